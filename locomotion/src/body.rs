use crate::collision::{CapsuleShape, ContactFlags};
use crate::config::MovementConfig;
use crate::constants::CAPSULE_MIN_HEIGHT_MARGIN;
use crate::error::LocomotionError;
use crate::utils::{Vec3, planar, planar_forward, planar_right, up};

/// Standing and crouched capsule heights for one character. The radius never changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleDimensions {
    pub radius: f32,
    pub stand_height: f32,
    pub crouch_height: f32,
}

impl CapsuleDimensions {
    pub fn from_config(cfg: &MovementConfig) -> Self {
        Self {
            radius: cfg.capsule_radius,
            stand_height: cfg.stand_height,
            crouch_height: cfg.crouch_height,
        }
    }

    /// Reject capsules that cannot be simulated. Both heights must fit two hemispheres plus a
    /// small margin.
    pub fn validate(&self) -> Result<(), LocomotionError> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(LocomotionError::InvalidRadius(self.radius));
        }

        let min = 2.0 * self.radius + CAPSULE_MIN_HEIGHT_MARGIN;
        for height in [self.stand_height, self.crouch_height] {
            if !(height.is_finite() && height >= min) {
                return Err(LocomotionError::CapsuleTooShort {
                    height,
                    min,
                    radius: self.radius,
                });
            }
        }

        Ok(())
    }
}

/// The simulated character: feet position, body yaw, velocity and collision capsule.
///
/// `position` is the bottom of the capsule. Crouching changes the height while keeping the feet
/// in place, so the capsule center always sits at `position + up * height / 2`.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterBody {
    pub(crate) position: Vec3,
    pub(crate) yaw: f32,
    pub(crate) velocity: Vec3,
    pub(crate) capsule: CapsuleDimensions,
    pub(crate) crouched: bool,
    /// Contacts reported by the most recent integrator move.
    pub(crate) last_contacts: ContactFlags,
}

impl CharacterBody {
    pub fn new(position: Vec3, yaw: f32, capsule: CapsuleDimensions) -> Result<Self, LocomotionError> {
        capsule.validate()?;
        if !(position.iter().all(|c| c.is_finite()) && yaw.is_finite()) {
            return Err(LocomotionError::NonFiniteSpawn);
        }

        Ok(Self {
            position,
            yaw,
            velocity: Vec3::zeros(),
            capsule,
            crouched: false,
            last_contacts: ContactFlags::empty(),
        })
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn capsule(&self) -> CapsuleDimensions {
        self.capsule
    }

    pub fn last_contacts(&self) -> ContactFlags {
        self.last_contacts
    }

    pub fn radius(&self) -> f32 {
        self.capsule.radius
    }

    pub fn is_crouched(&self) -> bool {
        self.crouched
    }

    /// Current capsule height (crouched or standing).
    pub fn height(&self) -> f32 {
        if self.crouched {
            self.capsule.crouch_height
        } else {
            self.capsule.stand_height
        }
    }

    pub fn center(&self) -> Vec3 {
        self.position + up() * (self.height() * 0.5)
    }

    /// Center-anchored capsule used by the integrator.
    pub fn shape(&self) -> CapsuleShape {
        CapsuleShape {
            radius: self.capsule.radius,
            half_segment: (self.height() * 0.5 - self.capsule.radius).max(0.0),
        }
    }

    /// Resize the capsule. The feet stay where they are.
    pub(crate) fn set_crouched(&mut self, crouched: bool) {
        self.crouched = crouched;
    }

    pub fn forward(&self) -> Vec3 {
        planar_forward(self.yaw)
    }

    pub fn right(&self) -> Vec3 {
        planar_right(self.yaw)
    }

    pub fn horizontal_velocity(&self) -> Vec3 {
        planar(self.velocity)
    }

    pub fn horizontal_speed(&self) -> f32 {
        self.horizontal_velocity().norm()
    }

    /// Replace the planar velocity, keeping the vertical component.
    pub(crate) fn set_horizontal_velocity(&mut self, horizontal: Vec3) {
        self.velocity.x = horizontal.x;
        self.velocity.z = horizontal.z;
    }
}

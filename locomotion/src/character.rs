use std::sync::Arc;

use crate::camera::{CameraPose, CameraRig, CameraTarget};
use crate::collision::{CapsuleMover, CollisionQueries};
use crate::config::ArchetypeConfig;
use crate::error::LocomotionError;
use crate::input::{InputBuffer, RawInput};
use crate::motor::{LocomotionMotor, MotorEvent, TickReport};
use crate::utils::{Vec3, clamp01};

/// Everything produced by one [`Character::frame`].
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub tick: TickReport,
    pub camera: CameraPose,
}

/// One playable character: input buffer, locomotion motor and follow camera, driven together
/// once per frame.
pub struct Character {
    archetype: Arc<ArchetypeConfig>,
    input: InputBuffer,
    motor: LocomotionMotor,
    camera: CameraRig,
}

impl Character {
    /// Spawn at `spawn` (feet) facing `yaw`. The camera starts behind the body.
    pub fn new(archetype: Arc<ArchetypeConfig>, spawn: Vec3, yaw: f32) -> Result<Self, LocomotionError> {
        let motor = LocomotionMotor::new(Arc::new(archetype.movement.clone()), spawn, yaw)?;
        let input = InputBuffer::new(motor.config().jump_buffer);
        let camera = CameraRig::new(Arc::new(archetype.camera.clone().validated()), yaw);

        log::debug!(
            "Spawned `{}` v{} at ({:.2}, {:.2}, {:.2})",
            archetype.name,
            archetype.version,
            spawn.x,
            spawn.y,
            spawn.z
        );

        Ok(Self {
            archetype,
            input,
            motor,
            camera,
        })
    }

    pub fn frame(
        &mut self,
        raw: &RawInput,
        queries: &dyn CollisionQueries,
        mover: &dyn CapsuleMover,
        dt: f32,
    ) -> FrameReport {
        let dt = dt.max(0.0).min(self.motor.config().max_delta_time);

        self.input.sample(raw, dt);
        self.camera.apply_look(self.input.look_delta());

        let tick = self
            .motor
            .tick(&mut self.input, self.camera.view_basis(), queries, mover, dt);

        let camera = self.camera.update(queries, self.camera_target(), dt);

        // Without input authority the body keeps whatever facing it has.
        if self.input.has_authority() {
            if let Some(yaw) = self
                .camera
                .facing_yaw(self.motor.body().yaw(), self.input.move_axis(), dt)
            {
                self.motor.set_facing_yaw(yaw);
            }
        }

        for event in &tick.events {
            if let MotorEvent::SlamLanded { intensity } = event {
                self.camera.kick(*intensity);
            }
        }

        self.input.end_frame();
        FrameReport { tick, camera }
    }

    fn camera_target(&self) -> CameraTarget {
        let max_speed = self.motor.config().max_ground_speed;
        let speed_ratio = if max_speed > 0.0 {
            clamp01(self.motor.body().horizontal_speed() / max_speed)
        } else {
            0.0
        };

        CameraTarget {
            position: self.motor.body().position(),
            body_yaw: self.motor.body().yaw(),
            crouched: self.motor.is_crouched(),
            grounded: self.motor.is_grounded(),
            speed_ratio,
        }
    }

    /// Scroll the camera distance; crossing `min_distance` switches view mode.
    pub fn zoom(&mut self, scroll: f32) {
        self.camera.zoom(scroll);
    }

    /// Hand control to (or take it from) the local player. Revoking neutralizes all input.
    pub fn set_input_authority(&mut self, authority: bool) {
        self.input.set_authority(authority);
    }

    pub fn archetype(&self) -> &Arc<ArchetypeConfig> {
        &self.archetype
    }

    pub fn motor(&self) -> &LocomotionMotor {
        &self.motor
    }

    pub fn motor_mut(&mut self) -> &mut LocomotionMotor {
        &mut self.motor
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn input(&self) -> &InputBuffer {
        &self.input
    }
}

/*!
Follow camera for one character.

The rig is third person while its orbit distance is above `min_distance` (plus a small band) and
first person otherwise. Each frame:
- look input turns the rig (yaw unbounded, pitch clamped per mode),
- [`CameraRig::update`] places the camera around the head anchor, pulling it in front of any
  occluder in third person and adding head-bob in first person,
- [`CameraRig::facing_yaw`] tells the host which way the body should turn to follow the camera.

Angles are stored in radians. Positive pitch looks down, matching [`crate::utils::view_rotation`].
*/

use std::sync::Arc;

use crate::collision::CollisionQueries;
use crate::config::CameraConfig;
use crate::constants::{
    CAMERA_KICK_DEGREES_PER_UNIT, DIST_EPS, FACING_INPUT_THRESHOLD, FIRST_PERSON_DISTANCE_EPS,
    HEADBOB_MIN_SPEED_RATIO,
};
use crate::motor::context::ViewBasis;
use crate::utils::{Quat, Vec2, Vec3, clamp01, lerp, slerp_yaw, smoothing_factor, up, view_rotation, wrap_angle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMode {
    FirstPerson,
    ThirdPerson,
}

/// What the rig follows this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTarget {
    /// Feet position of the character.
    pub position: Vec3,
    /// Body yaw; the first-person view looks along it.
    pub body_yaw: f32,
    pub crouched: bool,
    pub grounded: bool,
    /// Horizontal speed over the archetype's ground speed, in `[0, 1]`.
    pub speed_ratio: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Quat,
    pub mode: CameraMode,
    /// Distance from the head anchor after collision. Zero in first person.
    pub effective_distance: f32,
}

impl CameraPose {
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::z()
    }
}

pub struct CameraRig {
    config: Arc<CameraConfig>,
    yaw: f32,
    pitch: f32,
    distance: f32,
    headbob_phase: f32,
    headbob_offset: f32,
    /// 0 standing, 1 fully crouched.
    crouch_blend: f32,
    /// Extra pitch from impacts (radians), decays toward zero.
    kick: f32,
    pose: Option<CameraPose>,
}

impl CameraRig {
    pub fn new(config: Arc<CameraConfig>, yaw: f32) -> Self {
        let distance = config.distance.max(config.min_distance).min(config.max_distance);
        let mut rig = Self {
            yaw: wrap_angle(yaw),
            pitch: config.initial_pitch_deg.to_radians(),
            distance,
            headbob_phase: 0.0,
            headbob_offset: 0.0,
            crouch_blend: 0.0,
            kick: 0.0,
            pose: None,
            config,
        };
        rig.clamp_pitch();
        rig
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn mode(&self) -> CameraMode {
        if self.distance <= self.config.min_distance + FIRST_PERSON_DISTANCE_EPS {
            CameraMode::FirstPerson
        } else {
            CameraMode::ThirdPerson
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Requested orbit distance (before collision).
    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn headbob_offset(&self) -> f32 {
        self.headbob_offset
    }

    /// Last pose computed by [`CameraRig::update`].
    pub fn pose(&self) -> Option<CameraPose> {
        self.pose
    }

    /// Orientation the motor steers by. The kick is cosmetic and not included.
    pub fn view_basis(&self) -> ViewBasis {
        ViewBasis {
            yaw: self.yaw,
            pitch: self.pitch,
        }
    }

    /// Turn by a look delta. `x` turns right, `y` looks up.
    pub fn apply_look(&mut self, look_delta: Vec2) {
        if !(look_delta.x.is_finite() && look_delta.y.is_finite()) {
            return;
        }
        let sensitivity = self.config.look_sensitivity.to_radians();
        self.yaw = wrap_angle(self.yaw + look_delta.x * sensitivity);
        self.pitch -= look_delta.y * sensitivity;
        self.clamp_pitch();
    }

    /// Scroll toward (positive) or away from (negative) the character.
    pub fn zoom(&mut self, scroll: f32) {
        if !scroll.is_finite() {
            return;
        }
        let cfg = &self.config;
        self.distance = (self.distance - scroll * cfg.zoom_speed)
            .max(cfg.min_distance)
            .min(cfg.max_distance);
        self.clamp_pitch();
    }

    pub fn kick(&mut self, intensity: f32) {
        if intensity.is_finite() {
            self.kick += (intensity * CAMERA_KICK_DEGREES_PER_UNIT).to_radians();
        }
    }

    /// Point the camera orbits around and looks at.
    pub fn head_anchor(&self, feet: Vec3) -> Vec3 {
        feet + up() * (self.config.head_height - self.config.crouch_offset * self.crouch_blend)
    }

    pub fn update(&mut self, queries: &dyn CollisionQueries, target: CameraTarget, dt: f32) -> CameraPose {
        let dt = dt.max(0.0);
        let cfg = Arc::clone(&self.config);

        let crouch_goal = if target.crouched { 1.0 } else { 0.0 };
        self.crouch_blend = lerp(self.crouch_blend, crouch_goal, smoothing_factor(cfg.crouch_lerp_rate, dt));
        self.kick -= self.kick * smoothing_factor(cfg.kick_recovery_rate, dt);

        let head = self.head_anchor(target.position);
        let mode = self.mode();

        let pose = match mode {
            CameraMode::FirstPerson => {
                self.advance_headbob(target, dt);
                CameraPose {
                    position: head + up() * self.headbob_offset,
                    rotation: view_rotation(target.body_yaw, self.pitch + self.kick),
                    mode,
                    effective_distance: 0.0,
                }
            }
            CameraMode::ThirdPerson => {
                self.headbob_phase = 0.0;
                self.headbob_offset = 0.0;

                let back = view_rotation(self.yaw, self.pitch) * -Vec3::z();
                let distance = self.collide(queries, head, back);
                let position = head + back * distance;
                CameraPose {
                    position,
                    rotation: look_at(position, head).unwrap_or_else(|| view_rotation(self.yaw, self.pitch)),
                    mode,
                    effective_distance: distance,
                }
            }
        };

        self.pose = Some(pose);
        pose
    }

    /// Yaw the body should take this frame, or `None` when it keeps its own facing.
    ///
    /// First person always follows the camera. Third person only does while there is move
    /// input, so the player can orbit around an idle character.
    pub fn facing_yaw(&self, body_yaw: f32, move_input: Vec2, dt: f32) -> Option<f32> {
        let follow = self.mode() == CameraMode::FirstPerson || move_input.norm() > FACING_INPUT_THRESHOLD;
        if !follow {
            return None;
        }

        let t = (dt.max(0.0) * self.config.player_rotation_speed).min(1.0);
        Some(slerp_yaw(body_yaw, self.yaw, t))
    }

    fn clamp_pitch(&mut self) {
        let (min, max) = match self.mode() {
            CameraMode::FirstPerson => (self.config.fps_pitch_min_deg, self.config.fps_pitch_max_deg),
            CameraMode::ThirdPerson => (self.config.tps_pitch_min_deg, self.config.tps_pitch_max_deg),
        };
        self.pitch = self.pitch.max(min.to_radians()).min(max.to_radians());
    }

    /// Orbit distance after pulling the camera in front of the first occluder.
    fn collide(&self, queries: &dyn CollisionQueries, head: Vec3, back: Vec3) -> f32 {
        let cfg = &self.config;
        match queries.cast_sphere(head, cfg.collision_radius, back, self.distance) {
            Some(hit) => (hit.distance - cfg.collision_offset)
                .max(cfg.min_distance)
                .min(self.distance),
            None => self.distance,
        }
    }

    fn advance_headbob(&mut self, target: CameraTarget, dt: f32) {
        let ratio = clamp01(target.speed_ratio);
        if !target.grounded || ratio <= HEADBOB_MIN_SPEED_RATIO {
            self.headbob_phase = 0.0;
            self.headbob_offset = 0.0;
            return;
        }

        self.headbob_phase += dt * self.config.headbob_frequency * lerp(0.5, 1.0, ratio);
        self.headbob_offset = self.headbob_phase.sin() * self.config.headbob_amplitude * ratio;
    }
}

/// Rotation whose +Z points from `eye` to `target`.
fn look_at(eye: Vec3, target: Vec3) -> Option<Quat> {
    let dir = target - eye;
    if dir.norm_squared() <= DIST_EPS {
        return None;
    }
    Some(Quat::face_towards(&dir, &up()))
}

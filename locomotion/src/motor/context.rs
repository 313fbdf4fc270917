use crate::body::CharacterBody;
use crate::collision::CollisionQueries;
use crate::collision::probe::{GroundInfo, WallHit, probe_wall, wall_candidate_directions};
use crate::config::MovementConfig;
use crate::constants::WALL_SAME_SIDE_DOT;
use crate::input::InputBuffer;
use crate::utils::{Vec3, normalize_or_zero, planar_forward, planar_right, view_rotation};

use super::MotorEvent;
use super::dash_pool::DashChargePool;

/// Camera orientation the motor steers by. `pitch` is positive when looking down.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewBasis {
    pub yaw: f32,
    pub pitch: f32,
}

impl ViewBasis {
    /// Level view along the body facing, for hosts without a camera.
    pub fn from_body(body: &CharacterBody) -> Self {
        Self {
            yaw: body.yaw(),
            pitch: 0.0,
        }
    }

    pub fn forward(&self) -> Vec3 {
        planar_forward(self.yaw)
    }

    pub fn right(&self) -> Vec3 {
        planar_right(self.yaw)
    }

    /// Full 3D look direction including pitch.
    pub fn look_direction(&self) -> Vec3 {
        view_rotation(self.yaw, self.pitch) * Vec3::z()
    }
}

/// Timers and counters that outlive any single state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MotorTimers {
    /// Seconds since the ground probe last reported grounded (coyote window).
    pub time_since_grounded: f32,
    /// Seconds of airtime feeding the gravity ramp. Jumps and wall runs restart it.
    pub time_in_air: f32,
    pub time_on_slope: f32,
    /// Jumps used since the last ground contact.
    pub jump_count: u32,
    pub slide_cooldown: f32,
    pub wall_regrab_grace: f32,
    pub wall_same_side_cooldown: f32,
    pub last_wall_normal: Option<Vec3>,
    /// Wall whose run timed out. It stays off limits until the next ground contact.
    pub exhausted_wall_normal: Option<Vec3>,
}

impl MotorTimers {
    pub fn advance(&mut self, dt: f32, grounded: bool) {
        if grounded {
            self.time_since_grounded = 0.0;
            self.time_in_air = 0.0;
            self.jump_count = 0;
            self.exhausted_wall_normal = None;
        } else {
            self.time_since_grounded += dt;
            self.time_in_air += dt;
        }

        self.slide_cooldown = (self.slide_cooldown - dt).max(0.0);
        self.wall_regrab_grace = (self.wall_regrab_grace - dt).max(0.0);
        self.wall_same_side_cooldown = (self.wall_same_side_cooldown - dt).max(0.0);
    }

    fn is_last_wall(&self, normal: Vec3) -> bool {
        self.wall_same_side_cooldown > 0.0
            && self
                .last_wall_normal
                .is_some_and(|last| last.dot(&normal) > WALL_SAME_SIDE_DOT)
    }

    pub fn wall_run_allowed(&self, normal: Vec3) -> bool {
        let exhausted = self
            .exhausted_wall_normal
            .is_some_and(|wall| wall.dot(&normal) > WALL_SAME_SIDE_DOT);
        !exhausted && !self.is_last_wall(normal)
    }

    pub fn wall_jump_allowed(&self, normal: Vec3) -> bool {
        !self.is_last_wall(normal)
    }
}

/// Everything one state tick may read or mutate.
pub struct LocomotionContext<'a> {
    pub cfg: &'a MovementConfig,
    pub body: &'a mut CharacterBody,
    pub input: &'a mut InputBuffer,
    pub timers: &'a mut MotorTimers,
    pub dash: &'a mut DashChargePool,
    pub ground: &'a GroundInfo,
    pub view: ViewBasis,
    pub queries: &'a dyn CollisionQueries,
    pub dt: f32,
    pub events: &'a mut Vec<MotorEvent>,
}

impl LocomotionContext<'_> {
    /// Unit planar intent from the move axis in the view's basis, or zero without input.
    pub fn wish(&self) -> Vec3 {
        let axis = self.input.move_axis();
        normalize_or_zero(self.view.right() * axis.x + self.view.forward() * axis.y)
    }

    pub fn has_move_input(&self) -> bool {
        self.input.has_move_input()
    }

    pub fn wants_dash(&self) -> bool {
        self.input.dash_pressed() && self.dash.can_dash()
    }

    /// Slide held, off cooldown and moving fast enough.
    pub fn can_start_slide(&self) -> bool {
        self.input.slide_held()
            && self.timers.slide_cooldown <= 0.0
            && self.body.horizontal_speed() >= self.cfg.slide_min_entry_speed
    }

    /// Lost the floor without a steep slope to slide on.
    pub fn lost_ground(&self) -> bool {
        !self.ground.grounded && !self.ground.near_steep_slope
    }

    /// Nearest usable wall around the body within `wall_check_distance`.
    pub fn find_wall(&self) -> Option<WallHit> {
        probe_wall(
            self.queries,
            &*self.body,
            &wall_candidate_directions(&*self.body),
            self.cfg.wall_check_distance,
            self.cfg.walkable_cos(),
        )
    }

    pub fn emit(&mut self, event: MotorEvent) {
        self.events.push(event);
    }
}

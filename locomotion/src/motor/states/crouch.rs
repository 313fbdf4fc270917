use super::{StateRequest, can_stand, crouch_jump};
use crate::motor::context::LocomotionContext;
use crate::motor::physics::accelerate_toward;
use crate::motor::{JumpKind, MotorEvent};

/// Crouch-walking with the short capsule. Stands back up once headroom has stayed clear for
/// `stand_clear_time` with slide released.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CrouchState {
    clear_time: f32,
}

impl CrouchState {
    pub fn enter(ctx: &mut LocomotionContext) -> Self {
        ctx.body.set_crouched(true);
        Self { clear_time: 0.0 }
    }

    pub fn tick(&mut self, ctx: &mut LocomotionContext) -> Option<StateRequest> {
        let cfg = ctx.cfg;

        if ctx.lost_ground() {
            return Some(StateRequest::Airborne);
        }
        if ctx.wants_dash() {
            return Some(StateRequest::Dash);
        }
        if ctx.input.slide_held() && ctx.timers.slide_cooldown <= 0.0 && ctx.has_move_input() {
            return Some(StateRequest::Slide);
        }
        if ctx.input.has_buffered_jump() && ctx.ground.grounded {
            crouch_jump(ctx, JumpKind::Ground);
            return Some(StateRequest::Airborne);
        }

        let moving = ctx.has_move_input();
        let rate = if moving { cfg.crouch_accel } else { cfg.crouch_decel };
        let target = ctx.wish() * cfg.crouch_walk_speed;
        let horizontal = accelerate_toward(ctx.body.horizontal_velocity(), target, rate, ctx.dt);
        ctx.body.set_horizontal_velocity(horizontal);
        ctx.body.velocity.y = cfg.ground_stick_velocity;

        if ctx.input.slide_held() || !can_stand(ctx) {
            self.clear_time = 0.0;
            return None;
        }

        self.clear_time += ctx.dt;
        if self.clear_time < cfg.stand_clear_time {
            return None;
        }

        ctx.body.set_crouched(false);
        ctx.emit(MotorEvent::Stood);
        Some(StateRequest::Grounded)
    }
}

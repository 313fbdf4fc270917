use super::{StateRequest, launch_jump};
use crate::motor::context::LocomotionContext;
use crate::motor::physics::{
    air_accelerate, apply_landing_keep, landing_keep_fraction, progressive_gravity, wall_jump_velocity,
    wall_run_entry_allowed,
};
use crate::motor::{JumpKind, MotorEvent};

/// Jumping and falling, with air control, progressive gravity and wall checks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AirborneState;

impl AirborneState {
    pub fn enter(_ctx: &mut LocomotionContext) -> Self {
        Self
    }

    pub fn tick(&mut self, ctx: &mut LocomotionContext) -> Option<StateRequest> {
        let cfg = ctx.cfg;

        if ctx.wants_dash() {
            return Some(StateRequest::Dash);
        }
        if ctx.input.slide_pressed() {
            ctx.input.consume_slide_press();
            return Some(StateRequest::Slam);
        }

        let ground = *ctx.ground;
        if ground.grounded && ground.is_walkable && ctx.body.velocity.y <= 0.0 {
            let keep = landing_keep_fraction(ctx.body.velocity, ground.normal, cfg);
            ctx.body.velocity = apply_landing_keep(ctx.body.velocity, ground.normal, keep);
            ctx.emit(MotorEvent::Landed { keep });

            // Jump pressed just before touching down goes off on the landing frame.
            if ctx.input.has_buffered_jump() {
                ctx.timers.jump_count = 0;
                launch_jump(ctx, JumpKind::Ground);
                return None;
            }

            return Some(if ctx.body.is_crouched() {
                StateRequest::Crouch
            } else {
                StateRequest::Grounded
            });
        }
        if ground.near_steep_slope && ctx.body.velocity.y <= 0.0 {
            return Some(StateRequest::Grounded);
        }

        if ctx.input.has_buffered_jump() && try_air_jump(ctx) {
            return None;
        }

        let horizontal = ctx.body.horizontal_velocity();
        let control = if ctx.body.velocity.y > 0.0 {
            cfg.air_control_ascend_factor
        } else {
            cfg.air_control_descend_factor
        };
        let horizontal = air_accelerate(horizontal, ctx.wish(), cfg.max_air_speed, cfg.accel_air * control, ctx.dt);
        ctx.body.set_horizontal_velocity(horizontal);
        ctx.body.velocity.y = progressive_gravity(ctx.body.velocity.y, ctx.timers.time_in_air, 1.0, cfg, ctx.dt);

        let wall = ctx.find_wall()?;
        let threshold = if ctx.timers.wall_regrab_grace > 0.0 {
            cfg.wall_chain_approach_dot
        } else {
            cfg.wall_approach_min_dot
        };
        let enters = ctx.timers.wall_run_allowed(wall.normal)
            && wall_run_entry_allowed(ctx.body.horizontal_velocity(), wall.normal, threshold, cfg);

        enters.then_some(StateRequest::WallRun { wall })
    }
}

/// Wall jump first, then coyote, then a counted air jump. Returns `false` when none applies and
/// the buffered press is kept for later.
fn try_air_jump(ctx: &mut LocomotionContext) -> bool {
    let cfg = ctx.cfg;

    if let Some(wall) = ctx.find_wall().filter(|w| ctx.timers.wall_jump_allowed(w.normal)) {
        ctx.body.velocity = wall_jump_velocity(ctx.body.velocity, wall.normal, cfg);
        ctx.input.consume_buffered_jump();

        let timers = &mut *ctx.timers;
        timers.jump_count = timers.jump_count.max(1);
        timers.time_in_air = 0.0;
        timers.wall_regrab_grace = cfg.wall_regrab_grace;
        timers.wall_same_side_cooldown = cfg.wall_same_side_cooldown;
        timers.last_wall_normal = Some(wall.normal);

        ctx.emit(MotorEvent::Jumped { kind: JumpKind::Wall });
        return true;
    }

    let jumps = ctx.timers.jump_count;
    if jumps == 0 && ctx.timers.time_since_grounded <= cfg.coyote_time {
        launch_jump(ctx, JumpKind::Coyote);
        return true;
    }
    if jumps > 0 && jumps < cfg.max_jumps {
        launch_jump(ctx, JumpKind::Air);
        return true;
    }

    false
}

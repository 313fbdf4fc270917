use super::{StateRequest, launch_jump};
use crate::motor::JumpKind;
use crate::motor::context::LocomotionContext;
use crate::motor::physics::{accelerate_toward, downhill_direction, slope_slide_accel};
use crate::utils::{clamp01, lerp, normalize_or_zero, planar};

/// Walking, sprinting and sliding down slopes that are too steep to stand on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroundedState;

impl GroundedState {
    pub fn enter(ctx: &mut LocomotionContext) -> Self {
        ctx.timers.jump_count = 0;
        if ctx.body.velocity.y < 0.0 {
            ctx.body.velocity.y = ctx.cfg.ground_stick_velocity;
        }
        Self
    }

    pub fn tick(&mut self, ctx: &mut LocomotionContext) -> Option<StateRequest> {
        if ctx.body.is_crouched() {
            return Some(StateRequest::Crouch);
        }
        if ctx.wants_dash() {
            return Some(StateRequest::Dash);
        }
        if ctx.can_start_slide() {
            return Some(StateRequest::Slide);
        }
        if ctx.lost_ground() {
            return Some(StateRequest::Airborne);
        }

        if ctx.input.has_buffered_jump() && ctx.ground.grounded && ctx.ground.is_walkable {
            launch_jump(ctx, JumpKind::Ground);
            return Some(StateRequest::Airborne);
        }

        let ground = *ctx.ground;
        let slope_sliding = ground.near_steep_slope
            || (ground.hit && ground.slope_angle_deg > ctx.cfg.slope_slide_threshold_deg);

        if slope_sliding {
            slide_down_slope(ctx);
        } else {
            ctx.timers.time_on_slope = 0.0;
            walk(ctx);
        }

        ctx.body.velocity.y = ctx.cfg.ground_stick_velocity;
        None
    }
}

fn walk(ctx: &mut LocomotionContext) {
    let cfg = ctx.cfg;
    let wish = ctx.wish();
    let moving = ctx.has_move_input();

    let mut speed = if ctx.input.sprint_held() {
        cfg.max_sprint_speed
    } else {
        cfg.max_ground_speed
    };
    let mut accel = cfg.accel_ground;

    if moving && ctx.ground.hit {
        let downhill = normalize_or_zero(planar(downhill_direction(ctx.ground.normal)));
        let uphill = clamp01(-wish.dot(&downhill));
        let steepness = clamp01(ctx.ground.slope_angle_deg / cfg.walkable_limit_deg.max(1.0));
        speed *= lerp(1.0, cfg.uphill_speed_scale, uphill * steepness);
        accel *= lerp(1.0, cfg.uphill_accel_scale, uphill * steepness);
    }

    let rate = if moving { accel } else { cfg.decel_ground };
    let horizontal = accelerate_toward(ctx.body.horizontal_velocity(), wish * speed, rate, ctx.dt);
    ctx.body.set_horizontal_velocity(horizontal);
}

fn slide_down_slope(ctx: &mut LocomotionContext) {
    let cfg = ctx.cfg;
    ctx.timers.time_on_slope += ctx.dt;

    let downhill = normalize_or_zero(planar(downhill_direction(ctx.ground.normal)));
    let accel = slope_slide_accel(ctx.ground.slope_angle_deg, ctx.timers.time_on_slope, cfg);

    let mut horizontal = ctx.body.horizontal_velocity() + downhill * (accel * ctx.dt);
    let speed = horizontal.norm();
    if speed > cfg.slope_slide_max_speed {
        horizontal *= cfg.slope_slide_max_speed / speed;
    }
    ctx.body.set_horizontal_velocity(horizontal);
}

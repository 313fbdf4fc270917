use super::{StateRequest, crouch_jump};
use crate::config::SlideSpeedProfile;
use crate::constants::SLIDE_MIN_STICK_SPEED;
use crate::motor::context::LocomotionContext;
use crate::motor::physics::downhill_direction;
use crate::motor::{JumpKind, MotorEvent};
use crate::utils::{Vec3, normalize_or_zero, planar, rotate_towards};

/// Low-profile slide along a locked, slowly steerable direction.
///
/// The capsule is crouched on entry and only grows back through the crouch stand-up logic.
#[derive(Clone, Debug, PartialEq)]
pub struct SlideState {
    direction: Vec3,
    speed: f32,
    /// Feet position when the last slide velocity was set; measures forward progress.
    last_position: Vec3,
}

impl SlideState {
    pub fn enter(ctx: &mut LocomotionContext) -> Self {
        let cfg = ctx.cfg;
        ctx.timers.slide_cooldown = cfg.slide_cooldown;
        ctx.body.set_crouched(true);

        let strong_input = ctx.input.move_axis().norm() >= cfg.slide_input_threshold;
        let mut direction = if strong_input { ctx.wish() } else { ctx.view.forward() };
        if direction == Vec3::zeros() {
            direction = ctx.body.forward();
        }
        let direction = normalize_or_zero(planar(direction));

        let speed = match cfg.slide_profile {
            SlideSpeedProfile::Constant { speed } => speed,
            SlideSpeedProfile::Momentum { min_speed, max_speed, .. } => {
                ctx.body.horizontal_speed().max(min_speed).min(max_speed)
            }
        };

        let stick = stick_down(ctx);
        ctx.body.set_horizontal_velocity(direction * speed);
        ctx.body.velocity.y = stick;
        ctx.emit(MotorEvent::SlideStarted { direction });

        Self {
            direction,
            speed,
            last_position: ctx.body.position(),
        }
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn tick(&mut self, ctx: &mut LocomotionContext) -> Option<StateRequest> {
        let cfg = ctx.cfg;

        if ctx.lost_ground() {
            return Some(StateRequest::Airborne);
        }

        let progress = (ctx.body.position() - self.last_position).dot(&self.direction);
        if progress <= cfg.slide_stall_threshold {
            ctx.body.set_horizontal_velocity(Vec3::zeros());
            return Some(StateRequest::Crouch);
        }

        if ctx.wants_dash() {
            return Some(StateRequest::Dash);
        }

        if ctx.input.has_buffered_jump() {
            if crouch_jump(ctx, JumpKind::Slide) == JumpKind::Slide {
                let boosted = ctx.body.horizontal_velocity() * cfg.slide_jump_horiz_boost;
                ctx.body.set_horizontal_velocity(boosted);
            }
            return Some(StateRequest::Airborne);
        }

        if !ctx.input.slide_held() {
            ctx.body.set_horizontal_velocity(Vec3::zeros());
            return Some(StateRequest::Crouch);
        }

        let wish = ctx.wish();
        if wish != Vec3::zeros() {
            let max_turn = cfg.slide_turn_rate_deg.max(0.0).to_radians() * ctx.dt;
            self.direction = rotate_towards(self.direction, wish, max_turn);
        }
        self.speed = next_speed(self.speed, self.direction, ctx);

        let stick = stick_down(ctx);
        ctx.body.set_horizontal_velocity(self.direction * self.speed);
        ctx.body.velocity.y = stick;
        self.last_position = ctx.body.position();
        None
    }
}

fn stick_down(ctx: &LocomotionContext) -> f32 {
    -ctx.cfg.slide_stick_down_velocity.max(SLIDE_MIN_STICK_SPEED)
}

/// Advance the slide speed for one frame according to the configured profile.
fn next_speed(speed: f32, direction: Vec3, ctx: &LocomotionContext) -> f32 {
    match ctx.cfg.slide_profile {
        SlideSpeedProfile::Constant { speed } => speed,
        SlideSpeedProfile::Momentum {
            min_speed,
            max_speed,
            accel,
            friction,
            slope_accel_scale,
        } => {
            let ground = ctx.ground;
            let downhill = normalize_or_zero(planar(downhill_direction(ground.normal)));
            let slope_push = ctx.cfg.gravity_base
                * ground.slope_angle_deg.to_radians().sin()
                * downhill.dot(&direction)
                * slope_accel_scale;

            let rate = if slope_push > 0.0 {
                accel + slope_push
            } else {
                slope_push - friction
            };
            (speed + rate * ctx.dt).max(min_speed).min(max_speed.max(min_speed))
        }
    }
}

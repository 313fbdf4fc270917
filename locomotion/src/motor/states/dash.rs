use super::StateRequest;
use crate::motor::MotorEvent;
use crate::motor::context::LocomotionContext;
use crate::motor::physics::{dash_direction, progressive_gravity};
use crate::utils::{Vec3, planar};

/// Fixed-direction burst at constant speed for `dash_duration`.
#[derive(Clone, Debug, PartialEq)]
pub struct DashState {
    direction: Vec3,
    elapsed: f32,
}

impl DashState {
    pub fn enter(ctx: &mut LocomotionContext) -> Self {
        ctx.input.consume_dash();
        if !ctx.dash.try_consume() {
            log::warn!("Dash entered without an available charge");
        }

        let direction = dash_direction(ctx.wish(), ctx.view.look_direction(), ctx.body.forward(), ctx.cfg);
        ctx.body.velocity = direction * ctx.cfg.dash_speed;
        ctx.emit(MotorEvent::DashStarted { direction });

        Self {
            direction,
            elapsed: 0.0,
        }
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn tick(&mut self, ctx: &mut LocomotionContext) -> Option<StateRequest> {
        let cfg = ctx.cfg;
        self.elapsed += ctx.dt;

        if ctx.input.slide_pressed() {
            if !ctx.ground.grounded {
                ctx.input.consume_slide_press();
                return Some(StateRequest::Slam);
            }
            if ctx.can_start_slide() {
                ctx.input.consume_slide_press();
                return Some(StateRequest::Slide);
            }
        }

        if self.elapsed >= cfg.dash_duration {
            return Some(if ctx.ground.grounded {
                StateRequest::Grounded
            } else {
                StateRequest::Airborne
            });
        }

        let burst = self.direction * cfg.dash_speed;
        if cfg.dash_ignores_gravity {
            ctx.body.velocity = burst;
        } else {
            let vy = progressive_gravity(ctx.body.velocity.y, ctx.timers.time_in_air, 1.0, cfg, ctx.dt);
            let horizontal = planar(burst);
            ctx.body.velocity = horizontal + Vec3::new(0.0, vy, 0.0);
        }

        None
    }
}

use super::StateRequest;
use crate::motor::MotorEvent;
use crate::motor::context::LocomotionContext;
use crate::utils::Vec3;

/// Ground pound: a constant dive, then a short settle lock after impact.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SlamState {
    /// Remaining settle time once landed; `None` while still falling.
    settle: Option<f32>,
}

impl SlamState {
    pub fn enter(ctx: &mut LocomotionContext) -> Self {
        ctx.body.velocity.y = -ctx.cfg.slam_down_force;
        Self { settle: None }
    }

    pub fn is_settling(&self) -> bool {
        self.settle.is_some()
    }

    pub fn tick(&mut self, ctx: &mut LocomotionContext) -> Option<StateRequest> {
        let cfg = ctx.cfg;

        let Some(remaining) = self.settle else {
            if ctx.wants_dash() {
                return Some(StateRequest::Dash);
            }

            if !ctx.ground.grounded {
                ctx.body.velocity.y = -cfg.slam_down_force;
                return None;
            }

            ctx.emit(MotorEvent::SlamLanded {
                intensity: cfg.slam_kick_intensity,
            });
            if ctx.input.slide_held() && ctx.timers.slide_cooldown <= 0.0 {
                return Some(StateRequest::Slide);
            }

            self.settle = Some(cfg.slam_settle_time);
            hold_still(ctx);
            return None;
        };

        let remaining = remaining - ctx.dt;
        self.settle = Some(remaining);
        if ctx.lost_ground() {
            return Some(StateRequest::Airborne);
        }

        hold_still(ctx);
        if remaining > 0.0 {
            return None;
        }

        Some(if ctx.body.is_crouched() {
            StateRequest::Crouch
        } else {
            StateRequest::Grounded
        })
    }
}

fn hold_still(ctx: &mut LocomotionContext) {
    ctx.body.set_horizontal_velocity(Vec3::zeros());
    ctx.body.velocity.y = ctx.cfg.ground_stick_velocity;
}

use super::StateRequest;
use crate::collision::probe::{WallHit, still_has_wall};
use crate::motor::context::LocomotionContext;
use crate::motor::physics::{progressive_gravity, wall_jump_velocity};
use crate::motor::{JumpKind, MotorEvent};
use crate::utils::{Vec3, normalize_or_zero, planar, project_on_plane};

/// Running along a wall with reduced gravity until the wall ends, time runs out, the feet find
/// ground or the player jumps off.
#[derive(Clone, Debug, PartialEq)]
pub struct WallRunState {
    normal: Vec3,
    elapsed: f32,
}

impl WallRunState {
    pub fn enter(ctx: &mut LocomotionContext, wall: WallHit) -> Self {
        ctx.body.velocity = project_on_plane(ctx.body.velocity, wall.normal);
        ctx.timers.time_in_air = 0.0;
        ctx.timers.last_wall_normal = Some(wall.normal);
        ctx.emit(MotorEvent::WallRunStarted { normal: wall.normal });

        Self {
            normal: wall.normal,
            elapsed: 0.0,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn tick(&mut self, ctx: &mut LocomotionContext) -> Option<StateRequest> {
        let cfg = ctx.cfg;
        self.elapsed += ctx.dt;

        if ctx.input.has_buffered_jump() {
            ctx.body.velocity = wall_jump_velocity(ctx.body.velocity, self.normal, cfg);
            ctx.input.consume_buffered_jump();
            ctx.timers.jump_count = ctx.timers.jump_count.max(1);
            ctx.timers.time_in_air = 0.0;
            ctx.emit(MotorEvent::Jumped { kind: JumpKind::Wall });
            return Some(self.leave(ctx));
        }

        if ctx.ground.grounded && ctx.ground.is_walkable {
            self.leave(ctx);
            return Some(StateRequest::Grounded);
        }

        match still_has_wall(
            ctx.queries,
            &*ctx.body,
            self.normal,
            cfg.wall_check_distance,
            cfg.walkable_cos(),
        ) {
            Some(hit) => self.normal = hit.normal,
            None => return Some(self.leave(ctx)),
        }

        if self.elapsed >= cfg.wall_run_max_time {
            ctx.timers.exhausted_wall_normal = Some(self.normal);
            return Some(self.leave(ctx));
        }

        let mut velocity = project_on_plane(ctx.body.velocity, self.normal);
        let wish = ctx.wish();
        let steer = if wish == Vec3::zeros() { planar(velocity) } else { wish };
        let along = normalize_or_zero(planar(project_on_plane(steer, self.normal)));
        velocity += along * (cfg.wall_run_accel * ctx.dt);

        velocity.y = progressive_gravity(
            velocity.y,
            ctx.timers.time_in_air,
            cfg.wall_run_gravity_scale,
            cfg,
            ctx.dt,
        );
        ctx.body.velocity = velocity;
        None
    }

    /// Start the regrab grace and same-side cooldown for this wall. Always hands back to
    /// Airborne unless the caller overrides the request.
    fn leave(&self, ctx: &mut LocomotionContext) -> StateRequest {
        ctx.timers.wall_regrab_grace = ctx.cfg.wall_regrab_grace;
        ctx.timers.wall_same_side_cooldown = ctx.cfg.wall_same_side_cooldown;
        ctx.timers.last_wall_normal = Some(self.normal);
        ctx.emit(MotorEvent::WallRunEnded);
        StateRequest::Airborne
    }
}

/*!
Locomotion states as one closed sum type.

Each variant owns only its local data. Shared per-character data lives in
[`LocomotionContext`](super::context::LocomotionContext), borrowed for the duration of a tick.

Protocol, once per frame:
- The active state's `tick` mutates the body velocity and either stays (`None`) or requests
  exactly one successor.
- The motor builds the successor with [`LocomotionState::enter`] in the same frame. Entry
  effects (dash launch, slide capsule shrink, wall projection) happen there.
*/

mod airborne;
mod crouch;
mod dash;
mod grounded;
mod slam;
mod slide;
mod wall_run;

use std::fmt;

pub use airborne::AirborneState;
pub use crouch::CrouchState;
pub use dash::DashState;
pub use grounded::GroundedState;
pub use slam::SlamState;
pub use slide::SlideState;
pub use wall_run::WallRunState;

use super::context::LocomotionContext;
use super::physics::jump_horizontal_bonus;
use super::{JumpKind, MotorEvent};
use crate::collision::probe::{WallHit, has_headroom};

/// Successor requested by a state tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StateRequest {
    Grounded,
    Airborne,
    Dash,
    Slide,
    Crouch,
    WallRun { wall: WallHit },
    Slam,
}

/// Payload-free discriminant, for logs, observers and diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateKind {
    Grounded,
    Airborne,
    Dash,
    Slide,
    Crouch,
    WallRun,
    Slam,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateKind::Grounded => "Grounded",
            StateKind::Airborne => "Airborne",
            StateKind::Dash => "Dash",
            StateKind::Slide => "Slide",
            StateKind::Crouch => "Crouch",
            StateKind::WallRun => "WallRun",
            StateKind::Slam => "Slam",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LocomotionState {
    Grounded(GroundedState),
    Airborne(AirborneState),
    Dash(DashState),
    Slide(SlideState),
    Crouch(CrouchState),
    WallRun(WallRunState),
    Slam(SlamState),
}

impl Default for LocomotionState {
    fn default() -> Self {
        LocomotionState::Grounded(GroundedState)
    }
}

impl LocomotionState {
    pub fn kind(&self) -> StateKind {
        match self {
            LocomotionState::Grounded(_) => StateKind::Grounded,
            LocomotionState::Airborne(_) => StateKind::Airborne,
            LocomotionState::Dash(_) => StateKind::Dash,
            LocomotionState::Slide(_) => StateKind::Slide,
            LocomotionState::Crouch(_) => StateKind::Crouch,
            LocomotionState::WallRun(_) => StateKind::WallRun,
            LocomotionState::Slam(_) => StateKind::Slam,
        }
    }

    pub fn tick(&mut self, ctx: &mut LocomotionContext) -> Option<StateRequest> {
        match self {
            LocomotionState::Grounded(state) => state.tick(ctx),
            LocomotionState::Airborne(state) => state.tick(ctx),
            LocomotionState::Dash(state) => state.tick(ctx),
            LocomotionState::Slide(state) => state.tick(ctx),
            LocomotionState::Crouch(state) => state.tick(ctx),
            LocomotionState::WallRun(state) => state.tick(ctx),
            LocomotionState::Slam(state) => state.tick(ctx),
        }
    }

    /// Build the requested state and apply its entry effects.
    pub fn enter(request: StateRequest, ctx: &mut LocomotionContext) -> Self {
        match request {
            StateRequest::Grounded => LocomotionState::Grounded(GroundedState::enter(ctx)),
            StateRequest::Airborne => LocomotionState::Airborne(AirborneState::enter(ctx)),
            StateRequest::Dash => LocomotionState::Dash(DashState::enter(ctx)),
            StateRequest::Slide => LocomotionState::Slide(SlideState::enter(ctx)),
            StateRequest::Crouch => LocomotionState::Crouch(CrouchState::enter(ctx)),
            StateRequest::WallRun { wall } => LocomotionState::WallRun(WallRunState::enter(ctx, wall)),
            StateRequest::Slam => LocomotionState::Slam(SlamState::enter(ctx)),
        }
    }
}

/// Vertical jump at full jump velocity with the horizontal speed bonus.
///
/// Uses up the buffered jump, counts the jump and restarts the gravity ramp.
pub(crate) fn launch_jump(ctx: &mut LocomotionContext, kind: JumpKind) {
    let horizontal = jump_horizontal_bonus(ctx.body.horizontal_velocity(), ctx.cfg);
    ctx.body.set_horizontal_velocity(horizontal);
    ctx.body.velocity.y = ctx.cfg.jump_velocity();

    ctx.timers.jump_count += 1;
    ctx.timers.time_in_air = 0.0;
    ctx.input.consume_buffered_jump();
    ctx.emit(MotorEvent::Jumped { kind });
}

/// Whether the crouched capsule could grow back to standing height here.
pub(crate) fn can_stand(ctx: &LocomotionContext) -> bool {
    let capsule = ctx.body.capsule();
    has_headroom(
        ctx.queries,
        &*ctx.body,
        capsule.crouch_height,
        capsule.stand_height,
        capsule.radius * 0.9,
    )
}

/// Stand up if there is room. Returns `true` when the body ends up standing.
pub(crate) fn stand_if_clear(ctx: &mut LocomotionContext) -> bool {
    if !ctx.body.is_crouched() {
        return true;
    }
    if !can_stand(ctx) {
        return false;
    }

    ctx.body.set_crouched(false);
    ctx.emit(MotorEvent::Stood);
    true
}

/// Ground-style jump from a crouch: stand and jump when there is room, otherwise duck-jump.
pub(crate) fn crouch_jump(ctx: &mut LocomotionContext, standing_kind: JumpKind) -> JumpKind {
    let kind = if stand_if_clear(ctx) {
        standing_kind
    } else {
        JumpKind::Duck
    };
    launch_jump(ctx, kind);
    kind
}

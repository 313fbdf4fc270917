/*!
Per-frame locomotion driver.

One [`LocomotionMotor::tick`] runs, in order:
1. Clamp `dt` and probe the ground.
2. Advance the carried timers and the dash pool.
3. Tick the active state, then enter the requested successor (at most one per frame).
4. Hand the velocity to the [`CapsuleMover`] and apply the displacement it reports.
5. React to contact flags and notify observers.
*/

pub mod context;
pub mod dash_pool;
pub mod physics;
pub mod states;

use std::sync::Arc;

use crate::body::{CapsuleDimensions, CharacterBody};
use crate::collision::probe::{GroundInfo, probe_ground};
use crate::collision::{CapsuleMover, CollisionQueries, ContactFlag, ContactFlags};
use crate::config::MovementConfig;
use crate::error::LocomotionError;
use crate::input::InputBuffer;
use crate::utils::{Vec3, wrap_angle};

use context::{LocomotionContext, MotorTimers, ViewBasis};
use dash_pool::DashChargePool;
use states::{LocomotionState, StateKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpKind {
    /// Jump off walkable ground (including a bunny hop on the landing frame).
    Ground,
    /// Ground-style jump shortly after walking off a ledge.
    Coyote,
    /// Extra jump spent from `max_jumps` while airborne.
    Air,
    Wall,
    /// Standing jump out of a slide, with the slide boost.
    Slide,
    /// Jump that stays crouched because there is no headroom.
    Duck,
}

/// Things that happened during a tick, for camera, audio and animation adapters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotorEvent {
    Jumped { kind: JumpKind },
    Landed { keep: f32 },
    DashStarted { direction: Vec3 },
    SlideStarted { direction: Vec3 },
    SlamLanded { intensity: f32 },
    WallRunStarted { normal: Vec3 },
    WallRunEnded,
    Stood,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateTransition {
    pub from: StateKind,
    pub to: StateKind,
}

/// Outcome of one motor tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub transition: Option<StateTransition>,
    pub events: Vec<MotorEvent>,
    pub contacts: ContactFlags,
    /// Displacement actually applied by the mover.
    pub displacement: Vec3,
}

impl TickReport {
    pub fn has_event(&self, predicate: impl Fn(&MotorEvent) -> bool) -> bool {
        self.events.iter().any(predicate)
    }
}

/// Callbacks for adapters that prefer push notifications over reading [`TickReport`].
pub trait LocomotionObserver {
    fn on_state_changed(&mut self, _from: StateKind, _to: StateKind) {}

    fn on_event(&mut self, _event: &MotorEvent) {}
}

/// Read-only snapshot of the motor internals for debug overlays.
#[derive(Clone, Debug, PartialEq)]
pub struct MotorDiagnostics {
    pub state: StateKind,
    pub position: Vec3,
    pub velocity: Vec3,
    pub ground: GroundInfo,
    pub contacts: ContactFlags,
    pub crouched: bool,
    pub time_since_grounded: f32,
    pub time_in_air: f32,
    pub time_on_slope: f32,
    pub jump_count: u32,
    pub dash_charges: u32,
    pub dash_max_charges: u32,
    pub dash_cooldown: f32,
    pub dash_recharge_progress: f32,
    pub slide_cooldown: f32,
    pub wall_regrab_grace: f32,
    pub wall_same_side_cooldown: f32,
}

pub struct LocomotionMotor {
    config: Arc<MovementConfig>,
    body: CharacterBody,
    state: LocomotionState,
    timers: MotorTimers,
    dash: DashChargePool,
    ground: GroundInfo,
    observers: Vec<Box<dyn LocomotionObserver>>,
}

impl LocomotionMotor {
    /// Spawn a character at `position` (feet) facing `yaw`, starting Grounded.
    ///
    /// An unusable capsule is an error. Every other out-of-range tunable is clamped the same way
    /// [`MovementConfig::validate`] does.
    pub fn new(config: Arc<MovementConfig>, position: Vec3, yaw: f32) -> Result<Self, LocomotionError> {
        CapsuleDimensions::from_config(&config).validate()?;
        let config = clamped(config);
        let body = CharacterBody::new(position, yaw, CapsuleDimensions::from_config(&config))?;
        let dash = DashChargePool::from_config(&config);

        Ok(Self {
            config,
            body,
            state: LocomotionState::default(),
            timers: MotorTimers::default(),
            dash,
            ground: GroundInfo::none(),
            observers: Vec::new(),
        })
    }

    pub fn add_observer(&mut self, observer: Box<dyn LocomotionObserver>) {
        self.observers.push(observer);
    }

    pub fn tick(
        &mut self,
        input: &mut InputBuffer,
        view: ViewBasis,
        queries: &dyn CollisionQueries,
        mover: &dyn CapsuleMover,
        dt: f32,
    ) -> TickReport {
        let dt = dt.max(0.0).min(self.config.max_delta_time);

        let mut ground = probe_ground(queries, &self.body, &self.config);
        // Still rising from a jump: touching a surface is not standing on it.
        if self.body.velocity.y > 0.0 {
            ground.grounded = false;
        }
        log::trace!(
            "Ground probe: hit={} grounded={} steep={} dist={:.3} angle={:.1}",
            ground.hit,
            ground.grounded,
            ground.near_steep_slope,
            ground.distance,
            ground.slope_angle_deg
        );

        self.timers.advance(dt, ground.grounded);
        self.dash.tick(dt);
        self.ground = ground;

        let mut events = Vec::new();
        let from = self.state.kind();
        let transition = {
            let mut ctx = LocomotionContext {
                cfg: &self.config,
                body: &mut self.body,
                input,
                timers: &mut self.timers,
                dash: &mut self.dash,
                ground: &self.ground,
                view,
                queries,
                dt,
                events: &mut events,
            };

            self.state.tick(&mut ctx).map(|request| {
                self.state = LocomotionState::enter(request, &mut ctx);
                StateTransition {
                    from,
                    to: self.state.kind(),
                }
            })
        };
        if let Some(t) = transition {
            log::debug!("Locomotion state {} -> {}", t.from, t.to);
        }

        let outcome = mover.move_capsule(self.body.shape(), self.body.center(), self.body.velocity * dt, dt);
        self.body.position += outcome.displacement;
        self.body.last_contacts = outcome.contacts;
        self.apply_contact_policy(outcome.contacts);

        for observer in &mut self.observers {
            if let Some(t) = transition {
                observer.on_state_changed(t.from, t.to);
            }
            for event in &events {
                observer.on_event(event);
            }
        }

        TickReport {
            transition,
            events,
            contacts: outcome.contacts,
            displacement: outcome.displacement,
        }
    }

    fn apply_contact_policy(&mut self, contacts: ContactFlags) {
        let kind = self.state.kind();

        if contacts.has(ContactFlag::Above) && self.body.velocity.y > 0.0 {
            self.body.velocity.y = 0.0;
        }
        if contacts.has(ContactFlag::Sides) && kind == StateKind::Slide {
            self.body.set_horizontal_velocity(Vec3::zeros());
        }
        if contacts.has(ContactFlag::Below) && matches!(kind, StateKind::Grounded | StateKind::Crouch) {
            self.body.velocity.y = self.config.ground_stick_velocity;
        }
    }

    pub fn diagnostics(&self) -> MotorDiagnostics {
        MotorDiagnostics {
            state: self.state.kind(),
            position: self.body.position(),
            velocity: self.body.velocity(),
            ground: self.ground,
            contacts: self.body.last_contacts(),
            crouched: self.body.is_crouched(),
            time_since_grounded: self.timers.time_since_grounded,
            time_in_air: self.timers.time_in_air,
            time_on_slope: self.timers.time_on_slope,
            jump_count: self.timers.jump_count,
            dash_charges: self.dash.charges(),
            dash_max_charges: self.dash.max_charges(),
            dash_cooldown: self.dash.cooldown_remaining(),
            dash_recharge_progress: self.dash.recharge_progress(),
            slide_cooldown: self.timers.slide_cooldown,
            wall_regrab_grace: self.timers.wall_regrab_grace,
            wall_same_side_cooldown: self.timers.wall_same_side_cooldown,
        }
    }

    pub fn config(&self) -> &Arc<MovementConfig> {
        &self.config
    }

    pub fn body(&self) -> &CharacterBody {
        &self.body
    }

    pub fn state(&self) -> &LocomotionState {
        &self.state
    }

    pub fn state_kind(&self) -> StateKind {
        self.state.kind()
    }

    pub fn velocity(&self) -> Vec3 {
        self.body.velocity()
    }

    /// Grounded as of the last probe (never while rising).
    pub fn is_grounded(&self) -> bool {
        self.ground.grounded
    }

    pub fn ground(&self) -> &GroundInfo {
        &self.ground
    }

    pub fn is_dashing(&self) -> bool {
        self.state.kind() == StateKind::Dash
    }

    pub fn is_sliding(&self) -> bool {
        self.state.kind() == StateKind::Slide
    }

    pub fn is_wall_running(&self) -> bool {
        self.state.kind() == StateKind::WallRun
    }

    pub fn is_crouched(&self) -> bool {
        self.body.is_crouched()
    }

    /// Planar facing direction of the body.
    pub fn facing(&self) -> Vec3 {
        self.body.forward()
    }

    pub fn set_facing_yaw(&mut self, yaw: f32) {
        if yaw.is_finite() {
            self.body.yaw = wrap_angle(yaw);
        }
    }
}

/// Shares `config` as is when it is already in range, otherwise a clamped copy.
fn clamped(config: Arc<MovementConfig>) -> Arc<MovementConfig> {
    let mut checked = MovementConfig::clone(&config);
    if checked.validate().is_empty() {
        config
    } else {
        Arc::new(checked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::test_world::{HalfSpace, TestWorld};
    use crate::config::SlideSpeedProfile;
    use crate::input::RawInput;
    use crate::utils::{Vec2, planar};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Rig {
        motor: LocomotionMotor,
        input: InputBuffer,
        world: TestWorld,
    }

    impl Rig {
        fn new(cfg: MovementConfig, world: TestWorld, spawn: Vec3) -> Self {
            let input = InputBuffer::new(cfg.jump_buffer);
            Self {
                motor: LocomotionMotor::new(Arc::new(cfg), spawn, 0.0).unwrap(),
                input,
                world,
            }
        }

        fn on_floor(cfg: MovementConfig) -> Self {
            Self::new(cfg, TestWorld::flat(), Vec3::new(0.0, 0.005, 0.0))
        }

        fn step(&mut self, raw: RawInput, dt: f32) -> TickReport {
            self.input.sample(&raw, dt);
            let report = self
                .motor
                .tick(&mut self.input, ViewBasis::default(), &self.world, &self.world, dt);
            self.input.end_frame();
            report
        }

        fn idle(&mut self, frames: usize, dt: f32) {
            for _ in 0..frames {
                self.step(RawInput::default(), dt);
            }
        }
    }

    fn jump() -> RawInput {
        RawInput {
            jump: true,
            ..RawInput::default()
        }
    }

    fn forward() -> RawInput {
        RawInput {
            move_axis: Vec2::new(0.0, 1.0),
            ..RawInput::default()
        }
    }

    fn jumped(report: &TickReport) -> bool {
        report.has_event(|e| matches!(e, MotorEvent::Jumped { .. }))
    }

    #[test]
    fn spawn_rejects_invalid_capsule() {
        let cfg = MovementConfig {
            capsule_radius: -1.0,
            ..MovementConfig::default()
        };
        assert!(LocomotionMotor::new(Arc::new(cfg), Vec3::zeros(), 0.0).is_err());
    }

    #[test]
    fn out_of_range_config_is_clamped_on_spawn() {
        let cfg = MovementConfig {
            gravity_base: 30.0,
            gravity_max: 10.0,
            ..MovementConfig::default()
        };
        let motor = LocomotionMotor::new(Arc::new(cfg), Vec3::zeros(), 0.0).unwrap();
        assert_eq!(motor.config().gravity_max, 30.0);

        // A config that is already in range is shared, not copied.
        let shared = Arc::new(MovementConfig::default());
        let motor = LocomotionMotor::new(Arc::clone(&shared), Vec3::zeros(), 0.0).unwrap();
        assert!(Arc::ptr_eq(motor.config(), &shared));
    }

    #[test]
    fn direct_press_jumps_without_a_buffer_window() {
        let dt = 1.0 / 60.0;
        let mut rig = Rig::on_floor(MovementConfig {
            jump_buffer: 0.0,
            ..MovementConfig::default()
        });
        rig.idle(3, dt);

        let report = rig.step(jump(), dt);
        assert!(report.has_event(|e| matches!(e, MotorEvent::Jumped { kind: JumpKind::Ground })));
        assert_eq!(rig.motor.state_kind(), StateKind::Airborne);
    }

    #[test]
    fn jump_velocity_is_exact_at_any_frame_rate() {
        for dt in [1.0 / 30.0, 1.0 / 60.0, 1.0 / 144.0] {
            let mut rig = Rig::on_floor(MovementConfig::default());
            rig.idle(3, dt);
            let report = rig.step(jump(), dt);

            assert!(jumped(&report));
            assert_eq!(rig.motor.state_kind(), StateKind::Airborne);
            assert!((rig.motor.velocity().y - 10.488_089).abs() < 1.0e-3);
        }
    }

    #[test]
    fn round_trip_returns_to_stick_velocity() {
        for dt in [1.0 / 30.0, 1.0 / 90.0] {
            let cfg = MovementConfig::default();
            let stick = cfg.ground_stick_velocity;
            let mut rig = Rig::on_floor(cfg);
            rig.idle(3, dt);
            rig.step(jump(), dt);

            let mut landed = false;
            for _ in 0..400 {
                let report = rig.step(RawInput::default(), dt);
                if report.has_event(|e| matches!(e, MotorEvent::Landed { .. })) {
                    landed = true;
                    break;
                }
            }
            assert!(landed);
            rig.idle(3, dt);

            assert_eq!(rig.motor.state_kind(), StateKind::Grounded);
            assert!((rig.motor.velocity().y - stick).abs() < 1.0e-6);
            assert!(planar(rig.motor.velocity()).norm() < 1.0e-4);
        }
    }

    fn coyote_press_jumps(frames_after_edge: usize) -> bool {
        let dt = 0.01;
        let mut rig = Rig::on_floor(MovementConfig::default());
        rig.idle(3, dt);
        rig.world.remove_floors();

        for _ in 1..frames_after_edge {
            rig.step(RawInput::default(), dt);
        }
        let mut jumped_any = jumped(&rig.step(jump(), dt));
        for _ in 0..20 {
            jumped_any |= jumped(&rig.step(RawInput::default(), dt));
        }
        jumped_any
    }

    #[test]
    fn coyote_window_is_respected() {
        // coyote_time = 0.12 s at dt = 0.01 s.
        assert!(coyote_press_jumps(10));
        assert!(!coyote_press_jumps(14));
    }

    #[test]
    fn early_jump_press_fires_on_landing_frame() {
        let dt = 1.0 / 60.0;
        let cfg = MovementConfig {
            max_jumps: 1,
            ..MovementConfig::default()
        };

        let mut dry = Rig::on_floor(cfg.clone());
        dry.idle(3, dt);
        dry.step(jump(), dt);
        let mut landing_frame = None;
        for frame in 1..400 {
            let report = dry.step(RawInput::default(), dt);
            if report.has_event(|e| matches!(e, MotorEvent::Landed { .. })) {
                landing_frame = Some(frame);
                break;
            }
        }
        let landing_frame = landing_frame.unwrap();
        assert!(landing_frame > 6);

        let mut rig = Rig::on_floor(cfg);
        rig.idle(3, dt);
        rig.step(jump(), dt);
        for frame in 1..landing_frame {
            let raw = if frame == landing_frame - 5 { jump() } else { RawInput::default() };
            let report = rig.step(raw, dt);
            assert!(!jumped(&report));
        }

        let report = rig.step(RawInput::default(), dt);
        assert!(report.has_event(|e| matches!(e, MotorEvent::Landed { .. })));
        assert!(report.has_event(|e| matches!(e, MotorEvent::Jumped { kind: JumpKind::Ground })));
        assert!((rig.motor.velocity().y - rig.motor.config().jump_velocity()).abs() < 1.0e-4);
    }

    #[test]
    fn third_dash_is_refused_until_recharged() {
        let dt = 1.0 / 60.0;
        let cfg = MovementConfig {
            dash_max_charges: 2,
            ..MovementConfig::default()
        };
        let dash_speed = cfg.dash_speed;
        let mut rig = Rig::on_floor(cfg);
        rig.idle(3, dt);

        let dash = RawInput {
            dash: true,
            ..RawInput::default()
        };

        for _ in 0..2 {
            rig.step(dash, dt);
            assert!(rig.motor.is_dashing());
            assert!((rig.motor.velocity().norm() - dash_speed).abs() < 1.0e-3);
            rig.idle(15, dt);
            assert!(!rig.motor.is_dashing());
        }
        assert_eq!(rig.motor.diagnostics().dash_charges, 0);

        rig.step(dash, dt);
        assert!(!rig.motor.is_dashing());
    }

    #[test]
    fn slide_into_wall_stalls_to_crouch() {
        let dt = 0.01;
        let world = TestWorld::flat().with_wall(Vec3::new(0.0, 0.0, 6.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rig = Rig::new(MovementConfig::default(), world, Vec3::new(0.0, 0.005, 0.0));

        for _ in 0..20 {
            rig.step(forward(), dt);
        }

        let slide = RawInput {
            slide: true,
            ..forward()
        };
        let mut slid = false;
        let mut crouched = false;
        for _ in 0..200 {
            rig.step(slide, dt);
            slid |= rig.motor.is_sliding();
            if slid && rig.motor.state_kind() == StateKind::Crouch {
                crouched = true;
                break;
            }
        }

        assert!(slid);
        assert!(crouched);
        assert!(rig.motor.body().horizontal_speed() < 1.0e-6);
        assert!(rig.motor.is_crouched());
    }

    fn wall_on_right() -> TestWorld {
        TestWorld::empty().with_wall(Vec3::new(0.7, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0))
    }

    #[test]
    fn wall_run_starts_only_when_airborne_and_fast() {
        let dt = 1.0 / 60.0;

        // Airborne, running parallel to the wall.
        let mut rig = Rig::new(MovementConfig::default(), wall_on_right(), Vec3::new(0.0, 10.0, 0.0));
        rig.motor.body.velocity = Vec3::new(0.0, 0.0, 8.0);
        let mut ran = false;
        for _ in 0..5 {
            let report = rig.step(RawInput::default(), dt);
            ran |= report.has_event(|e| matches!(e, MotorEvent::WallRunStarted { .. }));
        }
        assert!(ran);
        assert!(rig.motor.is_wall_running());

        // Airborne but too slow.
        let mut rig = Rig::new(MovementConfig::default(), wall_on_right(), Vec3::new(0.0, 10.0, 0.0));
        rig.motor.body.velocity = Vec3::new(0.0, 0.0, 1.0);
        for _ in 0..30 {
            rig.step(RawInput::default(), dt);
            assert!(!rig.motor.is_wall_running());
        }

        // Fast but on the ground.
        let world = wall_on_right().with_plane(Vec3::zeros(), Vec3::y());
        let mut rig = Rig::new(MovementConfig::default(), world, Vec3::new(0.0, 0.005, 0.0));
        for _ in 0..60 {
            rig.step(forward(), dt);
            assert!(!rig.motor.is_wall_running());
        }
        assert!(rig.motor.body().horizontal_speed() > MovementConfig::default().wall_min_speed);
    }

    /// Drop into a wall run along `wall_on_right`, starting `height` above nothing.
    fn start_wall_run(height: f32) -> Rig {
        let mut rig = Rig::new(MovementConfig::default(), wall_on_right(), Vec3::new(0.0, height, 0.0));
        rig.motor.body.velocity = Vec3::new(0.0, 0.0, 8.0);
        for _ in 0..5 {
            rig.step(RawInput::default(), 1.0 / 60.0);
            if rig.motor.is_wall_running() {
                return rig;
            }
        }
        panic!("wall run did not start");
    }

    #[test]
    fn jumping_off_a_wall_run_pushes_away_from_the_wall() {
        let dt = 1.0 / 60.0;
        let mut rig = start_wall_run(10.0);
        rig.idle(5, dt);
        assert!(rig.motor.is_wall_running());

        let report = rig.step(jump(), dt);
        assert!(report.has_event(|e| matches!(e, MotorEvent::Jumped { kind: JumpKind::Wall })));
        assert!(report.has_event(|e| matches!(e, MotorEvent::WallRunEnded)));
        assert_eq!(rig.motor.state_kind(), StateKind::Airborne);

        let velocity = rig.motor.velocity();
        assert!(velocity.x < -rig.motor.config().wall_jump_min_horiz_speed);
        assert!((velocity.y - rig.motor.config().jump_velocity()).abs() < 1.0e-4);
    }

    #[test]
    fn timed_out_wall_stays_locked_until_landing() {
        let dt = 1.0 / 60.0;
        let mut rig = start_wall_run(100.0);

        let mut frames = 1;
        loop {
            let report = rig.step(RawInput::default(), dt);
            if report.has_event(|e| matches!(e, MotorEvent::WallRunEnded)) {
                break;
            }
            frames += 1;
            assert!(frames < 120, "wall run never timed out");
        }
        let expected = (rig.motor.config().wall_run_max_time / dt).round() as i32;
        assert!((frames - expected).abs() <= 1);
        assert!(rig.motor.timers.exhausted_wall_normal.is_some());

        // Same wall, still fast enough, but used up.
        for _ in 0..30 {
            rig.step(RawInput::default(), dt);
            assert!(!rig.motor.is_wall_running());
        }
        assert!(rig.motor.body().horizontal_speed() > rig.motor.config().wall_min_speed);

        let floor_y = rig.motor.body().position().y - 1.0;
        rig.world
            .planes
            .push(HalfSpace::through(Vec3::new(0.0, floor_y, 0.0), Vec3::y()));
        let mut landed = false;
        for _ in 0..60 {
            rig.step(forward(), dt);
            if rig.motor.state_kind() == StateKind::Grounded {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert!(rig.motor.timers.exhausted_wall_normal.is_none());

        for _ in 0..30 {
            rig.step(forward(), dt);
        }
        rig.step(
            RawInput {
                jump: true,
                ..forward()
            },
            dt,
        );
        let mut ran = false;
        for _ in 0..10 {
            rig.step(forward(), dt);
            ran |= rig.motor.is_wall_running();
        }
        assert!(ran);
    }

    #[test]
    fn duck_jump_under_a_ceiling_then_stand_once_clear() {
        let dt = 1.0 / 60.0;
        let ceiling = 1.6;
        let world = TestWorld::flat().with_plane(Vec3::new(0.0, ceiling, 0.0), -Vec3::y());
        let mut rig = Rig::new(MovementConfig::default(), world, Vec3::new(0.0, 0.005, 0.0));
        rig.motor.body.set_crouched(true);

        rig.idle(30, dt);
        assert_eq!(rig.motor.state_kind(), StateKind::Crouch);
        assert!(rig.motor.is_crouched());

        let report = rig.step(jump(), dt);
        assert!(report.has_event(|e| matches!(e, MotorEvent::Jumped { kind: JumpKind::Duck })));
        assert!(rig.motor.is_crouched());

        let mut landed = false;
        for _ in 0..120 {
            rig.step(RawInput::default(), dt);
            let body = rig.motor.body();
            assert!(body.position().y + body.height() < ceiling);
            if rig.motor.state_kind() == StateKind::Crouch {
                landed = true;
                break;
            }
        }
        assert!(landed);

        // Still no room: the crouch holds.
        rig.idle(30, dt);
        assert_eq!(rig.motor.state_kind(), StateKind::Crouch);

        rig.world.planes.retain(|p| p.normal.y > -0.7);
        let mut stood = false;
        for _ in 0..20 {
            stood |= rig
                .step(RawInput::default(), dt)
                .has_event(|e| matches!(e, MotorEvent::Stood));
        }
        assert!(stood);
        assert_eq!(rig.motor.state_kind(), StateKind::Grounded);
        assert!(!rig.motor.is_crouched());
    }

    /// Jump forward from the floor and slam once past the first frames of the jump.
    fn slam_from_jump(rig: &mut Rig, slam: RawInput, dt: f32) {
        rig.idle(3, dt);
        rig.step(
            RawInput {
                jump: true,
                ..forward()
            },
            dt,
        );
        for _ in 0..20 {
            rig.step(forward(), dt);
        }
        rig.step(slam, dt);
        assert_eq!(rig.motor.state_kind(), StateKind::Slam);
    }

    fn slam_landed(report: &TickReport) -> bool {
        report.has_event(|e| matches!(e, MotorEvent::SlamLanded { .. }))
    }

    #[test]
    fn slam_settles_in_place_before_standing() {
        let dt = 1.0 / 60.0;
        let mut rig = Rig::on_floor(MovementConfig::default());
        slam_from_jump(
            &mut rig,
            RawInput {
                slide: true,
                ..forward()
            },
            dt,
        );
        assert!(rig.motor.body().horizontal_speed() > 1.0);

        let mut landed = false;
        for _ in 0..120 {
            if slam_landed(&rig.step(forward(), dt)) {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert!(rig.motor.body().horizontal_speed() < 1.0e-6);

        let settle_frames = (rig.motor.config().slam_settle_time / dt).round() as usize;
        for _ in 0..settle_frames - 2 {
            rig.step(forward(), dt);
            assert_eq!(rig.motor.state_kind(), StateKind::Slam);
            assert!(rig.motor.body().horizontal_speed() < 1.0e-6);
        }

        let mut released = false;
        for _ in 0..4 {
            rig.step(forward(), dt);
            if rig.motor.state_kind() == StateKind::Grounded {
                released = true;
                break;
            }
        }
        assert!(released);
    }

    #[test]
    fn slam_with_slide_held_chains_into_a_slide() {
        let dt = 1.0 / 60.0;
        let slide = RawInput {
            slide: true,
            ..forward()
        };
        let mut rig = Rig::on_floor(MovementConfig::default());
        slam_from_jump(&mut rig, slide, dt);

        let mut chained = false;
        for _ in 0..120 {
            let report = rig.step(slide, dt);
            if slam_landed(&report) {
                assert!(report.has_event(|e| matches!(e, MotorEvent::SlideStarted { .. })));
                chained = true;
                break;
            }
        }
        assert!(chained);
        assert!(rig.motor.is_sliding());

        for _ in 0..10 {
            rig.step(slide, dt);
            assert!(rig.motor.is_sliding());
            assert!((rig.motor.body().horizontal_speed() - 16.0).abs() < 1.0e-3);
        }
    }

    /// Infinite incline going downhill toward `+Z`, and a spawn point resting just above it.
    fn incline(angle_deg: f32) -> (TestWorld, Vec3) {
        let angle = angle_deg.to_radians();
        let normal = Vec3::new(0.0, angle.cos(), angle.sin());
        let radius = MovementConfig::default().capsule_radius;
        let lift = (radius + 0.02) / normal.y - radius;
        (
            TestWorld::empty().with_plane(Vec3::zeros(), normal),
            Vec3::new(0.0, lift, 0.0),
        )
    }

    #[test]
    fn slopes_past_the_slide_threshold_slide_downhill() {
        let dt = 1.0 / 60.0;

        // 48 degrees: walkable, but steeper than the 45 degree slide threshold.
        let cfg = MovementConfig {
            ground_stick_velocity: -30.0,
            slope_slide_max_speed: 10.0,
            ..MovementConfig::default()
        };
        let (world, spawn) = incline(48.0);
        let mut rig = Rig::new(cfg, world, spawn);
        for _ in 0..60 {
            rig.step(RawInput::default(), dt);
            assert_eq!(rig.motor.state_kind(), StateKind::Grounded);
        }
        let horizontal = planar(rig.motor.velocity());
        assert!(horizontal.z > 9.9);
        assert!(horizontal.x.abs() < 1.0e-4);
        assert!(rig.motor.diagnostics().time_on_slope > 0.9);

        let (world, spawn) = incline(30.0);
        let mut rig = Rig::new(MovementConfig::default(), world, spawn);
        rig.idle(60, dt);
        assert_eq!(rig.motor.state_kind(), StateKind::Grounded);
        assert!(planar(rig.motor.velocity()).norm() < 1.0e-4);
        assert_eq!(rig.motor.diagnostics().time_on_slope, 0.0);
    }

    #[test]
    fn air_jumps_stop_at_max_jumps() {
        let dt = 1.0 / 60.0;
        let mut rig = Rig::on_floor(MovementConfig::default());
        assert_eq!(rig.motor.config().max_jumps, 2);
        rig.idle(3, dt);
        assert!(jumped(&rig.step(jump(), dt)));
        rig.idle(10, dt);

        let report = rig.step(jump(), dt);
        assert!(report.has_event(|e| matches!(e, MotorEvent::Jumped { kind: JumpKind::Air })));
        assert!((rig.motor.velocity().y - rig.motor.config().jump_velocity()).abs() < 1.0e-4);
        assert_eq!(rig.motor.diagnostics().jump_count, 2);

        rig.idle(5, dt);
        assert!(!jumped(&rig.step(jump(), dt)));
        for _ in 0..8 {
            assert!(!jumped(&rig.step(RawInput::default(), dt)));
        }
        assert_eq!(rig.motor.diagnostics().jump_count, 2);
        assert_eq!(rig.motor.state_kind(), StateKind::Airborne);
    }

    fn slide_speed(rig: &Rig) -> Option<f32> {
        match rig.motor.state() {
            LocomotionState::Slide(slide) => Some(slide.speed()),
            _ => None,
        }
    }

    #[test]
    fn momentum_slide_keeps_entry_speed_then_bleeds_it() {
        let dt = 0.01;
        let cfg = MovementConfig {
            slide_profile: SlideSpeedProfile::Momentum {
                min_speed: 6.0,
                max_speed: 20.0,
                accel: 10.0,
                friction: 8.0,
                slope_accel_scale: 1.0,
            },
            ..MovementConfig::default()
        };
        let mut rig = Rig::on_floor(cfg);
        for _ in 0..30 {
            rig.step(forward(), dt);
        }
        let entry = rig.motor.body().horizontal_speed();
        assert!((entry - 12.0).abs() < 1.0e-3);

        let slide = RawInput {
            slide: true,
            ..forward()
        };
        rig.step(slide, dt);
        let speed = slide_speed(&rig).unwrap();
        assert!((speed - entry).abs() < 1.0e-4);

        // Flat ground: friction only.
        for _ in 0..30 {
            rig.step(slide, dt);
        }
        let speed = slide_speed(&rig).unwrap();
        assert!((speed - (entry - 8.0 * 0.3)).abs() < 1.0e-3);
        assert!((rig.motor.body().horizontal_speed() - speed).abs() < 1.0e-4);

        for _ in 0..100 {
            rig.step(slide, dt);
        }
        assert_eq!(slide_speed(&rig), Some(6.0));
    }

    #[test]
    fn exactly_one_state_each_frame() {
        let dt = 1.0 / 60.0;
        let mut rig = Rig::on_floor(MovementConfig::default());
        let script = [
            forward(),
            jump(),
            RawInput {
                dash: true,
                ..forward()
            },
            RawInput {
                slide: true,
                ..RawInput::default()
            },
            RawInput::default(),
        ];

        for frame in 0..300 {
            let before = rig.motor.state_kind();
            let report = rig.step(script[(frame / 7) % script.len()], dt);
            match report.transition {
                Some(t) => {
                    assert_eq!(t.from, before);
                    assert_eq!(t.to, rig.motor.state_kind());
                }
                None => assert_eq!(before, rig.motor.state_kind()),
            }
            assert!(rig.motor.velocity().iter().all(|c| c.is_finite()));
        }
    }

    #[derive(Default)]
    struct Recorder {
        transitions: Vec<(StateKind, StateKind)>,
        jumps: usize,
    }

    struct Shared(Rc<RefCell<Recorder>>);

    impl LocomotionObserver for Shared {
        fn on_state_changed(&mut self, from: StateKind, to: StateKind) {
            self.0.borrow_mut().transitions.push((from, to));
        }

        fn on_event(&mut self, event: &MotorEvent) {
            if matches!(event, MotorEvent::Jumped { .. }) {
                self.0.borrow_mut().jumps += 1;
            }
        }
    }

    #[test]
    fn observers_see_transitions_and_events() {
        let dt = 1.0 / 60.0;
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut rig = Rig::on_floor(MovementConfig::default());
        rig.motor.add_observer(Box::new(Shared(recorder.clone())));

        rig.idle(2, dt);
        rig.step(jump(), dt);

        let recorded = recorder.borrow();
        assert_eq!(recorded.jumps, 1);
        assert_eq!(recorded.transitions, vec![(StateKind::Grounded, StateKind::Airborne)]);
    }

    #[test]
    fn oversized_dt_is_clamped() {
        let mut rig = Rig::new(MovementConfig::default(), TestWorld::empty(), Vec3::new(0.0, 100.0, 0.0));
        rig.motor.body.velocity = Vec3::new(10.0, 0.0, 0.0);
        let report = rig.step(RawInput::default(), 5.0);
        assert!((report.displacement.x - 1.0).abs() < 1.0e-4);
    }
}

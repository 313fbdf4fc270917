//! Tunable parameter sets for one character archetype.
//!
//! Three groups:
//! - [`MovementConfig`]: speeds, accelerations, gravity curve, timer windows and thresholds used
//!   by every locomotion state.
//! - [`CameraConfig`]: orbit distances, pitch limits, collision sweep and head-bob.
//! - [`KccSettings`]: knobs forwarded to Rapier's `KinematicCharacterController`.
//!
//! All structs deserialize from RON with `#[serde(default)]`, so a document only needs the fields
//! it overrides. Values are corrected (never rejected) by `validate()`, which clamps each field to
//! its nearest valid bound and logs what changed.

use log::warn;
use ron::extensions::Extensions;
use serde::{Deserialize, Serialize};

use crate::constants::{CAPSULE_MIN_HEIGHT_MARGIN, MAX_DELTA_TIME_S};
use crate::error::ConfigError;

/// Record of one field corrected during validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigAdjustment {
    pub field: &'static str,
    pub from: f32,
    pub to: f32,
}

/// Collects clamps applied to a config and logs each one.
struct Clamper {
    scope: &'static str,
    adjustments: Vec<ConfigAdjustment>,
}

impl Clamper {
    fn new(scope: &'static str) -> Self {
        Self {
            scope,
            adjustments: Vec::new(),
        }
    }

    fn within(&mut self, field: &'static str, value: &mut f32, min: f32, max: f32) {
        let max = max.max(min);
        let corrected = if value.is_finite() {
            value.clamp(min, max)
        } else {
            min
        };
        self.record(field, value, corrected);
    }

    fn at_least(&mut self, field: &'static str, value: &mut f32, min: f32) {
        self.within(field, value, min, f32::MAX);
    }

    fn at_least_u32(&mut self, field: &'static str, value: &mut u32, min: u32) {
        if *value < min {
            warn!("{}.{field} clamped from {} to {min}", self.scope, *value);
            self.adjustments.push(ConfigAdjustment {
                field,
                from: *value as f32,
                to: min as f32,
            });
            *value = min;
        }
    }

    fn record(&mut self, field: &'static str, value: &mut f32, corrected: f32) {
        // NaN != NaN, so a non-finite input is always recorded.
        if *value != corrected {
            warn!("{}.{field} clamped from {} to {corrected}", self.scope, *value);
            self.adjustments.push(ConfigAdjustment {
                field,
                from: *value,
                to: corrected,
            });
            *value = corrected;
        }
    }

    fn finish(self) -> Vec<ConfigAdjustment> {
        self.adjustments
    }
}

fn parse_ron<T: for<'de> Deserialize<'de>>(text: &str, origin: &str) -> Result<T, ConfigError> {
    ron::Options::default()
        .with_default_extension(Extensions::IMPLICIT_SOME)
        .from_str(text)
        .map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })
}

/// How slide speed evolves while the slide lasts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SlideSpeedProfile {
    /// Fixed planar speed for the whole slide.
    Constant { speed: f32 },
    /// Keeps entry momentum clamped into `[min_speed, max_speed]`. Loses `friction` per second on
    /// flat or uphill ground and gains `accel` plus the slope push going downhill.
    Momentum {
        min_speed: f32,
        max_speed: f32,
        accel: f32,
        friction: f32,
        slope_accel_scale: f32,
    },
}

impl Default for SlideSpeedProfile {
    fn default() -> Self {
        SlideSpeedProfile::Constant { speed: 16.0 }
    }
}

/// Movement tunables shared read-only by every locomotion state of one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // ==========================================
    // Ground
    // ==========================================
    pub max_ground_speed: f32,
    /// Target speed while sprint is held on the ground.
    pub max_sprint_speed: f32,
    pub accel_ground: f32,
    /// Friction rate used when there is no move input.
    pub decel_ground: f32,
    /// Vertical velocity held while grounded so the capsule hugs the floor (negative).
    pub ground_stick_velocity: f32,

    // ==========================================
    // Air
    // ==========================================
    pub max_air_speed: f32,
    pub accel_air: f32,
    /// Air acceleration factor while rising.
    pub air_control_ascend_factor: f32,
    /// Air acceleration factor while falling. Never below the ascend factor.
    pub air_control_descend_factor: f32,

    // ==========================================
    // Gravity
    // ==========================================
    pub gravity_base: f32,
    pub gravity_max: f32,
    /// Time in air over which gravity ramps from base to max.
    pub gravity_ramp_time: f32,
    /// Maximum fall speed (positive magnitude).
    pub terminal_velocity: f32,
    /// Maximum upward speed after gravity integration.
    pub max_rise_speed: f32,
    pub rise_gravity_multiplier: f32,
    pub fall_gravity_multiplier: f32,
    /// Gravity multiplier applied when `|vy| <= apex_threshold`.
    pub apex_hang_multiplier: f32,
    pub apex_threshold: f32,

    // ==========================================
    // Jump
    // ==========================================
    pub jump_height: f32,
    pub max_jumps: u32,
    pub coyote_time: f32,
    pub jump_buffer: f32,
    /// Largest horizontal bonus fraction granted by a jump at full ground speed.
    pub jump_horiz_bonus_max: f32,

    // ==========================================
    // Ground probe & slopes
    // ==========================================
    /// Distance below the feet still treated as grounded.
    pub ground_check_extra: f32,
    /// Maximum surface angle (degrees) still classified as ground.
    pub walkable_limit_deg: f32,
    /// Distance band in which a non-walkable hit raises the near-steep-slope flag.
    pub steep_slope_band: f32,
    /// Surface angle (degrees) above which grounded movement turns into slope sliding.
    pub slope_slide_threshold_deg: f32,
    pub slope_slide_base_accel: f32,
    /// Extra slope acceleration per second spent sliding.
    pub slope_slide_accel_per_sec: f32,
    pub slope_slide_max_speed: f32,
    pub slope_gravity_factor: f32,
    pub slope_angle_power: f32,
    pub uphill_speed_scale: f32,
    pub uphill_accel_scale: f32,

    // ==========================================
    // Landing
    // ==========================================
    pub landing_good_keep: f32,
    pub landing_bad_keep: f32,
    pub landing_downhill_bonus: f32,

    // ==========================================
    // Capsule & crouch
    // ==========================================
    pub capsule_radius: f32,
    pub stand_height: f32,
    pub crouch_height: f32,
    pub crouch_walk_speed: f32,
    pub crouch_accel: f32,
    pub crouch_decel: f32,
    /// Headroom must stay clear this long before a crouch stands up on its own.
    pub stand_clear_time: f32,

    // ==========================================
    // Dash
    // ==========================================
    pub dash_max_charges: u32,
    /// Delay after a dash before any charge starts recharging.
    pub dash_recharge_delay: f32,
    /// Time to recharge one charge once the delay has elapsed.
    pub dash_recharge_time: f32,
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_ignores_gravity: bool,
    /// Scale applied to an upward look component of the dash direction.
    pub dash_up_scale: f32,
    /// Scale applied to a downward look component of the dash direction.
    pub dash_down_scale: f32,

    // ==========================================
    // Slide
    // ==========================================
    pub slide_profile: SlideSpeedProfile,
    pub slide_cooldown: f32,
    /// Horizontal speed required to start a slide from the ground.
    pub slide_min_entry_speed: f32,
    /// Downward speed applied while sliding (positive magnitude).
    pub slide_stick_down_velocity: f32,
    pub slide_turn_rate_deg: f32,
    /// Move-axis magnitude above which the slide locks onto input instead of facing.
    pub slide_input_threshold: f32,
    /// Forward progress per frame at or below which a slide counts as stalled (meters).
    pub slide_stall_threshold: f32,
    /// Horizontal speed multiplier applied when jumping out of a slide.
    pub slide_jump_horiz_boost: f32,

    // ==========================================
    // Wall run & wall jump
    // ==========================================
    pub wall_run_accel: f32,
    pub wall_run_gravity_scale: f32,
    pub wall_run_max_time: f32,
    pub wall_check_distance: f32,
    pub wall_min_speed: f32,
    pub wall_approach_min_dot: f32,
    pub wall_parallel_min_ratio: f32,
    /// After leaving a wall, the approach threshold drops to `wall_chain_approach_dot` for this long.
    pub wall_regrab_grace: f32,
    pub wall_chain_approach_dot: f32,
    pub wall_same_side_cooldown: f32,
    pub wall_jump_outward: f32,
    pub wall_jump_upward: f32,
    pub wall_jump_min_horiz_speed: f32,
    pub wall_jump_horiz_scale: f32,
    pub wall_jump_separation_boost: f32,

    // ==========================================
    // Slam
    // ==========================================
    /// Constant downward speed while slamming (positive magnitude).
    pub slam_down_force: f32,
    pub slam_settle_time: f32,
    pub slam_kick_intensity: f32,

    // ==========================================
    // Frame
    // ==========================================
    pub max_delta_time: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            max_ground_speed: 12.0,
            max_sprint_speed: 16.0,
            accel_ground: 80.0,
            decel_ground: 90.0,
            ground_stick_velocity: -2.0,

            max_air_speed: 14.0,
            accel_air: 50.0,
            air_control_ascend_factor: 0.6,
            air_control_descend_factor: 1.0,

            gravity_base: 25.0,
            gravity_max: 60.0,
            gravity_ramp_time: 0.8,
            terminal_velocity: 75.0,
            max_rise_speed: 32.0,
            rise_gravity_multiplier: 1.0,
            fall_gravity_multiplier: 1.6,
            apex_hang_multiplier: 0.6,
            apex_threshold: 1.5,

            jump_height: 2.2,
            max_jumps: 2,
            coyote_time: 0.12,
            jump_buffer: 0.15,
            jump_horiz_bonus_max: 0.08,

            ground_check_extra: 0.08,
            walkable_limit_deg: 50.0,
            steep_slope_band: 0.3,
            slope_slide_threshold_deg: 45.0,
            slope_slide_base_accel: 8.0,
            slope_slide_accel_per_sec: 12.0,
            slope_slide_max_speed: 30.0,
            slope_gravity_factor: 1.0,
            slope_angle_power: 1.2,
            uphill_speed_scale: 0.75,
            uphill_accel_scale: 0.6,

            landing_good_keep: 0.90,
            landing_bad_keep: 0.35,
            landing_downhill_bonus: 0.10,

            capsule_radius: 0.4,
            stand_height: 2.0,
            crouch_height: 1.2,
            crouch_walk_speed: 4.0,
            crouch_accel: 40.0,
            crouch_decel: 50.0,
            stand_clear_time: 0.15,

            dash_max_charges: 2,
            dash_recharge_delay: 0.3,
            dash_recharge_time: 1.2,
            dash_speed: 28.0,
            dash_duration: 0.18,
            dash_ignores_gravity: true,
            dash_up_scale: 0.55,
            dash_down_scale: 0.8,

            slide_profile: SlideSpeedProfile::default(),
            slide_cooldown: 0.35,
            slide_min_entry_speed: 2.0,
            slide_stick_down_velocity: 6.0,
            slide_turn_rate_deg: 90.0,
            slide_input_threshold: 0.5,
            slide_stall_threshold: 0.001,
            slide_jump_horiz_boost: 1.1,

            wall_run_accel: 4.0,
            wall_run_gravity_scale: 0.4,
            wall_run_max_time: 1.0,
            wall_check_distance: 0.8,
            wall_min_speed: 3.0,
            wall_approach_min_dot: 0.3,
            wall_parallel_min_ratio: 0.6,
            wall_regrab_grace: 0.20,
            wall_chain_approach_dot: 0.10,
            wall_same_side_cooldown: 0.15,
            wall_jump_outward: 1.0,
            wall_jump_upward: 0.65,
            wall_jump_min_horiz_speed: 6.0,
            wall_jump_horiz_scale: 1.0,
            wall_jump_separation_boost: 2.0,

            slam_down_force: 40.0,
            slam_settle_time: 0.2,
            slam_kick_intensity: 0.6,

            max_delta_time: MAX_DELTA_TIME_S,
        }
    }
}

impl MovementConfig {
    /// Parse a (possibly partial) RON document; missing fields keep their defaults.
    ///
    /// The result is not validated. Call [`MovementConfig::validated`] before use.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        parse_ron(text, "<movement>")
    }

    /// Ground and wall jump launch speed: `sqrt(2 * gravity_base * jump_height)`.
    #[inline]
    pub fn jump_velocity(&self) -> f32 {
        (2.0 * self.gravity_base.max(0.0) * self.jump_height.max(0.0)).sqrt()
    }

    /// Minimum capsule height for the configured radius.
    #[inline]
    pub fn min_capsule_height(&self) -> f32 {
        2.0 * self.capsule_radius + CAPSULE_MIN_HEIGHT_MARGIN
    }

    pub fn walkable_cos(&self) -> f32 {
        self.walkable_limit_deg.to_radians().cos()
    }

    /// Clamp every field to its nearest valid bound and return what changed.
    pub fn validate(&mut self) -> Vec<ConfigAdjustment> {
        let mut c = Clamper::new("movement");

        c.at_least("max_ground_speed", &mut self.max_ground_speed, 0.0);
        c.at_least("max_sprint_speed", &mut self.max_sprint_speed, self.max_ground_speed);
        c.at_least("accel_ground", &mut self.accel_ground, 0.0);
        c.at_least("decel_ground", &mut self.decel_ground, 0.0);
        c.within("ground_stick_velocity", &mut self.ground_stick_velocity, -50.0, 0.0);

        c.at_least("max_air_speed", &mut self.max_air_speed, 0.0);
        c.at_least("accel_air", &mut self.accel_air, 0.0);
        c.within("air_control_ascend_factor", &mut self.air_control_ascend_factor, 0.0, 1.0);
        c.within(
            "air_control_descend_factor",
            &mut self.air_control_descend_factor,
            self.air_control_ascend_factor,
            1.0,
        );

        c.at_least("gravity_base", &mut self.gravity_base, 0.0);
        c.at_least("gravity_max", &mut self.gravity_max, self.gravity_base);
        c.at_least("gravity_ramp_time", &mut self.gravity_ramp_time, 0.01);
        c.at_least("terminal_velocity", &mut self.terminal_velocity, 0.0);
        c.at_least("rise_gravity_multiplier", &mut self.rise_gravity_multiplier, 0.0);
        c.at_least("fall_gravity_multiplier", &mut self.fall_gravity_multiplier, 0.0);
        c.within("apex_hang_multiplier", &mut self.apex_hang_multiplier, 0.0, 1.0);
        c.at_least("apex_threshold", &mut self.apex_threshold, 0.0);

        c.at_least("jump_height", &mut self.jump_height, 0.0);
        let jump_velocity = self.jump_velocity();
        c.at_least("max_rise_speed", &mut self.max_rise_speed, jump_velocity);
        c.at_least_u32("max_jumps", &mut self.max_jumps, 1);
        c.within("coyote_time", &mut self.coyote_time, 0.0, 0.5);
        c.within("jump_buffer", &mut self.jump_buffer, 0.0, 0.5);
        c.within("jump_horiz_bonus_max", &mut self.jump_horiz_bonus_max, 0.0, 1.0);

        c.within("ground_check_extra", &mut self.ground_check_extra, 0.0, 0.5);
        c.within("walkable_limit_deg", &mut self.walkable_limit_deg, 0.0, 89.0);
        c.at_least("steep_slope_band", &mut self.steep_slope_band, 0.0);
        c.within(
            "slope_slide_threshold_deg",
            &mut self.slope_slide_threshold_deg,
            0.0,
            89.0,
        );
        c.at_least("slope_slide_base_accel", &mut self.slope_slide_base_accel, 0.0);
        c.at_least("slope_slide_accel_per_sec", &mut self.slope_slide_accel_per_sec, 0.0);
        c.at_least("slope_slide_max_speed", &mut self.slope_slide_max_speed, 0.0);
        c.at_least("slope_gravity_factor", &mut self.slope_gravity_factor, 0.0);
        c.at_least("slope_angle_power", &mut self.slope_angle_power, 0.1);
        c.within("uphill_speed_scale", &mut self.uphill_speed_scale, 0.0, 1.0);
        c.within("uphill_accel_scale", &mut self.uphill_accel_scale, 0.0, 1.0);

        c.within("landing_bad_keep", &mut self.landing_bad_keep, 0.0, 1.0);
        c.within(
            "landing_good_keep",
            &mut self.landing_good_keep,
            self.landing_bad_keep,
            1.0,
        );
        c.within("landing_downhill_bonus", &mut self.landing_downhill_bonus, 0.0, 1.0);

        c.at_least("capsule_radius", &mut self.capsule_radius, 0.01);
        let min_height = self.min_capsule_height();
        c.at_least("stand_height", &mut self.stand_height, min_height);
        c.within("crouch_height", &mut self.crouch_height, min_height, self.stand_height);
        c.at_least("crouch_walk_speed", &mut self.crouch_walk_speed, 0.0);
        c.at_least("crouch_accel", &mut self.crouch_accel, 0.0);
        c.at_least("crouch_decel", &mut self.crouch_decel, 0.0);
        c.at_least("stand_clear_time", &mut self.stand_clear_time, 0.0);

        c.at_least_u32("dash_max_charges", &mut self.dash_max_charges, 1);
        c.at_least("dash_recharge_delay", &mut self.dash_recharge_delay, 0.0);
        c.at_least("dash_recharge_time", &mut self.dash_recharge_time, 0.01);
        c.at_least("dash_speed", &mut self.dash_speed, 0.0);
        c.at_least("dash_duration", &mut self.dash_duration, 0.0);
        c.within("dash_up_scale", &mut self.dash_up_scale, 0.0, 1.0);
        c.within("dash_down_scale", &mut self.dash_down_scale, 0.0, 1.0);

        match &mut self.slide_profile {
            SlideSpeedProfile::Constant { speed } => c.at_least("slide_profile.speed", speed, 0.0),
            SlideSpeedProfile::Momentum {
                min_speed,
                max_speed,
                accel,
                friction,
                slope_accel_scale,
            } => {
                c.at_least("slide_profile.min_speed", min_speed, 0.0);
                c.at_least("slide_profile.max_speed", max_speed, *min_speed);
                c.at_least("slide_profile.accel", accel, 0.0);
                c.at_least("slide_profile.friction", friction, 0.0);
                c.at_least("slide_profile.slope_accel_scale", slope_accel_scale, 0.0);
            }
        }
        c.at_least("slide_cooldown", &mut self.slide_cooldown, 0.0);
        c.at_least("slide_min_entry_speed", &mut self.slide_min_entry_speed, 0.0);
        c.at_least("slide_stick_down_velocity", &mut self.slide_stick_down_velocity, 0.0);
        c.at_least("slide_turn_rate_deg", &mut self.slide_turn_rate_deg, 0.0);
        c.within("slide_input_threshold", &mut self.slide_input_threshold, 0.0, 1.0);
        c.at_least("slide_stall_threshold", &mut self.slide_stall_threshold, 0.0);
        c.at_least("slide_jump_horiz_boost", &mut self.slide_jump_horiz_boost, 0.0);

        c.at_least("wall_run_accel", &mut self.wall_run_accel, 0.0);
        c.within("wall_run_gravity_scale", &mut self.wall_run_gravity_scale, 0.0, 1.0);
        c.at_least("wall_run_max_time", &mut self.wall_run_max_time, 0.0);
        c.at_least("wall_check_distance", &mut self.wall_check_distance, 0.0);
        c.at_least("wall_min_speed", &mut self.wall_min_speed, 0.0);
        c.within("wall_approach_min_dot", &mut self.wall_approach_min_dot, -1.0, 1.0);
        c.within("wall_parallel_min_ratio", &mut self.wall_parallel_min_ratio, 0.0, 1.0);
        c.at_least("wall_regrab_grace", &mut self.wall_regrab_grace, 0.0);
        c.within(
            "wall_chain_approach_dot",
            &mut self.wall_chain_approach_dot,
            -1.0,
            self.wall_approach_min_dot,
        );
        c.at_least("wall_same_side_cooldown", &mut self.wall_same_side_cooldown, 0.0);
        c.at_least("wall_jump_outward", &mut self.wall_jump_outward, 0.0);
        c.at_least("wall_jump_upward", &mut self.wall_jump_upward, 0.0);
        c.at_least("wall_jump_min_horiz_speed", &mut self.wall_jump_min_horiz_speed, 0.0);
        c.at_least("wall_jump_horiz_scale", &mut self.wall_jump_horiz_scale, 0.0);
        c.at_least("wall_jump_separation_boost", &mut self.wall_jump_separation_boost, 0.0);

        c.at_least("slam_down_force", &mut self.slam_down_force, 0.0);
        c.at_least("slam_settle_time", &mut self.slam_settle_time, 0.0);
        c.at_least("slam_kick_intensity", &mut self.slam_kick_intensity, 0.0);

        c.within("max_delta_time", &mut self.max_delta_time, 0.001, 1.0);

        c.finish()
    }

    /// Validated copy of `self`.
    pub fn validated(mut self) -> Self {
        self.validate();
        self
    }
}

/// Camera rig tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial orbit distance.
    pub distance: f32,
    /// At (or within a small band above) this distance the rig is first person.
    pub min_distance: f32,
    pub max_distance: f32,
    pub zoom_speed: f32,
    /// Degrees of yaw/pitch per unit of look input.
    pub look_sensitivity: f32,
    pub initial_pitch_deg: f32,
    pub tps_pitch_min_deg: f32,
    pub tps_pitch_max_deg: f32,
    pub fps_pitch_min_deg: f32,
    pub fps_pitch_max_deg: f32,
    /// Body yaw slerp rate toward camera forward (per second).
    pub player_rotation_speed: f32,
    pub collision_radius: f32,
    /// Gap kept between the camera and the first occluder.
    pub collision_offset: f32,
    /// Head anchor height above the character's feet while standing.
    pub head_height: f32,
    pub headbob_frequency: f32,
    pub headbob_amplitude: f32,
    /// How far the head anchor drops while crouched.
    pub crouch_offset: f32,
    pub crouch_lerp_rate: f32,
    /// Exponential decay rate of the pitch kick.
    pub kick_recovery_rate: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 5.0,
            min_distance: 1.0,
            max_distance: 10.0,
            zoom_speed: 2.0,
            look_sensitivity: 0.12,
            initial_pitch_deg: 10.0,
            tps_pitch_min_deg: -20.0,
            tps_pitch_max_deg: 80.0,
            fps_pitch_min_deg: -80.0,
            fps_pitch_max_deg: 80.0,
            player_rotation_speed: 10.0,
            collision_radius: 0.2,
            collision_offset: 0.1,
            head_height: 1.6,
            headbob_frequency: 9.0,
            headbob_amplitude: 0.05,
            crouch_offset: 0.6,
            crouch_lerp_rate: 12.0,
            kick_recovery_rate: 10.0,
        }
    }
}

impl CameraConfig {
    pub fn validate(&mut self) -> Vec<ConfigAdjustment> {
        let mut c = Clamper::new("camera");

        c.at_least("min_distance", &mut self.min_distance, 0.0);
        c.at_least("max_distance", &mut self.max_distance, self.min_distance);
        c.within("distance", &mut self.distance, self.min_distance, self.max_distance);
        c.at_least("zoom_speed", &mut self.zoom_speed, 0.0);
        c.at_least("look_sensitivity", &mut self.look_sensitivity, 0.0);
        c.within("tps_pitch_min_deg", &mut self.tps_pitch_min_deg, -89.0, 89.0);
        c.within(
            "tps_pitch_max_deg",
            &mut self.tps_pitch_max_deg,
            self.tps_pitch_min_deg,
            89.0,
        );
        c.within("fps_pitch_min_deg", &mut self.fps_pitch_min_deg, -89.0, 89.0);
        c.within(
            "fps_pitch_max_deg",
            &mut self.fps_pitch_max_deg,
            self.fps_pitch_min_deg,
            89.0,
        );
        c.at_least("player_rotation_speed", &mut self.player_rotation_speed, 0.0);
        c.at_least("collision_radius", &mut self.collision_radius, 0.0);
        c.at_least("collision_offset", &mut self.collision_offset, 0.0);
        c.at_least("headbob_frequency", &mut self.headbob_frequency, 0.0);
        c.at_least("headbob_amplitude", &mut self.headbob_amplitude, 0.0);
        c.within("crouch_offset", &mut self.crouch_offset, 0.0, self.head_height.max(0.0));
        c.at_least("crouch_lerp_rate", &mut self.crouch_lerp_rate, 0.0);
        c.at_least("kick_recovery_rate", &mut self.kick_recovery_rate, 0.0);

        c.finish()
    }

    pub fn validated(mut self) -> Self {
        self.validate();
        self
    }
}

/// Settings forwarded to Rapier's `KinematicCharacterController`.
///
/// Notes
/// - Values are expressed in meters and degrees (converted to radians at runtime).
/// - Snap-to-ground is left to the motor's stick velocity; `snap_to_ground = 0` disables it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KccSettings {
    /// Small gap preserved between the character and its surroundings (meters).
    pub offset: f32,
    pub max_slope_climb_deg: f32,
    pub min_slope_slide_deg: f32,
    /// Autostep maximum height (meters). Zero disables autostep.
    pub autostep_max_height: f32,
    pub autostep_min_width: f32,
    pub slide: bool,
    /// Increase if the character gets stuck when sliding (small, meters).
    pub normal_nudge_factor: f32,
    pub snap_to_ground: f32,
}

impl Default for KccSettings {
    fn default() -> Self {
        Self {
            offset: 0.02,
            max_slope_climb_deg: 50.0,
            min_slope_slide_deg: 50.0,
            autostep_max_height: 0.3,
            autostep_min_width: 0.2,
            slide: true,
            normal_nudge_factor: 1.0e-4,
            snap_to_ground: 0.0,
        }
    }
}

impl KccSettings {
    pub fn validate(&mut self) -> Vec<ConfigAdjustment> {
        let mut c = Clamper::new("kcc");
        c.within("offset", &mut self.offset, 0.0, 0.2);
        c.within("max_slope_climb_deg", &mut self.max_slope_climb_deg, 0.0, 89.0);
        c.within("min_slope_slide_deg", &mut self.min_slope_slide_deg, 0.0, 89.0);
        c.at_least("autostep_max_height", &mut self.autostep_max_height, 0.0);
        c.at_least("autostep_min_width", &mut self.autostep_min_width, 0.0);
        c.at_least("normal_nudge_factor", &mut self.normal_nudge_factor, 0.0);
        c.at_least("snap_to_ground", &mut self.snap_to_ground, 0.0);
        c.finish()
    }
}

/// A named, versioned bag of every tunable for one character archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeConfig {
    pub name: String,
    pub version: u32,
    pub movement: MovementConfig,
    pub camera: CameraConfig,
    pub kcc: KccSettings,
}

impl Default for ArchetypeConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            version: 1,
            movement: MovementConfig::default(),
            camera: CameraConfig::default(),
            kcc: KccSettings::default(),
        }
    }
}

impl ArchetypeConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        parse_ron(text, "<archetype>")
    }

    /// Read and parse an archetype file. The result is not validated.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse_ron(&text, &path.display().to_string())
    }

    /// Validate all three groups; returns every adjustment applied.
    pub fn validate(&mut self) -> Vec<ConfigAdjustment> {
        let mut adjustments = self.movement.validate();
        adjustments.extend(self.camera.validate());
        adjustments.extend(self.kcc.validate());
        adjustments
    }

    pub fn validated(mut self) -> Self {
        self.validate();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_needs_no_adjustment() {
        let mut cfg = MovementConfig::default();
        assert!(cfg.validate().is_empty());
        let mut cam = CameraConfig::default();
        assert!(cam.validate().is_empty());
        let mut kcc = KccSettings::default();
        assert!(kcc.validate().is_empty());
    }

    #[test]
    fn jump_velocity_matches_height_and_base_gravity() {
        let cfg = MovementConfig::default();
        assert!((cfg.jump_velocity() - (2.0f32 * 25.0 * 2.2).sqrt()).abs() < 1.0e-5);
        assert!((cfg.jump_velocity() - 10.488).abs() < 1.0e-2);
    }

    #[test]
    fn gravity_max_below_base_is_raised_to_base() {
        let mut cfg = MovementConfig {
            gravity_base: 30.0,
            gravity_max: 10.0,
            ..Default::default()
        };
        let adjustments = cfg.validate();
        assert_eq!(cfg.gravity_max, 30.0);
        assert!(adjustments.iter().any(|a| a.field == "gravity_max"));
    }

    #[test]
    fn timer_windows_are_clamped_into_range() {
        let mut cfg = MovementConfig {
            coyote_time: 2.0,
            jump_buffer: -1.0,
            ground_check_extra: 0.9,
            max_jumps: 0,
            ..Default::default()
        };
        cfg.validate();
        assert_eq!(cfg.coyote_time, 0.5);
        assert_eq!(cfg.jump_buffer, 0.0);
        assert_eq!(cfg.ground_check_extra, 0.5);
        assert_eq!(cfg.max_jumps, 1);
    }

    #[test]
    fn derived_bounds_follow_their_base_fields() {
        let mut cfg = MovementConfig {
            air_control_ascend_factor: 0.8,
            air_control_descend_factor: 0.2,
            max_sprint_speed: 5.0,
            slope_angle_power: 0.0,
            max_rise_speed: 1.0,
            landing_good_keep: 0.1,
            landing_bad_keep: 0.5,
            crouch_height: 0.1,
            ..Default::default()
        };
        cfg.validate();
        assert_eq!(cfg.air_control_descend_factor, 0.8);
        assert_eq!(cfg.max_sprint_speed, cfg.max_ground_speed);
        assert_eq!(cfg.slope_angle_power, 0.1);
        assert_eq!(cfg.max_rise_speed, cfg.jump_velocity());
        assert_eq!(cfg.landing_good_keep, 0.5);
        assert_eq!(cfg.crouch_height, cfg.min_capsule_height());
    }

    #[test]
    fn non_finite_values_fall_back_to_lower_bound() {
        let mut cfg = MovementConfig {
            accel_air: f32::NAN,
            ..Default::default()
        };
        let adjustments = cfg.validate();
        assert_eq!(cfg.accel_air, 0.0);
        assert_eq!(adjustments.len(), 1);
    }

    #[test]
    fn camera_distance_is_clamped_into_limits() {
        let mut cam = CameraConfig {
            min_distance: 2.0,
            max_distance: 1.0,
            distance: 9.0,
            ..Default::default()
        };
        cam.validate();
        assert_eq!(cam.max_distance, 2.0);
        assert_eq!(cam.distance, 2.0);
    }

    #[test]
    fn partial_ron_document_keeps_defaults() {
        let cfg = MovementConfig::from_ron_str("(jump_height: 3.0, max_jumps: 3)").unwrap();
        assert_eq!(cfg.jump_height, 3.0);
        assert_eq!(cfg.max_jumps, 3);
        assert_eq!(cfg.gravity_base, MovementConfig::default().gravity_base);
    }

    #[test]
    fn slide_profile_parses_momentum_variant() {
        let cfg = MovementConfig::from_ron_str(
            "(slide_profile: Momentum(min_speed: 4.0, max_speed: 20.0, accel: 6.0, friction: 3.0, slope_accel_scale: 1.0))",
        )
        .unwrap();
        assert!(matches!(
            cfg.slide_profile,
            SlideSpeedProfile::Momentum { max_speed, .. } if max_speed == 20.0
        ));
    }

    #[test]
    fn malformed_ron_reports_parse_error() {
        let err = MovementConfig::from_ron_str("(jump_height: )").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn bundled_archetype_file_parses_and_validates() {
        let text = include_str!("../config/default.ron");
        let mut archetype = ArchetypeConfig::from_ron_str(text).unwrap();
        assert_eq!(archetype.name, "runner");
        assert!(archetype.validate().is_empty());
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = ArchetypeConfig::load("/definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

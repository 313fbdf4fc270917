//! Velocity rules shared by the locomotion states.
//!
//! Everything here is a pure function of velocities, normals and config so the rules can be
//! tested without a world.

use crate::config::MovementConfig;
use crate::constants::{DIST_EPS, LANDING_KEEP_CEILING};
use crate::utils::{Vec3, clamp01, lerp, move_towards, normalize_or_zero, planar, project_on_plane, up};

/// Move planar velocity toward `target` at `rate` (m/s^2) without overshooting.
#[inline]
pub fn accelerate_toward(horizontal: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    move_towards(horizontal, target, rate.max(0.0) * dt)
}

/// Air strafing: only the speed missing along `wish` is added, so air control can steer but
/// never pushes past `max_speed` along the wish direction.
pub fn air_accelerate(horizontal: Vec3, wish: Vec3, max_speed: f32, accel: f32, dt: f32) -> Vec3 {
    if wish.norm_squared() <= DIST_EPS {
        return horizontal;
    }

    let current = horizontal.dot(&wish);
    let missing = max_speed - current;
    if missing <= 0.0 {
        return horizontal;
    }

    horizontal + wish * (accel.max(0.0) * dt).min(missing)
}

/// Gravity magnitude for this frame before the wall-run or dash scale.
///
/// Ramps from `gravity_base` to `gravity_max` over `gravity_ramp_time` seconds of air time,
/// then applies the rise or fall multiplier and the apex hang near zero vertical speed.
pub fn gravity_magnitude(vertical_speed: f32, time_in_air: f32, cfg: &MovementConfig) -> f32 {
    let ramp = clamp01(time_in_air / cfg.gravity_ramp_time.max(DIST_EPS));
    let mut g = lerp(cfg.gravity_base, cfg.gravity_max, ramp);

    g *= if vertical_speed > 0.0 {
        cfg.rise_gravity_multiplier
    } else {
        cfg.fall_gravity_multiplier
    };
    if vertical_speed.abs() <= cfg.apex_threshold {
        g *= cfg.apex_hang_multiplier;
    }

    g
}

/// Integrate progressive gravity into `vertical_speed`, clamped to terminal and max rise speed.
pub fn progressive_gravity(vertical_speed: f32, time_in_air: f32, scale: f32, cfg: &MovementConfig, dt: f32) -> f32 {
    let g = gravity_magnitude(vertical_speed, time_in_air, cfg) * scale;
    (vertical_speed - g * dt).max(-cfg.terminal_velocity).min(cfg.max_rise_speed)
}

/// Direction that points down the slope with normal `n` (zero on flat ground).
pub fn downhill_direction(normal: Vec3) -> Vec3 {
    normalize_or_zero(project_on_plane(-up(), normal))
}

/// Fraction of horizontal speed kept when touching down.
///
/// A grazing landing keeps `landing_good_keep`, a head-on one keeps `landing_bad_keep`, and
/// landing downhill earns up to `landing_downhill_bonus` on top. The result always lies in
/// `[landing_bad_keep, 0.95]`.
pub fn landing_keep_fraction(velocity: Vec3, normal: Vec3, cfg: &MovementConfig) -> f32 {
    let bad = cfg.landing_bad_keep;
    let ceiling = LANDING_KEEP_CEILING.max(bad);

    let dir = normalize_or_zero(velocity);
    if dir == Vec3::zeros() {
        return cfg.landing_good_keep.max(bad).min(ceiling);
    }

    let impact = dir.dot(&normal).abs();
    let mut keep = lerp(bad, cfg.landing_good_keep, 1.0 - impact);

    let tangent = normalize_or_zero(project_on_plane(velocity, normal));
    keep += tangent.dot(&downhill_direction(normal)).max(0.0) * cfg.landing_downhill_bonus;

    keep.max(bad).min(ceiling)
}

/// Redirect horizontal velocity along the landing surface, scaled by `keep`. Vertical speed is
/// left to the caller.
pub fn apply_landing_keep(velocity: Vec3, normal: Vec3, keep: f32) -> Vec3 {
    let horizontal = planar(velocity);
    let speed = horizontal.norm();

    let along_surface = normalize_or_zero(planar(project_on_plane(velocity, normal)));
    let dir = if along_surface == Vec3::zeros() {
        normalize_or_zero(horizontal)
    } else {
        along_surface
    };

    let kept = dir * speed * keep;
    Vec3::new(kept.x, velocity.y, kept.z)
}

/// Scale horizontal speed by up to `1 + jump_horiz_bonus_max` depending on how close it is to
/// the ground speed cap.
pub fn jump_horizontal_bonus(horizontal: Vec3, cfg: &MovementConfig) -> Vec3 {
    let ratio = clamp01(horizontal.norm() / cfg.max_ground_speed.max(0.01));
    horizontal * (1.0 + lerp(0.0, cfg.jump_horiz_bonus_max, ratio))
}

/// Launch velocity for a jump off a wall with outward `normal`.
///
/// Horizontal motion leaves along the outward/upward blend, at least `wall_jump_min_horiz_speed`,
/// plus a separation push. Vertical speed is the full jump velocity.
pub fn wall_jump_velocity(velocity: Vec3, normal: Vec3, cfg: &MovementConfig) -> Vec3 {
    let blend = normalize_or_zero(normal * cfg.wall_jump_outward + up() * cfg.wall_jump_upward);

    let mut horizontal_dir = normalize_or_zero(planar(blend));
    if horizontal_dir == Vec3::zeros() {
        horizontal_dir = normalize_or_zero(planar(normal));
    }

    let target = (planar(velocity).norm() * cfg.wall_jump_horiz_scale).max(cfg.wall_jump_min_horiz_speed);
    let horizontal = horizontal_dir * target + planar(normal) * cfg.wall_jump_separation_boost;

    Vec3::new(horizontal.x, cfg.jump_velocity(), horizontal.z)
}

/// Whether horizontal motion qualifies for a wall run on a wall with outward `normal`.
///
/// Needs `wall_min_speed` and either an approach (moving into the wall) or mostly parallel motion.
pub fn wall_run_entry_allowed(horizontal: Vec3, normal: Vec3, approach_threshold: f32, cfg: &MovementConfig) -> bool {
    let speed = horizontal.norm();
    if speed < cfg.wall_min_speed || speed <= DIST_EPS {
        return false;
    }

    let dir = horizontal / speed;
    let approach = dir.dot(&-normal);
    let parallel = planar(project_on_plane(horizontal, normal)).norm() / speed;

    approach >= approach_threshold || parallel >= cfg.wall_parallel_min_ratio
}

/// Downhill acceleration while sliding down a slope, in m/s^2.
pub fn slope_slide_accel(slope_angle_deg: f32, time_on_slope: f32, cfg: &MovementConfig) -> f32 {
    let steepness = slope_angle_deg.to_radians().sin().max(0.0).powf(cfg.slope_angle_power);
    cfg.slope_slide_base_accel
        + cfg.slope_slide_accel_per_sec * time_on_slope.max(0.0)
        + cfg.gravity_base * cfg.slope_gravity_factor * steepness
}

/// Dash direction: wish when steering, otherwise the look direction with its vertical part
/// scaled by the up/down factors. Falls back to the body facing.
pub fn dash_direction(wish: Vec3, look: Vec3, facing: Vec3, cfg: &MovementConfig) -> Vec3 {
    if wish.norm_squared() > DIST_EPS {
        return normalize_or_zero(wish);
    }

    let scale = if look.y >= 0.0 {
        cfg.dash_up_scale
    } else {
        cfg.dash_down_scale
    };
    let scaled = normalize_or_zero(Vec3::new(look.x, look.y * scale, look.z));
    if scaled == Vec3::zeros() {
        normalize_or_zero(planar(facing))
    } else {
        scaled
    }
}

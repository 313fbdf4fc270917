use nalgebra as na;

use crate::constants::{DIST_EPS, YAW_EPS};

/// Common math aliases for clarity and consistency.
pub type Vec2 = na::Vector2<f32>;
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;

/// World up axis. The whole crate is Y-up.
#[inline]
pub fn up() -> Vec3 {
    Vec3::y()
}

/// Drop the vertical component.
#[inline]
pub fn planar(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Planar forward for a yaw (radians). Yaw 0 faces +Z, positive yaw turns toward +X.
#[inline]
pub fn planar_forward(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Planar right for a yaw (radians), perpendicular to [`planar_forward`].
#[inline]
pub fn planar_right(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), 0.0, -yaw.sin())
}

/// Yaw that faces along the planar part of `v`, if it has one.
pub fn yaw_from_planar(v: Vec3) -> Option<f32> {
    if v.x * v.x + v.z * v.z > YAW_EPS {
        return Some(v.x.atan2(v.z));
    }

    None
}

/// Yaw-only rotation.
#[inline]
pub fn yaw_rotation(yaw: f32) -> Quat {
    Quat::from_axis_angle(&Vec3::y_axis(), yaw)
}

/// Rotation for a view: yaw about +Y, then pitch about the local +X (positive pitch looks down).
#[inline]
pub fn view_rotation(yaw: f32, pitch: f32) -> Quat {
    yaw_rotation(yaw) * Quat::from_axis_angle(&Vec3::x_axis(), pitch)
}

pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let len = v.norm();
    if len > DIST_EPS { v / len } else { Vec3::zeros() }
}

/// Remove the component of `v` along the unit normal `n`.
#[inline]
pub fn project_on_plane(v: Vec3, n: Vec3) -> Vec3 {
    v - n * v.dot(&n)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn clamp01(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Move `current` toward `target` by at most `max_delta` (vector length).
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let dist = delta.norm();
    if dist <= max_delta || dist <= DIST_EPS {
        target
    } else {
        current + delta / dist * max_delta
    }
}

/// Rotate the planar direction `from` toward `to` by at most `max_radians`.
///
/// Both inputs are treated as planar; the result is a unit planar vector. If either input has
/// no planar length, `from` is returned normalized (or zero).
pub fn rotate_towards(from: Vec3, to: Vec3, max_radians: f32) -> Vec3 {
    let (Some(from_yaw), Some(to_yaw)) = (yaw_from_planar(from), yaw_from_planar(to)) else {
        return normalize_or_zero(planar(from));
    };

    let delta = wrap_angle(to_yaw - from_yaw);
    let step = delta.clamp(-max_radians.abs(), max_radians.abs());
    planar_forward(from_yaw + step)
}

/// Wrap an angle (radians) into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

/// Spherically interpolate a body yaw toward `target_yaw` by fraction `t` (clamped to `[0, 1]`).
pub fn slerp_yaw(current_yaw: f32, target_yaw: f32, t: f32) -> f32 {
    let from = yaw_rotation(current_yaw);
    let to = yaw_rotation(target_yaw);
    let t = clamp01(t);
    match from.try_slerp(&to, t, 1.0e-6) {
        Some(blended) => yaw_from_planar(blended * Vec3::z()).unwrap_or(current_yaw),
        // Degenerate interpolation: fall back to the planar angle blend.
        None => wrap_angle(current_yaw + wrap_angle(target_yaw - current_yaw) * t),
    }
}

/// Frame-rate independent exponential smoothing factor.
#[inline]
pub fn smoothing_factor(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate.max(0.0) * dt.max(0.0)).exp()
}

//! Ground, wall and headroom probes built on [`CollisionQueries`].

use super::{CollisionQueries, ContactFlag, QueryHit};
use crate::body::CharacterBody;
use crate::config::MovementConfig;
use crate::constants::{
    GROUND_PROBE_LIFT, GROUND_PROBE_RADIUS_SCALE, GROUND_PROBE_SLACK, WALL_PROBE_CHEST_RATIO,
    WALL_PROBE_MIN_CHEST, WALL_STILL_RANGE_SCALE,
};
use crate::utils::{Vec3, up};

/// Per-frame ground classification under the feet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundInfo {
    pub hit: bool,
    /// Surface normal, `+Y` when nothing was hit.
    pub normal: Vec3,
    /// Gap between the feet and the surface.
    pub distance: f32,
    pub slope_angle_deg: f32,
    pub is_walkable: bool,
    pub grounded: bool,
    /// Standing on a too-steep surface close enough to slide on it.
    pub near_steep_slope: bool,
}

impl GroundInfo {
    pub fn none() -> Self {
        Self {
            hit: false,
            normal: up(),
            distance: f32::INFINITY,
            slope_angle_deg: 0.0,
            is_walkable: false,
            grounded: false,
            near_steep_slope: false,
        }
    }
}

impl Default for GroundInfo {
    fn default() -> Self {
        Self::none()
    }
}

/// Sweep a slightly narrower sphere down from just above the feet.
///
/// The body is grounded when the surface is walkable and either within `ground_check_extra` of
/// the feet or the last move already reported floor contact.
pub fn probe_ground(queries: &dyn CollisionQueries, body: &CharacterBody, cfg: &MovementConfig) -> GroundInfo {
    let radius = body.radius() * GROUND_PROBE_RADIUS_SCALE;
    let origin = body.position() + up() * (radius + GROUND_PROBE_LIFT);
    let range = GROUND_PROBE_LIFT + cfg.ground_check_extra.max(cfg.steep_slope_band) + GROUND_PROBE_SLACK;

    let Some(hit) = queries.cast_sphere(origin, radius, -up(), range) else {
        return GroundInfo::none();
    };

    let normal = hit.normal;
    let cos = normal.y.max(-1.0).min(1.0);
    let slope_angle_deg = cos.acos().to_degrees();
    let is_walkable = cos >= cfg.walkable_cos();
    let distance = (hit.distance - GROUND_PROBE_LIFT).max(0.0);

    let close = distance <= cfg.ground_check_extra || body.last_contacts().has(ContactFlag::Below);
    GroundInfo {
        hit: true,
        normal,
        distance,
        slope_angle_deg,
        is_walkable,
        grounded: is_walkable && close,
        near_steep_slope: !is_walkable && distance <= cfg.steep_slope_band,
    }
}

/// Best wall found by [`probe_wall`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallHit {
    pub normal: Vec3,
    /// Probe direction that found it.
    pub direction: Vec3,
    pub distance: f32,
}

/// Chest height of the wall rays.
fn chest_origin(body: &CharacterBody) -> Vec3 {
    body.center() + up() * (body.height() * WALL_PROBE_CHEST_RATIO).max(WALL_PROBE_MIN_CHEST)
}

/// Candidate wall directions: forward and both sides of the body.
pub fn wall_candidate_directions(body: &CharacterBody) -> [Vec3; 3] {
    let right = body.right();
    [body.forward(), right, -right]
}

/// Cast rays from chest height along each direction and keep the most head-on wall.
///
/// Surfaces with `|normal.y| > max_normal_y` are floors or ceilings and are skipped.
pub fn probe_wall(
    queries: &dyn CollisionQueries,
    body: &CharacterBody,
    directions: &[Vec3],
    range: f32,
    max_normal_y: f32,
) -> Option<WallHit> {
    let origin = chest_origin(body);
    let mut best: Option<(f32, WallHit)> = None;

    for &direction in directions {
        let Some(QueryHit { distance, normal }) = queries.cast_ray(origin, direction, range) else {
            continue;
        };
        if normal.y.abs() > max_normal_y {
            continue;
        }

        let facing = (-normal).dot(&direction);
        if facing <= 0.0 {
            continue;
        }
        if best.is_none_or(|(score, _)| facing > score) {
            best = Some((
                facing,
                WallHit {
                    normal,
                    direction,
                    distance,
                },
            ));
        }
    }

    best.map(|(_, hit)| hit)
}

/// Re-check a wall that is already being run on by casting into it.
///
/// Uses the same floor/ceiling cutoff as [`probe_wall`].
pub fn still_has_wall(
    queries: &dyn CollisionQueries,
    body: &CharacterBody,
    wall_normal: Vec3,
    range: f32,
    max_normal_y: f32,
) -> Option<WallHit> {
    let direction = -wall_normal;
    let hit = queries.cast_ray(chest_origin(body), direction, range * WALL_STILL_RANGE_SCALE)?;
    (hit.normal.y.abs() <= max_normal_y).then_some(WallHit {
        normal: hit.normal,
        direction,
        distance: hit.distance,
    })
}

/// Whether a sphere of `radius` can rise from `from_height` to `to_height` above the feet.
pub fn has_headroom(
    queries: &dyn CollisionQueries,
    body: &CharacterBody,
    from_height: f32,
    to_height: f32,
    radius: f32,
) -> bool {
    let rise = to_height - from_height;
    if rise <= 0.0 {
        return true;
    }

    let origin = body.position() + up() * (from_height - radius).max(radius);
    queries.cast_sphere(origin, radius, up(), rise).is_none()
}

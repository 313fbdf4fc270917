//! Analytic half-space world for deterministic motor tests.
//!
//! Every obstacle is an infinite plane; the solid side is where `normal . x <= offset`.

use super::{CapsuleMover, CapsuleShape, CollisionQueries, ContactFlag, ContactFlags, MoveOutcome, QueryHit};
use crate::utils::Vec3;

/// Gap kept between the capsule and a plane after a blocked move.
pub(crate) const TEST_SKIN: f32 = 0.01;

#[derive(Clone, Copy, Debug)]
pub(crate) struct HalfSpace {
    pub normal: Vec3,
    pub offset: f32,
}

impl HalfSpace {
    /// Plane through `point` with outward `normal` (normalized here).
    pub fn through(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            offset: normal.dot(&point),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct TestWorld {
    pub planes: Vec<HalfSpace>,
}

impl TestWorld {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Flat floor at `y = 0`.
    pub fn flat() -> Self {
        Self::empty().with_plane(Vec3::zeros(), Vec3::y())
    }

    pub fn with_plane(mut self, point: Vec3, normal: Vec3) -> Self {
        self.planes.push(HalfSpace::through(point, normal));
        self
    }

    /// Vertical wall through `point` facing `normal` (planar).
    pub fn with_wall(self, point: Vec3, normal: Vec3) -> Self {
        self.with_plane(point, Vec3::new(normal.x, 0.0, normal.z))
    }

    /// Drop every floor-like plane (normal mostly up).
    pub fn remove_floors(&mut self) {
        self.planes.retain(|p| p.normal.y < 0.7);
    }

    fn sweep(&self, origin: Vec3, radius: f32, direction: Vec3, max_distance: f32) -> Option<QueryHit> {
        let mut best: Option<QueryHit> = None;
        for plane in &self.planes {
            let gap = plane.normal.dot(&origin) - plane.offset - radius;
            let distance = if gap <= 0.0 {
                0.0
            } else {
                let closing = -plane.normal.dot(&direction);
                if closing <= 1.0e-6 {
                    continue;
                }
                gap / closing
            };

            if distance <= max_distance && best.is_none_or(|b| distance < b.distance) {
                best = Some(QueryHit {
                    distance,
                    normal: plane.normal,
                });
            }
        }
        best
    }
}

impl CollisionQueries for TestWorld {
    fn cast_sphere(&self, origin: Vec3, radius: f32, direction: Vec3, max_distance: f32) -> Option<QueryHit> {
        self.sweep(origin, radius, direction, max_distance)
    }

    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<QueryHit> {
        self.sweep(origin, 0.0, direction, max_distance)
    }
}

impl CapsuleMover for TestWorld {
    fn move_capsule(&self, capsule: CapsuleShape, center: Vec3, displacement: Vec3, _dt: f32) -> MoveOutcome {
        let mut pos = center;
        let mut remaining = displacement;
        let mut contacts = ContactFlags::empty();

        for _ in 0..4 {
            let len = remaining.norm();
            if len <= 1.0e-7 {
                break;
            }
            let dir = remaining / len;

            let mut first: Option<(f32, Vec3)> = None;
            for plane in &self.planes {
                let extent = capsule.radius + capsule.half_segment * plane.normal.y.abs();
                let gap = plane.normal.dot(&pos) - plane.offset - extent;
                let closing = -plane.normal.dot(&dir);
                if closing <= 1.0e-6 {
                    continue;
                }
                let t = ((gap - TEST_SKIN) / closing).max(0.0);
                if t < len && first.is_none_or(|(best, _)| t < best) {
                    first = Some((t, plane.normal));
                }
            }

            match first {
                None => {
                    pos += remaining;
                    break;
                }
                Some((t, normal)) => {
                    pos += dir * t;
                    if normal.y > 0.7 {
                        contacts.add(ContactFlag::Below);
                    } else if normal.y < -0.7 {
                        contacts.add(ContactFlag::Above);
                    } else {
                        contacts.add(ContactFlag::Sides);
                    }
                    let rest = remaining - dir * t;
                    remaining = rest - normal * rest.dot(&normal);
                }
            }
        }

        MoveOutcome {
            displacement: pos - center,
            contacts,
        }
    }
}

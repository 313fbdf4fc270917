//! Rapier-backed collision world for static level geometry.
//!
//! Builds an immutable Rapier scene from static collider definitions and exposes it to the
//! locomotion core through [`CollisionQueries`] (on a borrowed `QueryPipeline`) and
//! [`CapsuleMover`] (through [`RapierMover`], which wraps Rapier's
//! `KinematicCharacterController`).
//!
//! Determinism
//! - Definitions are inserted sorted by `id`, so the same input always builds the same sets.
//! - The world is query-only. Statics never move after [`CollisionWorld::build`].

pub use rapier3d;

use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::parry::shape::{Ball, Capsule};
use rapier3d::prelude::*;

use super::{CapsuleMover, CapsuleShape, CollisionQueries, MoveOutcome, QueryHit, contacts_from_shortfall};
use crate::config::KccSettings;
use crate::utils::{Quat, Vec3};

/// One immutable world collider.
///
/// Units are meters. For planes the surface normal is `rotation * +Y` and the surface passes
/// through `translation + normal * offset_along_normal`.
#[derive(Clone, Debug)]
pub struct StaticColliderDef {
    /// Stable identifier; insertion order follows it.
    pub id: u32,
    pub translation: Vec3,
    pub rotation: Quat,
    pub shape: StaticShape,
}

#[derive(Clone, Debug)]
pub enum StaticShape {
    /// Infinite half-space; solid below the surface.
    Plane { offset_along_normal: f32 },
    Cuboid { half_extents: Vec3 },
    Sphere { radius: f32 },
    CapsuleY { radius: f32, half_height: f32 },
    CylinderY { radius: f32, half_height: f32 },
}

/// Rapier sets holding the static geometry plus the phases needed to query it.
pub struct CollisionWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
}

impl CollisionWorld {
    pub fn build(mut defs: Vec<StaticColliderDef>) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        for def in &defs {
            let rb = RigidBodyBuilder::fixed().pose(to_isometry(def.translation, def.rotation)).build();
            let rb_handle = bodies.insert(rb);
            colliders.insert_with_parent(collider_from_def(def), rb_handle, &mut bodies);
        }

        // Collision detection only: refreshes the broad-phase BVH so queries can run.
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        CollisionPipeline::new().step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &(),
            &(),
        );

        log::debug!("Built collision world with {} static colliders", defs.len());

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
        }
    }

    /// Borrowed query view. Use `QueryFilter::only_fixed()` for pure static geometry.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }
}

/// The collider is attached to a fixed body carrying the pose, so every shape keeps an identity
/// local transform except the plane, which is shifted along its local +Y.
fn collider_from_def(def: &StaticColliderDef) -> Collider {
    match def.shape {
        StaticShape::Plane { offset_along_normal } => {
            ColliderBuilder::new(SharedShape::halfspace(Vector::y_axis()))
                .translation(vector![0.0, offset_along_normal, 0.0])
                .build()
        }
        StaticShape::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).build()
        }
        StaticShape::Sphere { radius } => ColliderBuilder::ball(radius).build(),
        StaticShape::CapsuleY { radius, half_height } => {
            ColliderBuilder::capsule_y(half_height, radius).build()
        }
        StaticShape::CylinderY { radius, half_height } => {
            ColliderBuilder::cylinder(half_height, radius).build()
        }
    }
}

#[inline]
fn to_vector(v: Vec3) -> Vector<f32> {
    vector![v.x, v.y, v.z]
}

#[inline]
fn from_vector(v: &Vector<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn to_isometry(translation: Vec3, rotation: Quat) -> Isometry<f32> {
    let q = rapier3d::na::UnitQuaternion::from_quaternion(rapier3d::na::Quaternion::new(
        rotation.w, rotation.i, rotation.j, rotation.k,
    ));
    Isometry::from_parts(rapier3d::na::Translation3::new(translation.x, translation.y, translation.z), q)
}

/// Orient a hit normal so it faces back against the cast direction.
fn facing_caster(normal: Vec3, direction: Vec3) -> Vec3 {
    if normal.dot(&direction) > 0.0 { -normal } else { normal }
}

impl CollisionQueries for QueryPipeline<'_> {
    fn cast_sphere(&self, origin: Vec3, radius: f32, direction: Vec3, max_distance: f32) -> Option<QueryHit> {
        let ball = Ball::new(radius.max(0.0));
        let pose = Isometry::translation(origin.x, origin.y, origin.z);
        let (_handle, hit) = self.cast_shape(
            &pose,
            &to_vector(direction),
            &ball,
            ShapeCastOptions::with_max_time_of_impact(max_distance.max(0.0)),
        )?;

        Some(QueryHit {
            distance: hit.time_of_impact,
            normal: facing_caster(from_vector(&hit.normal1), direction),
        })
    }

    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<QueryHit> {
        let ray = Ray::new(point![origin.x, origin.y, origin.z], to_vector(direction));
        let (_handle, hit) = self.cast_ray_and_get_normal(&ray, max_distance.max(0.0), true)?;

        Some(QueryHit {
            distance: hit.time_of_impact,
            normal: facing_caster(from_vector(&hit.normal), direction),
        })
    }
}

/// Build Rapier's character controller from archetype settings.
pub fn kinematic_controller(settings: &KccSettings) -> KinematicCharacterController {
    let autostep = (settings.autostep_max_height > 0.0).then(|| CharacterAutostep {
        max_height: CharacterLength::Absolute(settings.autostep_max_height),
        min_width: CharacterLength::Absolute(settings.autostep_min_width),
        include_dynamic_bodies: false,
    });
    let snap_to_ground =
        (settings.snap_to_ground > 0.0).then_some(CharacterLength::Absolute(settings.snap_to_ground));

    KinematicCharacterController {
        offset: CharacterLength::Absolute(settings.offset),
        slide: settings.slide,
        autostep,
        max_slope_climb_angle: settings.max_slope_climb_deg.to_radians(),
        min_slope_slide_angle: settings.min_slope_slide_deg.to_radians(),
        snap_to_ground,
        normal_nudge_factor: settings.normal_nudge_factor,
        ..KinematicCharacterController::default()
    }
}

/// [`CapsuleMover`] backed by Rapier's kinematic controller.
pub struct RapierMover<'p, 'w> {
    pub queries: &'p QueryPipeline<'w>,
    pub controller: &'p KinematicCharacterController,
}

impl CapsuleMover for RapierMover<'_, '_> {
    fn move_capsule(&self, capsule: CapsuleShape, center: Vec3, displacement: Vec3, dt: f32) -> MoveOutcome {
        let shape = Capsule::new_y(capsule.half_segment, capsule.radius);
        let pose = Isometry::translation(center.x, center.y, center.z);
        let corrected = self.controller.move_shape(
            dt,
            self.queries,
            &shape,
            &pose,
            to_vector(displacement),
            |_| {},
        );

        let actual = from_vector(&corrected.translation);
        MoveOutcome {
            displacement: actual,
            contacts: contacts_from_shortfall(displacement, actual, corrected.grounded),
        }
    }
}

/*!
Collision-world seams consumed by the locomotion core.

The core never resolves collisions itself. It needs two things from a host world:
- [`CollisionQueries`]: read-only sphere and ray sweeps (ground, wall, headroom and camera probes).
- [`CapsuleMover`]: one sweep-and-slide move per frame that reports the displacement actually
  applied plus coarse contact flags.

`rapier_world` implements both on top of Rapier's `QueryPipeline` and
`KinematicCharacterController`. Tests use an analytic half-space world.
*/

pub mod probe;
pub mod rapier_world;
#[cfg(test)]
pub(crate) mod test_world;

use crate::bitmask_flags::BitmaskFlags;
use crate::utils::{Vec3, planar};

crate::define_bitmask_flags!(ContactFlag, u8, {
    /// Floor contact under the capsule.
    Below,
    /// Ceiling contact.
    Above,
    /// Wall contact blocking horizontal motion.
    Sides,
});

/// Contacts reported by one integrator move.
pub type ContactFlags = BitmaskFlags<u8>;

/// A sweep or ray hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueryHit {
    /// Distance travelled along the (unit) cast direction before contact.
    pub distance: f32,
    /// Surface normal of the geometry that was hit, facing back toward the caster.
    pub normal: Vec3,
}

/// Read-only scene queries. Directions must be unit length.
///
/// A miss is `None`; nothing in range is a normal outcome, never an error.
pub trait CollisionQueries {
    fn cast_sphere(&self, origin: Vec3, radius: f32, direction: Vec3, max_distance: f32)
    -> Option<QueryHit>;

    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<QueryHit>;
}

/// Y-aligned capsule around its center: two hemispheres of `radius` joined by a segment of
/// `2 * half_segment`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleShape {
    pub radius: f32,
    pub half_segment: f32,
}

/// Result of one sweep-and-slide move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveOutcome {
    pub displacement: Vec3,
    pub contacts: ContactFlags,
}

/// Host sweep-and-slide primitive.
pub trait CapsuleMover {
    fn move_capsule(
        &self,
        capsule: CapsuleShape,
        center: Vec3,
        displacement: Vec3,
        dt: f32,
    ) -> MoveOutcome;
}

/// Derive contact flags by comparing a desired move with the move actually applied.
///
/// Notes:
/// - `grounded` is the mover's own floor verdict and always sets `Below`.
/// - Horizontal motion counts as blocked when less than half of it survived along the desired
///   direction, so walking up a walkable slope is not reported as a wall.
pub fn contacts_from_shortfall(desired: Vec3, actual: Vec3, grounded: bool) -> ContactFlags {
    const BLOCK_EPS: f32 = 1.0e-4;

    let mut contacts = ContactFlags::empty();
    contacts.set(
        ContactFlag::Below,
        grounded || (desired.y < -BLOCK_EPS && actual.y > desired.y + BLOCK_EPS),
    );
    contacts.set(
        ContactFlag::Above,
        desired.y > BLOCK_EPS && actual.y < desired.y - BLOCK_EPS,
    );

    let desired_planar = planar(desired);
    let desired_len = desired_planar.norm();
    if desired_len > BLOCK_EPS {
        let progress = planar(actual).dot(&(desired_planar / desired_len));
        contacts.set(ContactFlag::Sides, progress < desired_len * 0.5);
    }

    contacts
}

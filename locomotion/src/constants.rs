/*!
Tolerances and fixed probe parameters shared by the motor, probes and camera.

Tunable gameplay values live in [`crate::config::MovementConfig`]. The constants here are the
numbers that should not change per archetype: epsilons, probe slack and geometric margins.

Notes
- Distances are in meters, time in seconds, angles in degrees unless the name says otherwise.
*/

/// Default upper bound for a single frame delta (seconds).
///
/// A stalled frame is simulated as at most this much time so timers and integration never
/// take one huge step.
pub const MAX_DELTA_TIME_S: f32 = 0.10;

/// Practical small distance for comparisons (meters).
pub const DIST_EPS: f32 = 1.0e-6;

/// Minimum planar length required to derive a yaw from a vector.
pub const YAW_EPS: f32 = 1.0e-6;

/// Height above the feet at which the ground sweep starts.
pub const GROUND_PROBE_LIFT: f32 = 0.05;

/// Fixed extra range added to every ground sweep on top of the configured margin.
pub const GROUND_PROBE_SLACK: f32 = 0.05;

/// Ground sweep radius as a fraction of the capsule radius.
///
/// Slightly smaller than the capsule so walls touching the capsule side are not reported
/// as ground.
pub const GROUND_PROBE_RADIUS_SCALE: f32 = 0.95;

/// Extra height above `2 * radius` a capsule must keep when crouched.
pub const CAPSULE_MIN_HEIGHT_MARGIN: f32 = 0.02;

/// Lowest chest height (above capsule center) used for wall probes.
pub const WALL_PROBE_MIN_CHEST: f32 = 0.2;

/// Chest height as a fraction of the current capsule height.
pub const WALL_PROBE_CHEST_RATIO: f32 = 0.35;

/// Range multiplier used when re-checking the wall already being run on.
pub const WALL_STILL_RANGE_SCALE: f32 = 1.1;

/// Two wall normals with a dot product above this are considered the same wall side.
pub const WALL_SAME_SIDE_DOT: f32 = 0.9;

/// Vertical speed applied while sliding never sticks less than this (m/s, magnitude).
pub const SLIDE_MIN_STICK_SPEED: f32 = 2.0;

/// Upper bound of the landing keep fraction, regardless of configured values.
pub const LANDING_KEEP_CEILING: f32 = 0.95;

/// Move-axis magnitude above which third-person input steers the body.
pub const FACING_INPUT_THRESHOLD: f32 = 0.1;

/// Distance band above `min_distance` in which the camera switches to first person.
pub const FIRST_PERSON_DISTANCE_EPS: f32 = 0.1;

/// Pitch kick in degrees per unit of kick intensity.
pub const CAMERA_KICK_DEGREES_PER_UNIT: f32 = 3.0;

/// Speed ratio below which head-bob is disabled and its phase reset.
pub const HEADBOB_MIN_SPEED_RATIO: f32 = 0.01;

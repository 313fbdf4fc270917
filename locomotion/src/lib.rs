pub mod bitmask_flags;
pub mod body;
pub mod camera;
pub mod character;
pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod input;
pub mod motor;
pub mod provider;
pub mod utils;

pub use body::{CapsuleDimensions, CharacterBody};
pub use camera::{CameraMode, CameraPose, CameraRig, CameraTarget};
pub use character::{Character, FrameReport};
pub use collision::probe::{GroundInfo, WallHit, has_headroom, probe_ground, probe_wall};
pub use collision::rapier_world::{CollisionWorld, RapierMover, StaticColliderDef, StaticShape, kinematic_controller};
pub use collision::{CapsuleMover, CollisionQueries, ContactFlag, ContactFlags, MoveOutcome, QueryHit};
pub use config::{ArchetypeConfig, CameraConfig, ConfigAdjustment, KccSettings, MovementConfig, SlideSpeedProfile};
pub use error::{ConfigError, LocomotionError};
pub use input::{InputBuffer, RawInput};
pub use motor::context::ViewBasis;
pub use motor::states::StateKind;
pub use motor::{
    JumpKind, LocomotionMotor, LocomotionObserver, MotorDiagnostics, MotorEvent, StateTransition, TickReport,
};
pub use provider::ConfigProvider;
pub use utils::{Quat, Vec2, Vec3};

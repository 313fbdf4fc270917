use std::path::PathBuf;

/// Fatal construction failures. Per-frame simulation never produces these.
#[derive(Debug, thiserror::Error)]
pub enum LocomotionError {
    #[error("Capsule radius must be positive and finite, got {0}")]
    InvalidRadius(f32),

    #[error("Capsule height {height} is below the minimum {min} for radius {radius}")]
    CapsuleTooShort { height: f32, min: f32, radius: f32 },

    #[error("Spawn position must be finite")]
    NonFiniteSpawn,
}

/// Errors raised while loading or registering configuration archetypes.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("Archetype `{name}` version {offered} is not newer than registered version {current}")]
    StaleVersion {
        name: String,
        offered: u32,
        current: u32,
    },

    #[error("Unknown archetype `{0}`")]
    UnknownArchetype(String),
}

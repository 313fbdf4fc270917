//! Registry of named, versioned archetype configs.
//!
//! Characters hold an `Arc` to the archetype they were spawned with, so re-registering a newer
//! version affects only characters spawned afterwards.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::ArchetypeConfig;
use crate::error::ConfigError;

#[derive(Debug, Default)]
pub struct ConfigProvider {
    archetypes: HashMap<String, Arc<ArchetypeConfig>>,
}

impl ConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store an archetype under its name.
    ///
    /// A name that is already registered only accepts a strictly newer version.
    pub fn register(&mut self, mut archetype: ArchetypeConfig) -> Result<Arc<ArchetypeConfig>, ConfigError> {
        if let Some(current) = self.archetypes.get(&archetype.name) {
            if archetype.version <= current.version {
                return Err(ConfigError::StaleVersion {
                    name: archetype.name,
                    offered: archetype.version,
                    current: current.version,
                });
            }
        }

        let adjustments = archetype.validate();
        log::info!(
            "Registered archetype `{}` v{} ({} field(s) clamped)",
            archetype.name,
            archetype.version,
            adjustments.len()
        );

        let archetype = Arc::new(archetype);
        self.archetypes
            .insert(archetype.name.clone(), Arc::clone(&archetype));
        Ok(archetype)
    }

    /// Load a RON archetype file and register it.
    pub fn load_ron(&mut self, path: impl AsRef<Path>) -> Result<Arc<ArchetypeConfig>, ConfigError> {
        let archetype = ArchetypeConfig::load(path)?;
        self.register(archetype)
    }

    pub fn get(&self, name: &str) -> Result<Arc<ArchetypeConfig>, ConfigError> {
        self.archetypes
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownArchetype(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.archetypes.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.archetypes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}

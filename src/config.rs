//! Layered runtime configuration
//!
//! Precedence (lowest to highest):
//! 1. Bundled system default config (`config/config.yaml` in the pipeline root)
//! 2. Pre-existing config file at the resolved `--configfile` path
//! 3. CLI-derived merge payload for the invoked command
//!
//! The resolved configuration is a flat top-level YAML mapping: a key from a
//! higher layer fully replaces the lower layer's value, absent keys fall
//! through. The result is written back to the configfile path, so a later
//! invocation pointed at the same file reuses the resolved values as its
//! base layer.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::errors::{SpaeError, SpaeResult};

/// What seeding the configfile from the system template did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The system template was copied to the target path.
    Copied,
    /// The target already existed and was kept as the override layer.
    Reused,
}

/// The resolved flat configuration mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedConfig {
    map: Mapping,
}

impl ResolvedConfig {
    pub fn from_mapping(map: Mapping) -> Self {
        Self { map }
    }

    /// Read a config file into a mapping.
    ///
    /// A file whose top level is not a mapping cannot serve as a merge layer.
    pub fn read(path: &Path) -> SpaeResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SpaeError::io(format!("read {}", path.display()), e))?;
        let value: Value = serde_yaml::from_str(&content)
            .map_err(|e| SpaeError::config(path, e.to_string()))?;
        match value {
            Value::Mapping(map) => Ok(Self { map }),
            Value::Null => Ok(Self::default()),
            _ => Err(SpaeError::config(path, "top level must be a mapping")),
        }
    }

    pub fn mapping(&self) -> &Mapping {
        &self.map
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// Overlay another mapping on top of this one, key by key.
    ///
    /// Replacement is shallow: a key's whole value is taken from the overlay,
    /// nested mappings are not merged further.
    pub fn merge(&mut self, overlay: &Mapping) {
        for (key, value) in overlay {
            self.map.insert(key.clone(), value.clone());
        }
    }

    /// Persist the mapping to `path`, creating parent directories.
    pub fn write(&self, path: &Path) -> SpaeResult<()> {
        ensure_parent(path)?;
        let yaml = self.to_yaml()?;
        fs::write(path, yaml).map_err(|e| SpaeError::io(format!("write {}", path.display()), e))
    }

    pub fn to_yaml(&self) -> SpaeResult<String> {
        serde_yaml::to_string(&self.map)
            .map_err(|e| SpaeError::config("<resolved config>", e.to_string()))
    }
}

/// Serialize a merge payload into a flat mapping.
///
/// Omitted optional flags serialize to `null` and still overwrite: the
/// payload is the highest-priority layer.
pub fn payload_mapping<T: Serialize>(payload: &T) -> SpaeResult<Mapping> {
    match serde_yaml::to_value(payload) {
        Ok(Value::Mapping(map)) => Ok(map),
        Ok(_) => Err(SpaeError::config(
            "<merge payload>",
            "payload must serialize to a mapping",
        )),
        Err(e) => Err(SpaeError::config("<merge payload>", e.to_string())),
    }
}

/// Copy the bundled system config to `dest` unless it already exists.
///
/// A pre-existing destination is kept untouched; its values act as session
/// overrides. A missing system template is fatal: without it there is no
/// baseline configuration.
pub fn copy_config(system_config: &Path, dest: &Path) -> SpaeResult<SeedOutcome> {
    if !system_config.is_file() {
        return Err(SpaeError::AssetNotFound(system_config.to_path_buf()));
    }
    if dest.exists() {
        debug!("reusing existing config file {}", dest.display());
        return Ok(SeedOutcome::Reused);
    }
    ensure_parent(dest)?;
    fs::copy(system_config, dest).map_err(|e| {
        SpaeError::io(
            format!(
                "copy {} to {}",
                system_config.display(),
                dest.display()
            ),
            e,
        )
    })?;
    debug!("copied system default config to {}", dest.display());
    Ok(SeedOutcome::Copied)
}

/// Produce and persist the resolved configuration for one invocation.
///
/// Seeds the configfile from the system template when absent, overlays the
/// CLI payload, and writes the result back to the configfile path.
pub fn resolve(
    system_config: &Path,
    configfile: &Path,
    payload: &Mapping,
) -> SpaeResult<(SeedOutcome, ResolvedConfig)> {
    let outcome = copy_config(system_config, configfile)?;
    let mut resolved = ResolvedConfig::read(configfile)?;
    resolved.merge(payload);
    resolved.write(configfile)?;
    Ok((outcome, resolved))
}

fn ensure_parent(path: &Path) -> SpaeResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| SpaeError::io(format!("create {}", parent.display()), e))?;
        }
    }
    Ok(())
}

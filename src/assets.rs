//! Bundled pipeline files
//!
//! The workflow definitions, the system default config, and the citation and
//! version files ship alongside the binary. `Assets` locates that pipeline
//! root once per process and hands out paths into it; nothing here is ever
//! mutated after startup.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{SpaeError, SpaeResult};

/// Environment variable overriding the pipeline root.
pub const HOME_ENV: &str = "SPAE_HOME";

const VERSION_FILE: &str = "spae.VERSION";
const CITATION_FILE: &str = "spae.CITATION";

/// Read-only provider for bundled pipeline files.
#[derive(Debug, Clone)]
pub struct Assets {
    root: PathBuf,
}

impl Assets {
    /// Locate the pipeline root.
    ///
    /// Resolution order: `SPAE_HOME` (trusted as-is), `<exedir>/../share/spae`
    /// next to the installed binary, then the development checkout. The two
    /// discovered candidates must contain the system config to qualify.
    pub fn locate() -> SpaeResult<Self> {
        if let Some(home) = env::var_os(HOME_ENV) {
            return Ok(Self::at(PathBuf::from(home)));
        }

        let mut candidates = Vec::new();
        if let Ok(exe) = env::current_exe() {
            if let Some(bindir) = exe.parent() {
                candidates.push(bindir.join("..").join("share").join("spae"));
            }
        }
        candidates.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")));

        for candidate in candidates {
            if Self::at(candidate.clone()).system_config().is_file() {
                return Ok(Self::at(candidate));
            }
        }

        Err(SpaeError::AssetRoot(format!(
            "set {HOME_ENV} to the directory containing the spae workflow files"
        )))
    }

    /// Use an explicit pipeline root.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Main pipeline definition.
    pub fn snakefile(&self) -> PathBuf {
        self.root.join("workflow").join("Snakefile")
    }

    /// Database install workflow definition.
    pub fn install_snakefile(&self) -> PathBuf {
        self.root.join("workflow").join("install.smk")
    }

    /// Bundled system default config template.
    pub fn system_config(&self) -> PathBuf {
        self.root.join("config").join("config.yaml")
    }

    /// Default conda environment directory for Snakemake rules.
    pub fn default_conda_prefix(&self) -> PathBuf {
        self.root.join("workflow").join("conda")
    }

    /// Single-line version string from the bundled version file.
    pub fn version(&self) -> SpaeResult<String> {
        let path = self.root.join(VERSION_FILE);
        let content = read_asset(&path)?;
        Ok(content.lines().next().unwrap_or_default().trim().to_string())
    }

    /// Full citation text from the bundled citation file.
    pub fn citation(&self) -> SpaeResult<String> {
        read_asset(&self.root.join(CITATION_FILE))
    }
}

fn read_asset(path: &Path) -> SpaeResult<String> {
    if !path.is_file() {
        return Err(SpaeError::AssetNotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|e| SpaeError::io(format!("read {}", path.display()), e))
}

/// Version string handed to clap at startup.
///
/// The version file is part of the installation; failing to read it is a
/// fatal startup error, reported before argument parsing finishes.
pub fn bundled_version() -> String {
    match Assets::locate().and_then(|a| a.version()) {
        Ok(version) => version,
        Err(e) => {
            crate::cli::output::error(&e);
            std::process::exit(crate::exitcode::CONFIG);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_checkout_root_when_locating_then_bundled_files_resolve() {
        let assets = Assets::at(env!("CARGO_MANIFEST_DIR"));
        assert!(assets.system_config().is_file());
        assert!(assets.snakefile().is_file());
        assert!(assets.install_snakefile().is_file());
    }

    #[test]
    fn given_checkout_root_when_reading_version_then_single_line() {
        let assets = Assets::at(env!("CARGO_MANIFEST_DIR"));
        let version = assets.version().unwrap();
        assert!(!version.is_empty());
        assert!(!version.contains('\n'));
    }

    #[test]
    fn given_bogus_root_when_reading_citation_then_asset_error() {
        let assets = Assets::at("/nonexistent/spae");
        let err = assets.citation().unwrap_err();
        assert!(matches!(err, SpaeError::AssetNotFound(_)));
    }
}

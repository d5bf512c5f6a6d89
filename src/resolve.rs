//! Directory-relative default resolution
//!
//! Several options default to a path inside the output directory. Resolution
//! runs in two phases: phase 1 fixes the output directory itself, phase 2
//! derives every directory-relative default from that result. An option the
//! user supplied explicitly passes through unchanged, even when it spells
//! the same filename as the declared default.

use std::path::{Path, PathBuf};

/// Declared default for `--output`.
pub const DEFAULT_OUTPUT: &str = "spae.out";
/// Declared default for `--configfile`, relative to the output directory.
pub const DEFAULT_CONFIGFILE: &str = "spae.config.yaml";
/// Declared default for `--log`, relative to the output directory.
pub const DEFAULT_LOG: &str = "spae.log";

/// Paths shared by the `run` and `install` commands after both resolution
/// phases have completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub output: PathBuf,
    pub configfile: PathBuf,
    pub log: PathBuf,
}

impl ResolvedPaths {
    /// Resolve the directory-relative defaults against the output directory.
    ///
    /// `configfile` and `log` are the user-supplied values, `None` when the
    /// flag was omitted.
    pub fn resolve(
        output: &Path,
        configfile: Option<&Path>,
        log: Option<&Path>,
    ) -> Self {
        // phase 1
        let output = output.to_path_buf();
        // phase 2
        let configfile = default_to_output(&output, DEFAULT_CONFIGFILE, configfile);
        let log = default_to_output(&output, DEFAULT_LOG, log);
        Self {
            output,
            configfile,
            log,
        }
    }
}

/// Place the declared default inside the output directory unless the user
/// supplied a value.
pub fn default_to_output(output: &Path, declared: &str, supplied: Option<&Path>) -> PathBuf {
    match supplied {
        Some(value) => value.to_path_buf(),
        None => output.join(declared),
    }
}

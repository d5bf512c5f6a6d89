//! Exit-code mapping for top-level errors

use crate::errors::SpaeError;
use crate::exitcode;

/// Map a top-level error to the process exit code.
///
/// Delegated execution failures relay the engine's own code unchanged;
/// everything else follows sysexits conventions.
pub fn exit_code(err: &SpaeError) -> i32 {
    match err {
        SpaeError::AssetNotFound(_) | SpaeError::AssetRoot(_) => exitcode::CONFIG,
        SpaeError::Config { .. } => exitcode::DATAERR,
        SpaeError::Io { .. } => exitcode::IOERR,
        SpaeError::SnakeDefault { .. } => exitcode::USAGE,
        SpaeError::Spawn { .. } => exitcode::UNAVAILABLE,
        SpaeError::EngineExit(code) => *code,
    }
}

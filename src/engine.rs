//! Snakemake invocation
//!
//! Builds the final argument vector for the external workflow engine and
//! executes it. Execution goes through the `CommandRunner` seam so tests can
//! observe the argument vector and inject exit statuses without spawning
//! anything.

use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use tracing::debug;

use crate::errors::{SpaeError, SpaeResult};

/// The external workflow engine executable.
pub const ENGINE: &str = "snakemake";

/// Runs an external command to completion, stdio inherited.
pub trait CommandRunner {
    fn status(&self, program: &str, args: &[String]) -> io::Result<ExitStatus>;
}

/// Spawns real processes.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn status(&self, program: &str, args: &[String]) -> io::Result<ExitStatus> {
        Command::new(program).args(args).status()
    }
}

/// Everything needed to construct one engine invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub snakefile: PathBuf,
    pub configfile: PathBuf,
    pub threads: u32,
    pub profile: Option<String>,
    pub use_conda: bool,
    pub conda_prefix: PathBuf,
    pub snake_default: Vec<String>,
    pub snake_args: Vec<String>,
}

impl Invocation {
    /// Assemble the engine argument vector.
    ///
    /// Passthrough arguments come last so they win the engine's own argument
    /// parsing against any conflicting default runtime flag. `--jobs` is
    /// only set when no profile is in play, including one smuggled in via
    /// the passthrough list: cluster profiles own their job counts.
    pub fn command_line(&self) -> SpaeResult<Vec<String>> {
        let mut argv = vec![
            "-s".to_string(),
            self.snakefile.display().to_string(),
            "--configfile".to_string(),
            self.configfile.display().to_string(),
        ];

        let profile_in_passthrough = self.snake_args.iter().any(|a| a == "--profile");
        if self.profile.is_none() && !profile_in_passthrough {
            argv.push("--jobs".to_string());
            argv.push(self.threads.to_string());
        }

        if self.use_conda {
            argv.push("--use-conda".to_string());
            argv.push("--conda-prefix".to_string());
            argv.push(self.conda_prefix.display().to_string());
        }

        for flag in &self.snake_default {
            // An entry may carry several engine flags, e.g. "-k --nolock".
            let split = shell_words::split(flag).map_err(|e| SpaeError::SnakeDefault {
                value: flag.clone(),
                reason: e.to_string(),
            })?;
            argv.extend(split);
        }

        if let Some(profile) = &self.profile {
            argv.push("--profile".to_string());
            argv.push(profile.clone());
        }

        argv.extend(self.snake_args.iter().cloned());
        Ok(argv)
    }

    /// Render the full command for display.
    pub fn render(&self) -> SpaeResult<String> {
        let mut words = vec![ENGINE.to_string()];
        words.extend(self.command_line()?);
        Ok(shell_words::join(&words))
    }
}

/// Execute the engine and relay its exit status.
///
/// The engine's failure code is propagated unchanged; this layer never
/// interprets or retries delegated execution errors.
pub fn execute(invocation: &Invocation, runner: &dyn CommandRunner) -> SpaeResult<()> {
    let argv = invocation.command_line()?;
    debug!("engine argv: {:?}", argv);

    let status = runner
        .status(ENGINE, &argv)
        .map_err(|e| SpaeError::Spawn {
            program: ENGINE.to_string(),
            source: e,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(SpaeError::EngineExit(status.code().unwrap_or(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation() -> Invocation {
        Invocation {
            snakefile: PathBuf::from("/opt/spae/workflow/Snakefile"),
            configfile: PathBuf::from("out1/spae.config.yaml"),
            threads: 4,
            profile: None,
            use_conda: true,
            conda_prefix: PathBuf::from("/opt/spae/workflow/conda"),
            snake_default: vec!["--rerun-incomplete".to_string(), "--nolock".to_string()],
            snake_args: vec![],
        }
    }

    #[test]
    fn given_no_profile_when_building_then_jobs_present() {
        let argv = invocation().command_line().unwrap();
        let jobs = argv.iter().position(|a| a == "--jobs").unwrap();
        assert_eq!(argv[jobs + 1], "4");
    }

    #[test]
    fn given_profile_when_building_then_jobs_absent() {
        let mut inv = invocation();
        inv.profile = Some("slurm".to_string());
        let argv = inv.command_line().unwrap();
        assert!(!argv.contains(&"--jobs".to_string()));
        let profile = argv.iter().position(|a| a == "--profile").unwrap();
        assert_eq!(argv[profile + 1], "slurm");
    }

    #[test]
    fn given_profile_in_passthrough_when_building_then_jobs_absent() {
        let mut inv = invocation();
        inv.snake_args = vec!["--profile".to_string(), "slurm".to_string()];
        let argv = inv.command_line().unwrap();
        assert!(!argv.contains(&"--jobs".to_string()));
    }

    #[test]
    fn given_multi_token_default_when_building_then_shell_split() {
        let mut inv = invocation();
        inv.snake_default = vec!["-k --nolock".to_string()];
        let argv = inv.command_line().unwrap();
        assert!(argv.contains(&"-k".to_string()));
        assert!(argv.contains(&"--nolock".to_string()));
        assert!(!argv.contains(&"-k --nolock".to_string()));
    }

    #[test]
    fn given_passthrough_when_building_then_appended_last() {
        let mut inv = invocation();
        inv.profile = Some("slurm".to_string());
        inv.snake_args = vec!["--dry-run".to_string(), "--touch".to_string()];
        let argv = inv.command_line().unwrap();
        assert_eq!(argv[argv.len() - 2..], ["--dry-run", "--touch"]);
        // Defaults and profile all precede the passthrough block.
        let dry = argv.iter().position(|a| a == "--dry-run").unwrap();
        let nolock = argv.iter().position(|a| a == "--nolock").unwrap();
        let profile = argv.iter().position(|a| a == "--profile").unwrap();
        assert!(nolock < dry);
        assert!(profile < dry);
    }

    #[test]
    fn given_conda_disabled_when_building_then_no_conda_flags() {
        let mut inv = invocation();
        inv.use_conda = false;
        let argv = inv.command_line().unwrap();
        assert!(!argv.contains(&"--use-conda".to_string()));
        assert!(!argv.contains(&"--conda-prefix".to_string()));
    }

    #[test]
    fn given_invocation_when_rendering_then_starts_with_engine() {
        let rendered = invocation().render().unwrap();
        assert!(rendered.starts_with("snakemake -s "));
    }
}

#![cfg(unix)]
//! Engine invocation through the CommandRunner seam

use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::Mutex;

use spae::engine::{execute, CommandRunner, Invocation, ENGINE};
use spae::errors::SpaeError;

/// Records the invocation and reports a fixed exit code.
struct RecordingRunner {
    calls: Mutex<Vec<(String, Vec<String>)>>,
    exit: i32,
}

impl RecordingRunner {
    fn with_exit(exit: i32) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            exit,
        }
    }

    fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn status(&self, program: &str, args: &[String]) -> io::Result<ExitStatus> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));
        // Wait-status encoding: exit code lives in bits 8..16.
        Ok(ExitStatus::from_raw(self.exit << 8))
    }
}

/// Simulates the engine missing from PATH.
struct MissingEngineRunner;

impl CommandRunner for MissingEngineRunner {
    fn status(&self, _program: &str, _args: &[String]) -> io::Result<ExitStatus> {
        Err(io::Error::from(io::ErrorKind::NotFound))
    }
}

fn invocation() -> Invocation {
    Invocation {
        snakefile: PathBuf::from("/opt/spae/workflow/Snakefile"),
        configfile: PathBuf::from("out1/spae.config.yaml"),
        threads: 4,
        profile: None,
        use_conda: true,
        conda_prefix: PathBuf::from("/opt/spae/workflow/conda"),
        snake_default: vec![
            "--rerun-incomplete".to_string(),
            "--printshellcmds".to_string(),
            "--nolock".to_string(),
            "--show-failed-logs".to_string(),
        ],
        snake_args: vec![],
    }
}

#[test]
fn given_successful_engine_when_executing_then_ok() {
    let runner = RecordingRunner::with_exit(0);

    execute(&invocation(), &runner).unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, ENGINE);
    assert_eq!(calls[0].1[..2], ["-s", "/opt/spae/workflow/Snakefile"]);
}

#[test]
fn given_failing_engine_when_executing_then_exit_code_relayed_unchanged() {
    let runner = RecordingRunner::with_exit(7);

    let err = execute(&invocation(), &runner).unwrap_err();

    assert!(matches!(err, SpaeError::EngineExit(7)));
}

#[test]
fn given_missing_engine_when_executing_then_spawn_error() {
    let err = execute(&invocation(), &MissingEngineRunner).unwrap_err();

    assert!(matches!(err, SpaeError::Spawn { .. }));
}

#[test]
fn given_passthrough_args_when_executing_then_they_are_last() {
    let runner = RecordingRunner::with_exit(0);
    let mut inv = invocation();
    inv.snake_args = vec!["--dry-run".to_string()];

    execute(&inv, &runner).unwrap();

    let argv = runner.calls().remove(0).1;
    assert_eq!(argv.last().unwrap(), "--dry-run");
    // The baseline default flags all precede the passthrough block, so the
    // engine's own parsing gives the passthrough final say.
    let last_default = argv
        .iter()
        .position(|a| a == "--show-failed-logs")
        .unwrap();
    assert!(last_default < argv.len() - 1);
}

#[test]
fn given_threads_and_no_profile_when_executing_then_jobs_flag_present() {
    let runner = RecordingRunner::with_exit(0);

    execute(&invocation(), &runner).unwrap();

    let argv = runner.calls().remove(0).1;
    let jobs = argv.iter().position(|a| a == "--jobs").unwrap();
    assert_eq!(argv[jobs + 1], "4");
}

#[test]
fn given_profile_when_executing_then_profile_forwarded_and_jobs_suppressed() {
    let runner = RecordingRunner::with_exit(0);
    let mut inv = invocation();
    inv.profile = Some("slurm".to_string());

    execute(&inv, &runner).unwrap();

    let argv = runner.calls().remove(0).1;
    assert!(!argv.contains(&"--jobs".to_string()));
    let profile = argv.iter().position(|a| a == "--profile").unwrap();
    assert_eq!(argv[profile + 1], "slurm");
}

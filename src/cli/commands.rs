//! Command handlers

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::assets::Assets;
use crate::cli::args::{Cli, Commands, CommonOpts, ConfigArgs, InstallArgs, Preprocess, RunArgs};
use crate::cli::output;
use crate::config::{self, SeedOutcome};
use crate::engine::{self, Invocation, SystemRunner};
use crate::errors::{SpaeError, SpaeResult};
use crate::resolve::ResolvedPaths;
use crate::util::path::{expand_opt, expand_user_path};

/// Merge payload for `run`: the full flag-derived key set.
#[derive(Debug, Serialize)]
struct RunPayload {
    input: Option<PathBuf>,
    output: PathBuf,
    host: Option<String>,
    db_dir: Option<PathBuf>,
    temp_dir: Option<PathBuf>,
    sequencing: Preprocess,
    contigs: Option<PathBuf>,
    hq_contigs: Option<PathBuf>,
    profile: Option<String>,
    log: PathBuf,
}

/// Merge payload for `install`: only what the install workflow reads.
#[derive(Debug, Serialize)]
struct InstallPayload {
    output: PathBuf,
    db_dir: Option<PathBuf>,
    profile: Option<String>,
    log: PathBuf,
}

pub fn execute_command(cli: Cli) -> SpaeResult<()> {
    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Install(args) => install(args),
        Commands::Config(args) => copy_template(args),
        Commands::Citation => citation(),
        Commands::Completion { shell } => completion(shell),
    }
}

#[instrument(skip(args))]
fn run(args: RunArgs) -> SpaeResult<()> {
    let assets = Assets::locate()?;
    let common = args.common.expanded();
    let paths = ResolvedPaths::resolve(
        &common.output,
        common.configfile.as_deref(),
        common.log.as_deref(),
    );

    let payload = RunPayload {
        input: expand_opt(args.input.as_deref()),
        output: paths.output.clone(),
        host: args.host,
        db_dir: common.db_dir.clone(),
        temp_dir: common.temp_dir.clone(),
        sequencing: args.preprocess,
        contigs: expand_opt(args.contigs.as_deref()),
        hq_contigs: expand_opt(args.hq_contigs.as_deref()),
        profile: common.profile.clone(),
        log: paths.log.clone(),
    };

    launch(&assets, assets.snakefile(), &common, &paths, &payload)
}

#[instrument(skip(args))]
fn install(args: InstallArgs) -> SpaeResult<()> {
    let assets = Assets::locate()?;
    let common = args.common.expanded();
    let paths = ResolvedPaths::resolve(
        &common.output,
        common.configfile.as_deref(),
        common.log.as_deref(),
    );

    let payload = InstallPayload {
        output: paths.output.clone(),
        db_dir: common.db_dir.clone(),
        profile: common.profile.clone(),
        log: paths.log.clone(),
    };

    launch(&assets, assets.install_snakefile(), &common, &paths, &payload)
}

/// Shared tail of `run` and `install`: resolve the layered config, persist
/// it, and hand the pipeline to the engine.
fn launch<T: Serialize>(
    assets: &Assets,
    snakefile: PathBuf,
    common: &CommonOpts,
    paths: &ResolvedPaths,
    payload: &T,
) -> SpaeResult<()> {
    let payload = config::payload_mapping(payload)?;
    let (outcome, resolved) = config::resolve(&assets.system_config(), &paths.configfile, &payload)?;

    match outcome {
        SeedOutcome::Copied => output::action(
            "Config",
            &format!(
                "copied system default config to {}",
                paths.configfile.display()
            ),
        ),
        SeedOutcome::Reused => output::action(
            "Config",
            &format!("reusing existing config file {}", paths.configfile.display()),
        ),
    }
    output::header("Runtime config:");
    output::info(&resolved.to_yaml()?);

    let invocation = Invocation {
        snakefile,
        configfile: paths.configfile.clone(),
        threads: common.threads,
        profile: common.profile.clone(),
        use_conda: common.conda_enabled(),
        conda_prefix: common
            .conda_prefix
            .clone()
            .unwrap_or_else(|| assets.default_conda_prefix()),
        snake_default: common.snake_default.clone(),
        snake_args: common.snake_args.clone(),
    };

    let rendered = invocation.render()?;
    output::action("Running", &rendered);
    output::append_log(&paths.log, &format!("Running snakemake command:\n{rendered}"))
        .map_err(|e| SpaeError::io(format!("write {}", paths.log.display()), e))?;
    engine::execute(&invocation, &SystemRunner)
}

#[instrument(skip(args))]
fn copy_template(args: ConfigArgs) -> SpaeResult<()> {
    let assets = Assets::locate()?;
    let dest = expand_user_path(&args.configfile);
    match config::copy_config(&assets.system_config(), &dest)? {
        SeedOutcome::Copied => {
            output::success(&format!("copied config template to {}", dest.display()));
        }
        SeedOutcome::Reused => {
            output::warning(&format!(
                "config file {} already exists, keeping it",
                dest.display()
            ));
        }
    }
    Ok(())
}

fn citation() -> SpaeResult<()> {
    let assets = Assets::locate()?;
    let text = assets.citation()?;
    for line in text.lines() {
        output::info(line);
    }
    Ok(())
}

fn completion(shell: Shell) -> SpaeResult<()> {
    debug!("generating completions for {shell:?}");
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

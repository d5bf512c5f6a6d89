//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::resolve::DEFAULT_OUTPUT;
use crate::util::path::{expand_opt, expand_user_path};

const RUN_HELP_EXTRA: &str = "\
CLUSTER EXECUTION:
  spae run ... --profile [profile]
For information on Snakemake profiles see:
https://snakemake.readthedocs.io/en/stable/executing/cli.html#profiles

RUN EXAMPLES:
  Required:           spae run --input [file]
  Specify threads:    spae run ... --threads [threads]
  Disable conda:      spae run ... --no-use-conda
  Change defaults:    spae run ... --snake-default=\"-k --nolock\"
  Add Snakemake args: spae run ... -- --dry-run --keep-going --touch
  Specify targets:    spae run ... -- all print_targets

AVAILABLE TARGETS:
  qc        Trim reads
  assemble  Assemble samples (+qc)
  annotate  Annotate genomes
  coverage  Get coverage stats
  all       Run everything (default)";

const INSTALL_HELP_EXTRA: &str = "\
INSTALLING REQUIRED DATABASES:
  spae install --db-dir [directory]

This command downloads the databases the pipeline rules depend on.";

/// Assembling pure culture phages from both Illumina and Nanopore sequencing technology
#[derive(Parser, Debug)]
#[command(name = "spae")]
#[command(author, about)]
#[command(version = &*crate::assets::bundled_version().leak(), disable_version_flag = true)]
#[command(subcommand_required = true, arg_required_else_help = true)]
#[command(long_about = "Assembling pure culture phages from both Illumina and Nanopore \
sequencing technology.\n\nFor more options, run:\nspae command --help")]
pub struct Cli {
    /// Print version
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version,
          value_parser = clap::value_parser!(bool))]
    pub version: Option<bool>,

    /// Increase log verbosity (-d, -dd, -ddd)
    #[arg(short = 'd', long = "debug", action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Commands in display order: primary pipeline commands first, auxiliary
/// commands after.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the assembly pipeline
    Run(RunArgs),

    /// Install the required databases
    Install(InstallArgs),

    /// Copy the system default config file
    Config(ConfigArgs),

    /// Print the citation(s) for this tool
    Citation,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Sequencing method for preprocessing.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Preprocess {
    Paired,
    Longread,
}

/// Common command line args shared by `run` and `install`.
#[derive(Args, Debug, Clone)]
pub struct CommonOpts {
    /// Output directory
    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Custom config file [default: (output)/spae.config.yaml]
    #[arg(long, value_name = "PATH")]
    pub configfile: Option<PathBuf>,

    /// Number of threads to use
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub threads: u32,

    /// Snakemake profile for cluster execution
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Custom database directory
    #[arg(long, value_name = "DIR")]
    pub db_dir: Option<PathBuf>,

    /// Temp directory
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Use conda for Snakemake rules [default: on]
    #[arg(long, overrides_with = "no_use_conda")]
    pub use_conda: bool,

    /// Do not use conda for Snakemake rules
    #[arg(long, overrides_with = "use_conda")]
    pub no_use_conda: bool,

    /// Custom conda env directory [default: bundled workflow/conda]
    #[arg(long, value_name = "DIR")]
    pub conda_prefix: Option<PathBuf>,

    /// Customise Snakemake runtime args
    #[arg(long, value_name = "FLAG", allow_hyphen_values = true,
          default_values_t = [
              "--rerun-incomplete".to_string(),
              "--printshellcmds".to_string(),
              "--nolock".to_string(),
              "--show-failed-logs".to_string(),
          ])]
    pub snake_default: Vec<String>,

    /// Log file [default: (output)/spae.log]
    #[arg(long, value_name = "PATH", hide = true)]
    pub log: Option<PathBuf>,

    /// Additional args forwarded verbatim to Snakemake (after `--`)
    #[arg(last = true, value_name = "SNAKE_ARGS")]
    pub snake_args: Vec<String>,
}

impl CommonOpts {
    /// Effective conda toggle; on unless `--no-use-conda` won.
    pub fn conda_enabled(&self) -> bool {
        !self.no_use_conda
    }

    /// Expand `~` and env vars in every user-supplied path.
    pub fn expanded(mut self) -> Self {
        self.output = expand_user_path(&self.output);
        self.configfile = expand_opt(self.configfile.as_deref());
        self.db_dir = expand_opt(self.db_dir.as_deref());
        self.temp_dir = expand_opt(self.temp_dir.as_deref());
        self.conda_prefix = expand_opt(self.conda_prefix.as_deref());
        self.log = expand_opt(self.log.as_deref());
        self
    }
}

/// Run spae
#[derive(Args, Debug)]
#[command(after_help = RUN_HELP_EXTRA)]
pub struct RunArgs {
    /// Input samples TSV or directory of reads
    #[arg(long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Host genome for filtering
    #[arg(long, value_name = "GENOME")]
    pub host: Option<String>,

    /// Sequencing method
    #[arg(long, value_enum, default_value_t = Preprocess::Paired)]
    pub preprocess: Preprocess,

    /// Directory of assembled phage contigs
    #[arg(long, value_name = "DIR")]
    pub contigs: Option<PathBuf>,

    /// Directory of high-quality contigs
    #[arg(long, value_name = "DIR")]
    pub hq_contigs: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonOpts,
}

/// Install the databases required by the pipeline
#[derive(Args, Debug)]
#[command(after_help = INSTALL_HELP_EXTRA)]
pub struct InstallArgs {
    #[command(flatten)]
    pub common: CommonOpts,
}

/// Copy the system default config file
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Copy template config to file
    #[arg(long, value_name = "PATH", default_value = "config.yaml")]
    pub configfile: PathBuf,
}

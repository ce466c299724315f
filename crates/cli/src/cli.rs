// Command-line flags (all optional; every flag also reads an env var)

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "trainpush")]
#[command(about = "Run one training job, then publish its weights to the hub", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Job definition file handed to the toolkit
    #[arg(long, env = "TRAINPUSH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Job name override
    #[arg(long, env = "TRAINPUSH_JOB_NAME")]
    pub job_name: Option<String>,

    /// Weights file produced by the job
    #[arg(long, env = "TRAINPUSH_ARTIFACT")]
    pub artifact: Option<PathBuf>,

    /// Destination path inside the repository
    #[arg(long, env = "TRAINPUSH_PATH_IN_REPO")]
    pub path_in_repo: Option<String>,

    /// Toolkit checkout (working directory of the job)
    #[arg(long, env = "TRAINPUSH_TOOLKIT_DIR")]
    pub toolkit_dir: Option<PathBuf>,

    /// Interpreter used to start the toolkit
    #[arg(long, env = "TRAINPUSH_PYTHON")]
    pub python: Option<String>,

    /// Settings file (toml/yaml/json); `./trainpush.*` is picked up when present
    #[arg(long, env = "TRAINPUSH_SETTINGS")]
    pub settings: Option<PathBuf>,
}

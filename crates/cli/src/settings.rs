//! Pipeline configuration layering
//!
//! Built-in defaults -> settings file -> command-line / env overrides.

use crate::cli::Cli;
use config::{Config, ConfigError, File};
use std::path::{Path, PathBuf};
use trainpush_core::domain::PipelineConfig;

/// Optional settings file looked up in the working directory
pub const DEFAULT_SETTINGS_STEM: &str = "trainpush";

/// Extensions tried for the implicit settings file, in order
pub const SETTINGS_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

fn path_string(path: &Option<PathBuf>) -> Option<String> {
    path.as_ref().map(|p| p.display().to_string())
}

/// First `trainpush.<ext>` in `dir`
///
/// Only names with a known extension are considered; a bare `trainpush`
/// (the binary itself) never matches.
pub fn find_default_settings(dir: &Path) -> Option<PathBuf> {
    SETTINGS_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", DEFAULT_SETTINGS_STEM, ext)))
        .find(|path| path.is_file())
}

/// Settings file that applies to this invocation, if any
pub fn settings_path(cli: &Cli, dir: &Path) -> Option<PathBuf> {
    cli.settings.clone().or_else(|| find_default_settings(dir))
}

/// Resolve the effective configuration from the working directory
///
/// An explicit `--settings` file must exist; the implicit `./trainpush.*` one is optional.
pub fn load(cli: &Cli) -> Result<PipelineConfig, ConfigError> {
    load_in(cli, Path::new("."))
}

fn load_in(cli: &Cli, dir: &Path) -> Result<PipelineConfig, ConfigError> {
    let mut builder = Config::builder().add_source(Config::try_from(&PipelineConfig::default())?);

    if let Some(path) = settings_path(cli, dir) {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder
        .set_override_option("job.config_path", path_string(&cli.config))?
        .set_override_option("job.name", cli.job_name.clone())?
        .set_override_option("artifact.local_path", path_string(&cli.artifact))?
        .set_override_option("artifact.path_in_repo", cli.path_in_repo.clone())?
        .set_override_option("toolkit.root", path_string(&cli.toolkit_dir))?
        .set_override_option("toolkit.python", cli.python.clone())?
        .build()?
        .try_deserialize()
}

/// Settings file that `load` reads, for logging and error messages
pub fn describe_source(cli: &Cli) -> String {
    match settings_path(cli, Path::new(".")) {
        Some(path) => path.display().to_string(),
        None => "built-in defaults".to_string(),
    }
}

// Subprocess job launcher
// reason: tokio::process for the child, nix for graceful termination
use async_trait::async_trait;
use std::collections::HashMap;
use std::ffi::OsString;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{info, warn};

use trainpush_core::domain::{JobSpec, StageEnv, ToolkitSettings};
use trainpush_core::port::{ExecutionError, JobLauncher, JobOutcome, TimeProvider, TrainingJob};

/// Launches the toolkit's entrypoint as `<python> <entrypoint> <config> [--name <name>]`
pub struct SubprocessJobLauncher {
    toolkit: ToolkitSettings,
    time_provider: Arc<dyn TimeProvider>,
}

impl SubprocessJobLauncher {
    /// Create a new launcher
    ///
    /// # Example
    /// ```ignore
    /// let launcher = SubprocessJobLauncher::new(
    ///     ToolkitSettings::default(),
    ///     Arc::new(SystemTimeProvider),
    /// );
    /// ```
    pub fn new(toolkit: ToolkitSettings, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            toolkit,
            time_provider,
        }
    }

    /// Keep only allowlisted inherited variables (no allowlist keeps everything)
    fn filter_env<I>(&self, inherited: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        match &self.toolkit.env_allowlist {
            None => inherited.into_iter().collect(),
            Some(allowlist) => inherited
                .into_iter()
                .filter(|(k, _)| allowlist.contains(k))
                .collect(),
        }
    }

    fn build_args(&self, spec: &JobSpec) -> Vec<OsString> {
        let mut args = vec![
            OsString::from(&self.toolkit.entrypoint),
            spec.config_path.clone().into_os_string(),
        ];
        if let Some(name) = &spec.name {
            args.push(OsString::from("--name"));
            args.push(OsString::from(name));
        }
        args
    }

    fn build_command(&self, spec: &JobSpec, env: &StageEnv) -> Command {
        let mut command = Command::new(&self.toolkit.python);
        command
            .args(self.build_args(spec))
            .current_dir(&self.toolkit.root)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        if self.toolkit.env_allowlist.is_some() {
            command.env_clear().envs(self.filter_env(std::env::vars()));
        }

        // Stage variables always win over inherited ones
        command.envs(env.iter());
        command
    }
}

#[async_trait]
impl JobLauncher for SubprocessJobLauncher {
    async fn launch(
        &self,
        spec: &JobSpec,
        env: &StageEnv,
    ) -> Result<Box<dyn TrainingJob>, ExecutionError> {
        let config_exists = tokio::fs::try_exists(&spec.config_path)
            .await
            .unwrap_or(false);
        if !config_exists {
            return Err(ExecutionError::ConfigNotFound(
                spec.config_path.display().to_string(),
            ));
        }

        let child = self
            .build_command(spec, env)
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed(format!("{}: {}", self.toolkit.python, e)))?;

        info!(
            pid = ?child.id(),
            program = %self.toolkit.python,
            entrypoint = %self.toolkit.entrypoint,
            working_dir = %self.toolkit.root.display(),
            "Training job started"
        );

        Ok(Box::new(SubprocessJob {
            child: Some(child),
            started_at: self.time_provider.now_millis(),
            time_provider: Arc::clone(&self.time_provider),
            grace_period: Duration::from_millis(
                trainpush_core::application::constants::GRACEFUL_SHUTDOWN_TIMEOUT_MS as u64,
            ),
        }))
    }
}

/// Running toolkit process
///
/// Released by `cleanup`; `kill_on_drop` covers paths that never reach it.
pub struct SubprocessJob {
    child: Option<Child>,
    started_at: i64,
    time_provider: Arc<dyn TimeProvider>,
    grace_period: Duration,
}

/// SIGTERM first, then SIGKILL after the grace period
async fn terminate(child: &mut Child, grace_period: Duration) -> Result<(), ExecutionError> {
    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = child.id() {
            info!(pid = %pid, "Sending SIGTERM to training job");
            match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                Ok(()) => {
                    if let Ok(waited) = tokio::time::timeout(grace_period, child.wait()).await {
                        waited.map_err(|e| ExecutionError::IoError(e.to_string()))?;
                        info!(pid = %pid, "Training job exited after SIGTERM");
                        return Ok(());
                    }
                    warn!(pid = %pid, "Training job did not exit after SIGTERM, sending SIGKILL");
                }
                Err(e) => warn!(pid = %pid, error = %e, "SIGTERM failed, sending SIGKILL"),
            }
        }
    }

    #[cfg(not(unix))]
    let _ = grace_period;

    child
        .kill()
        .await
        .map_err(|e| ExecutionError::Killed(e.to_string()))
}

fn exit_error(status: ExitStatus) -> ExecutionError {
    if let Some(code) = status.code() {
        return ExecutionError::Failed(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return ExecutionError::Killed(format!("terminated by signal {}", signal));
        }
    }

    ExecutionError::Killed(status.to_string())
}

#[async_trait]
impl TrainingJob for SubprocessJob {
    async fn run(&mut self) -> Result<JobOutcome, ExecutionError> {
        let child = self
            .child
            .as_mut()
            .ok_or_else(|| ExecutionError::IoError("job already released".to_string()))?;

        let status = child
            .wait()
            .await
            .map_err(|e| ExecutionError::IoError(e.to_string()))?;
        let duration_ms = self.time_provider.now_millis() - self.started_at;

        info!(
            duration_ms = %duration_ms,
            exit_code = ?status.code(),
            "Training process exited"
        );

        if status.success() {
            Ok(JobOutcome {
                exit_code: status.code(),
                duration_ms,
            })
        } else {
            Err(exit_error(status))
        }
    }

    async fn cleanup(&mut self) -> Result<(), ExecutionError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        match child.try_wait() {
            Ok(Some(_)) => Ok(()),
            Ok(None) => terminate(&mut child, self.grace_period).await,
            Err(e) => Err(ExecutionError::IoError(e.to_string())),
        }
    }
}

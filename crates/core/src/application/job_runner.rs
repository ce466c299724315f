// Job Runner - construct -> run -> release

use crate::domain::{JobSpec, StageEnv};
use crate::port::{ExecutionError, JobLauncher, JobOutcome, TrainingJob};
use std::sync::Arc;
use tracing::{info, warn};

pub struct JobRunner {
    launcher: Arc<dyn JobLauncher>,
}

impl JobRunner {
    pub fn new(launcher: Arc<dyn JobLauncher>) -> Self {
        Self { launcher }
    }

    /// Construct the job described by `spec` and run it to completion
    ///
    /// No retry: the job either completes or the error is returned.
    pub async fn run(&self, spec: &JobSpec, env: &StageEnv) -> Result<JobOutcome, ExecutionError> {
        info!(
            config_path = %spec.config_path.display(),
            name = ?spec.name,
            "Constructing training job"
        );

        let job = self.launcher.launch(spec, env).await?;
        run_scoped(job).await
    }
}

/// Run a job and release it on every exit path
///
/// A run failure wins over a cleanup failure; the cleanup failure is logged.
pub async fn run_scoped(mut job: Box<dyn TrainingJob>) -> Result<JobOutcome, ExecutionError> {
    let run_result = job.run().await;
    let cleanup_result = job.cleanup().await;

    match (run_result, cleanup_result) {
        (Ok(outcome), Ok(())) => Ok(outcome),
        (Ok(_), Err(cleanup_err)) => Err(cleanup_err),
        (Err(run_err), Ok(())) => Err(run_err),
        (Err(run_err), Err(cleanup_err)) => {
            warn!(error = %cleanup_err, "Job cleanup failed after run failure");
            Err(run_err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::job_launcher::mocks::MockJobLauncher;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_success_releases_once() {
        let launcher = Arc::new(MockJobLauncher::new_success());
        let runner = JobRunner::new(launcher.clone());

        let outcome = runner
            .run(&JobSpec::default(), &StageEnv::new())
            .await
            .unwrap();

        assert_eq!(outcome.exit_code, Some(0));
        assert_eq!(launcher.run_count(), 1);
        assert_eq!(launcher.cleanup_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_run_still_releases() {
        let launcher = Arc::new(MockJobLauncher::new_failing_run(2));
        let runner = JobRunner::new(launcher.clone());

        let result = runner.run(&JobSpec::default(), &StageEnv::new()).await;

        assert!(matches!(result, Err(ExecutionError::Failed(2))));
        assert_eq!(launcher.cleanup_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_launch_never_runs() {
        let launcher = Arc::new(MockJobLauncher::new_failing_launch("no toolkit"));
        let runner = JobRunner::new(launcher.clone());

        let result = runner.run(&JobSpec::default(), &StageEnv::new()).await;

        assert!(matches!(result, Err(ExecutionError::SpawnFailed(_))));
        assert_eq!(launcher.run_count(), 0);
        assert_eq!(launcher.cleanup_count(), 0);
    }

    struct LeakyJob {
        fail_run: bool,
        cleanups: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TrainingJob for LeakyJob {
        async fn run(&mut self) -> Result<JobOutcome, ExecutionError> {
            if self.fail_run {
                Err(ExecutionError::Failed(1))
            } else {
                Ok(JobOutcome {
                    exit_code: Some(0),
                    duration_ms: 1,
                })
            }
        }

        async fn cleanup(&mut self) -> Result<(), ExecutionError> {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
            Err(ExecutionError::Killed("stuck".to_string()))
        }
    }

    #[tokio::test]
    async fn test_cleanup_failure_after_success_is_reported() {
        let cleanups = Arc::new(AtomicUsize::new(0));
        let job = Box::new(LeakyJob {
            fail_run: false,
            cleanups: cleanups.clone(),
        });

        let result = run_scoped(job).await;

        assert!(matches!(result, Err(ExecutionError::Killed(_))));
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_failure_wins_over_cleanup_failure() {
        let cleanups = Arc::new(AtomicUsize::new(0));
        let job = Box::new(LeakyJob {
            fail_run: true,
            cleanups: cleanups.clone(),
        });

        let result = run_scoped(job).await;

        assert!(matches!(result, Err(ExecutionError::Failed(1))));
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    }
}

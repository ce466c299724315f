// Job Launcher Port
// Abstraction over the external training toolkit (construct -> run -> cleanup)

use crate::domain::{JobSpec, StageEnv};
use async_trait::async_trait;
use thiserror::Error;

/// Result of a completed training run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub exit_code: Option<i32>,
    pub duration_ms: i64,
}

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Job definition not found: {0}")]
    ConfigNotFound(String),

    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Job exited with status {0}")]
    Failed(i32),

    #[error("Process killed: {0}")]
    Killed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Constructs jobs from a job definition
///
/// Implementations:
/// - SubprocessJobLauncher: spawns the toolkit's launcher script
#[async_trait]
pub trait JobLauncher: Send + Sync {
    /// Construct (and start) a job
    ///
    /// # Errors
    /// - ExecutionError::ConfigNotFound if the job definition is missing
    /// - ExecutionError::SpawnFailed if the toolkit cannot be started
    async fn launch(
        &self,
        spec: &JobSpec,
        env: &StageEnv,
    ) -> Result<Box<dyn TrainingJob>, ExecutionError>;
}

/// Handle to one constructed job
#[async_trait]
pub trait TrainingJob: Send {
    /// Wait for the job to finish
    async fn run(&mut self) -> Result<JobOutcome, ExecutionError>;

    /// Release everything the job holds. Must be safe to call after a failed run.
    async fn cleanup(&mut self) -> Result<(), ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock launcher behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Launch and run succeed
        Success,
        /// Launch fails with message
        FailLaunch(String),
        /// Run exits with the given status
        FailRun(i32),
    }

    /// Calls observed across the launcher and the jobs it produced
    #[derive(Debug, Default)]
    pub struct MockCalls {
        pub launches: usize,
        pub runs: usize,
        pub cleanups: usize,
        pub last_spec: Option<JobSpec>,
        pub last_env: Option<StageEnv>,
    }

    /// Mock Job Launcher for testing
    pub struct MockJobLauncher {
        behavior: MockBehavior,
        calls: Arc<Mutex<MockCalls>>,
    }

    impl MockJobLauncher {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                calls: Arc::new(Mutex::new(MockCalls::default())),
            }
        }
        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }
        pub fn new_failing_launch(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::FailLaunch(message.into()))
        }
        pub fn new_failing_run(exit_code: i32) -> Self {
            Self::new(MockBehavior::FailRun(exit_code))
        }
        pub fn launch_count(&self) -> usize {
            self.calls.lock().unwrap().launches
        }
        pub fn run_count(&self) -> usize {
            self.calls.lock().unwrap().runs
        }
        pub fn cleanup_count(&self) -> usize {
            self.calls.lock().unwrap().cleanups
        }
        pub fn last_env(&self) -> Option<StageEnv> {
            self.calls.lock().unwrap().last_env.clone()
        }
        pub fn last_spec(&self) -> Option<JobSpec> {
            self.calls.lock().unwrap().last_spec.clone()
        }
    }

    #[async_trait]
    impl JobLauncher for MockJobLauncher {
        async fn launch(
            &self,
            spec: &JobSpec,
            env: &StageEnv,
        ) -> Result<Box<dyn TrainingJob>, ExecutionError> {
            {
                let mut calls = self.calls.lock().unwrap();
                calls.launches += 1;
                calls.last_spec = Some(spec.clone());
                calls.last_env = Some(env.clone());
            }

            let exit_code = match &self.behavior {
                MockBehavior::Success => None,
                MockBehavior::FailLaunch(msg) => {
                    return Err(ExecutionError::SpawnFailed(msg.clone()))
                }
                MockBehavior::FailRun(code) => Some(*code),
            };

            Ok(Box::new(MockTrainingJob {
                exit_code,
                calls: Arc::clone(&self.calls),
            }))
        }
    }

    struct MockTrainingJob {
        exit_code: Option<i32>,
        calls: Arc<Mutex<MockCalls>>,
    }

    #[async_trait]
    impl TrainingJob for MockTrainingJob {
        async fn run(&mut self) -> Result<JobOutcome, ExecutionError> {
            self.calls.lock().unwrap().runs += 1;
            match self.exit_code {
                None => Ok(JobOutcome {
                    exit_code: Some(0),
                    duration_ms: 100,
                }),
                Some(code) => Err(ExecutionError::Failed(code)),
            }
        }

        async fn cleanup(&mut self) -> Result<(), ExecutionError> {
            self.calls.lock().unwrap().cleanups += 1;
            Ok(())
        }
    }
}

// Pipeline - train -> publish orchestration
// Init -> Training -> Publishing -> Done, any failure -> Failed(stage)

use super::credentials::CredentialSwitcher;
use super::job_runner::JobRunner;
use super::report::RunReport;
use crate::domain::credential::{FIRST_TOKEN_VAR, REPO_ID_VAR, SECOND_TOKEN_VAR};
use crate::domain::{DomainError, PipelineConfig, RunCounters, Secrets, Stage};
use crate::error::{PipelineError, Result};
use crate::port::{
    ArtifactPublisher, ArtifactUpload, IdProvider, JobOutcome, PublishReceipt, TimeProvider,
};
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};

pub struct Pipeline {
    config: PipelineConfig,
    switcher: CredentialSwitcher,
    runner: JobRunner,
    publisher: Arc<dyn ArtifactPublisher>,
    time_provider: Arc<dyn TimeProvider>,
    id_provider: Arc<dyn IdProvider>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        switcher: CredentialSwitcher,
        runner: JobRunner,
        publisher: Arc<dyn ArtifactPublisher>,
        time_provider: Arc<dyn TimeProvider>,
        id_provider: Arc<dyn IdProvider>,
    ) -> Self {
        Self {
            config,
            switcher,
            runner,
            publisher,
            time_provider,
            id_provider,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run both stages once and report
    ///
    /// Never panics on stage failure: the failure is recorded in the returned
    /// report so the caller can print the summary before exiting.
    pub async fn execute(&self, secrets: &Secrets) -> RunReport {
        let run_id = self.id_provider.generate_id();
        let span = info_span!("run", run_id = %run_id);

        async move {
            let mut counters = RunCounters::default();
            let mut training = None;

            let result = self
                .run_stages(secrets, &mut counters, &mut training)
                .await;

            match &result {
                Ok(receipt) => {
                    info!(stage = %Stage::Done, repo_url = %receipt.repo_url, "Pipeline finished");
                }
                Err(e) => {
                    counters.record_failed();
                    error!(stage = %e.stage, error = %e, "Error running job");
                }
            }

            RunReport {
                run_id,
                counters,
                training,
                result,
            }
        }
        .instrument(span)
        .await
    }

    async fn run_stages(
        &self,
        secrets: &Secrets,
        counters: &mut RunCounters,
        training: &mut Option<JobOutcome>,
    ) -> std::result::Result<PublishReceipt, PipelineError> {
        let outcome = self
            .train(secrets)
            .await
            .map_err(|e| PipelineError::new(Stage::Training, e))?;

        // Counted once the job has run and been released; a later publishing
        // failure does not erase it.
        counters.record_completed();
        *training = Some(outcome);

        self.publish(secrets)
            .await
            .map_err(|e| PipelineError::new(Stage::Publishing, e))
    }

    async fn train(&self, secrets: &Secrets) -> Result<JobOutcome> {
        let token = secrets
            .first_token
            .clone()
            .ok_or_else(|| DomainError::MissingCredential(FIRST_TOKEN_VAR.to_string()))?;
        let ctx = self.switcher.install(Stage::Training, token)?;

        info!(
            stage = %Stage::Training,
            config_path = %self.config.job.config_path.display(),
            "Running job"
        );

        let outcome = self.runner.run(&self.config.job, &ctx.env).await?;

        info!(
            duration_ms = outcome.duration_ms,
            exit_code = ?outcome.exit_code,
            "Training job completed"
        );

        Ok(outcome)
    }

    async fn publish(&self, secrets: &Secrets) -> Result<PublishReceipt> {
        let token = secrets
            .second_token
            .clone()
            .ok_or_else(|| DomainError::MissingCredential(SECOND_TOKEN_VAR.to_string()))?;
        let ctx = self.switcher.install(Stage::Publishing, token)?;

        let repo_id = secrets
            .repo_id
            .clone()
            .ok_or_else(|| DomainError::MissingSetting(REPO_ID_VAR.to_string()))?;

        let artifact = &self.config.artifact;
        let upload = ArtifactUpload {
            local_path: artifact.local_path.clone(),
            path_in_repo: artifact.path_in_repo.clone(),
            repo_id,
        };

        info!(
            stage = %Stage::Publishing,
            local_path = %upload.local_path.display(),
            repo_id = %upload.repo_id,
            "Uploading artifact"
        );

        let start_time = self.time_provider.now_millis();
        let receipt = self.publisher.publish(&upload, &ctx.token).await?;
        let duration_ms = self.time_provider.now_millis() - start_time;

        info!(
            duration_ms = duration_ms,
            repo_url = %receipt.repo_url,
            commit_oid = ?receipt.commit_oid,
            "Artifact published"
        );

        Ok(receipt)
    }
}

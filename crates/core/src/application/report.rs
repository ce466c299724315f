// Run Reporter - summary block + run outcome

use super::constants::SUMMARY_BORDER_WIDTH;
use crate::domain::{RunCounters, Stage};
use crate::error::PipelineError;
use crate::port::{JobOutcome, PublishReceipt};

/// Outcome of one pipeline invocation
#[derive(Debug)]
pub struct RunReport {
    pub run_id: String,
    pub counters: RunCounters,
    /// Set once the training job ran and was released
    pub training: Option<JobOutcome>,
    pub result: Result<PublishReceipt, PipelineError>,
}

impl RunReport {
    /// Report for a run that failed before the training stage began
    pub fn aborted(run_id: String, error: PipelineError) -> Self {
        let mut counters = RunCounters::default();
        counters.record_failed();

        Self {
            run_id,
            counters,
            training: None,
            result: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Stage the run failed in, if any
    pub fn failed_stage(&self) -> Option<Stage> {
        self.result.as_ref().err().map(|e| e.stage)
    }

    pub fn summary(&self) -> String {
        format_summary(&self.counters)
    }

    pub fn into_result(self) -> Result<PublishReceipt, PipelineError> {
        self.result
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Bordered result block
///
/// ```text
///
/// ========================================
/// Result:
///  - 1 completed job
/// ========================================
/// ```
///
/// Lines for zero counts are omitted.
pub fn format_summary(counters: &RunCounters) -> String {
    let border = "=".repeat(SUMMARY_BORDER_WIDTH);
    let mut lines = vec![String::new(), border.clone(), "Result:".to_string()];

    if counters.completed > 0 {
        lines.push(format!(
            " - {} completed job{}",
            counters.completed,
            plural(counters.completed)
        ));
    }
    if counters.failed > 0 {
        lines.push(format!(
            " - {} failure{}",
            counters.failed,
            plural(counters.failed)
        ));
    }

    lines.push(border);
    let mut block = lines.join("\n");
    block.push('\n');
    block
}

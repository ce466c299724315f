// Run Domain Model (stages + counters for one invocation)

use serde::{Deserialize, Serialize};

/// Pipeline stage
///
/// `Init -> Training -> Publishing -> Done`; failures are recorded against the
/// stage that was active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Init,
    Training,
    Publishing,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Init => write!(f, "init"),
            Stage::Training => write!(f, "training"),
            Stage::Publishing => write!(f, "publishing"),
            Stage::Done => write!(f, "done"),
        }
    }
}

/// Completed / failed job counters for one invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    pub completed: u32,
    pub failed: u32,
}

impl RunCounters {
    pub fn new(completed: u32, failed: u32) -> Self {
        Self { completed, failed }
    }

    pub fn record_completed(&mut self) {
        self.completed += 1;
    }

    pub fn record_failed(&mut self) {
        self.failed += 1;
    }
}

// Application Layer - Use Cases

pub mod constants;
pub mod credentials;
pub mod job_runner;
pub mod pipeline;
pub mod report;

// Re-exports
pub use credentials::CredentialSwitcher;
pub use job_runner::{run_scoped, JobRunner};
pub use pipeline::Pipeline;
pub use report::{format_summary, RunReport};

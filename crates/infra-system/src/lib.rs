// Trainpush Infrastructure - System Adapters
// Implements: JobLauncher, CredentialStore, environment bootstrap

pub mod bootstrap;
pub mod file_credential_store;
pub mod subprocess_launcher;

pub use bootstrap::{read_secrets, Bootstrap, EnvironmentBootstrapper};
pub use file_credential_store::FileCredentialStore;
pub use subprocess_launcher::SubprocessJobLauncher;

// Pipeline constants (no magic values)

/// Width of the `=` border around the run summary
pub const SUMMARY_BORDER_WIDTH: usize = 40;

/// Grace period between SIGTERM and SIGKILL when releasing a running job (5 seconds)
pub const GRACEFUL_SHUTDOWN_TIMEOUT_MS: i64 = 5000;

/// Telemetry opt-out handed to every stage
pub const DISABLE_TELEMETRY_VAR: &str = "DISABLE_TELEMETRY";
pub const DISABLE_TELEMETRY_VALUE: &str = "YES";

/// Toolkit debug switch; `"1"` turns on anomaly detection in the toolkit's numerical runtime
pub const DEBUG_TOOLKIT_VAR: &str = "DEBUG_TOOLKIT";
pub const DEBUG_TOOLKIT_ENABLED: &str = "1";

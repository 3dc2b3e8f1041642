//! Telemetry module
//!
//! Logging and pipeline metrics

mod logging;
mod metrics;

pub use logging::init_logging;
pub use self::metrics::{record_duration, record_rows, Stage};

use crate::config::TelemetryConfig;

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    init_logging(&config.log_level, config.log_format)?;
    Ok(())
}

//! Layered monitor configuration
//!
//! Defaults, then an optional config file, then `DROWSY__`-prefixed
//! environment variables (`DROWSY__GOVERNOR__MAX_SPEED=120`).

use std::path::Path;

use alerting::AlertConfig;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use dms::DmsConfig;
use landmark_source::CaptureConfig;
use serde::{Deserialize, Serialize};
use speed_governor::{EtaConfig, GovernorConfig};
use tracing::info;

use crate::MonitorError;

const ENV_PREFIX: &str = "DROWSY";

/// Complete monitor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub dms: DmsConfig,
    pub governor: GovernorConfig,
    pub eta: EtaConfig,
    pub alerts: AlertConfig,
    pub capture: CaptureConfig,
}

impl MonitorConfig {
    /// Load from an optional file plus the environment, then validate
    pub fn load(path: Option<&Path>) -> Result<Self, MonitorError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path));
        }
        Self::build(builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        ))
    }

    /// Load from an in-memory TOML document, ignoring the environment
    pub fn from_toml_str(toml: &str) -> Result<Self, MonitorError> {
        Self::build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn build(
        builder: ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, MonitorError> {
        let config: MonitorConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Fail fast on values the core formulas cannot run with
    pub fn validate(&self) -> Result<(), MonitorError> {
        self.dms.validate()?;
        self.governor.validate()?;
        self.eta.validate()?;
        if self.capture.fps == 0 {
            return Err(MonitorError::InvalidConfig("capture fps must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speed_governor::GovernorError;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = MonitorConfig::from_toml_str("").unwrap();
        assert_eq!(config.governor.max_speed, 100.0);
        assert_eq!(config.dms.critical_threshold, 25.0);
        assert_eq!(config.eta.base_offset_minutes, 150);
        assert!(config.alerts.alarm_enabled);
    }

    #[test]
    fn test_partial_override() {
        let config = MonitorConfig::from_toml_str(
            r#"
            [governor]
            max_speed = 120
            tick_period_ms = 200

            [dms]
            hysteresis_margin = 2.5
            "#,
        )
        .unwrap();

        assert_eq!(config.governor.max_speed, 120.0);
        assert_eq!(config.governor.tick_period_ms, 200);
        assert_eq!(config.governor.smoothing_factor, 0.05);
        assert_eq!(config.dms.hysteresis_margin, 2.5);
    }

    #[test]
    fn test_zero_max_speed_fails_fast() {
        let err = MonitorConfig::from_toml_str("[governor]\nmax_speed = 0").unwrap_err();
        assert!(matches!(
            err,
            MonitorError::Governor(GovernorError::InvalidMaxSpeed(_))
        ));
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            MonitorConfig::from_toml_str("[governor\nmax_speed = "),
            Err(MonitorError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = MonitorConfig::load(Some(Path::new("/nonexistent/drowsy.toml")));
        assert!(matches!(result, Err(MonitorError::Config(_))));
    }
}

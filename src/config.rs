//! Runtime configuration.
//!
//! Every section defaults to the standard business constants; a JSON file may
//! override any subset of them.

use crate::domain::loyalty::LoyaltyRules;
use crate::domain::shipment::CostSchedule;
use crate::error::{Result, RuleError};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub loyalty: LoyaltyRules,
    pub shipment: CostSchedule,
    pub telemetry: TelemetryConfig,
}

/// Tracing controls.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads the file at `path` if given, otherwise the defaults, then validates.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Self::from_json(&raw)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| RuleError::Config(format!("invalid config: {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        self.loyalty.validate()?;
        self.shipment.validate()
    }
}

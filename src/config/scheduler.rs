//! Scheduler configuration structures.

use serde::{Deserialize, Serialize};

/// Pool totals for a scheduler instance.
///
/// Totals are fixed at construction; the pool is never resized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Total CPU thread units available to CPU phases.
    pub cpu_total: u32,
    /// Total GPU memory units available to GPU phases.
    pub gpu_total: u32,
}

impl SchedulerConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.cpu_total == 0 {
            return Err("cpu_total must be greater than 0".into());
        }
        if self.gpu_total == 0 {
            return Err("gpu_total must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse a configuration from a JSON string and validate it.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation failure description.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_config_passes() {
        let cfg = SchedulerConfig {
            cpu_total: 8,
            gpu_total: 4096,
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_totals_are_rejected() {
        let cfg = SchedulerConfig {
            cpu_total: 0,
            gpu_total: 4096,
        };
        assert!(cfg.validate().is_err());

        let cfg = SchedulerConfig {
            cpu_total: 8,
            gpu_total: 0,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn parses_from_json() {
        let cfg =
            SchedulerConfig::from_json_str(r#"{"cpu_total": 4, "gpu_total": 2048}"#).unwrap();
        assert_eq!(cfg.cpu_total, 4);
        assert_eq!(cfg.gpu_total, 2048);
    }

    #[test]
    fn invalid_json_reports_parse_error() {
        let err = SchedulerConfig::from_json_str("{not json").unwrap_err();
        assert!(err.contains("parse error"));
    }

    #[test]
    fn json_with_zero_total_fails_validation() {
        assert!(SchedulerConfig::from_json_str(r#"{"cpu_total": 0, "gpu_total": 1}"#).is_err());
    }
}

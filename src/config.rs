//! Simulation configuration.
//!
//! Every policy knob of the engine lives here so runs are reproducible and
//! testable under varied policies: nothing in the scheduler, oracle or
//! simulator reads a hard-coded constant. Configuration can be built in
//! code, via [`Default`], or loaded from a TOML file.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::ModifiedJulianDate;

/// Per-site cap on new commitments within one scheduling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaMode {
    /// No cap; bounded only by candidate and space availability.
    Unlimited,
    /// At most N new slots per site per scheduling cycle.
    PerInterval(u32),
}

impl QuotaMode {
    /// Slots still available given `committed` new slots this cycle.
    pub fn allows(&self, committed: u32) -> bool {
        match self {
            QuotaMode::Unlimited => true,
            QuotaMode::PerInterval(n) => committed < *n,
        }
    }
}

impl FromStr for QuotaMode {
    type Err = Error;

    /// Parse `unlimited` or `<N>-per-interval`.
    fn from_str(s: &str) -> Result<Self> {
        if s == "unlimited" {
            return Ok(QuotaMode::Unlimited);
        }
        if let Some(count) = s.strip_suffix("-per-interval") {
            let n: u32 = count
                .parse()
                .map_err(|_| Error::Config(format!("invalid quota mode: {s:?}")))?;
            return Ok(QuotaMode::PerInterval(n));
        }
        Err(Error::Config(format!("invalid quota mode: {s:?}")))
    }
}

impl std::fmt::Display for QuotaMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuotaMode::Unlimited => write!(f, "unlimited"),
            QuotaMode::PerInterval(n) => write!(f, "{n}-per-interval"),
        }
    }
}

impl Serialize for QuotaMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QuotaMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// All tunable parameters of a campaign run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Accuracy threshold in minutes. Targets whose propagated error stays
    /// below it count as constrained and are skipped by the forecaster.
    pub accuracy_threshold_min: i64,
    /// Per-site observation-rate policy.
    pub quota: QuotaMode,
    /// Mission milestone date timing uncertainties are propagated to.
    pub milestone: ModifiedJulianDate,
    /// Length of one scheduling cycle in days.
    pub scheduling_interval_days: f64,
    /// How often the forecaster re-runs, in days.
    pub forecast_interval_days: f64,
    /// Minimum target altitude for visibility, in degrees.
    pub min_target_altitude_deg: f64,
    /// Sun altitude below which it counts as night, in degrees.
    pub sun_altitude_threshold_deg: f64,
    /// Calibration padding reserved before ingress and after egress, in
    /// minutes.
    pub continuum_margin_min: f64,
    /// Minimum transit depth for a target to be worth observing.
    pub depth_threshold: f64,
    /// Probability that a scheduled observation succeeds.
    pub success_probability: f64,
    /// 1-sigma scatter of a simulated measured center, in minutes.
    pub center_jitter_min: f64,
    /// Mean of the reported measurement error draw, in minutes.
    pub reported_error_mean_min: f64,
    /// 1-sigma spread of the reported measurement error draw, in minutes.
    pub reported_error_sigma_min: f64,
    /// Seed for the simulator RNG; random when absent.
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            accuracy_threshold_min: 10,
            quota: QuotaMode::Unlimited,
            // 2029-06-12 00:00 UTC
            milestone: ModifiedJulianDate::new(62483.0),
            scheduling_interval_days: 7.0,
            forecast_interval_days: 28.0,
            min_target_altitude_deg: 20.0,
            sun_altitude_threshold_deg: -12.0,
            continuum_margin_min: 45.0,
            depth_threshold: 10.0,
            success_probability: 0.6,
            center_jitter_min: 0.5,
            reported_error_mean_min: 0.5,
            reported_error_sigma_min: 0.01,
            rng_seed: None,
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SimulationConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.scheduling_interval_days <= 0.0 {
            return Err(Error::Config(
                "scheduling_interval_days must be positive".into(),
            ));
        }
        if self.forecast_interval_days <= 0.0 {
            return Err(Error::Config(
                "forecast_interval_days must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.success_probability) {
            return Err(Error::Config(
                "success_probability must be within [0, 1]".into(),
            ));
        }
        Ok(())
    }

    /// Continuum margin in days.
    pub fn continuum_margin_days(&self) -> f64 {
        self.continuum_margin_min / (24.0 * 60.0)
    }

    /// Accuracy threshold in minutes as a float.
    pub fn accuracy_threshold(&self) -> f64 {
        self.accuracy_threshold_min as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quota_modes() {
        assert_eq!(QuotaMode::from_str("unlimited").unwrap(), QuotaMode::Unlimited);
        assert_eq!(
            QuotaMode::from_str("3-per-interval").unwrap(),
            QuotaMode::PerInterval(3)
        );
        assert!(QuotaMode::from_str("sometimes").is_err());
        assert!(QuotaMode::from_str("-per-interval").is_err());
        assert!(QuotaMode::from_str("three-per-interval").is_err());
    }

    #[test]
    fn test_quota_allows() {
        assert!(QuotaMode::Unlimited.allows(u32::MAX - 1));
        assert!(QuotaMode::PerInterval(2).allows(1));
        assert!(!QuotaMode::PerInterval(2).allows(2));
        assert!(!QuotaMode::PerInterval(0).allows(0));
    }

    #[test]
    fn test_parse_config_toml() {
        let toml = r#"
accuracy_threshold_min = 5
quota = "2-per-interval"
scheduling_interval_days = 7.0
forecast_interval_days = 28.0
rng_seed = 42
"#;
        let config: SimulationConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.accuracy_threshold_min, 5);
        assert_eq!(config.quota, QuotaMode::PerInterval(2));
        assert_eq!(config.rng_seed, Some(42));
        // Unspecified fields fall back to defaults.
        assert_eq!(config.continuum_margin_min, 45.0);
        assert_eq!(config.min_target_altitude_deg, 20.0);
    }

    #[test]
    fn test_bad_quota_mode_is_fatal() {
        let toml = r#"quota = "5-per-week""#;
        let parsed: std::result::Result<SimulationConfig, _> = toml::from_str(toml);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_probability() {
        let config = SimulationConfig {
            success_probability: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "accuracy_threshold_min = 8\nquota = \"unlimited\"").unwrap();
        let config = SimulationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.accuracy_threshold_min, 8);
        assert_eq!(config.quota, QuotaMode::Unlimited);
    }
}

//! Target and observation records.
//!
//! A [`Target`] carries its sky position, transit geometry, the current
//! fitted ephemeris and the forecast metrics derived from it. Observations
//! are owned by their target and are append-only; the only writers after
//! bootstrap are the period fitter, the error propagator and the
//! observation simulator.

use serde::{Deserialize, Serialize};

use super::time::ModifiedJulianDate;

/// Current linear ephemeris of a target.
///
/// `period` is always positive: when a fit is infeasible the previously
/// stored values (initially the catalog starting period) are retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ephemeris {
    /// Orbital period in days.
    pub period: f64,
    /// 1-sigma period uncertainty in days, if known.
    pub period_err: Option<f64>,
    /// Latest usable measured transit center.
    pub last_center: ModifiedJulianDate,
    /// 1-sigma uncertainty of the latest center in days, if known.
    pub last_center_err: Option<f64>,
    /// Epoch number of the latest center.
    pub last_epoch: i64,
}

/// Ground-truth ephemeris used only by the observation simulator.
///
/// Kept separate from the fitted ephemeris so the simulation can project
/// "true" transit centers independently of what the fit currently believes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrueEphemeris {
    pub period: f64,
    pub last_center: ModifiedJulianDate,
    pub last_epoch: i64,
}

/// Forecast metrics derived from the current ephemeris.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastMetrics {
    /// Propagated timing uncertainty at the mission milestone, in days.
    /// `None` until a propagation has succeeded for this target.
    pub err_at_milestone: Option<f64>,
    /// Propagated uncertainty as a percentage of the transit duration.
    pub percent_loss: Option<f64>,
    /// True once the uncertainty consumes the whole transit duration.
    pub lost: bool,
}

/// A follow-up target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    /// Right ascension in degrees.
    pub ra_deg: f64,
    /// Declination in degrees.
    pub dec_deg: f64,
    /// Transit duration in minutes.
    pub duration_min: f64,
    /// Transit depth in millimagnitudes; used only as a "worth observing"
    /// filter.
    pub depth: f64,
    /// Catalog starting period in days, the fallback when fits fail.
    pub period_start: f64,
    /// Uncertainty of the starting period in days.
    pub period_start_err: f64,
    pub ephemeris: Ephemeris,
    pub true_ephemeris: Option<TrueEphemeris>,
    pub metrics: ForecastMetrics,
    /// Metrics at bootstrap, kept for end-of-run comparison.
    pub initial_metrics: Option<ForecastMetrics>,
    pub n_observations: u32,
}

impl Target {
    /// Create a target with its ephemeris initialized from catalog values.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        ra_deg: f64,
        dec_deg: f64,
        duration_min: f64,
        depth: f64,
        period_start: f64,
        period_start_err: f64,
        last_center: ModifiedJulianDate,
        last_epoch: i64,
    ) -> Self {
        Self {
            name: name.into(),
            ra_deg,
            dec_deg,
            duration_min,
            depth,
            period_start,
            period_start_err,
            ephemeris: Ephemeris {
                period: period_start,
                period_err: Some(period_start_err),
                last_center,
                last_center_err: None,
                last_epoch,
            },
            true_ephemeris: None,
            metrics: ForecastMetrics::default(),
            initial_metrics: None,
            n_observations: 0,
        }
    }
}

/// A single timing measurement of a target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Store-assigned identifier; simulator-injected rows start at 10000.
    pub id: i64,
    /// Integer count of elapsed orbital cycles since the reference transit.
    pub epoch: i64,
    /// Measured transit center.
    pub center: ModifiedJulianDate,
    /// 1-sigma measurement uncertainty in days.
    pub center_err: f64,
    /// Where the measurement came from (catalog name or site name).
    pub source: String,
    /// Ground-truth center, populated only for simulated observations of
    /// targets with a true ephemeris.
    pub true_center: Option<ModifiedJulianDate>,
}

/// An observation about to be appended; the store assigns the identifier.
#[derive(Debug, Clone)]
pub struct NewObservation {
    pub epoch: i64,
    pub center: ModifiedJulianDate,
    pub center_err: f64,
    pub source: String,
    pub true_center: Option<ModifiedJulianDate>,
}

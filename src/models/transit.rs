//! Candidate transit windows and committed schedule slots.

use serde::{Deserialize, Serialize};

use super::time::ModifiedJulianDate;

/// A forecast transit event, either a fresh candidate or one screened for
/// site visibility.
///
/// Sky position, duration and forecast metrics are copied from the target at
/// generation time so the window can be scheduled without a target lookup.
/// Ingress and egress are derived, which keeps the
/// `ingress = center - duration/2`, `egress = center + duration/2` invariant
/// true by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitWindow {
    pub target: String,
    pub center: ModifiedJulianDate,
    /// Transit duration in minutes.
    pub duration_min: f64,
    pub ra_deg: f64,
    pub dec_deg: f64,
    /// Percent-of-duration loss at generation time.
    pub loss: Option<f64>,
    /// Propagated timing error at generation time, in days.
    pub error_days: Option<f64>,
    pub epoch: i64,
    /// Sites confirmed visible; empty until the site screen has run.
    #[serde(default)]
    pub sites: Vec<String>,
}

impl TransitWindow {
    /// Transit duration in days.
    pub fn duration_days(&self) -> f64 {
        self.duration_min / (24.0 * 60.0)
    }

    /// Start of the transit event.
    pub fn ingress(&self) -> ModifiedJulianDate {
        self.center - self.duration_days() / 2.0
    }

    /// End of the transit event.
    pub fn egress(&self) -> ModifiedJulianDate {
        self.center + self.duration_days() / 2.0
    }
}

/// A committed observation slot on one site's schedule.
///
/// `start` and `end` include the continuum margin reserved either side of
/// the transit itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledSlot {
    pub target: String,
    pub ra_deg: f64,
    pub dec_deg: f64,
    /// Transit center being observed.
    pub center: ModifiedJulianDate,
    /// Reserved run start (ingress minus continuum margin).
    pub start: ModifiedJulianDate,
    /// Reserved run end (egress plus continuum margin).
    pub end: ModifiedJulianDate,
    pub epoch: i64,
}

impl ScheduledSlot {
    /// Reserved run length in days.
    pub fn run_days(&self) -> f64 {
        self.end - self.start
    }
}

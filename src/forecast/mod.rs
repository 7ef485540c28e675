//! Candidate transit forecasting.
//!
//! Projects a target's current ephemeris forward and yields the transit
//! windows that fall strictly inside a requested interval and pass the
//! general visibility screen. The projection is lazy: windows are produced
//! one at a time, so long horizons cost nothing until consumed.

use crate::config::SimulationConfig;
use crate::models::{ModifiedJulianDate, Target, TransitWindow};
use crate::visibility::VisibilityOracle;

/// Projects ephemerides into candidate transit windows.
#[derive(Debug, Clone, Copy)]
pub struct TransitForecaster {
    oracle: VisibilityOracle,
}

impl TransitForecaster {
    pub fn new(oracle: VisibilityOracle) -> Self {
        Self { oracle }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(VisibilityOracle::from_config(config))
    }

    /// Lazy series of visible candidate windows for `target` with centers
    /// strictly inside `(start, end)`.
    ///
    /// The walk starts at the ephemeris' latest measured center, so epochs
    /// stay anchored to the same reference transit as the fit. Windows carry
    /// the target's current forecast metrics; the scheduler reads them as the
    /// scheduling priority.
    pub fn series(
        &self,
        target: &Target,
        start: ModifiedJulianDate,
        end: ModifiedJulianDate,
    ) -> TransitSeries {
        TransitSeries {
            oracle: self.oracle,
            target: target.name.clone(),
            ra_deg: target.ra_deg,
            dec_deg: target.dec_deg,
            duration_min: target.duration_min,
            loss: target.metrics.percent_loss,
            error_days: target.metrics.err_at_milestone,
            period: target.ephemeris.period,
            current: target.ephemeris.last_center,
            epoch: target.ephemeris.last_epoch,
            start,
            end,
        }
    }
}

/// Iterator over a single target's visible candidate windows.
pub struct TransitSeries {
    oracle: VisibilityOracle,
    target: String,
    ra_deg: f64,
    dec_deg: f64,
    duration_min: f64,
    loss: Option<f64>,
    error_days: Option<f64>,
    period: f64,
    current: ModifiedJulianDate,
    epoch: i64,
    start: ModifiedJulianDate,
    end: ModifiedJulianDate,
}

impl Iterator for TransitSeries {
    type Item = TransitWindow;

    fn next(&mut self) -> Option<TransitWindow> {
        // A non-positive period would loop forever.
        if !self.period.is_finite() || self.period <= 0.0 {
            return None;
        }
        while self.current < self.end {
            let center = self.current;
            let epoch = self.epoch;
            self.current = self.current + self.period;
            self.epoch += 1;

            if center <= self.start {
                continue;
            }
            let window = TransitWindow {
                target: self.target.clone(),
                center,
                duration_min: self.duration_min,
                ra_deg: self.ra_deg,
                dec_deg: self.dec_deg,
                loss: self.loss,
                error_days: self.error_days,
                epoch,
                sites: Vec::new(),
            };
            if self.oracle.visible_anywhere(&window) {
                return Some(window);
            }
        }
        None
    }
}

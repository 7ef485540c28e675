//! Forward propagation of timing uncertainty to the mission milestone.

use crate::error::{Error, Result};
use crate::models::{ForecastMetrics, ModifiedJulianDate};

/// Propagated uncertainty and the loss metric derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Propagation {
    /// Total timing error at the milestone, in days; `None` when the inputs
    /// carried no usable errors and the sentinel loss applies.
    pub error_days: Option<f64>,
    /// Error as a percentage of the transit duration.
    pub percent_loss: f64,
    /// True once the error consumes the full duration.
    pub lost: bool,
}

/// Sentinel loss recorded when center or period errors are unknown.
const UNKNOWN_LOSS_PERCENT: f64 = 1000.0;

impl Propagation {
    fn from_error(error_days: f64, duration_min: f64) -> Self {
        let percent = error_days * 24.0 * 60.0 / duration_min * 100.0;
        Self {
            error_days: Some(error_days),
            percent_loss: percent,
            lost: percent >= 100.0,
        }
    }
}

impl From<Propagation> for ForecastMetrics {
    fn from(p: Propagation) -> Self {
        ForecastMetrics {
            err_at_milestone: p.error_days,
            percent_loss: Some(p.percent_loss),
            lost: p.lost,
        }
    }
}

/// Project timing uncertainty from the latest observation to `milestone`.
///
/// Steps forward in whole periods until the milestone is reached, counting
/// `n` elapsed cycles, then combines the independent errors as
/// `sqrt(center_err^2 + n^2 * period_err^2)`. When the latest center is
/// already at or past the milestone there are no cycles left to cover and
/// the center error is used as-is. Missing errors short-circuit to a
/// sentinel loss of 1000% rather than propagating undefined values.
///
/// A pure function of its inputs; malformed (non-finite, non-positive
/// period or duration) values fail with [`Error::Propagation`], which
/// callers treat as "no update this cycle".
pub fn propagate(
    period: f64,
    period_err: Option<f64>,
    last_center: ModifiedJulianDate,
    last_center_err: Option<f64>,
    duration_min: f64,
    milestone: ModifiedJulianDate,
) -> Result<Propagation> {
    if !period.is_finite() || period <= 0.0 {
        return Err(Error::Propagation(format!("invalid period: {period}")));
    }
    if !duration_min.is_finite() || duration_min <= 0.0 {
        return Err(Error::Propagation(format!(
            "invalid duration: {duration_min} min"
        )));
    }
    if !last_center.value().is_finite() || !milestone.value().is_finite() {
        return Err(Error::Propagation("non-finite time input".into()));
    }

    let (period_err, center_err) = match (period_err, last_center_err) {
        (Some(pe), Some(ce)) => (pe, ce),
        _ => {
            return Ok(Propagation {
                error_days: None,
                percent_loss: UNKNOWN_LOSS_PERCENT,
                lost: true,
            })
        }
    };
    if !period_err.is_finite() || !center_err.is_finite() {
        return Err(Error::Propagation("non-finite error input".into()));
    }

    if last_center >= milestone {
        return Ok(Propagation::from_error(center_err, duration_min));
    }

    // Smallest n with last_center + n * period >= milestone.
    let cycles = ((milestone - last_center) / period).ceil();
    let error_days = (center_err * center_err + cycles * cycles * period_err * period_err).sqrt();
    Ok(Propagation::from_error(error_days, duration_min))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_cycle_scenario() {
        // period = 1 d, period_err = 0.001 d, center_err = 0.002 d,
        // duration = 120 min, milestone exactly 10 periods ahead.
        let last = ModifiedJulianDate::new(60000.0);
        let p = propagate(
            1.0,
            Some(0.001),
            last,
            Some(0.002),
            120.0,
            last + 10.0,
        )
        .unwrap();
        let expected = (0.002f64.powi(2) + 100.0 * 0.001f64.powi(2)).sqrt();
        assert!((p.error_days.unwrap() - expected).abs() < 1e-12);
        assert!((p.percent_loss - expected * 24.0 * 60.0 / 120.0 * 100.0).abs() < 1e-9);
        assert!(!p.lost);
    }

    #[test]
    fn test_idempotent() {
        let last = ModifiedJulianDate::new(59000.25);
        let milestone = ModifiedJulianDate::new(62483.0);
        let a = propagate(3.52, Some(2e-5), last, Some(8e-4), 160.0, milestone).unwrap();
        let b = propagate(3.52, Some(2e-5), last, Some(8e-4), 160.0, milestone).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_milestone_already_reached() {
        let last = ModifiedJulianDate::new(62500.0);
        let p = propagate(
            2.0,
            Some(0.001),
            last,
            Some(0.004),
            120.0,
            ModifiedJulianDate::new(62483.0),
        )
        .unwrap();
        // No cycles to cover: the center error passes through unchanged.
        assert_eq!(p.error_days, Some(0.004));
        assert!(!p.lost);
    }

    #[test]
    fn test_missing_errors_short_circuit() {
        let last = ModifiedJulianDate::new(60000.0);
        let p = propagate(1.0, None, last, Some(0.002), 120.0, last + 100.0).unwrap();
        assert_eq!(p.error_days, None);
        assert_eq!(p.percent_loss, 1000.0);
        assert!(p.lost);

        let p = propagate(1.0, Some(0.001), last, None, 120.0, last + 100.0).unwrap();
        assert!(p.lost);
    }

    #[test]
    fn test_lost_target() {
        // Large period error over many cycles exceeds the duration.
        let last = ModifiedJulianDate::new(60000.0);
        let p = propagate(1.0, Some(0.01), last, Some(0.002), 60.0, last + 1000.0).unwrap();
        assert!(p.percent_loss >= 100.0);
        assert!(p.lost);
    }

    #[test]
    fn test_malformed_inputs_fail() {
        let last = ModifiedJulianDate::new(60000.0);
        let milestone = last + 10.0;
        assert!(matches!(
            propagate(f64::NAN, Some(0.001), last, Some(0.002), 120.0, milestone),
            Err(Error::Propagation(_))
        ));
        assert!(matches!(
            propagate(0.0, Some(0.001), last, Some(0.002), 120.0, milestone),
            Err(Error::Propagation(_))
        ));
        assert!(matches!(
            propagate(1.0, Some(0.001), last, Some(0.002), 0.0, milestone),
            Err(Error::Propagation(_))
        ));
        assert!(matches!(
            propagate(1.0, Some(f64::INFINITY), last, Some(0.002), 120.0, milestone),
            Err(Error::Propagation(_))
        ));
    }

    #[test]
    fn test_partial_cycle_rounds_up() {
        // 9.5 periods to the milestone still requires 10 whole cycles.
        let last = ModifiedJulianDate::new(60000.0);
        let p = propagate(1.0, Some(0.001), last, Some(0.0), 120.0, last + 9.5).unwrap();
        let expected = (100.0f64 * 0.001f64.powi(2)).sqrt();
        assert!((p.error_days.unwrap() - expected).abs() < 1e-12);
    }
}

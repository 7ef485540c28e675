//! Weighted linear ephemeris fit.
//!
//! Fits transit center against epoch number with a straight line, weighting
//! each observation by the inverse of its timing error. The slope is the
//! current period; its standard error comes from the covariance of the
//! weighted normal equations scaled by the reduced chi-square.

use nalgebra::{Matrix2, Vector2};

use crate::error::{Error, Result};
use crate::models::{ModifiedJulianDate, Observation};

/// Minimum number of usable observations for a fit.
pub const MIN_OBSERVATIONS: usize = 3;

/// Result of a successful period fit.
#[derive(Debug, Clone, Copy)]
pub struct PeriodFit {
    /// Fitted period in days.
    pub period: f64,
    /// Standard error of the period in days.
    pub period_err: f64,
    /// Latest measured center in the sample.
    pub last_center: ModifiedJulianDate,
    /// Timing error of the latest center, in days.
    pub last_center_err: f64,
    /// Highest epoch number in the sample.
    pub last_epoch: i64,
}

fn usable(obs: &Observation) -> bool {
    obs.center.value().is_finite() && obs.center_err.is_finite() && obs.center_err >= 0.0
}

/// Fit a linear ephemeris to a target's observations.
///
/// Observations with undefined or negative errors are excluded up front. A
/// timing error of zero gives that observation zero statistical weight but
/// it still counts toward the sample size and the latest-measurement search.
///
/// Fails with [`Error::InsufficientData`] when fewer than
/// [`MIN_OBSERVATIONS`] usable observations remain, or when the weighted
/// system is degenerate (all weights zero, repeated epochs, non-finite
/// slope). Callers must not distinguish the two causes: either way there is
/// no usable fit and the prior ephemeris stands.
pub fn fit_period(observations: &[Observation]) -> Result<PeriodFit> {
    let sample: Vec<&Observation> = observations.iter().filter(|o| usable(o)).collect();
    if sample.len() < MIN_OBSERVATIONS {
        return Err(Error::InsufficientData(sample.len()));
    }

    let degenerate = || Error::InsufficientData(sample.len());

    // Weighted normal equations for y = a*x + b with weight w = 1/err.
    let mut normal = Matrix2::<f64>::zeros();
    let mut moment = Vector2::<f64>::zeros();
    for obs in &sample {
        let w = if obs.center_err > 0.0 {
            1.0 / obs.center_err
        } else {
            0.0
        };
        let w2 = w * w;
        let x = obs.epoch as f64;
        let y = obs.center.value();
        normal[(0, 0)] += w2 * x * x;
        normal[(0, 1)] += w2 * x;
        normal[(1, 0)] += w2 * x;
        normal[(1, 1)] += w2;
        moment[0] += w2 * x * y;
        moment[1] += w2 * y;
    }

    let inverse = normal.try_inverse().ok_or_else(degenerate)?;
    let coeffs = inverse * moment;
    let (slope, intercept) = (coeffs[0], coeffs[1]);

    let chi2: f64 = sample
        .iter()
        .map(|obs| {
            let w = if obs.center_err > 0.0 {
                1.0 / obs.center_err
            } else {
                0.0
            };
            let residual = obs.center.value() - (slope * obs.epoch as f64 + intercept);
            (w * residual).powi(2)
        })
        .sum();
    let dof = (sample.len() - 2) as f64;
    let period_err = (inverse[(0, 0)] * chi2 / dof).sqrt();

    // A non-positive or non-finite slope is no usable ephemeris.
    if !slope.is_finite() || slope <= 0.0 || !period_err.is_finite() {
        return Err(degenerate());
    }

    let latest = sample
        .iter()
        .max_by(|a, b| a.center.partial_cmp(&b.center).unwrap_or(std::cmp::Ordering::Equal))
        .ok_or_else(degenerate)?;
    let last_epoch = sample.iter().map(|o| o.epoch).max().ok_or_else(degenerate)?;

    Ok(PeriodFit {
        period: slope,
        period_err,
        last_center: latest.center,
        last_center_err: latest.center_err,
        last_epoch,
    })
}

//! Ephemeris estimation: the weighted period fit and forward error
//! propagation that together produce each target's loss metric.

pub mod fitter;
pub mod propagation;

pub use fitter::{fit_period, PeriodFit};
pub use propagation::{propagate, Propagation};

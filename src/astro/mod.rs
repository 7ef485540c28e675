//! Minimal positional astronomy for the visibility predicates.
//!
//! The engine only needs day/night decisions and altitude-threshold
//! crossings, so this module carries a low-precision solar ephemeris and
//! hour-angle geometry rather than a full astrometric stack. Everything
//! works in degrees and Modified Julian Dates.

pub mod rise_set;
pub mod solar;

pub use rise_set::{target_rise_set, RiseSet};
pub use solar::{sun_position, sun_set_rise, SunEvents, SunPosition};

/// Apparent sidereal motion of the hour angle, degrees per day.
pub(crate) const SIDEREAL_RATE_DEG_PER_DAY: f64 = 360.985_647_366_29;

/// Normalize an angle to [0, 360).
pub fn normalize_deg(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// Normalize an angle to [-180, 180).
pub(crate) fn normalize_signed_deg(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Greenwich mean sidereal time in degrees at the given UT instant.
pub fn gmst_deg(mjd: f64) -> f64 {
    normalize_deg(280.460_618_37 + SIDEREAL_RATE_DEG_PER_DAY * (mjd - 51544.5))
}

/// Where a body's diurnal track sits relative to an altitude threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum AltitudeCrossing {
    /// Crosses the threshold at hour angle +/- the contained value, degrees.
    Crosses(f64),
    /// Never reaches the threshold from this latitude.
    NeverAbove,
    /// Stays above the threshold for the whole day.
    AlwaysAbove,
}

/// Hour angle at which a body of declination `dec_deg` crosses altitude
/// `alt_deg`, seen from latitude `lat_deg`.
pub(crate) fn altitude_crossing(alt_deg: f64, lat_deg: f64, dec_deg: f64) -> AltitudeCrossing {
    let (alt, lat, dec) = (
        alt_deg.to_radians(),
        lat_deg.to_radians(),
        dec_deg.to_radians(),
    );
    let cos_h0 = (alt.sin() - lat.sin() * dec.sin()) / (lat.cos() * dec.cos());
    if cos_h0 > 1.0 {
        AltitudeCrossing::NeverAbove
    } else if cos_h0 < -1.0 {
        AltitudeCrossing::AlwaysAbove
    } else {
        AltitudeCrossing::Crosses(cos_h0.acos().to_degrees())
    }
}

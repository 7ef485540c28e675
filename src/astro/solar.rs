//! Low-precision solar ephemeris and night-window computation.
//!
//! Good to a few arcminutes over the mission horizon, which is far tighter
//! than the visibility model needs.

use crate::models::ModifiedJulianDate;

use super::{
    altitude_crossing, gmst_deg, normalize_deg, normalize_signed_deg, AltitudeCrossing,
    SIDEREAL_RATE_DEG_PER_DAY,
};

/// Equatorial position of the Sun.
#[derive(Debug, Clone, Copy)]
pub struct SunPosition {
    pub ra_deg: f64,
    pub dec_deg: f64,
}

/// Apparent Sun position at the given instant.
pub fn sun_position(mjd: f64) -> SunPosition {
    let n = mjd - 51544.5;
    let mean_longitude = normalize_deg(280.460 + 0.985_647_4 * n);
    let mean_anomaly = (357.528 + 0.985_600_3 * n).to_radians();
    let ecliptic_longitude = (mean_longitude
        + 1.915 * mean_anomaly.sin()
        + 0.020 * (2.0 * mean_anomaly).sin())
    .to_radians();
    let obliquity = (23.439 - 0.000_000_4 * n).to_radians();

    let ra = ecliptic_longitude
        .sin()
        .mul_add(obliquity.cos(), 0.0)
        .atan2(ecliptic_longitude.cos())
        .to_degrees();
    let dec = (obliquity.sin() * ecliptic_longitude.sin()).asin().to_degrees();

    SunPosition {
        ra_deg: normalize_deg(ra),
        dec_deg: dec,
    }
}

/// Night window for one calendar day at one coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SunEvents {
    /// The Sun drops below the threshold at `sunset` and returns at
    /// `sunrise` the following morning.
    Sets {
        sunset: ModifiedJulianDate,
        sunrise: ModifiedJulianDate,
    },
    /// The Sun never reaches the threshold: night all day (polar winter).
    AlwaysDown,
    /// The Sun never drops below the threshold: no usable night (polar
    /// summer).
    NeverDown,
}

/// Sunset and sunrise around the local night following `date` (midnight
/// UTC), for the Sun crossing `threshold_alt_deg`.
///
/// Longitude is degrees east, latitude degrees north.
pub fn sun_set_rise(
    date: ModifiedJulianDate,
    longitude_deg: f64,
    latitude_deg: f64,
    threshold_alt_deg: f64,
) -> SunEvents {
    // Local solar transit near local noon, refined by the Sun's hour angle.
    let mut transit = date.value() + 0.5 - longitude_deg / 360.0;
    for _ in 0..2 {
        let sun = sun_position(transit);
        let hour_angle = normalize_signed_deg(gmst_deg(transit) + longitude_deg - sun.ra_deg);
        transit -= hour_angle / SIDEREAL_RATE_DEG_PER_DAY;
    }

    let dec = sun_position(transit).dec_deg;
    match altitude_crossing(threshold_alt_deg, latitude_deg, dec) {
        AltitudeCrossing::NeverAbove => SunEvents::AlwaysDown,
        AltitudeCrossing::AlwaysAbove => SunEvents::NeverDown,
        AltitudeCrossing::Crosses(h0) => {
            // The Sun's hour angle advances one turn per solar day.
            let sunset = transit + h0 / 360.0;
            let sunrise = transit + 1.0 - h0 / 360.0;
            SunEvents::Sets {
                sunset: ModifiedJulianDate::new(sunset),
                sunrise: ModifiedJulianDate::new(sunrise),
            }
        }
    }
}

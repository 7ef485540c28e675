//! Transit visibility predicates.
//!
//! One algorithm serves two questions: "is this transit visible from
//! somewhere on Earth?" (screened against a coarse global grid of
//! coordinates) and "is it visible from this specific site?". A coordinate
//! passes when the Sun stays below the night threshold for the whole
//! ingress-egress interval and the target stays above the minimum altitude
//! for the same interval.
//!
//! Rise/set times are computed for the transit's calendar date. When the
//! computed event lands after the transit center the computation caught the
//! wrong sidereal day, so the check repeats once for the previous calendar
//! day before giving up. Circumpolar targets short-circuit the altitude
//! interval test; never-rising targets fail it outright.

use itertools::iproduct;

use crate::astro::{sun_set_rise, target_rise_set, RiseSet, SunEvents};
use crate::config::SimulationConfig;
use crate::models::{Site, TransitWindow};

/// Latitude bands of the global screening grid, degrees north.
const GRID_LATITUDES: [f64; 3] = [45.0, 0.0, -45.0];

/// Longitude bands of the global screening grid, degrees east.
const GRID_LONGITUDES: [f64; 7] = [0.0, 60.0, 120.0, 150.0, 180.0, 240.0, 300.0];

/// Decides transit observability from coordinates and sites.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityOracle {
    sun_altitude_threshold_deg: f64,
    min_target_altitude_deg: f64,
}

impl VisibilityOracle {
    pub fn new(sun_altitude_threshold_deg: f64, min_target_altitude_deg: f64) -> Self {
        Self {
            sun_altitude_threshold_deg,
            min_target_altitude_deg,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.sun_altitude_threshold_deg,
            config.min_target_altitude_deg,
        )
    }

    /// Whether the transit is visible from at least one point of the global
    /// grid.
    pub fn visible_anywhere(&self, window: &TransitWindow) -> bool {
        iproduct!(GRID_LATITUDES, GRID_LONGITUDES)
            .any(|(lat, lon)| self.visible_from_coordinate(window, lon, lat))
    }

    /// Names of the sites from which the transit passes the full predicate.
    pub fn visible_sites(&self, window: &TransitWindow, sites: &[Site]) -> Vec<String> {
        sites
            .iter()
            .filter(|site| {
                self.visible_from_coordinate(window, site.longitude_deg, site.latitude_deg)
            })
            .map(|site| site.name.clone())
            .collect()
    }

    /// Full predicate for one coordinate: night for the whole event and
    /// target up for the whole event.
    pub fn visible_from_coordinate(
        &self,
        window: &TransitWindow,
        longitude_deg: f64,
        latitude_deg: f64,
    ) -> bool {
        self.is_night(window, longitude_deg, latitude_deg)
            && self.is_target_up(window, longitude_deg, latitude_deg)
    }

    /// Sun below the night threshold from ingress to egress.
    fn is_night(&self, window: &TransitWindow, longitude_deg: f64, latitude_deg: f64) -> bool {
        let date = window.center.floor_day();
        match sun_set_rise(
            date,
            longitude_deg,
            latitude_deg,
            self.sun_altitude_threshold_deg,
        ) {
            SunEvents::AlwaysDown => true,
            SunEvents::NeverDown => false,
            SunEvents::Sets { sunset, sunrise } => {
                if window.ingress() > sunset && window.egress() < sunrise {
                    true
                } else if sunset > window.center {
                    // Wrong day: the night containing the transit started the
                    // evening before.
                    match sun_set_rise(
                        date - 1.0,
                        longitude_deg,
                        latitude_deg,
                        self.sun_altitude_threshold_deg,
                    ) {
                        SunEvents::AlwaysDown => true,
                        SunEvents::NeverDown => false,
                        SunEvents::Sets { sunset, sunrise } => {
                            window.ingress() > sunset && window.egress() < sunrise
                        }
                    }
                } else {
                    false
                }
            }
        }
    }

    /// Target above the minimum altitude from ingress to egress.
    fn is_target_up(&self, window: &TransitWindow, longitude_deg: f64, latitude_deg: f64) -> bool {
        let date = window.center.floor_day();
        match target_rise_set(
            date,
            window.ra_deg,
            window.dec_deg,
            self.min_target_altitude_deg,
            longitude_deg,
            latitude_deg,
        ) {
            RiseSet::AlwaysUp => true,
            RiseSet::NeverUp => false,
            RiseSet::Crosses { rise, set } => {
                if window.ingress() > rise && window.egress() < set {
                    true
                } else if rise > window.center {
                    // Wrong sidereal day: repeat for the previous date.
                    match target_rise_set(
                        date - 1.0,
                        window.ra_deg,
                        window.dec_deg,
                        self.min_target_altitude_deg,
                        longitude_deg,
                        latitude_deg,
                    ) {
                        RiseSet::AlwaysUp => true,
                        RiseSet::NeverUp => false,
                        RiseSet::Crosses { rise, set } => {
                            window.ingress() > rise && window.egress() < set
                        }
                    }
                } else {
                    false
                }
            }
        }
    }
}

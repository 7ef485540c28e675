use serde::{Deserialize, Serialize};

/// A telescope site. Immutable once loaded for a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    /// Geodetic latitude in degrees, north positive.
    pub latitude_deg: f64,
    /// Longitude in degrees, east positive.
    pub longitude_deg: f64,
    /// Altitude above sea level in meters.
    pub altitude_m: f64,
    /// Primary mirror aperture in meters.
    pub aperture_m: f64,
}

impl Site {
    pub fn new(
        name: impl Into<String>,
        latitude_deg: f64,
        longitude_deg: f64,
        altitude_m: f64,
        aperture_m: f64,
    ) -> Self {
        Self {
            name: name.into(),
            latitude_deg,
            longitude_deg,
            altitude_m,
            aperture_m,
        }
    }
}

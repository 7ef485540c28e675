//! Typed records shared across the engine.

pub mod sample;
pub mod site;
pub mod target;
pub mod time;
pub mod transit;

pub use sample::CampaignSample;
pub use site::Site;
pub use target::{Ephemeris, ForecastMetrics, NewObservation, Observation, Target, TrueEphemeris};
pub use time::ModifiedJulianDate;
pub use transit::{ScheduledSlot, TransitWindow};

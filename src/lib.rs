//! # transitsim
//!
//! Transit forecast, visibility and scheduling engine for exoplanet
//! follow-up campaigns.
//!
//! The crate simulates a network of ground-based telescopes keeping the
//! transit ephemerides of a target list accurate until a mission milestone:
//! it fits periods to timing observations, propagates the timing uncertainty
//! forward, forecasts which upcoming transits are observable and from where,
//! allocates observation slots under a per-site quota, and feeds synthetic
//! observation results back into the ephemerides.
//!
//! ## Components
//!
//! - Weighted linear period fitting and milestone error propagation
//! - Day/night and target-altitude visibility, per site or on a global grid
//! - Lazy transit forecasting over a time window
//! - Greedy loss-prioritized, conflict-free, quota-bounded scheduling
//! - Synthetic observation generation with a seedable RNG
//! - A campaign loop tying the pieces together over a multi-year horizon
//!
//! ## Example
//!
//! ```rust,ignore
//! use transitsim::{Campaign, MemoryStore, ModifiedJulianDate, SimulationConfig};
//!
//! let store = MemoryStore::new();
//! let sites = transitsim::io::load_sites_csv("sites.csv")?;
//! let targets = transitsim::io::load_targets_csv("targets.csv")?;
//! let seeds = transitsim::io::load_observations_csv("observations.csv")?;
//! transitsim::io::bootstrap_store(&store, sites, targets, seeds)?;
//!
//! let config = SimulationConfig::from_file("campaign.toml")?;
//! let mut campaign = Campaign::new(&store, config)?;
//! campaign.initialize(ModifiedJulianDate::new(60000.0))?;
//! let samples = campaign.run(None, ModifiedJulianDate::new(62848.0))?;
//! println!("constrained {}/{}", samples[samples.len() - 1].constrained,
//!          samples[samples.len() - 1].total);
//! ```

pub mod astro;
pub mod campaign;
pub mod config;
pub mod ephemeris;
pub mod error;
pub mod forecast;
pub mod io;
pub mod models;
pub mod scheduler;
pub mod simulator;
pub mod store;
pub mod visibility;

pub use campaign::Campaign;
pub use config::{QuotaMode, SimulationConfig};
pub use ephemeris::{fit_period, propagate, PeriodFit, Propagation};
pub use error::{Error, Result};
pub use forecast::TransitForecaster;
pub use models::{
    CampaignSample, Ephemeris, ForecastMetrics, ModifiedJulianDate, NewObservation, Observation,
    ScheduledSlot, Site, Target, TransitWindow, TrueEphemeris,
};
pub use scheduler::Scheduler;
pub use simulator::ObservationSimulator;
pub use store::{MemoryStore, Store};
pub use visibility::VisibilityOracle;

//! Persistence abstraction for campaign state.
//!
//! The engine only needs get/put/range-query semantics over targets,
//! observations, candidate windows and per-site schedules, so the storage
//! backend sits behind a trait and can be swapped. The in-memory
//! implementation in [`memory`] is the default for simulations and tests.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::models::{
    CampaignSample, Ephemeris, ForecastMetrics, ModifiedJulianDate, NewObservation, Observation,
    ScheduledSlot, Site, Target, TransitWindow,
};

/// Storage surface consumed by the engine.
///
/// The campaign loop is single-threaded and single-writer by construction:
/// each scheduling, observation or recalculation step completes before the
/// next one starts, so implementations only need interior mutability, not
/// transactional isolation.
pub trait Store {
    // ---- targets ----

    /// Register a target at bootstrap.
    fn add_target(&self, target: Target) -> Result<()>;

    /// All registered target names.
    fn list_target_names(&self) -> Result<Vec<String>>;

    /// Fetch a target by name.
    fn get_target(&self, name: &str) -> Result<Target>;

    /// Replace a target's current ephemeris.
    fn update_ephemeris(&self, name: &str, ephemeris: Ephemeris) -> Result<()>;

    /// Replace a target's forecast metrics.
    fn update_metrics(&self, name: &str, metrics: ForecastMetrics) -> Result<()>;

    /// Record the bootstrap-time metrics, kept for end-of-run comparison.
    fn set_initial_metrics(&self, name: &str, metrics: ForecastMetrics) -> Result<()>;

    /// Bump the stored observation counter.
    fn increment_observation_count(&self, name: &str) -> Result<()>;

    /// Targets worth forecasting: deep enough, last observed before `as_of`,
    /// and either unconstrained (propagated error above the threshold) or
    /// with no propagated error at all.
    fn list_targets_needing_forecast(
        &self,
        as_of: ModifiedJulianDate,
        depth_threshold: f64,
        loss_threshold_min: f64,
    ) -> Result<Vec<String>>;

    // ---- observations ----

    /// All observations of a target, ordered by epoch.
    fn get_observations(&self, name: &str) -> Result<Vec<Observation>>;

    /// Append an observation, assigning its identifier. Returns `false`
    /// (without storing) when the target already has an observation with the
    /// same measured center, which guards duplicate ingestion.
    fn append_observation(&self, name: &str, observation: NewObservation) -> Result<bool>;

    // ---- candidate transit windows ----

    /// Store forecast candidates, kept ordered by center time.
    fn insert_candidates(&self, windows: Vec<TransitWindow>) -> Result<()>;

    /// Candidates with centers inside [start, end).
    fn candidates_between(
        &self,
        start: ModifiedJulianDate,
        end: ModifiedJulianDate,
    ) -> Result<Vec<TransitWindow>>;

    /// Center time of the earliest stored candidate, if any.
    fn earliest_candidate(&self) -> Result<Option<ModifiedJulianDate>>;

    /// Drop candidates whose center precedes `cutoff`; they can no longer be
    /// scheduled. Returns how many were dropped.
    fn discard_candidates_before(&self, cutoff: ModifiedJulianDate) -> Result<usize>;

    // ---- sites and schedules ----

    /// Register a site for the campaign.
    fn add_site(&self, site: Site) -> Result<()>;

    /// All registered sites.
    fn list_sites(&self) -> Result<Vec<Site>>;

    /// Committed slots for a site, ordered by start time.
    fn site_schedule(&self, site: &str) -> Result<Vec<ScheduledSlot>>;

    /// Commit a slot to a site's schedule. Returns `false` when a slot with
    /// an identical start time already exists (treated as already scheduled,
    /// not an error).
    fn commit_slot(&self, site: &str, slot: ScheduledSlot) -> Result<bool>;

    /// Committed slots whose observed transit center falls inside
    /// [start, end).
    fn slots_between(
        &self,
        site: &str,
        start: ModifiedJulianDate,
        end: ModifiedJulianDate,
    ) -> Result<Vec<ScheduledSlot>>;

    // ---- campaign progress ----

    /// Record one point of the campaign progress curve.
    fn append_sample(&self, sample: CampaignSample) -> Result<()>;

    /// All recorded progress samples, in insertion order.
    fn list_samples(&self) -> Result<Vec<CampaignSample>>;
}

//! In-memory store implementation.
//!
//! All state lives in HashMaps and Vecs behind one `RwLock`, giving fast,
//! deterministic and isolated runs. This is the storage backend used by the
//! simulation itself and by the test suite.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::models::{
    CampaignSample, Ephemeris, ForecastMetrics, ModifiedJulianDate, NewObservation, Observation,
    ScheduledSlot, Site, Target, TransitWindow,
};

use super::Store;

/// First identifier handed out to stored observations. Keeps simulated rows
/// clearly separated from any externally numbered catalog data.
const OBSERVATION_ID_FLOOR: i64 = 10000;

#[derive(Default)]
struct MemoryData {
    targets: HashMap<String, Target>,
    /// Insertion order, so listings are deterministic.
    target_order: Vec<String>,
    observations: HashMap<String, Vec<Observation>>,
    /// Ordered by center time, so range queries and pruning are slices.
    candidates: Vec<TransitWindow>,
    sites: Vec<Site>,
    schedules: HashMap<String, Vec<ScheduledSlot>>,
    samples: Vec<CampaignSample>,
}

/// In-memory [`Store`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<MemoryData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MemoryData> {
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MemoryData> {
        self.data.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn with_target<R>(
    data: &mut MemoryData,
    name: &str,
    f: impl FnOnce(&mut Target) -> R,
) -> Result<R> {
    data.targets
        .get_mut(name)
        .map(f)
        .ok_or_else(|| Error::UnknownTarget(name.to_string()))
}

impl Store for MemoryStore {
    fn add_target(&self, target: Target) -> Result<()> {
        let mut data = self.write();
        if !data.targets.contains_key(&target.name) {
            data.target_order.push(target.name.clone());
            data.observations.entry(target.name.clone()).or_default();
        }
        data.targets.insert(target.name.clone(), target);
        Ok(())
    }

    fn list_target_names(&self) -> Result<Vec<String>> {
        Ok(self.read().target_order.clone())
    }

    fn get_target(&self, name: &str) -> Result<Target> {
        self.read()
            .targets
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownTarget(name.to_string()))
    }

    fn update_ephemeris(&self, name: &str, ephemeris: Ephemeris) -> Result<()> {
        with_target(&mut self.write(), name, |t| t.ephemeris = ephemeris)
    }

    fn update_metrics(&self, name: &str, metrics: ForecastMetrics) -> Result<()> {
        with_target(&mut self.write(), name, |t| t.metrics = metrics)
    }

    fn set_initial_metrics(&self, name: &str, metrics: ForecastMetrics) -> Result<()> {
        with_target(&mut self.write(), name, |t| {
            t.initial_metrics = Some(metrics)
        })
    }

    fn increment_observation_count(&self, name: &str) -> Result<()> {
        with_target(&mut self.write(), name, |t| t.n_observations += 1)
    }

    fn list_targets_needing_forecast(
        &self,
        as_of: ModifiedJulianDate,
        depth_threshold: f64,
        loss_threshold_min: f64,
    ) -> Result<Vec<String>> {
        let data = self.read();
        Ok(data
            .target_order
            .iter()
            .filter(|name| {
                let Some(target) = data.targets.get(*name) else {
                    return false;
                };
                let unconstrained = match target.metrics.err_at_milestone {
                    Some(err) => err * 24.0 * 60.0 > loss_threshold_min,
                    None => true,
                };
                target.depth > depth_threshold
                    && target.ephemeris.last_center < as_of
                    && unconstrained
            })
            .cloned()
            .collect())
    }

    fn get_observations(&self, name: &str) -> Result<Vec<Observation>> {
        let data = self.read();
        let mut observations = data
            .observations
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownTarget(name.to_string()))?;
        observations.sort_by_key(|o| o.epoch);
        Ok(observations)
    }

    fn append_observation(&self, name: &str, observation: NewObservation) -> Result<bool> {
        let mut data = self.write();
        if !data.targets.contains_key(name) {
            return Err(Error::UnknownTarget(name.to_string()));
        }
        let rows = data.observations.entry(name.to_string()).or_default();
        if rows
            .iter()
            .any(|existing| existing.center == observation.center)
        {
            return Ok(false);
        }
        let id = rows
            .iter()
            .map(|o| o.id + 1)
            .max()
            .unwrap_or(OBSERVATION_ID_FLOOR)
            .max(OBSERVATION_ID_FLOOR);
        rows.push(Observation {
            id,
            epoch: observation.epoch,
            center: observation.center,
            center_err: observation.center_err,
            source: observation.source,
            true_center: observation.true_center,
        });
        Ok(true)
    }

    fn insert_candidates(&self, windows: Vec<TransitWindow>) -> Result<()> {
        let mut data = self.write();
        for window in windows {
            let at = data
                .candidates
                .partition_point(|held| held.center < window.center);
            data.candidates.insert(at, window);
        }
        Ok(())
    }

    fn candidates_between(
        &self,
        start: ModifiedJulianDate,
        end: ModifiedJulianDate,
    ) -> Result<Vec<TransitWindow>> {
        let data = self.read();
        let lo = data.candidates.partition_point(|w| w.center < start);
        let hi = data.candidates.partition_point(|w| w.center < end);
        Ok(data.candidates[lo..hi].to_vec())
    }

    fn earliest_candidate(&self) -> Result<Option<ModifiedJulianDate>> {
        Ok(self.read().candidates.first().map(|w| w.center))
    }

    fn discard_candidates_before(&self, cutoff: ModifiedJulianDate) -> Result<usize> {
        let mut data = self.write();
        let passed = data.candidates.partition_point(|w| w.center < cutoff);
        data.candidates.drain(..passed);
        Ok(passed)
    }

    fn add_site(&self, site: Site) -> Result<()> {
        let mut data = self.write();
        data.schedules.entry(site.name.clone()).or_default();
        data.sites.retain(|s| s.name != site.name);
        data.sites.push(site);
        Ok(())
    }

    fn list_sites(&self) -> Result<Vec<Site>> {
        Ok(self.read().sites.clone())
    }

    fn site_schedule(&self, site: &str) -> Result<Vec<ScheduledSlot>> {
        self.read()
            .schedules
            .get(site)
            .cloned()
            .ok_or_else(|| Error::UnknownSite(site.to_string()))
    }

    fn commit_slot(&self, site: &str, slot: ScheduledSlot) -> Result<bool> {
        let mut data = self.write();
        let schedule = data
            .schedules
            .get_mut(site)
            .ok_or_else(|| Error::UnknownSite(site.to_string()))?;
        if schedule.iter().any(|existing| existing.start == slot.start) {
            return Ok(false);
        }
        let insert_at = schedule.partition_point(|existing| existing.start < slot.start);
        schedule.insert(insert_at, slot);
        Ok(true)
    }

    fn slots_between(
        &self,
        site: &str,
        start: ModifiedJulianDate,
        end: ModifiedJulianDate,
    ) -> Result<Vec<ScheduledSlot>> {
        let data = self.read();
        let schedule = data
            .schedules
            .get(site)
            .ok_or_else(|| Error::UnknownSite(site.to_string()))?;
        Ok(schedule
            .iter()
            .filter(|slot| slot.center >= start && slot.center < end)
            .cloned()
            .collect())
    }

    fn append_sample(&self, sample: CampaignSample) -> Result<()> {
        self.write().samples.push(sample);
        Ok(())
    }

    fn list_samples(&self) -> Result<Vec<CampaignSample>> {
        Ok(self.read().samples.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(name: &str) -> Target {
        Target::new(
            name,
            120.0,
            15.0,
            150.0,
            20.0,
            3.5,
            1e-4,
            ModifiedJulianDate::new(58000.0),
            0,
        )
    }

    fn new_obs(epoch: i64, center: f64) -> NewObservation {
        NewObservation {
            epoch,
            center: ModifiedJulianDate::new(center),
            center_err: 0.001,
            source: "test".into(),
            true_center: None,
        }
    }

    #[test]
    fn test_unknown_target_errors() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get_target("nope"),
            Err(Error::UnknownTarget(_))
        ));
        assert!(matches!(
            store.append_observation("nope", new_obs(0, 58000.0)),
            Err(Error::UnknownTarget(_))
        ));
    }

    #[test]
    fn test_observation_ids_start_at_floor() {
        let store = MemoryStore::new();
        store.add_target(target("a")).unwrap();
        assert!(store.append_observation("a", new_obs(0, 58000.0)).unwrap());
        assert!(store.append_observation("a", new_obs(1, 58003.5)).unwrap());
        let rows = store.get_observations("a").unwrap();
        assert_eq!(rows[0].id, 10000);
        assert_eq!(rows[1].id, 10001);
    }

    #[test]
    fn test_duplicate_center_rejected() {
        let store = MemoryStore::new();
        store.add_target(target("a")).unwrap();
        assert!(store.append_observation("a", new_obs(0, 58000.0)).unwrap());
        assert!(!store.append_observation("a", new_obs(5, 58000.0)).unwrap());
        assert_eq!(store.get_observations("a").unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_slot_start_rejected() {
        let store = MemoryStore::new();
        store.add_site(Site::new("obs1", 28.76, -17.89, 2396.0, 2.0)).unwrap();
        let slot = ScheduledSlot {
            target: "a".into(),
            ra_deg: 120.0,
            dec_deg: 15.0,
            center: ModifiedJulianDate::new(60000.5),
            start: ModifiedJulianDate::new(60000.45),
            end: ModifiedJulianDate::new(60000.55),
            epoch: 12,
        };
        assert!(store.commit_slot("obs1", slot.clone()).unwrap());
        assert!(!store.commit_slot("obs1", slot).unwrap());
        assert_eq!(store.site_schedule("obs1").unwrap().len(), 1);
    }

    #[test]
    fn test_schedule_stays_sorted() {
        let store = MemoryStore::new();
        store.add_site(Site::new("obs1", 0.0, 0.0, 0.0, 1.0)).unwrap();
        for start in [60002.0, 60000.0, 60001.0] {
            let slot = ScheduledSlot {
                target: "a".into(),
                ra_deg: 0.0,
                dec_deg: 0.0,
                center: ModifiedJulianDate::new(start + 0.05),
                start: ModifiedJulianDate::new(start),
                end: ModifiedJulianDate::new(start + 0.1),
                epoch: 0,
            };
            store.commit_slot("obs1", slot).unwrap();
        }
        let schedule = store.site_schedule("obs1").unwrap();
        let starts: Vec<f64> = schedule.iter().map(|s| s.start.value()).collect();
        assert_eq!(starts, vec![60000.0, 60001.0, 60002.0]);
    }

    #[test]
    fn test_forecast_listing_filters() {
        let store = MemoryStore::new();
        let mut deep = target("deep");
        deep.metrics.err_at_milestone = Some(0.05); // 72 min, unconstrained
        let mut constrained = target("constrained");
        constrained.metrics.err_at_milestone = Some(0.001); // 1.44 min
        let mut shallow = target("shallow");
        shallow.depth = 1.0;
        let unknown = target("unknown"); // no metrics yet
        for t in [deep, constrained, shallow, unknown] {
            store.add_target(t).unwrap();
        }

        let names = store
            .list_targets_needing_forecast(ModifiedJulianDate::new(60000.0), 10.0, 10.0)
            .unwrap();
        assert_eq!(names, vec!["deep".to_string(), "unknown".to_string()]);
    }

    #[test]
    fn test_candidates_between() {
        let store = MemoryStore::new();
        let make = |center: f64| TransitWindow {
            target: "a".into(),
            center: ModifiedJulianDate::new(center),
            duration_min: 120.0,
            ra_deg: 0.0,
            dec_deg: 0.0,
            loss: None,
            error_days: None,
            epoch: 0,
            sites: vec![],
        };
        // Out-of-order insertion still yields an ordered range.
        store
            .insert_candidates(vec![make(60005.0), make(60010.0), make(60001.0)])
            .unwrap();
        let picked = store
            .candidates_between(ModifiedJulianDate::new(60000.0), ModifiedJulianDate::new(60006.0))
            .unwrap();
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].center.value(), 60001.0);
        assert_eq!(picked[1].center.value(), 60005.0);
        assert_eq!(
            store.earliest_candidate().unwrap().unwrap().value(),
            60001.0
        );
    }

    #[test]
    fn test_passed_candidates_are_discarded() {
        let store = MemoryStore::new();
        let make = |center: f64| TransitWindow {
            target: "a".into(),
            center: ModifiedJulianDate::new(center),
            duration_min: 120.0,
            ra_deg: 0.0,
            dec_deg: 0.0,
            loss: None,
            error_days: None,
            epoch: 0,
            sites: vec![],
        };
        store
            .insert_candidates(vec![make(60001.0), make(60005.0), make(60010.0)])
            .unwrap();

        let dropped = store
            .discard_candidates_before(ModifiedJulianDate::new(60006.0))
            .unwrap();
        assert_eq!(dropped, 2);
        assert_eq!(
            store.earliest_candidate().unwrap().unwrap().value(),
            60010.0
        );
        // Remaining candidates still answer range queries.
        let rest = store
            .candidates_between(ModifiedJulianDate::new(60000.0), ModifiedJulianDate::new(60020.0))
            .unwrap();
        assert_eq!(rest.len(), 1);

        // Nothing left behind the cutoff: a repeat discard is a no-op.
        assert_eq!(
            store
                .discard_candidates_before(ModifiedJulianDate::new(60006.0))
                .unwrap(),
            0
        );
    }
}

//! Synthetic observation generation and the ephemeris feedback loop.
//!
//! Walks each site's committed slots for a cycle, decides success with a
//! weighted coin, synthesizes a timing measurement around the center the
//! current ephemeris predicts, then re-fits and re-propagates the target so
//! later scheduling decisions see the improved (or unchanged) uncertainty.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimulationConfig;
use crate::ephemeris::{fit_period, propagate};
use crate::error::{Error, Result};
use crate::models::{Ephemeris, ModifiedJulianDate, NewObservation, Target};
use crate::store::Store;

const MIN_PER_DAY: f64 = 24.0 * 60.0;

/// Simulates scheduled observations and feeds results back into the store.
pub struct ObservationSimulator<'a, S> {
    store: &'a S,
    success_probability: f64,
    center_jitter_days: f64,
    reported_error_mean_days: f64,
    reported_error_sigma_days: f64,
    milestone: ModifiedJulianDate,
    rng: StdRng,
}

impl<'a, S: Store> ObservationSimulator<'a, S> {
    pub fn new(store: &'a S, config: &SimulationConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            store,
            success_probability: config.success_probability,
            center_jitter_days: config.center_jitter_min / MIN_PER_DAY,
            reported_error_mean_days: config.reported_error_mean_min / MIN_PER_DAY,
            reported_error_sigma_days: config.reported_error_sigma_min / MIN_PER_DAY,
            milestone: config.milestone,
            rng,
        }
    }

    /// Attempt every slot with an observed center in
    /// `[start, start + interval_days)` across all sites.
    ///
    /// Returns the number of successful observations.
    pub fn observe(&mut self, start: ModifiedJulianDate, interval_days: f64) -> Result<u32> {
        let end = start + interval_days;
        let mut observed = 0;
        for site in self.store.list_sites()? {
            for slot in self.store.slots_between(&site.name, start, end)? {
                if !self.rng.gen_bool(self.success_probability) {
                    continue;
                }
                info!("observed {} from {} at {}", slot.target, site.name, slot.center);
                let target = self.store.get_target(&slot.target)?;
                let observation = self.synthesize(&target, slot.epoch, &site.name);
                let appended = self.store.append_observation(&target.name, observation)?;
                if appended {
                    self.store.increment_observation_count(&target.name)?;
                    observed += 1;
                }
                self.recalculate(&target.name)?;
            }
        }
        Ok(observed)
    }

    /// One synthetic measurement at `epoch`: the measured center scatters
    /// around the prediction of the current ephemeris, and the reported error
    /// is drawn independently of the actual offset.
    fn synthesize(&mut self, target: &Target, epoch: i64, site: &str) -> NewObservation {
        let eph = &target.ephemeris;
        let expected =
            eph.last_center + (epoch - eph.last_epoch) as f64 * eph.period;
        let center = ModifiedJulianDate::new(self.gauss(expected.value(), self.center_jitter_days));
        let center_err = self
            .gauss(self.reported_error_mean_days, self.reported_error_sigma_days)
            .abs();
        let true_center = target.true_ephemeris.as_ref().map(|truth| {
            truth.last_center + (epoch - truth.last_epoch) as f64 * truth.period
        });
        NewObservation {
            epoch,
            center,
            center_err,
            source: site.to_string(),
            true_center,
        }
    }

    /// Re-fit the period and re-propagate the milestone error from whatever
    /// observations the store now holds.
    ///
    /// An infeasible fit leaves the stored ephemeris (ultimately the catalog
    /// starting values) in place; an infeasible propagation leaves the
    /// metrics in place. Neither aborts the campaign.
    pub fn recalculate(&self, name: &str) -> Result<()> {
        let observations = self.store.get_observations(name)?;
        match fit_period(&observations) {
            Ok(fit) => {
                self.store.update_ephemeris(
                    name,
                    Ephemeris {
                        period: fit.period,
                        period_err: Some(fit.period_err),
                        last_center: fit.last_center,
                        last_center_err: Some(fit.last_center_err),
                        last_epoch: fit.last_epoch,
                    },
                )?;
            }
            Err(Error::InsufficientData(count)) => {
                warn!("fit for {name} failed, has {count} usable observations");
            }
            Err(e) => return Err(e),
        }

        let target = self.store.get_target(name)?;
        let eph = &target.ephemeris;
        match propagate(
            eph.period,
            eph.period_err,
            eph.last_center,
            eph.last_center_err,
            target.duration_min,
            self.milestone,
        ) {
            Ok(p) => self.store.update_metrics(name, p.into())?,
            Err(Error::Propagation(reason)) => {
                debug!("propagation for {name} skipped: {reason}");
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Box-Muller normal draw.
    fn gauss(&mut self, mean: f64, sigma: f64) -> f64 {
        let u1: f64 = self.rng.gen_range(f64::MIN_POSITIVE..1.0);
        let u2: f64 = self.rng.gen();
        mean + sigma * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScheduledSlot, Site, Target, TrueEphemeris};
    use crate::store::MemoryStore;

    fn config(seed: u64) -> SimulationConfig {
        SimulationConfig {
            rng_seed: Some(seed),
            ..Default::default()
        }
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.add_site(Site::new("north", 45.0, 10.0, 1200.0, 1.0)).unwrap();
        let mut target = Target::new(
            "wasp-x",
            250.0,
            30.0,
            110.0,
            18.0,
            2.5,
            1e-4,
            ModifiedJulianDate::new(60000.0),
            0,
        );
        target.true_ephemeris = Some(TrueEphemeris {
            period: 2.5001,
            last_center: ModifiedJulianDate::new(60000.0),
            last_epoch: 0,
        });
        store.add_target(target).unwrap();
        store
    }

    fn slot(epoch: i64, center: f64) -> ScheduledSlot {
        ScheduledSlot {
            target: "wasp-x".into(),
            ra_deg: 250.0,
            dec_deg: 30.0,
            center: ModifiedJulianDate::new(center),
            start: ModifiedJulianDate::new(center - 0.07),
            end: ModifiedJulianDate::new(center + 0.07),
            epoch,
        }
    }

    #[test]
    fn test_certain_success_observes_every_slot() {
        let store = seeded_store();
        for epoch in [4_i64, 8, 12] {
            store
                .commit_slot("north", slot(epoch, 60000.0 + epoch as f64 * 2.5))
                .unwrap();
        }
        let mut config = config(7);
        config.success_probability = 1.0;
        let mut sim = ObservationSimulator::new(&store, &config);
        let observed = sim
            .observe(ModifiedJulianDate::new(60000.0), 40.0)
            .unwrap();
        assert_eq!(observed, 3);
        assert_eq!(store.get_target("wasp-x").unwrap().n_observations, 3);

        let rows = store.get_observations("wasp-x").unwrap();
        assert_eq!(rows.len(), 3);
        for row in &rows {
            let expected = 60000.0 + row.epoch as f64 * 2.5;
            // 0.5 min jitter: anything beyond 10 min would be a bug.
            assert!((row.center.value() - expected).abs() < 10.0 / MIN_PER_DAY);
            assert!(row.center_err > 0.0 && row.center_err < 1.0 / MIN_PER_DAY);
            assert_eq!(row.source, "north");
            // True centers follow the true ephemeris exactly.
            let truth = 60000.0 + row.epoch as f64 * 2.5001;
            assert!((row.true_center.unwrap().value() - truth).abs() < 1e-9);
        }
    }

    #[test]
    fn test_certain_failure_observes_nothing() {
        let store = seeded_store();
        store.commit_slot("north", slot(4, 60010.0)).unwrap();
        let mut config = config(7);
        config.success_probability = 0.0;
        let mut sim = ObservationSimulator::new(&store, &config);
        assert_eq!(
            sim.observe(ModifiedJulianDate::new(60000.0), 40.0).unwrap(),
            0
        );
        assert!(store.get_observations("wasp-x").unwrap().is_empty());
    }

    #[test]
    fn test_feedback_updates_ephemeris_and_metrics() {
        let store = seeded_store();
        for epoch in [4_i64, 8, 12] {
            store
                .commit_slot("north", slot(epoch, 60000.0 + epoch as f64 * 2.5))
                .unwrap();
        }
        let mut config = config(11);
        config.success_probability = 1.0;
        let mut sim = ObservationSimulator::new(&store, &config);
        sim.observe(ModifiedJulianDate::new(60000.0), 40.0).unwrap();

        let target = store.get_target("wasp-x").unwrap();
        // Three observations: the fit replaced the catalog ephemeris.
        assert!((target.ephemeris.period - 2.5).abs() < 0.01);
        assert!(target.ephemeris.last_center_err.is_some());
        assert_eq!(target.ephemeris.last_epoch, 12);
        // And the propagation populated the metrics.
        assert!(target.metrics.err_at_milestone.is_some());
        assert!(target.metrics.percent_loss.is_some());
    }

    #[test]
    fn test_too_few_observations_keeps_catalog_ephemeris() {
        let store = seeded_store();
        store.commit_slot("north", slot(4, 60010.0)).unwrap();
        let mut config = config(3);
        config.success_probability = 1.0;
        let mut sim = ObservationSimulator::new(&store, &config);
        sim.observe(ModifiedJulianDate::new(60000.0), 40.0).unwrap();

        let target = store.get_target("wasp-x").unwrap();
        assert_eq!(target.ephemeris.period, 2.5);
        assert_eq!(target.ephemeris.last_epoch, 0);
        // Missing center error short-circuits to the sentinel loss.
        assert_eq!(target.metrics.err_at_milestone, None);
        assert_eq!(target.metrics.percent_loss, Some(1000.0));
        assert!(target.metrics.lost);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let draws = |seed| {
            let store = seeded_store();
            for epoch in [4_i64, 8, 12] {
                store
                    .commit_slot("north", slot(epoch, 60000.0 + epoch as f64 * 2.5))
                    .unwrap();
            }
            let mut sim = ObservationSimulator::new(&store, &config(seed));
            sim.observe(ModifiedJulianDate::new(60000.0), 40.0).unwrap();
            store
                .get_observations("wasp-x")
                .unwrap()
                .iter()
                .map(|o| (o.epoch, o.center.value(), o.center_err))
                .collect::<Vec<_>>()
        };
        assert_eq!(draws(99), draws(99));
    }

    #[test]
    fn test_gauss_moments() {
        let store = seeded_store();
        let mut sim = ObservationSimulator::new(&store, &config(42));
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| sim.gauss(5.0, 2.0)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!((mean - 5.0).abs() < 0.1, "mean = {mean}");
        assert!((var - 4.0).abs() < 0.2, "var = {var}");
    }
}

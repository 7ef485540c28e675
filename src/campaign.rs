//! Campaign orchestration.
//!
//! Drives the whole follow-up simulation: bootstrap fits and forecasts,
//! then a stepped loop of scheduling, simulated observing and periodic
//! re-forecasting over the campaign horizon, collecting a progress sample at
//! every forecast refresh.

use log::info;

use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use crate::forecast::TransitForecaster;
use crate::models::{CampaignSample, ModifiedJulianDate, TransitWindow};
use crate::scheduler::Scheduler;
use crate::simulator::ObservationSimulator;
use crate::store::Store;

/// A full follow-up campaign over one store.
pub struct Campaign<'a, S> {
    store: &'a S,
    config: SimulationConfig,
    forecaster: TransitForecaster,
    scheduler: Scheduler<'a, S>,
    simulator: ObservationSimulator<'a, S>,
}

impl<'a, S: Store> Campaign<'a, S> {
    /// Fails fast on configuration the engine cannot run with.
    pub fn new(store: &'a S, config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            forecaster: TransitForecaster::from_config(&config),
            scheduler: Scheduler::new(store, &config),
            simulator: ObservationSimulator::new(store, &config),
            config,
        })
    }

    /// Bootstrap the campaign: fit and propagate every target from its seed
    /// observations, record the starting metrics, and forecast the first
    /// candidate window.
    pub fn initialize(&mut self, start: ModifiedJulianDate) -> Result<()> {
        for name in self.store.list_target_names()? {
            self.simulator.recalculate(&name)?;
            let target = self.store.get_target(&name)?;
            self.store.set_initial_metrics(&name, target.metrics)?;
        }
        self.forecast(start, start + self.config.forecast_interval_days)
    }

    /// Forecast candidate windows in `(start, end)` for every target that
    /// still needs follow-up, and store them.
    pub fn forecast(&self, start: ModifiedJulianDate, end: ModifiedJulianDate) -> Result<()> {
        let names = self.store.list_targets_needing_forecast(
            start,
            self.config.depth_threshold,
            self.config.accuracy_threshold(),
        )?;
        for name in names {
            let target = self.store.get_target(&name)?;
            let windows: Vec<TransitWindow> = self.forecaster.series(&target, start, end).collect();
            self.store.insert_candidates(windows)?;
        }
        Ok(())
    }

    /// Run the campaign until `end`.
    ///
    /// The start date defaults to the earliest forecast candidate when no
    /// hint is given; with neither, there is nothing to run. Each step
    /// advances one scheduling interval, builds schedules, simulates the
    /// observations, and every forecast interval refreshes the forecast and
    /// records a progress sample.
    pub fn run(
        &mut self,
        start_hint: Option<ModifiedJulianDate>,
        end: ModifiedJulianDate,
    ) -> Result<Vec<CampaignSample>> {
        let start = match start_hint {
            Some(date) => date,
            None => self
                .store
                .earliest_candidate()?
                .ok_or_else(|| Error::Config("no candidate transits to start from".into()))?,
        };
        info!("running campaign from {start} until {end}");

        let interval = self.config.scheduling_interval_days;
        let limit = self.config.forecast_interval_days;
        let mut since_forecast = 0.0;
        let mut current = start;
        let mut samples = Vec::new();

        while current < end {
            current = current + interval;
            self.scheduler.make_schedules(current, interval)?;
            self.simulator.observe(current, interval)?;
            // Candidates behind the clock can never be scheduled again.
            self.store.discard_candidates_before(current)?;
            since_forecast += interval;
            if since_forecast >= limit {
                info!("forecasting on {current}");
                self.forecast(current, current + limit)?;
                since_forecast = 0.0;

                let sample = self.check_constrained(current)?;
                self.store.append_sample(sample)?;
                samples.push(sample);
            }
        }
        if let Some(last) = samples.last() {
            info!(
                "campaign finished, constrained {}/{} targets",
                last.constrained, last.total
            );
        }
        Ok(samples)
    }

    /// Progress at `current`: of the deep targets observed before `current`,
    /// how many have their milestone error under the accuracy threshold.
    pub fn check_constrained(&self, current: ModifiedJulianDate) -> Result<CampaignSample> {
        let mut total = 0;
        let mut constrained = 0;
        for name in self.store.list_target_names()? {
            let target = self.store.get_target(&name)?;
            if target.depth <= self.config.depth_threshold
                || target.ephemeris.last_center >= current
            {
                continue;
            }
            total += 1;
            if let Some(err) = target.metrics.err_at_milestone {
                if err * 24.0 * 60.0 < self.config.accuracy_threshold() {
                    constrained += 1;
                }
            }
        }
        info!("constrained {constrained}/{total} targets on {current}");
        Ok(CampaignSample {
            date: current,
            constrained,
            total,
        })
    }
}

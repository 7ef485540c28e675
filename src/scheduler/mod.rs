//! Greedy per-site observation scheduling.
//!
//! Candidates in the scheduling interval are screened for site visibility,
//! prioritized by forecast loss, then placed greedily into each site's
//! schedule. A slot reserves the transit plus a continuum calibration margin
//! on either side, and never overlaps an already committed slot. A per-site
//! quota caps new commitments within one cycle.

use log::{debug, info};

use crate::config::{QuotaMode, SimulationConfig};
use crate::error::Result;
use crate::models::{ModifiedJulianDate, ScheduledSlot, TransitWindow};
use crate::store::Store;
use crate::visibility::VisibilityOracle;

/// Loss and error assigned to windows whose target has no propagated error
/// yet; large enough to sort them first and pass the constrained filter.
const UNCONSTRAINED_SENTINEL: f64 = 1000.0;

/// Allocates candidate transits to site schedules.
pub struct Scheduler<'a, S> {
    store: &'a S,
    oracle: VisibilityOracle,
    quota: QuotaMode,
    accuracy_threshold_min: f64,
    margin_days: f64,
}

impl<'a, S: Store> Scheduler<'a, S> {
    pub fn new(store: &'a S, config: &SimulationConfig) -> Self {
        Self {
            store,
            oracle: VisibilityOracle::from_config(config),
            quota: config.quota,
            accuracy_threshold_min: config.accuracy_threshold(),
            margin_days: config.continuum_margin_days(),
        }
    }

    /// Candidates in `[start, end)` that are visible from at least one site
    /// and still worth observing, sorted by loss descending.
    ///
    /// Windows without a propagated error get the sentinel loss, so unknown
    /// targets are chased hardest. Windows whose error in minutes does not
    /// exceed the accuracy threshold are already constrained and dropped.
    pub fn upcoming_transits(
        &self,
        start: ModifiedJulianDate,
        end: ModifiedJulianDate,
    ) -> Result<Vec<TransitWindow>> {
        let sites = self.store.list_sites()?;
        let mut picked = Vec::new();
        for mut window in self.store.candidates_between(start, end)? {
            window.sites = self.oracle.visible_sites(&window, &sites);
            if window.sites.is_empty() {
                continue;
            }
            let error_days = match window.error_days {
                Some(e) => e,
                None => {
                    window.loss = Some(UNCONSTRAINED_SENTINEL);
                    window.error_days = Some(UNCONSTRAINED_SENTINEL);
                    UNCONSTRAINED_SENTINEL
                }
            };
            if error_days * 24.0 * 60.0 > self.accuracy_threshold_min {
                debug!(
                    "{} needed, current error {:.3} min",
                    window.target,
                    error_days * 24.0 * 60.0
                );
                picked.push(window);
            }
        }
        picked.sort_by(|a, b| {
            let la = a.loss.unwrap_or(UNCONSTRAINED_SENTINEL);
            let lb = b.loss.unwrap_or(UNCONSTRAINED_SENTINEL);
            lb.partial_cmp(&la).unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(picked)
    }

    /// Build schedules for every site over `[start, start + interval_days)`.
    ///
    /// Returns the number of slots committed across all sites. A window
    /// visible from several sites may be scheduled at each of them.
    pub fn make_schedules(
        &self,
        start: ModifiedJulianDate,
        interval_days: f64,
    ) -> Result<u32> {
        let end = start + interval_days;
        let windows = self.upcoming_transits(start, end)?;
        let sites = self.store.list_sites()?;

        let mut committed_total = 0;
        for site in &sites {
            let mut committed = 0u32;
            for window in windows.iter().filter(|w| w.sites.contains(&site.name)) {
                if !self.quota.allows(committed) {
                    break;
                }
                let slot_start = window.ingress() - self.margin_days;
                let slot_end = window.egress() + self.margin_days;

                // Re-read each time so slots committed earlier in this pass
                // are seen.
                let schedule = self.store.site_schedule(&site.name)?;
                let conflict = schedule
                    .iter()
                    .any(|held| overlaps(held, slot_start, slot_end));
                if conflict {
                    continue;
                }

                let slot = ScheduledSlot {
                    target: window.target.clone(),
                    ra_deg: window.ra_deg,
                    dec_deg: window.dec_deg,
                    center: window.center,
                    start: slot_start,
                    end: slot_end,
                    epoch: window.epoch,
                };
                let run_min = slot.run_days() * 24.0 * 60.0;
                if self.store.commit_slot(&site.name, slot)? {
                    info!(
                        "scheduled {} at {} for {} ({run_min:.0} min run)",
                        window.target, site.name, window.center
                    );
                    committed += 1;
                }
            }
            committed_total += committed;
        }
        Ok(committed_total)
    }
}

/// The three placement checks: the new run may not start inside a held run,
/// may not end inside one, and may not surround one.
fn overlaps(held: &ScheduledSlot, new_start: ModifiedJulianDate, new_end: ModifiedJulianDate) -> bool {
    (held.start < new_start && new_start < held.end)
        || (held.start < new_end && new_end < held.end)
        || (new_start < held.start && held.end < new_end)
}

//! CSV loaders for the bootstrap feed and the results writer.
//!
//! A campaign needs three inputs: the site network, the target catalog and
//! the seed timing observations. All three arrive as headed CSV files and
//! land in the store through [`bootstrap_store`]. Progress samples go back
//! out the same way.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{CampaignSample, ModifiedJulianDate, NewObservation, Site, Target, TrueEphemeris};
use crate::store::Store;

#[derive(Debug, Deserialize)]
struct SiteRecord {
    name: String,
    latitude_deg: f64,
    longitude_deg: f64,
    altitude_m: f64,
    aperture_m: f64,
}

#[derive(Debug, Deserialize)]
struct TargetRecord {
    name: String,
    ra_deg: f64,
    dec_deg: f64,
    duration_min: f64,
    depth: f64,
    period_days: f64,
    period_err_days: f64,
    /// Reference transit center, MJD.
    epoch_center: f64,
    /// True period for ground-truth projection, when known.
    true_period_days: Option<f64>,
}

/// One seed timing measurement from the catalog feed.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedObservation {
    pub target: String,
    pub epoch: i64,
    pub center: f64,
    pub center_err: f64,
    pub source: String,
}

/// Load the site network from a headed CSV file.
pub fn load_sites_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Site>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut sites = Vec::new();
    for record in reader.deserialize() {
        let r: SiteRecord = record?;
        sites.push(Site::new(
            r.name,
            r.latitude_deg,
            r.longitude_deg,
            r.altitude_m,
            r.aperture_m,
        ));
    }
    Ok(sites)
}

/// Load the target catalog from a headed CSV file.
pub fn load_targets_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Target>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut targets = Vec::new();
    for record in reader.deserialize() {
        let r: TargetRecord = record?;
        let mut target = Target::new(
            r.name,
            r.ra_deg,
            r.dec_deg,
            r.duration_min,
            r.depth,
            r.period_days,
            r.period_err_days,
            ModifiedJulianDate::new(r.epoch_center),
            0,
        );
        target.true_ephemeris = r.true_period_days.map(|period| TrueEphemeris {
            period,
            last_center: ModifiedJulianDate::new(r.epoch_center),
            last_epoch: 0,
        });
        targets.push(target);
    }
    Ok(targets)
}

/// Load seed observations from a headed CSV file.
pub fn load_observations_csv<P: AsRef<Path>>(path: P) -> Result<Vec<SeedObservation>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut observations = Vec::new();
    for record in reader.deserialize() {
        observations.push(record?);
    }
    Ok(observations)
}

/// Feed sites, targets and seed observations into a store.
///
/// Duplicate seed centers are dropped by the store, matching its behavior
/// for simulated rows.
pub fn bootstrap_store<S: Store>(
    store: &S,
    sites: Vec<Site>,
    targets: Vec<Target>,
    observations: Vec<SeedObservation>,
) -> Result<()> {
    for site in sites {
        store.add_site(site)?;
    }
    for target in targets {
        store.add_target(target)?;
    }
    for seed in observations {
        let appended = store.append_observation(
            &seed.target,
            NewObservation {
                epoch: seed.epoch,
                center: ModifiedJulianDate::new(seed.center),
                center_err: seed.center_err,
                source: seed.source,
                true_center: None,
            },
        )?;
        if appended {
            store.increment_observation_count(&seed.target)?;
        }
    }
    Ok(())
}

/// Dump the full target state as pretty JSON, for inspection of a run.
pub fn write_targets_json<P: AsRef<Path>, S: Store>(path: P, store: &S) -> Result<()> {
    let mut targets = Vec::new();
    for name in store.list_target_names()? {
        targets.push(store.get_target(&name)?);
    }
    let file = std::fs::File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &targets)?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct SampleRecord {
    date_mjd: f64,
    constrained: u32,
    total: u32,
}

/// Write the campaign progress curve to a headed CSV file.
pub fn write_samples_csv<P: AsRef<Path>>(path: P, samples: &[CampaignSample]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for sample in samples {
        writer.serialize(SampleRecord {
            date_mjd: sample.date.value(),
            constrained: sample.constrained,
            total: sample.total,
        })?;
    }
    writer.flush()?;
    Ok(())
}

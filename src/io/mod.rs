//! File-based input and output.

pub mod loaders;

pub use loaders::{
    bootstrap_store, load_observations_csv, load_sites_csv, load_targets_csv, write_samples_csv,
    write_targets_json, SeedObservation,
};

//! A Rust library for loading MIMIC-style ICU tables into a validated,
//! in-memory patient graph.
//!
//! Four delimited tables are read in a fixed order (PATIENTS, ADMISSIONS,
//! ICUSTAYS, CHARTEVENTS) and linked into
//! patient → hospital visit → ICU stay → time series of events.
//! Structural violations abort the load; chart events that cannot be linked
//! to an ICU stay are kept aside as invalid rows.

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod reader;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{LoaderConfig, VisitIdScope};
pub use database::{Database, LinkedEvent, LoadSummary};
pub use error::{IcuDbError, Result};

// Record types
pub use models::{
    AdmissionLocation, AdmissionType, ChartDetails, ClinicalEvent, EventKind, EventValue, Gender,
    HospitalVisit, IcuStay, Insurance, Patient,
};

// Reading and snapshots
pub use database::snapshot::{SNAPSHOT_FORMAT, SNAPSHOT_VERSION, SnapshotManifest};
pub use reader::{Table, TableReader};
pub use utils::parse_date_time;

//! Versioned on-disk snapshots of a loaded database
//!
//! A snapshot is a directory holding `manifest.json` and one JSON Lines file
//! per level of the graph:
//!
//! | file                   | one line per      | line layout                                         |
//! |------------------------|-------------------|-----------------------------------------------------|
//! | `patients.jsonl`       | patient           | patient fields                                      |
//! | `admissions.jsonl`     | hospital visit    | `{"subject_id", "record"}`                          |
//! | `icustays.jsonl`       | ICU stay          | `{"subject_id", "hadm_id", "record"}`               |
//! | `chartevents.jsonl`    | attached event    | `{"subject_id", "hadm_id", "icustay_id", "record"}` |
//! | `invalid_events.jsonl` | diverted event    | `{"row", "subject_id", "hadm_id", "icustay_id", "event"}` |
//!
//! Records are written in ascending identifier order (events in chronological
//! order), so two snapshots of the same graph are byte-identical. Restoring
//! replays every record through the regular add operations, which re-validates
//! all identifier invariants.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::LoaderConfig;
use crate::database::{Database, LinkedEvent, LoadSummary};
use crate::error::util::{ensure_directory, safe_create_file, safe_open_file, validate_directory};
use crate::error::{IcuDbError, Result};
use crate::models::{ClinicalEvent, HospitalVisit, IcuStay, Patient};
use crate::utils::logging::log_warning;

/// Value of `format` in every manifest
pub const SNAPSHOT_FORMAT: &str = "icu-db-snapshot";

/// Snapshot layout version written by this crate
pub const SNAPSHOT_VERSION: u32 = 1;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const PATIENTS_FILE: &str = "patients.jsonl";
pub const ADMISSIONS_FILE: &str = "admissions.jsonl";
pub const ICUSTAYS_FILE: &str = "icustays.jsonl";
pub const CHARTEVENTS_FILE: &str = "chartevents.jsonl";
pub const INVALID_EVENTS_FILE: &str = "invalid_events.jsonl";

/// Contents of `manifest.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotManifest {
    pub format: String,
    pub version: u32,
    pub counts: LoadSummary,
}

#[derive(Serialize, Deserialize)]
struct VisitLine<T> {
    subject_id: i64,
    record: T,
}

#[derive(Serialize, Deserialize)]
struct StayLine<T> {
    subject_id: i64,
    hadm_id: i64,
    record: T,
}

#[derive(Serialize, Deserialize)]
struct EventLine<T> {
    subject_id: i64,
    hadm_id: i64,
    icustay_id: i64,
    record: T,
}

/// Line-oriented JSON writer for one snapshot file
struct JsonLines {
    out: BufWriter<File>,
}

impl JsonLines {
    fn create(dir: &Path, name: &str) -> Result<Self> {
        let file = safe_create_file(&dir.join(name), "writing snapshot")?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    fn write<T: Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Read every non-empty line of a snapshot file as `T`
fn read_lines<T, F>(dir: &Path, name: &str, mut apply: F) -> Result<()>
where
    T: DeserializeOwned,
    F: FnMut(T) -> Result<()>,
{
    let reader = BufReader::new(safe_open_file(&dir.join(name), "restoring snapshot")?);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        apply(serde_json::from_str(&line)?)?;
    }
    Ok(())
}

impl Database {
    /// Write a snapshot into `config.snapshot_dir`
    pub fn save_snapshot(&self) -> Result<SnapshotManifest> {
        let dir = self.config.snapshot_dir.clone();
        self.save_snapshot_to(&dir)
    }

    /// Write a snapshot into `dir`, creating it if needed
    pub fn save_snapshot_to(&self, dir: &Path) -> Result<SnapshotManifest> {
        ensure_directory(dir, "writing snapshot")?;
        log::info!("Saving snapshot to {}", dir.display());

        let mut patients = JsonLines::create(dir, PATIENTS_FILE)?;
        let mut admissions = JsonLines::create(dir, ADMISSIONS_FILE)?;
        let mut icu_stays = JsonLines::create(dir, ICUSTAYS_FILE)?;
        let mut events = JsonLines::create(dir, CHARTEVENTS_FILE)?;

        for patient in self.patients.values().sorted_by_key(|p| p.subject_id) {
            let subject_id = patient.subject_id;
            patients.write(patient)?;

            for visit in patient.hospital_visits().sorted_by_key(|v| v.hadm_id) {
                let hadm_id = visit.hadm_id;
                admissions.write(&VisitLine {
                    subject_id,
                    record: visit,
                })?;

                for stay in visit.icu_stays().sorted_by_key(|s| s.icustay_id) {
                    let icustay_id = stay.icustay_id;
                    icu_stays.write(&StayLine {
                        subject_id,
                        hadm_id,
                        record: stay,
                    })?;

                    for event in stay.events() {
                        events.write(&EventLine {
                            subject_id,
                            hadm_id,
                            icustay_id,
                            record: event,
                        })?;
                    }
                }
            }
        }

        patients.finish()?;
        admissions.finish()?;
        icu_stays.finish()?;
        events.finish()?;

        let mut invalid = JsonLines::create(dir, INVALID_EVENTS_FILE)?;
        for linked in &self.invalid_rows {
            invalid.write(linked)?;
        }
        invalid.finish()?;

        let manifest = SnapshotManifest {
            format: SNAPSHOT_FORMAT.to_string(),
            version: SNAPSHOT_VERSION,
            counts: self.summary(),
        };
        let file = safe_create_file(&dir.join(MANIFEST_FILE), "writing snapshot")?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, &manifest)?;
        out.flush()?;

        log::info!(
            "Snapshot saved: {} patients, {} events",
            manifest.counts.patients,
            manifest.counts.events
        );
        Ok(manifest)
    }

    /// Restore a database from `config.snapshot_dir`
    pub fn restore_snapshot(config: LoaderConfig) -> Result<Self> {
        let dir = config.snapshot_dir.clone();
        Self::restore_snapshot_from(&dir, config)
    }

    /// Restore a database from the snapshot in `dir`
    ///
    /// # Errors
    /// Returns [`IcuDbError::UnsupportedSnapshot`] for an unknown format or
    /// version, and the usual identifier errors if the files are inconsistent.
    pub fn restore_snapshot_from(dir: &Path, config: LoaderConfig) -> Result<Self> {
        validate_directory(dir, "restoring snapshot")?;
        let manifest = read_manifest(dir)?;
        log::info!("Restoring snapshot from {}", dir.display());

        let mut db = Self::new(config);
        read_lines(dir, PATIENTS_FILE, |patient: Patient| db.add_patient(patient))?;
        read_lines(dir, ADMISSIONS_FILE, |line: VisitLine<HospitalVisit>| {
            db.add_hospital_visit(line.subject_id, line.record)
        })?;
        read_lines(dir, ICUSTAYS_FILE, |line: StayLine<IcuStay>| {
            db.add_icu_stay(line.subject_id, line.hadm_id, line.record)
        })?;
        read_lines(dir, CHARTEVENTS_FILE, |line: EventLine<ClinicalEvent>| {
            db.add_event(line.subject_id, line.hadm_id, line.icustay_id, line.record)
                .map(|_| ())
        })?;
        read_lines(dir, INVALID_EVENTS_FILE, |linked: LinkedEvent| {
            db.invalid_rows.push(linked);
            Ok(())
        })?;

        let restored = db.summary();
        if restored != manifest.counts {
            log_warning(
                &format!(
                    "Snapshot counts differ from manifest: restored {restored:?}, manifest {:?}",
                    manifest.counts
                ),
                Some(dir),
            );
        }
        Ok(db)
    }
}

/// Read and check `manifest.json`
pub fn read_manifest(dir: &Path) -> Result<SnapshotManifest> {
    let file = safe_open_file(&dir.join(MANIFEST_FILE), "restoring snapshot")?;
    let manifest: SnapshotManifest = serde_json::from_reader(BufReader::new(file))?;
    if manifest.format != SNAPSHOT_FORMAT || manifest.version != SNAPSHOT_VERSION {
        return Err(IcuDbError::UnsupportedSnapshot {
            format: manifest.format,
            version: manifest.version,
        });
    }
    Ok(manifest)
}

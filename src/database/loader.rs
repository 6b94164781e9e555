//! Table loading passes
//!
//! Each pass streams one table row by row, builds a typed record, validates
//! it and links it into the graph. The first fatal error aborts the pass and
//! is returned wrapped with the table name and row index; whatever was linked
//! before that row stays in the database.

use std::fs::File;
use std::io::{BufReader, Read};
use std::time::Instant;

use indicatif::ProgressBar;

use crate::config::LoaderConfig;
use crate::database::{Database, LinkedEvent, LoadSummary};
use crate::error::util::validate_directory;
use crate::error::{IcuDbError, Result};
use crate::models::{ClinicalEvent, HospitalVisit, IcuStay, Patient};
use crate::reader::{Record, Table, TableReader};
use crate::utils::logging::{
    create_spinner, finish_progress_bar, log_operation_complete, log_operation_start, log_progress,
};

/// Progress bookkeeping for one pass over a table
struct PassProgress {
    table: Table,
    start: Instant,
    rows: usize,
    spinner: Option<ProgressBar>,
}

impl PassProgress {
    fn start(config: &LoaderConfig, table: Table) -> Self {
        let spinner = config
            .show_progress
            .then(|| create_spinner(Some(table.name())));
        Self {
            table,
            start: Instant::now(),
            rows: 0,
            spinner,
        }
    }

    fn row(&mut self, config: &LoaderConfig, index: usize, saved: usize) {
        self.rows = index + 1;
        if let Some(spinner) = &self.spinner {
            spinner.inc(1);
        }
        if config.is_progress_row(index) {
            log_progress(self.table, index, saved);
        }
    }

    fn finish(self, saved: usize) {
        if let Some(spinner) = &self.spinner {
            finish_progress_bar(spinner, Some("done"));
        }
        log_operation_complete(
            "reading",
            self.table,
            self.rows,
            saved,
            Some(self.start.elapsed()),
        );
    }
}

impl Database {
    /// Create a database and load all four tables from `config.data_dir`
    pub fn load(config: LoaderConfig) -> Result<Self> {
        let mut db = Self::new(config);
        db.load_all()?;
        Ok(db)
    }

    /// Load patients, admissions, ICU stays and chart events, in that order
    pub fn load_all(&mut self) -> Result<LoadSummary> {
        validate_directory(&self.config.data_dir, "loading ICU tables")?;
        log_operation_start("Loading ICU tables from", &self.config.data_dir);

        self.read_patients_table()?;
        self.read_hospital_visits_table()?;
        self.read_icu_stays_table()?;
        self.read_chart_events_table()?;

        let summary = self.summary();
        log::info!(
            "Loaded {} patients, {} admissions, {} ICU stays, {} events ({} invalid rows)",
            summary.patients,
            summary.hospital_visits,
            summary.icu_stays,
            summary.events,
            summary.invalid_rows
        );
        Ok(summary)
    }

    fn open_table(&self, table: Table) -> Result<TableReader<BufReader<File>>> {
        TableReader::open(&self.config.data_dir, table, self.config.delimiter)
    }

    /// Read PATIENTS.csv; returns the number of patients in the database
    pub fn read_patients_table(&mut self) -> Result<usize> {
        let table = self.open_table(Table::Patients)?;
        self.load_patients(table)
    }

    /// Read ADMISSIONS.csv; returns the number of admissions in the database
    pub fn read_hospital_visits_table(&mut self) -> Result<usize> {
        let table = self.open_table(Table::Admissions)?;
        self.load_hospital_visits(table)
    }

    /// Read ICUSTAYS.csv; returns the number of ICU stays in the database
    pub fn read_icu_stays_table(&mut self) -> Result<usize> {
        let table = self.open_table(Table::IcuStays)?;
        self.load_icu_stays(table)
    }

    /// Read CHARTEVENTS.csv; returns the number of events attached to stays
    ///
    /// Uses the sharded parallel path when `config.parallel_events` is set.
    pub fn read_chart_events_table(&mut self) -> Result<usize> {
        let table = self.open_table(Table::ChartEvents)?;
        if self.config.parallel_events {
            self.load_chart_events_parallel(table)
        } else {
            self.load_chart_events(table)
        }
    }

    /// Load patients from any PATIENTS-shaped table
    ///
    /// Rows without a `SUBJECT_ID` are skipped with a warning.
    pub fn load_patients<R: Read>(&mut self, table: TableReader<R>) -> Result<usize> {
        let mut progress = PassProgress::start(&self.config, Table::Patients);
        for row in table.rows() {
            let (index, record) = row?;
            self.load_patient_row(index, &record)
                .map_err(|e| e.at_row(Table::Patients, index))?;
            progress.row(&self.config, index, self.num_patients());
        }
        progress.finish(self.num_patients());
        Ok(self.num_patients())
    }

    fn load_patient_row(&mut self, index: usize, record: &Record) -> Result<()> {
        let subject_id = match record.get("SUBJECT_ID").map(str::trim) {
            Some(id) if !id.is_empty() => id
                .parse::<i64>()
                .map_err(|_| IcuDbError::invalid_number("SUBJECT_ID", id))?,
            _ => {
                log::warn!("Row {index} doesn't contain the subject id");
                return Ok(());
            }
        };

        let patient = Patient::from_record(subject_id, record)?;
        self.add_patient(patient)
    }

    /// Load admissions from any ADMISSIONS-shaped table
    pub fn load_hospital_visits<R: Read>(&mut self, table: TableReader<R>) -> Result<usize> {
        let mut progress = PassProgress::start(&self.config, Table::Admissions);
        for row in table.rows() {
            let (index, record) = row?;
            self.load_hospital_visit_row(&record)
                .map_err(|e| e.at_row(Table::Admissions, index))?;
            progress.row(&self.config, index, self.num_hospital_visits());
        }
        progress.finish(self.num_hospital_visits());
        Ok(self.num_hospital_visits())
    }

    fn load_hospital_visit_row(&mut self, record: &Record) -> Result<()> {
        let subject_id = record.require_i64("SUBJECT_ID")?;
        self.require_patient(subject_id)?;
        let visit = HospitalVisit::from_record(record)?;
        self.add_hospital_visit(subject_id, visit)
    }

    /// Load ICU stays from any ICUSTAYS-shaped table
    pub fn load_icu_stays<R: Read>(&mut self, table: TableReader<R>) -> Result<usize> {
        let mut progress = PassProgress::start(&self.config, Table::IcuStays);
        for row in table.rows() {
            let (index, record) = row?;
            self.load_icu_stay_row(&record)
                .map_err(|e| e.at_row(Table::IcuStays, index))?;
            progress.row(&self.config, index, self.num_icu_stays());
        }
        progress.finish(self.num_icu_stays());
        Ok(self.num_icu_stays())
    }

    fn load_icu_stay_row(&mut self, record: &Record) -> Result<()> {
        let subject_id = record.require_i64("SUBJECT_ID")?;
        self.require_patient(subject_id)?;
        let icu_stay = IcuStay::from_record(record)?;
        let hadm_id = record.require_i64("HADM_ID")?;
        self.add_icu_stay(subject_id, hadm_id, icu_stay)
    }

    /// Load chart events from any CHARTEVENTS-shaped table, one row at a time
    ///
    /// Rows lacking `HADM_ID` or `ICUSTAY_ID` are diverted to
    /// [`Database::invalid_rows`].
    pub fn load_chart_events<R: Read>(&mut self, table: TableReader<R>) -> Result<usize> {
        let mut progress = PassProgress::start(&self.config, Table::ChartEvents);
        let before = self.num_events();
        for row in table.rows() {
            let (index, record) = row?;
            self.load_chart_event_row(index, &record)
                .map_err(|e| e.at_row(Table::ChartEvents, index))?;
            progress.row(&self.config, index, self.num_events() - before);
        }
        let attached = self.num_events() - before;
        progress.finish(attached);
        Ok(attached)
    }

    fn load_chart_event_row(&mut self, index: usize, record: &Record) -> Result<()> {
        let subject_id = record.require_i64("SUBJECT_ID")?;
        self.require_patient(subject_id)?;
        let linked = LinkedEvent::from_chart_record(index, subject_id, record)?;
        self.link_event(linked)
    }

    /// Attach a parsed event, or divert it when its linkage is incomplete
    pub(crate) fn link_event(&mut self, linked: LinkedEvent) -> Result<()> {
        match (linked.hadm_id, linked.icustay_id) {
            (Some(hadm_id), Some(icustay_id)) => {
                self.add_event(linked.subject_id, hadm_id, icustay_id, linked.event)?;
            }
            _ => self.divert_invalid_row(linked),
        }
        Ok(())
    }
}

impl LinkedEvent {
    /// Parse a CHARTEVENTS row whose subject id has already been read
    pub fn from_chart_record(row: usize, subject_id: i64, record: &Record) -> Result<Self> {
        let event = ClinicalEvent::from_chart_record(record)?;
        Ok(Self {
            row,
            subject_id,
            hadm_id: record.opt_i64("HADM_ID")?,
            icustay_id: record.opt_i64("ICUSTAY_ID")?,
            event,
        })
    }

    /// Whether the row names both its admission and its ICU stay
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.hadm_id.is_some() && self.icustay_id.is_some()
    }
}

//! The ICU database: root of the patient graph
//!
//! A [`Database`] owns every [`Patient`] of one load session and links
//! admissions, ICU stays and chart events into it. Loading happens in a fixed
//! order (see [`crate::reader::Table::LOAD_ORDER`]); every record must find its
//! parent among the records loaded before it.

pub mod loader;
pub mod parallel;
pub mod snapshot;

use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::{LoaderConfig, VisitIdScope};
use crate::error::{IcuDbError, Result};
use crate::models::{ClinicalEvent, HospitalVisit, IcuStay, Patient};

/// An event together with the identifiers that link it into the graph
///
/// Rows without an admission id or an ICU stay id are kept in this form in
/// [`Database::invalid_rows`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedEvent {
    /// Index of the source row (0 = first data row)
    pub row: usize,
    pub subject_id: i64,
    pub hadm_id: Option<i64>,
    pub icustay_id: Option<i64>,
    pub event: ClinicalEvent,
}

/// Record counts of a database
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub patients: usize,
    pub hospital_visits: usize,
    pub icu_stays: usize,
    pub events: usize,
    pub invalid_rows: usize,
}

/// In-memory graph of patients, admissions, ICU stays and events
#[derive(Debug)]
pub struct Database {
    config: LoaderConfig,
    patients: FxHashMap<i64, Patient>,
    /// hadm_id → subject_id, for admission lookups without a patient id
    visit_index: FxHashMap<i64, i64>,
    invalid_rows: Vec<LinkedEvent>,
    num_hospital_visits: usize,
    num_icu_stays: usize,
    num_events: usize,
}

impl Database {
    /// Create an empty database for one load session
    #[must_use]
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            patients: FxHashMap::default(),
            visit_index: FxHashMap::default(),
            invalid_rows: Vec::new(),
            num_hospital_visits: 0,
            num_icu_stays: 0,
            num_events: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Register a patient
    ///
    /// # Errors
    /// Returns [`IcuDbError::DuplicateKey`] if the subject id is already loaded.
    pub fn add_patient(&mut self, patient: Patient) -> Result<()> {
        if self.patients.contains_key(&patient.subject_id) {
            log::error!("Patient {} already exists.", patient.subject_id);
            return Err(IcuDbError::DuplicateKey {
                entity: "Patient",
                id: patient.subject_id,
                scope: None,
            });
        }
        self.patients.insert(patient.subject_id, patient);
        Ok(())
    }

    /// Attach an admission to an already loaded patient
    ///
    /// With [`VisitIdScope::Global`] an admission id may only be used once in
    /// the whole database; with [`VisitIdScope::PerPatient`] only once per
    /// patient.
    pub fn add_hospital_visit(&mut self, subject_id: i64, visit: HospitalVisit) -> Result<()> {
        let hadm_id = visit.hadm_id;
        if self.config.visit_id_scope == VisitIdScope::Global {
            if let Some(owner) = self.visit_index.get(&hadm_id) {
                log::error!("hadm_id {hadm_id} already belongs to patient {owner}");
                return Err(IcuDbError::DuplicateKey {
                    entity: "Admission",
                    id: hadm_id,
                    scope: None,
                });
            }
        }

        self.patient_mut(subject_id)?.add_hospital_visit(visit)?;
        self.visit_index.entry(hadm_id).or_insert(subject_id);
        self.num_hospital_visits += 1;
        Ok(())
    }

    /// Attach an ICU stay to an admission of an already loaded patient
    pub fn add_icu_stay(&mut self, subject_id: i64, hadm_id: i64, icu_stay: IcuStay) -> Result<()> {
        self.patient_mut(subject_id)?.add_icu_stay(hadm_id, icu_stay)?;
        self.num_icu_stays += 1;
        Ok(())
    }

    /// Attach an event to an ICU stay, returning the event it replaced
    pub fn add_event(
        &mut self,
        subject_id: i64,
        hadm_id: i64,
        icustay_id: i64,
        event: ClinicalEvent,
    ) -> Result<Option<ClinicalEvent>> {
        let replaced = self
            .patient_mut(subject_id)?
            .add_event(hadm_id, icustay_id, event)?;
        if replaced.is_none() {
            self.num_events += 1;
        }
        Ok(replaced)
    }

    /// Keep an event that cannot be linked to an ICU stay
    pub fn divert_invalid_row(&mut self, linked: LinkedEvent) {
        log::warn!(
            "event without icu stay id or without adm id. row {}",
            linked.row
        );
        self.invalid_rows.push(linked);
    }

    /// Fail with [`IcuDbError::BrokenReference`] unless the patient is loaded
    pub fn require_patient(&self, subject_id: i64) -> Result<&Patient> {
        self.patients.get(&subject_id).ok_or_else(|| {
            log::error!("Patient {subject_id} doesn't exist.");
            patient_not_found(subject_id)
        })
    }

    fn patient_mut(&mut self, subject_id: i64) -> Result<&mut Patient> {
        self.patients.get_mut(&subject_id).ok_or_else(|| {
            log::error!("Patient {subject_id} doesn't exist.");
            patient_not_found(subject_id)
        })
    }

    #[must_use]
    pub fn patient(&self, subject_id: i64) -> Option<&Patient> {
        self.patients.get(&subject_id)
    }

    /// All patients, in no particular order
    pub fn patients(&self) -> impl Iterator<Item = &Patient> {
        self.patients.values()
    }

    /// Look up an admission by its id alone
    #[must_use]
    pub fn hospital_visit(&self, hadm_id: i64) -> Option<&HospitalVisit> {
        let subject_id = self.visit_index.get(&hadm_id)?;
        self.patients.get(subject_id)?.hospital_visit(hadm_id)
    }

    #[must_use]
    pub fn icu_stay(&self, hadm_id: i64, icustay_id: i64) -> Option<&IcuStay> {
        self.hospital_visit(hadm_id)?.icu_stay(icustay_id)
    }

    /// Events that could not be linked to an ICU stay, in row order
    #[must_use]
    pub fn invalid_rows(&self) -> &[LinkedEvent] {
        &self.invalid_rows
    }

    #[must_use]
    pub fn num_patients(&self) -> usize {
        self.patients.len()
    }

    #[must_use]
    pub fn num_hospital_visits(&self) -> usize {
        self.num_hospital_visits
    }

    #[must_use]
    pub fn num_icu_stays(&self) -> usize {
        self.num_icu_stays
    }

    /// Events attached to ICU stays; diverted rows are not counted
    #[must_use]
    pub fn num_events(&self) -> usize {
        self.num_events
    }

    #[must_use]
    pub fn summary(&self) -> LoadSummary {
        LoadSummary {
            patients: self.num_patients(),
            hospital_visits: self.num_hospital_visits,
            icu_stays: self.num_icu_stays,
            events: self.num_events,
            invalid_rows: self.invalid_rows.len(),
        }
    }

    /// Patients with more than one hospital admission, by subject id
    #[must_use]
    pub fn readmitted_patients(&self) -> Vec<&Patient> {
        self.patients
            .values()
            .filter(|p| p.num_hospital_visits() > 1)
            .sorted_by_key(|p| p.subject_id)
            .collect()
    }

    /// Patients with more ICU stays than hospital admissions, by subject id
    #[must_use]
    pub fn patients_with_multiple_icu_stays_per_visit(&self) -> Vec<&Patient> {
        self.patients
            .values()
            .filter(|p| p.num_hospital_visits() < p.num_icu_stays())
            .sorted_by_key(|p| p.subject_id)
            .collect()
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

fn patient_not_found(subject_id: i64) -> IcuDbError {
    IcuDbError::BrokenReference {
        entity: "Patient",
        id: subject_id,
        scope: None,
    }
}

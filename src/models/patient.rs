//! Patient model
//!
//! `dod` merges `dod_hosp` (hospital database) and `dod_ssn` (social security
//! death index), giving priority to the hospital record. `expire_flag` tells
//! whether the patient died, i.e. whether `dod` is set. Patients older than 89
//! have their date of birth shifted to 300 years before their first admission.

use chrono::NaiveDateTime;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{IcuDbError, Result};
use crate::models::event::ClinicalEvent;
use crate::models::hospital_visit::HospitalVisit;
use crate::models::icu_stay::IcuStay;
use crate::models::types::Gender;
use crate::reader::Record;
use crate::utils::parse_date_time;

/// A person tracked across one or more hospital admissions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub subject_id: i64,
    pub gender: Gender,
    pub dob: Option<NaiveDateTime>,
    pub dod: Option<NaiveDateTime>,
    pub dod_hosp: Option<NaiveDateTime>,
    pub dod_ssn: Option<NaiveDateTime>,
    pub expire_flag: bool,
    #[serde(skip)]
    hospital_visits: FxHashMap<i64, HospitalVisit>,
}

impl Patient {
    /// Create a patient with no visits
    #[must_use]
    pub fn new(
        subject_id: i64,
        gender: Gender,
        dob: Option<NaiveDateTime>,
        dod: Option<NaiveDateTime>,
        dod_hosp: Option<NaiveDateTime>,
        dod_ssn: Option<NaiveDateTime>,
        expire_flag: bool,
    ) -> Self {
        Self {
            subject_id,
            gender,
            dob,
            dod,
            dod_hosp,
            dod_ssn,
            expire_flag,
            hospital_visits: FxHashMap::default(),
        }
    }

    /// Build a patient from a PATIENTS row whose `SUBJECT_ID` is known
    ///
    /// `DOD_HOSP` and `DOD_SSN` may be absent from the table, in which case
    /// they are treated as empty.
    ///
    /// # Errors
    /// Returns [`IcuDbError::DeathRecordMismatch`] when the death fields
    /// disagree: an empty `DOD` requires empty `DOD_HOSP`, empty `DOD_SSN` and
    /// `EXPIRE_FLAG` 0, and a present `DOD` requires `EXPIRE_FLAG` 1.
    pub fn from_record(subject_id: i64, record: &Record) -> Result<Self> {
        let dod = record.require("DOD")?;
        let dod_hosp = record.get("DOD_HOSP").unwrap_or_default();
        let dod_ssn = record.get("DOD_SSN").unwrap_or_default();
        let expire_flag = record.require("EXPIRE_FLAG")?;

        let consistent = if dod.trim().is_empty() {
            dod_hosp.trim().is_empty() && dod_ssn.trim().is_empty() && expire_flag.trim() == "0"
        } else {
            expire_flag.trim() == "1"
        };
        if !consistent {
            return Err(IcuDbError::DeathRecordMismatch {
                subject_id,
                dod: dod.to_string(),
                dod_hosp: dod_hosp.to_string(),
                dod_ssn: dod_ssn.to_string(),
                expire_flag: expire_flag.to_string(),
            });
        }

        Ok(Self::new(
            subject_id,
            Gender::from(record.require("GENDER")?),
            record.date_time("DOB")?,
            parse_date_time(dod)?,
            parse_date_time(dod_hosp)?,
            parse_date_time(dod_ssn)?,
            expire_flag.trim() == "1",
        ))
    }

    /// Add a hospital visit to this patient
    ///
    /// # Errors
    /// Returns [`IcuDbError::DuplicateKey`] if the patient already has a visit
    /// with the same `hadm_id`.
    pub fn add_hospital_visit(&mut self, visit: HospitalVisit) -> Result<()> {
        if visit.death_time.is_some() && self.dod_hosp.is_none() {
            log::warn!(
                "visit info states the patient died in hospital while patient info doesn't. patient id: {}, hadm id: {}",
                self.subject_id,
                visit.hadm_id
            );
        }

        if self.hospital_visits.contains_key(&visit.hadm_id) {
            log::error!(
                "hadm_id already exists in patient. patient {}, hadm_id {}",
                self.subject_id,
                visit.hadm_id
            );
            return Err(IcuDbError::DuplicateKey {
                entity: "Admission",
                id: visit.hadm_id,
                scope: Some(format!("patient {}", self.subject_id)),
            });
        }

        self.hospital_visits.insert(visit.hadm_id, visit);
        Ok(())
    }

    /// Add an ICU stay to one of this patient's admissions
    pub fn add_icu_stay(&mut self, hadm_id: i64, icu_stay: IcuStay) -> Result<()> {
        self.visit_mut(hadm_id)?.add_icu_stay(icu_stay)
    }

    /// Add an event to an ICU stay of one of this patient's admissions
    pub fn add_event(
        &mut self,
        hadm_id: i64,
        icustay_id: i64,
        event: ClinicalEvent,
    ) -> Result<Option<ClinicalEvent>> {
        self.visit_mut(hadm_id)?.add_event(icustay_id, event)
    }

    fn visit_mut(&mut self, hadm_id: i64) -> Result<&mut HospitalVisit> {
        let subject_id = self.subject_id;
        self.hospital_visits.get_mut(&hadm_id).ok_or_else(|| {
            log::error!("hadm_id does not exist in patient. patient {subject_id}, hadm_id {hadm_id}");
            IcuDbError::BrokenReference {
                entity: "Admission",
                id: hadm_id,
                scope: Some(format!("patient {subject_id}")),
            }
        })
    }

    #[must_use]
    pub fn hospital_visit(&self, hadm_id: i64) -> Option<&HospitalVisit> {
        self.hospital_visits.get(&hadm_id)
    }

    pub fn hospital_visits(&self) -> impl Iterator<Item = &HospitalVisit> {
        self.hospital_visits.values()
    }

    #[must_use]
    pub fn num_hospital_visits(&self) -> usize {
        self.hospital_visits.len()
    }

    #[must_use]
    pub fn num_icu_stays(&self) -> usize {
        self.hospital_visits
            .values()
            .map(HospitalVisit::num_icu_stays)
            .sum()
    }

    #[must_use]
    pub fn num_events(&self) -> usize {
        self.hospital_visits.values().map(HospitalVisit::num_events).sum()
    }
}

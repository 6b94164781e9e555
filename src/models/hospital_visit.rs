//! Hospital visit (admission) model
//!
//! One continuous hospital stay. `death_time` is only present when the patient
//! died in hospital and is almost always equal to `discharge_time`.

use chrono::NaiveDateTime;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{IcuDbError, Result};
use crate::models::event::ClinicalEvent;
use crate::models::icu_stay::IcuStay;
use crate::models::types::{AdmissionLocation, AdmissionType, Insurance};
use crate::reader::Record;

/// A single hospital admission and the ICU stays that happened during it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalVisit {
    pub hadm_id: i64,
    pub admit_time: Option<NaiveDateTime>,
    pub discharge_time: Option<NaiveDateTime>,
    pub death_time: Option<NaiveDateTime>,
    pub admission_type: AdmissionType,
    pub admission_location: AdmissionLocation,
    pub insurance: Insurance,
    pub language: String,
    pub religion: String,
    pub marital_status: String,
    pub ethnicity: String,
    /// Registration time at the emergency department
    pub ed_reg_time: Option<NaiveDateTime>,
    /// Discharge time from the emergency department
    pub ed_out_time: Option<NaiveDateTime>,
    /// Preliminary free-text diagnosis assigned on admission
    pub diagnosis: String,
    #[serde(skip)]
    icu_stays: FxHashMap<i64, IcuStay>,
}

impl HospitalVisit {
    /// Build a visit from an ADMISSIONS row
    ///
    /// # Errors
    /// Fails on missing columns, unparsable dates and values outside the
    /// admission type, admission location or insurance vocabularies.
    pub fn from_record(record: &Record) -> Result<Self> {
        let hadm_id = record.require_i64("HADM_ID")?;
        let admit_time = record.date_time("ADMITTIME")?;
        let discharge_time = record.date_time("DISCHTIME")?;
        let death_time = record.date_time("DEATHTIME")?;

        if death_time.is_some() && death_time != discharge_time {
            log::warn!("Death time and discharge time are not the same for hadm_id: {hadm_id}");
        }

        let admission_type = parse_vocabulary::<AdmissionType>(record, "ADMISSION_TYPE")?;
        let admission_location =
            parse_vocabulary::<AdmissionLocation>(record, "ADMISSION_LOCATION")?;
        let insurance = parse_vocabulary::<Insurance>(record, "INSURANCE")?;

        Ok(Self {
            hadm_id,
            admit_time,
            discharge_time,
            death_time,
            admission_type,
            admission_location,
            insurance,
            language: record.text("LANGUAGE")?,
            religion: record.text("RELIGION")?,
            marital_status: record.text("MARITAL_STATUS")?,
            ethnicity: record.text("ETHNICITY")?,
            ed_reg_time: record.date_time("EDREGTIME")?,
            ed_out_time: record.date_time("EDOUTTIME")?,
            diagnosis: record.text("DIAGNOSIS")?,
            icu_stays: FxHashMap::default(),
        })
    }

    /// Attach an ICU stay to this admission
    ///
    /// # Errors
    /// Returns [`IcuDbError::DuplicateKey`] if the stay id is already present.
    pub fn add_icu_stay(&mut self, icu_stay: IcuStay) -> Result<()> {
        if self.icu_stays.contains_key(&icu_stay.icustay_id) {
            log::error!(
                "icustay_id already exists in this admission. adm {}, icu_stay {}",
                self.hadm_id,
                icu_stay.icustay_id
            );
            return Err(IcuDbError::DuplicateKey {
                entity: "ICU stay",
                id: icu_stay.icustay_id,
                scope: Some(format!("admission {}", self.hadm_id)),
            });
        }

        self.icu_stays.insert(icu_stay.icustay_id, icu_stay);
        Ok(())
    }

    /// Attach an event to one of this admission's ICU stays
    ///
    /// Returns the event it replaced, if any.
    ///
    /// # Errors
    /// Returns [`IcuDbError::BrokenReference`] if the stay is not part of this
    /// admission.
    pub fn add_event(&mut self, icustay_id: i64, event: ClinicalEvent) -> Result<Option<ClinicalEvent>> {
        match self.icu_stays.get_mut(&icustay_id) {
            Some(stay) => Ok(stay.add_event(event)),
            None => {
                log::error!(
                    "event from icu stay id {} doesn't belong to any of the icu stays in admission {}",
                    icustay_id,
                    self.hadm_id
                );
                Err(IcuDbError::BrokenReference {
                    entity: "ICU stay",
                    id: icustay_id,
                    scope: Some(format!("admission {}", self.hadm_id)),
                })
            }
        }
    }

    #[must_use]
    pub fn icu_stay(&self, icustay_id: i64) -> Option<&IcuStay> {
        self.icu_stays.get(&icustay_id)
    }

    pub fn icu_stays(&self) -> impl Iterator<Item = &IcuStay> {
        self.icu_stays.values()
    }

    #[must_use]
    pub fn num_icu_stays(&self) -> usize {
        self.icu_stays.len()
    }

    #[must_use]
    pub fn num_events(&self) -> usize {
        self.icu_stays.values().map(IcuStay::num_events).sum()
    }

    #[must_use]
    pub fn died_in_hospital(&self) -> bool {
        self.death_time.is_some()
    }
}

fn parse_vocabulary<T>(record: &Record, column: &str) -> Result<T>
where
    T: std::str::FromStr<Err = IcuDbError>,
{
    let raw = record.require(column)?;
    raw.parse::<T>().inspect_err(|_| {
        log::error!("{} invalid value {}", column.to_lowercase(), raw);
    })
}

//! ICU stay model
//!
//! An ICU stay groups all ICU admissions of a patient within 24 hours of each
//! other, so a patient may move between care units or wards and keep the same
//! `icustay_id`. Events charted during the stay are kept as a time series:
//! chart time → item id → event.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::event::ClinicalEvent;
use crate::reader::Record;

/// Events charted at the same instant, keyed by item id
pub type ConcurrentEvents = BTreeMap<i64, ClinicalEvent>;

/// One continuous stay in an intensive-care unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IcuStay {
    pub icustay_id: i64,
    /// ICU database the data was sourced from (carevue / metavision / both)
    pub db_source: String,
    pub first_care_unit: String,
    pub last_care_unit: String,
    pub first_ward_id: Option<i64>,
    pub last_ward_id: Option<i64>,
    pub in_time: Option<NaiveDateTime>,
    pub out_time: Option<NaiveDateTime>,
    /// Length of stay in fractional days
    pub los: Option<f64>,
    /// True when the first and last ward or care unit differ
    pub was_transferred: bool,
    #[serde(skip)]
    time_series: BTreeMap<Option<NaiveDateTime>, ConcurrentEvents>,
}

impl IcuStay {
    /// Create a stay; `was_transferred` is derived from the unit and ward fields
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        icustay_id: i64,
        db_source: String,
        first_care_unit: String,
        last_care_unit: String,
        first_ward_id: Option<i64>,
        last_ward_id: Option<i64>,
        in_time: Option<NaiveDateTime>,
        out_time: Option<NaiveDateTime>,
        los: Option<f64>,
    ) -> Self {
        let was_transferred = first_ward_id != last_ward_id || first_care_unit != last_care_unit;
        Self {
            icustay_id,
            db_source,
            first_care_unit,
            last_care_unit,
            first_ward_id,
            last_ward_id,
            in_time,
            out_time,
            los,
            was_transferred,
            time_series: BTreeMap::new(),
        }
    }

    /// Build a stay from an ICUSTAYS row
    pub fn from_record(record: &Record) -> Result<Self> {
        Ok(Self::new(
            record.require_i64("ICUSTAY_ID")?,
            record.text("DBSOURCE")?,
            record.text("FIRST_CAREUNIT")?,
            record.text("LAST_CAREUNIT")?,
            record.opt_i64("FIRST_WARDID")?,
            record.opt_i64("LAST_WARDID")?,
            record.date_time("INTIME")?,
            record.date_time("OUTTIME")?,
            record.opt_f64("LOS")?,
        ))
    }

    /// Index an event by chart time and item id
    ///
    /// A second event for the same item at the same time replaces the first;
    /// the replaced event is returned and a warning is logged.
    pub fn add_event(&mut self, event: ClinicalEvent) -> Option<ClinicalEvent> {
        let chart_time = event.chart_time;
        let item_id = event.item_id;
        let replaced = self
            .time_series
            .entry(chart_time)
            .or_default()
            .insert(item_id, event);

        if replaced.is_some() {
            log::warn!(
                "item_id {} was already inserted at time {:?} in icu stay {}",
                item_id,
                chart_time,
                self.icustay_id
            );
        }
        replaced
    }

    /// Time series in chronological order (events without a chart time first)
    #[must_use]
    pub fn time_series(&self) -> &BTreeMap<Option<NaiveDateTime>, ConcurrentEvents> {
        &self.time_series
    }

    /// Measurements charted at `time`
    #[must_use]
    pub fn events_at(&self, time: Option<NaiveDateTime>) -> Option<&ConcurrentEvents> {
        self.time_series.get(&time)
    }

    /// Every event in chronological order, then by item id
    pub fn events(&self) -> impl Iterator<Item = &ClinicalEvent> {
        self.time_series.values().flat_map(BTreeMap::values)
    }

    /// Number of distinct chart times
    #[must_use]
    pub fn num_time_points(&self) -> usize {
        self.time_series.len()
    }

    #[must_use]
    pub fn num_events(&self) -> usize {
        self.time_series.values().map(BTreeMap::len).sum()
    }
}

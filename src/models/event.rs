//! Clinical event model
//!
//! A clinical event is one timestamped observation of a patient during an ICU
//! stay. `item_id` points into an external catalog of measurement types.
//! `value` holds what was charted; when the charted value is numeric, `value_num`
//! is expected to carry the same number. Chart events additionally record who
//! validated the measurement and when.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{IcuDbError, Result};
use crate::reader::{Record, parse_f64};

/// The charted value of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventValue {
    Numeric(f64),
    Text(String),
}

impl EventValue {
    /// Interpret a raw cell: plain decimal numbers become `Numeric`
    ///
    /// Digit strings too long for an `f64` stay `Text`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if is_plain_number(raw) {
            if let Ok(number) = raw.parse::<f64>() {
                if number.is_finite() {
                    return Self::Numeric(number);
                }
            }
        }
        Self::Text(raw.to_string())
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(number) => Some(*number),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric(_))
    }
}

/// Digits with at most one decimal point, and at least one digit
fn is_plain_number(s: &str) -> bool {
    let mut seen_dot = false;
    let mut seen_digit = false;
    for c in s.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}

/// Fields only the chart-event table carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDetails {
    /// When the observation was manually input or validated
    pub store_time: Option<NaiveDateTime>,
    /// Caregiver who validated the measurement
    pub cgid: Option<i64>,
    /// Whether a warning was raised for the value (Metavision)
    pub warning: Option<bool>,
    /// Whether an error occurred during the measurement (Metavision)
    pub error: Option<bool>,
    /// Manual or automatic measurement (CareVue)
    pub result_status: String,
    /// Whether the measurement was stopped
    pub stopped: String,
}

/// Source-specific part of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// A bare measurement with no table-specific fields
    Measurement,
    /// A row of the chart-event table
    Chart(ChartDetails),
}

/// One timestamped clinical observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalEvent {
    pub item_id: i64,
    pub chart_time: Option<NaiveDateTime>,
    pub value: EventValue,
    pub value_num: Option<f64>,
    pub value_unit: String,
    pub kind: EventKind,
}

impl ClinicalEvent {
    /// Build a measurement event, validating its value against `value_num`
    ///
    /// # Errors
    /// Returns [`IcuDbError::ValueMismatch`] when `value` is a plain number that
    /// differs from a non-empty `value_num`, and [`IcuDbError::InvalidNumber`]
    /// when `value_num` is not a number.
    pub fn measurement(
        item_id: i64,
        chart_time: Option<NaiveDateTime>,
        value: &str,
        value_num: &str,
        value_unit: &str,
    ) -> Result<Self> {
        let parsed_num = parse_f64("VALUENUM", value_num)?;
        let parsed_value = EventValue::parse(value);

        if let Some(number) = parsed_value.as_f64() {
            match parsed_num {
                None => log::warn!(
                    "Value is numeric but VALUENUM is empty. item {item_id}, value {value}"
                ),
                Some(declared) if declared != number => {
                    return Err(IcuDbError::ValueMismatch {
                        item_id,
                        value: value.to_string(),
                        value_num: value_num.to_string(),
                    });
                }
                Some(_) => {}
            }
        }

        Ok(Self {
            item_id,
            chart_time,
            value: parsed_value,
            value_num: parsed_num,
            value_unit: value_unit.to_string(),
            kind: EventKind::Measurement,
        })
    }

    /// Build a chart event from a CHARTEVENTS row
    pub fn from_chart_record(record: &Record) -> Result<Self> {
        let item_id = record.require_i64("ITEMID")?;
        let mut event = Self::measurement(
            item_id,
            record.date_time("CHARTTIME")?,
            record.require("VALUE")?,
            record.require("VALUENUM")?,
            record.require("VALUEUOM")?,
        )?;

        event.kind = EventKind::Chart(ChartDetails {
            store_time: record.date_time("STORETIME")?,
            cgid: record.opt_i64("CGID")?,
            warning: parse_flag("WARNING", record.require("WARNING")?),
            error: parse_flag("ERROR", record.require("ERROR")?),
            result_status: record.text("RESULTSTATUS")?,
            stopped: record.text("STOPPED")?,
        });

        Ok(event)
    }

    /// Chart-specific fields, if this is a chart event
    #[must_use]
    pub fn chart_details(&self) -> Option<&ChartDetails> {
        match &self.kind {
            EventKind::Chart(details) => Some(details),
            EventKind::Measurement => None,
        }
    }
}

/// Parse a 0/1 flag column; empty and unrecognised cells give `None`
fn parse_flag(column: &str, raw: &str) -> Option<bool> {
    match raw.trim() {
        "" => None,
        "0" => Some(false),
        "1" => Some(true),
        other => {
            log::warn!("{column} flag '{other}' is neither 0 nor 1, stored as empty");
            None
        }
    }
}

//! Test utilities
//!
//! Table fixtures shared by unit and integration tests.


// Re-export commonly used functions for convenience
pub use fixtures::{
    ADMISSIONS_HEADER, CHARTEVENTS_HEADER, ICUSTAYS_HEADER, PATIENTS_HEADER, admission_row,
    chart_event_row, icu_stay_row, patient_row, table_text, write_tables,
};

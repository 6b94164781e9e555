//! Domain models for the ICU database
//!
//! The record types form a strict containment tree:
//! [`Patient`] → [`HospitalVisit`] → [`IcuStay`] → [`ClinicalEvent`].
//! Each type is built by a validating factory from a source row, and each
//! container exposes an add-child operation that enforces identifier
//! uniqueness within its scope.

pub mod event;
pub mod hospital_visit;
pub mod icu_stay;
pub mod patient;
pub mod types;

// Re-export commonly used types
pub use event::{ChartDetails, ClinicalEvent, EventKind, EventValue};
pub use hospital_visit::HospitalVisit;
pub use icu_stay::{ConcurrentEvents, IcuStay};
pub use patient::Patient;
pub use types::{AdmissionLocation, AdmissionType, Gender, Insurance};

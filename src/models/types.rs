//! Common domain type definitions
//!
//! Closed vocabularies of the admission table and the patient gender code.
//! Vocabulary values are parsed from, displayed as and serialized to the exact
//! strings that appear in the source tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IcuDbError;

/// Gender of a patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Male gender
    Male,
    /// Female gender
    Female,
    /// Unknown or not specified
    Unknown,
}

impl From<&str> for Gender {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Self::Male,
            "f" | "female" => Self::Female,
            _ => Self::Unknown,
        }
    }
}

/// Declares a closed vocabulary enum with its source-table spellings
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $field:tt {
            $($(#[$vmeta:meta])* $variant:ident => $text:tt,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every accepted value, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Spelling used in the source table
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = IcuDbError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(IcuDbError::InvalidEnum {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// Type of a hospital admission
    ///
    /// Emergency and urgent indicate unplanned care, elective a planned
    /// admission, newborn an admission that pertains to the patient's birth.
    AdmissionType, "admission_type" {
        Elective => "ELECTIVE",
        Urgent => "URGENT",
        Newborn => "NEWBORN",
        Emergency => "EMERGENCY",
    }
}

vocabulary! {
    /// Where the patient was before arriving at the hospital
    AdmissionLocation, "admission_location" {
        EmergencyRoomAdmit => "EMERGENCY ROOM ADMIT",
        TransferFromHospExtram => "TRANSFER FROM HOSP/EXTRAM",
        TransferFromOtherHealt => "TRANSFER FROM OTHER HEALT",
        ClinicReferralPremature => "CLINIC REFERRAL/PREMATURE",
        InfoNotAvailable => "** INFO NOT AVAILABLE **",
        TransferFromSkilledNur => "TRANSFER FROM SKILLED NUR",
        TrsfWithinThisFacility => "TRSF WITHIN THIS FACILITY",
        HmoReferralSick => "HMO REFERRAL/SICK",
        PhysReferralNormalDeli => "PHYS REFERRAL/NORMAL DELI",
    }
}

vocabulary! {
    /// Insurance type recorded on admission
    Insurance, "insurance" {
        Private => "Private",
        Medicare => "Medicare",
        Medicaid => "Medicaid",
        Government => "Government",
        SelfPay => "Self Pay",
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::record;
    use icu_db::models::*;
    use icu_db::reader::Table;
    use icu_db::utils::test::fixtures::{ADMISSIONS_HEADER, admission_row};
    use icu_db::IcuDbError;

    fn visit(admission_type: &str, location: &str, insurance: &str) -> icu_db::Result<HospitalVisit> {
        let row = admission_row(10, 100001, admission_type, location, insurance);
        HospitalVisit::from_record(&record(Table::Admissions, ADMISSIONS_HEADER, row))
    }

    #[test]
    fn test_emergency_medicare_visit() {
        let visit = visit("EMERGENCY", "EMERGENCY ROOM ADMIT", "Medicare").unwrap();

        assert_eq!(visit.hadm_id, 100001);
        assert_eq!(visit.admission_type, AdmissionType::Emergency);
        assert_eq!(visit.admission_location, AdmissionLocation::EmergencyRoomAdmit);
        assert_eq!(visit.insurance, Insurance::Medicare);
        assert_eq!(visit.diagnosis, "SEPSIS, URINARY");
        assert!(visit.death_time.is_none());
        assert!(!visit.died_in_hospital());
        assert_eq!(visit.num_icu_stays(), 0);
    }

    #[test]
    fn test_every_admission_location_is_accepted() {
        for location in AdmissionLocation::ALL {
            let visit = visit("URGENT", location.as_str(), "Medicaid").unwrap();
            assert_eq!(visit.admission_location, *location);
        }
    }

    #[test]
    fn test_values_outside_vocabulary_fail() {
        let err = visit("WALK-IN", "EMERGENCY ROOM ADMIT", "Medicare").unwrap_err();
        assert!(matches!(err, IcuDbError::InvalidEnum { field: "admission_type", .. }));

        let err = visit("ELECTIVE", "HOME", "Medicare").unwrap_err();
        assert!(matches!(err, IcuDbError::InvalidEnum { field: "admission_location", .. }));

        let err = visit("ELECTIVE", "EMERGENCY ROOM ADMIT", "Crypto").unwrap_err();
        assert!(matches!(err, IcuDbError::InvalidEnum { field: "insurance", ref value } if value == "Crypto"));
    }

    #[test]
    fn test_duplicate_icu_stay() {
        let mut visit = visit("ELECTIVE", "PHYS REFERRAL/NORMAL DELI", "Private").unwrap();
        let stay = IcuStay::new(200001, "carevue".into(), "CSRU".into(), "CSRU".into(), Some(14), Some(14), None, None, None);

        visit.add_icu_stay(stay.clone()).unwrap();
        let err = visit.add_icu_stay(stay).unwrap_err();

        assert_eq!(err.to_string(), "ICU stay 200001 already exists in admission 100001");
        assert_eq!(visit.num_icu_stays(), 1);
    }

    #[test]
    fn test_event_for_stay_outside_visit() {
        let mut visit = visit("ELECTIVE", "PHYS REFERRAL/NORMAL DELI", "Private").unwrap();
        let event = ClinicalEvent::measurement(211, None, "80", "80", "bpm").unwrap();

        let err = visit.add_event(200009, event).unwrap_err();
        assert!(matches!(err, IcuDbError::BrokenReference { entity: "ICU stay", id: 200009, .. }));
    }
}

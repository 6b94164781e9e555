#[cfg(test)]
mod tests {
    use crate::utils::record;
    use icu_db::models::*;
    use icu_db::reader::Table;
    use icu_db::utils::test::fixtures::{PATIENTS_HEADER, admission_row, ADMISSIONS_HEADER, patient_row};
    use icu_db::IcuDbError;

    fn patient(subject_id: i64, dod: &str, dod_hosp: &str, dod_ssn: &str, flag: &str) -> icu_db::Result<Patient> {
        let record = record(Table::Patients, PATIENTS_HEADER, patient_row(subject_id, dod, dod_hosp, dod_ssn, flag));
        Patient::from_record(subject_id, &record)
    }

    #[test]
    fn test_living_patient() {
        let patient = patient(10, "", "", "", "0").unwrap();

        assert_eq!(patient.subject_id, 10);
        assert_eq!(patient.gender, Gender::Female);
        assert_eq!(
            patient.dob,
            Some(chrono::NaiveDate::from_ymd_opt(2075, 3, 13).unwrap().and_hms_opt(0, 0, 0).unwrap())
        );
        assert!(patient.dod.is_none());
        assert!(!patient.expire_flag);
        assert_eq!(patient.num_hospital_visits(), 0);
        assert_eq!(patient.num_icu_stays(), 0);
    }

    #[test]
    fn test_deceased_patient() {
        let patient = patient(11, "2102-06-14 00:00:00", "", "2102-06-14 00:00:00", "1").unwrap();
        assert!(patient.expire_flag);
        assert!(patient.dod.is_some());
        assert!(patient.dod_hosp.is_none());
        assert!(patient.dod_ssn.is_some());
    }

    #[test]
    fn test_death_record_must_agree() {
        let cases = [
            ("2102-06-14 00:00:00", "", "", "0"),
            ("", "2102-06-14 00:00:00", "", "0"),
            ("", "", "2102-06-14 00:00:00", "0"),
            ("", "", "", "1"),
        ];
        for (dod, dod_hosp, dod_ssn, flag) in cases {
            let err = patient(12, dod, dod_hosp, dod_ssn, flag).unwrap_err();
            assert!(
                matches!(err, IcuDbError::DeathRecordMismatch { subject_id: 12, .. }),
                "expected mismatch for {dod:?}/{dod_hosp:?}/{dod_ssn:?}/{flag}"
            );
        }
    }

    #[test]
    fn test_duplicate_visit_in_patient() {
        let mut patient = patient(10, "", "", "", "0").unwrap();
        let row = admission_row(10, 100001, "NEWBORN", "CLINIC REFERRAL/PREMATURE", "Government");
        let visit = HospitalVisit::from_record(&record(Table::Admissions, ADMISSIONS_HEADER, row)).unwrap();

        patient.add_hospital_visit(visit.clone()).unwrap();
        let err = patient.add_hospital_visit(visit).unwrap_err();

        assert!(matches!(err, IcuDbError::DuplicateKey { entity: "Admission", id: 100001, .. }));
        assert_eq!(err.to_string(), "Admission 100001 already exists in patient 10");
        assert_eq!(patient.num_hospital_visits(), 1);
    }

    #[test]
    fn test_icu_stay_for_unknown_visit() {
        let mut patient = patient(10, "", "", "", "0").unwrap();
        let stay = IcuStay::new(200001, "metavision".into(), "SICU".into(), "SICU".into(), None, None, None, None, None);

        let err = patient.add_icu_stay(100001, stay).unwrap_err();
        assert!(matches!(err, IcuDbError::BrokenReference { entity: "Admission", id: 100001, .. }));
    }
}

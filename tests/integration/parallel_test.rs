use crate::utils::sample_data_dir;
use icu_db::{Database, LoaderConfig};
use itertools::Itertools;

#[test]
fn test_parallel_load_matches_sequential() -> icu_db::Result<()> {
    let dir = sample_data_dir();

    let sequential = Database::load(LoaderConfig::new(dir.path()))?;
    let parallel = Database::load(LoaderConfig::new(dir.path()).with_parallel_events(Some(4)))?;

    assert_eq!(parallel.summary(), sequential.summary());
    assert_eq!(parallel.invalid_rows(), sequential.invalid_rows());

    for patient in sequential.patients().sorted_by_key(|p| p.subject_id) {
        for visit in patient.hospital_visits() {
            for stay in visit.icu_stays() {
                let other = parallel.icu_stay(visit.hadm_id, stay.icustay_id).unwrap();
                assert!(stay.events().eq(other.events()), "stay {} differs", stay.icustay_id);
            }
        }
    }
    Ok(())
}

#[test]
fn test_single_worker() -> icu_db::Result<()> {
    let dir = sample_data_dir();
    let db = Database::load(LoaderConfig::new(dir.path()).with_parallel_events(Some(1)))?;
    assert_eq!(db.num_events(), 6);
    Ok(())
}

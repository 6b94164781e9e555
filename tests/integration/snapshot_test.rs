use crate::utils::sample_data_dir;
use icu_db::database::snapshot::{CHARTEVENTS_FILE, MANIFEST_FILE, PATIENTS_FILE};
use icu_db::{Database, IcuDbError, LoaderConfig, SNAPSHOT_VERSION};

#[test]
fn test_snapshot_round_trip() -> icu_db::Result<()> {
    let data = sample_data_dir();
    let out = tempfile::tempdir().unwrap();

    let db = Database::load(LoaderConfig::new(data.path()))?;
    let manifest = db.save_snapshot_to(out.path())?;
    assert_eq!(manifest.version, SNAPSHOT_VERSION);
    assert_eq!(manifest.counts, db.summary());

    let restored = Database::restore_snapshot_from(out.path(), LoaderConfig::default())?;
    assert_eq!(restored.summary(), db.summary());
    assert_eq!(restored.invalid_rows(), db.invalid_rows());

    let original = db.icu_stay(100002, 200003).unwrap();
    let copy = restored.icu_stay(100002, 200003).unwrap();
    assert!(original.events().eq(copy.events()));
    assert_eq!(copy.first_ward_id, original.first_ward_id);

    let visit = restored.hospital_visit(100003).unwrap();
    assert_eq!(visit.insurance, icu_db::Insurance::SelfPay);
    Ok(())
}

#[test]
fn test_snapshots_are_deterministic() -> icu_db::Result<()> {
    let data = sample_data_dir();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    Database::load(LoaderConfig::new(data.path()))?.save_snapshot_to(first.path())?;
    let restored = {
        let db = Database::load(LoaderConfig::new(data.path()).with_parallel_events(Some(2)))?;
        db.save_snapshot_to(second.path())?;
        db
    };
    assert_eq!(restored.num_patients(), 2);

    for file in [MANIFEST_FILE, PATIENTS_FILE, CHARTEVENTS_FILE] {
        let a = std::fs::read(first.path().join(file))?;
        let b = std::fs::read(second.path().join(file))?;
        assert_eq!(a, b, "{file} differs");
    }
    Ok(())
}

#[test]
fn test_snapshot_dir_from_config() -> icu_db::Result<()> {
    let data = sample_data_dir();
    let out = tempfile::tempdir().unwrap();
    let config = LoaderConfig::new(data.path()).with_snapshot_dir(out.path().join("snap"));

    let db = Database::load(config.clone())?;
    db.save_snapshot()?;

    let restored = Database::restore_snapshot(config)?;
    assert_eq!(restored.summary(), db.summary());
    Ok(())
}

#[test]
fn test_unknown_format_is_rejected() {
    let out = tempfile::tempdir().unwrap();
    Database::default().save_snapshot_to(out.path()).unwrap();
    let manifest = std::fs::read_to_string(out.path().join(MANIFEST_FILE)).unwrap();
    std::fs::write(
        out.path().join(MANIFEST_FILE),
        manifest.replace("icu-db-snapshot", "pickle"),
    )
    .unwrap();

    let err = Database::restore_snapshot_from(out.path(), LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, IcuDbError::UnsupportedSnapshot { ref format, version: 1 } if format == "pickle"));
}

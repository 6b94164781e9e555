use icu_db::reader::{Record, Table, TableReader};
use icu_db::utils::test::fixtures::{
    admission_row, chart_event_row, icu_stay_row, patient_row, table_text, write_tables,
};
use tempfile::TempDir;

/// Parse a single data row of `table` into a record
#[must_use]
pub fn record(table: Table, header: &str, row: String) -> Record {
    let text = table_text(header, &[row]);
    let (_, record) = TableReader::from_reader(table, std::io::Cursor::new(text.into_bytes()), b',')
        .unwrap()
        .rows()
        .next()
        .expect("one data row")
        .unwrap();
    record
}

/// A data directory with two patients, three admissions, three ICU stays and
/// a handful of chart events, one of them without an admission id
#[must_use]
pub fn sample_data_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_tables(
        dir.path(),
        &[
            patient_row(10, "", "", "", "0"),
            patient_row(11, "2102-06-14 00:00:00", "2102-06-14 00:00:00", "", "1"),
        ],
        &[
            admission_row(10, 100001, "EMERGENCY", "EMERGENCY ROOM ADMIT", "Medicare"),
            admission_row(11, 100002, "ELECTIVE", "PHYS REFERRAL/NORMAL DELI", "Private"),
            admission_row(11, 100003, "URGENT", "TRANSFER FROM HOSP/EXTRAM", "Self Pay"),
        ],
        &[
            icu_stay_row(10, 100001, 200001, 3, 7),
            icu_stay_row(11, 100002, 200002, 52, 52),
            icu_stay_row(11, 100002, 200003, 15, 15),
        ],
        &sample_chart_events(),
    )
    .unwrap();
    dir
}

/// Chart events matching [`sample_data_dir`]
#[must_use]
pub fn sample_chart_events() -> Vec<String> {
    vec![
        chart_event_row(10, "100001", "200001", 211, "2101-10-20 19:10:00", "86"),
        chart_event_row(10, "100001", "200001", 618, "2101-10-20 19:10:00", "21"),
        chart_event_row(10, "100001", "200001", 211, "2101-10-20 20:10:00", "88"),
        chart_event_row(10, "", "200001", 211, "2101-10-20 21:10:00", "90"),
        chart_event_row(11, "100002", "200002", 211, "2102-01-03 08:00:00", "72"),
        chart_event_row(11, "100002", "200003", 223761, "2102-01-04 08:00:00", "98.6"),
        chart_event_row(11, "100002", "200003", 220048, "2102-01-04 08:00:00", "SR (Sinus Rhythm)"),
    ]
}

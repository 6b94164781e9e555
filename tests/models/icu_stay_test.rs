#[cfg(test)]
mod tests {
    use crate::utils::record;
    use icu_db::models::*;
    use icu_db::parse_date_time;
    use icu_db::reader::Table;
    use icu_db::utils::test::fixtures::{ICUSTAYS_HEADER, icu_stay_row};

    #[test]
    fn test_ward_change_marks_transfer() {
        let row = icu_stay_row(10, 100001, 200001, 3, 7);
        let stay = IcuStay::from_record(&record(Table::IcuStays, ICUSTAYS_HEADER, row)).unwrap();

        assert_eq!(stay.icustay_id, 200001);
        assert_eq!(stay.first_ward_id, Some(3));
        assert_eq!(stay.last_ward_id, Some(7));
        assert!(stay.was_transferred);
        assert_eq!(stay.los, Some(6.0646));
        assert_eq!(stay.in_time, parse_date_time("2101-10-20 19:10:11").unwrap());
    }

    #[test]
    fn test_same_ward_is_not_a_transfer() {
        let row = icu_stay_row(10, 100001, 200001, 52, 52);
        let stay = IcuStay::from_record(&record(Table::IcuStays, ICUSTAYS_HEADER, row)).unwrap();
        assert!(!stay.was_transferred);
    }

    #[test]
    fn test_events_without_chart_time_come_first() {
        let mut stay = IcuStay::new(200001, "carevue".into(), "MICU".into(), "MICU".into(), None, None, None, None, None);
        let timed = parse_date_time("2101-10-20 19:10:00").unwrap();

        stay.add_event(ClinicalEvent::measurement(211, timed, "86", "86", "bpm").unwrap());
        stay.add_event(ClinicalEvent::measurement(211, None, "84", "84", "bpm").unwrap());

        let times: Vec<_> = stay.time_series().keys().copied().collect();
        assert_eq!(times, vec![None, timed]);
        assert_eq!(stay.events_at(None).unwrap().len(), 1);
        assert!(stay.events_at(parse_date_time("2101-10-21 00:00:00").unwrap()).is_none());
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::record;
    use icu_db::models::*;
    use icu_db::reader::Table;
    use icu_db::utils::test::fixtures::{CHARTEVENTS_HEADER, chart_event_row};
    use icu_db::IcuDbError;

    #[test]
    fn test_chart_event_from_row() {
        let row = chart_event_row(10, "100001", "200001", 211, "2101-10-20 19:10:00", "86");
        let event = ClinicalEvent::from_chart_record(&record(Table::ChartEvents, CHARTEVENTS_HEADER, row)).unwrap();

        assert_eq!(event.item_id, 211);
        assert_eq!(event.value, EventValue::Numeric(86.0));
        assert_eq!(event.value_num, Some(86.0));
        assert_eq!(event.value_unit, "bpm");

        let details = event.chart_details().unwrap();
        assert_eq!(details.cgid, Some(17525));
        assert_eq!(details.warning, Some(false));
        assert_eq!(details.stopped, "NotStopd");
    }

    #[test]
    fn test_text_value_is_kept() {
        let row = chart_event_row(10, "100001", "200001", 220048, "2101-10-20 19:10:00", "SR (Sinus Rhythm)");
        let event = ClinicalEvent::from_chart_record(&record(Table::ChartEvents, CHARTEVENTS_HEADER, row)).unwrap();

        assert_eq!(event.value, EventValue::Text("SR (Sinus Rhythm)".to_string()));
        assert!(event.value_num.is_none());
    }

    #[test]
    fn test_value_must_match_value_num() {
        let err = ClinicalEvent::measurement(211, None, "86", "87", "bpm").unwrap_err();
        assert!(matches!(err, IcuDbError::ValueMismatch { item_id: 211, .. }));

        // Same number, different spelling
        assert!(ClinicalEvent::measurement(211, None, "86", "86.0", "bpm").is_ok());
    }
}

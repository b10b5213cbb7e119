use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sleep_diary_metrics::presenter::{
    completion_rate, efficiency_band, format_duration, quality_symbol, quality_symbol_for_average,
    trend_for, EfficiencyBand, TrendArrow,
};
use sleep_diary_metrics::{
    Aggregator, Comparator, DiaryRecordAdapter, EngineConfig, Measure, MetricsError,
    ProgressReport, WeeklySummary,
};

const CURRENT_WEEK: &str = r#"[
    {"id": "1", "date": "2024-01-15", "se": 88, "tst": 400, "sol": 20, "quality_rating": 4},
    {"id": "2", "date": "2024-01-16", "se": 92, "tst": 420, "sol": 15, "quality_rating": 4},
    {"id": "3", "date": "2024-01-17", "se": null, "tst": null, "sol": 25},
    {"id": "4", "date": "2024-01-18", "se": 85, "tst": 380, "sol": 30, "quality_rating": 3},
    {"id": "5", "date": "2024-01-19", "se": 90, "tst": 410, "sol": 10, "quality_rating": 5}
]"#;

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

#[test]
fn test_sparse_week_end_to_end() {
    let entries = DiaryRecordAdapter::parse_array(CURRENT_WEEK).unwrap();
    let summary = Aggregator::summarize(&entries, 7);

    assert_eq!(summary.avg_se, Some(88.8));
    assert_eq!(summary.avg_tst, Some(402.5));
    assert_eq!(summary.avg_sol, Some(20.0));
    assert_eq!(summary.avg_quality, Some(4.0));
    assert_eq!(summary.avg_waso, None);
    assert_eq!(summary.days_logged, 5);
    assert_eq!(summary.total_days, 7);

    assert_eq!(completion_rate(summary.days_logged, summary.total_days), 71);
    assert_eq!(efficiency_band(summary.avg_se), EfficiencyBand::Good);
    assert_eq!(format_duration(summary.avg_tst), "6h 43m");
    assert_eq!(quality_symbol_for_average(summary.avg_quality), quality_symbol(Some(4)));
}

#[test]
fn test_compare_against_previous_week() {
    let current = Aggregator::summarize(&DiaryRecordAdapter::parse_array(CURRENT_WEEK).unwrap(), 7);
    let previous = Aggregator::summarize(
        &DiaryRecordAdapter::parse_array(
            r#"[
                {"id": "p1", "date": "2024-01-08", "se": 78, "sol": 35},
                {"id": "p2", "date": "2024-01-09", "se": 82, "sol": 25}
            ]"#,
        )
        .unwrap(),
        7,
    );

    let comparison = Comparator::compare(current, Some(previous), None);

    assert_eq!(comparison.se_change, Some(11.0));
    assert_eq!(comparison.se_baseline_change, None);

    let sol = comparison.delta(Measure::Sol);
    assert_eq!(sol.vs_previous, Some(-10.0));
    let trend = trend_for(Measure::Sol, sol.vs_previous).unwrap();
    assert_eq!(trend.arrow, TrendArrow::Down);
    assert!(trend.favorable);
    assert_eq!(trend.magnitude, "10");
}

#[test]
fn test_summary_json_round_trips_through_compare() {
    let current = Aggregator::summarize(&DiaryRecordAdapter::parse_array(CURRENT_WEEK).unwrap(), 7);
    let json = serde_json::to_value(&current).unwrap();

    assert_eq!(json["avgSe"], 88.8);
    assert_eq!(json["avgWaso"], serde_json::Value::Null);
    assert_eq!(json["daysLogged"], 5);

    let parsed: WeeklySummary = serde_json::from_value(json).unwrap();
    let comparison = Comparator::compare(parsed, None, None);
    assert_eq!(comparison.current, current);
    assert!(comparison.previous.is_none());
}

#[test]
fn test_progress_report_from_ndjson() {
    let ndjson = "\
{\"id\": \"p1\", \"date\": \"2024-01-10\", \"se\": 80}
{\"id\": \"p2\", \"date\": \"2024-01-12\", \"se\": 80}
{\"id\": \"c1\", \"date\": \"2024-01-16\", \"se\": 88}
{\"id\": \"c2\", \"date\": \"2024-01-20\", \"se\": 92}
";
    let entries = DiaryRecordAdapter::parse_ndjson(ndjson).unwrap();

    let report = ProgressReport::build(&entries, date(1, 21), &EngineConfig::default()).unwrap();

    assert_eq!(report.comparison.current.days_logged, 2);
    assert_eq!(report.comparison.current.avg_se, Some(90.0));
    assert_eq!(report.comparison.se_change, Some(12.5));
    assert_eq!(report.completion_rate, 29);
    assert_eq!(report.rows.len(), Measure::ALL.len());
}

#[test]
fn test_invalid_record_is_rejected_before_aggregation() {
    let json = r#"[{"id": "1", "date": "2024-01-15", "se": "about ninety"}]"#;

    let err = DiaryRecordAdapter::parse_array(json).unwrap_err();

    assert!(matches!(err, MetricsError::Validation(_)));
    assert!(err.to_string().contains("se"));
}

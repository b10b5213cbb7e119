//! Progress report orchestration
//!
//! Runs the full pipeline for a report date: select the current, previous and
//! baseline windows from the supplied entries, summarize each, compare them,
//! and format one display row per measure.

use crate::aggregator::Aggregator;
use crate::comparator::Comparator;
use crate::config::EngineConfig;
use crate::derive::fill_missing_all;
use crate::error::MetricsError;
use crate::presenter::{
    completion_rate, efficiency_band, format_measure, trend_for, EfficiencyBand, Trend,
};
use crate::types::{DiaryEntry, Measure, MetricsComparison, WeeklySummary};
use crate::window::DateWindow;
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// One measure's display values across windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub measure: Measure,
    pub label: String,
    pub current: String,
    pub previous: String,
    pub baseline: String,
    pub trend_vs_previous: Option<Trend>,
    pub trend_vs_baseline: Option<Trend>,
}

/// Windows the report was computed over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportWindows {
    pub current: DateWindow,
    pub previous: DateWindow,
    pub baseline: Option<DateWindow>,
}

/// Weekly progress report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    pub report_id: String,
    pub producer: String,
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub as_of: NaiveDate,
    pub windows: ReportWindows,
    pub comparison: MetricsComparison,
    /// Percent of the current window with a logged entry
    pub completion_rate: u32,
    pub efficiency_band: EfficiencyBand,
    pub rows: Vec<MetricRow>,
}

impl ProgressReport {
    /// Build a report for the window ending on `as_of`.
    ///
    /// `entries` may span any dates; each window selects its own. The
    /// previous window is always computed, and is `None` in the comparison
    /// only when it holds no entries.
    pub fn build(
        entries: &[DiaryEntry],
        as_of: NaiveDate,
        config: &EngineConfig,
    ) -> Result<Self, MetricsError> {
        config.validate()?;

        let derived;
        let entries = if config.derive_missing {
            derived = fill_missing_all(entries.to_vec());
            derived.as_slice()
        } else {
            entries
        };

        let current_window = DateWindow::ending_on(as_of, config.window_days)?;
        let previous_window = current_window.preceding()?;
        let baseline_window = config
            .baseline_start
            .map(|start| DateWindow::new(start, config.window_days))
            .transpose()?;

        let current = Aggregator::summarize(current_window.select(entries), config.window_days);
        let previous = summarize_if_logged(&previous_window, entries);
        let baseline = baseline_window
            .as_ref()
            .and_then(|w| summarize_if_logged(w, entries));

        let comparison = Comparator::compare(current, previous, baseline);
        let rows = build_rows(&comparison);

        let report = ProgressReport {
            report_id: Uuid::new_v4().to_string(),
            producer: PRODUCER_NAME.to_string(),
            version: ENGINE_VERSION.to_string(),
            generated_at: Utc::now(),
            as_of,
            windows: ReportWindows {
                current: current_window,
                previous: previous_window,
                baseline: baseline_window,
            },
            completion_rate: completion_rate(
                comparison.current.days_logged,
                comparison.current.total_days,
            ),
            efficiency_band: efficiency_band(comparison.current.avg_se),
            comparison,
            rows,
        };

        info!(
            report_id = %report.report_id,
            %as_of,
            completion_rate = report.completion_rate,
            "built progress report"
        );

        Ok(report)
    }

    /// Serialize the report to JSON
    pub fn to_json(&self) -> Result<String, MetricsError> {
        Ok(serde_json::to_string(self)?)
    }
}

fn summarize_if_logged(
    window: &DateWindow,
    entries: &[DiaryEntry],
) -> Option<WeeklySummary> {
    let selected = window.select(entries);
    if selected.is_empty() {
        debug!(start = %window.start, "no entries in comparison window");
        return None;
    }
    Some(Aggregator::summarize(selected, window.days))
}

fn build_rows(comparison: &MetricsComparison) -> Vec<MetricRow> {
    Measure::ALL
        .iter()
        .map(|&measure| {
            let delta = comparison.delta(measure);
            let format_window = |summary: Option<&WeeklySummary>| {
                format_measure(measure, summary.and_then(|s| s.average(measure)))
            };

            MetricRow {
                measure,
                label: measure.label().to_string(),
                current: format_window(Some(&comparison.current)),
                previous: format_window(comparison.previous.as_ref()),
                baseline: format_window(comparison.baseline.as_ref()),
                trend_vs_previous: trend_for(measure, delta.vs_previous),
                trend_vs_baseline: trend_for(measure, delta.vs_baseline),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::{TrendArrow, PLACEHOLDER};

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn entry(day: u32, se: Option<f64>, sol: Option<f64>) -> DiaryEntry {
        let mut e = DiaryEntry::new(format!("e{day}"), date(1, day));
        e.se = se;
        e.sol = sol;
        e
    }

    fn sample_entries() -> Vec<DiaryEntry> {
        let mut entries = Vec::new();
        // Baseline week: Jan 1-7
        for d in 1..=7 {
            entries.push(entry(d, Some(75.0), Some(40.0)));
        }
        // Previous week: Jan 8-14
        for d in 8..=14 {
            entries.push(entry(d, Some(80.0), Some(30.0)));
        }
        // Current week: Jan 15-21, five days logged
        for (d, se) in [(15, 88.0), (16, 92.0), (18, 85.0), (19, 90.0)] {
            entries.push(entry(d, Some(se), Some(25.0)));
        }
        entries.push(entry(21, None, Some(25.0)));
        entries
    }

    #[test]
    fn test_report_with_baseline() {
        let config = EngineConfig {
            baseline_start: Some(date(1, 1)),
            ..EngineConfig::default()
        };

        let report = ProgressReport::build(&sample_entries(), date(1, 21), &config).unwrap();

        assert_eq!(report.windows.current.start, date(1, 15));
        assert_eq!(report.windows.previous.start, date(1, 8));
        assert_eq!(report.comparison.current.avg_se, Some(88.8));
        assert_eq!(report.comparison.current.days_logged, 5);
        assert_eq!(report.completion_rate, 71);
        assert_eq!(report.efficiency_band, EfficiencyBand::Good);
        // (88.8 - 80) / 80 * 100 = 11.0
        assert_eq!(report.comparison.se_change, Some(11.0));
        // (88.8 - 75) / 75 * 100 = 18.4
        assert_eq!(report.comparison.se_baseline_change, Some(18.4));

        let sol = report.rows.iter().find(|r| r.measure == Measure::Sol).unwrap();
        assert_eq!(sol.current, "25m");
        assert_eq!(sol.previous, "30m");
        let trend = sol.trend_vs_previous.as_ref().unwrap();
        assert_eq!(trend.arrow, TrendArrow::Down);
        assert!(trend.favorable);
        assert_eq!(trend.magnitude, "5");
    }

    #[test]
    fn test_report_without_history() {
        let entries: Vec<DiaryEntry> = sample_entries()
            .into_iter()
            .filter(|e| e.date >= date(1, 15))
            .collect();

        let report =
            ProgressReport::build(&entries, date(1, 21), &EngineConfig::default()).unwrap();

        assert!(report.comparison.previous.is_none());
        assert!(report.comparison.baseline.is_none());
        assert_eq!(report.comparison.se_change, None);
        assert!(report.windows.baseline.is_none());

        let se = report.rows.iter().find(|r| r.measure == Measure::Se).unwrap();
        assert_eq!(se.current, "89%");
        assert_eq!(se.previous, PLACEHOLDER);
        assert_eq!(se.trend_vs_previous, None);
    }

    #[test]
    fn test_report_empty_current_week() {
        let report =
            ProgressReport::build(&sample_entries(), date(3, 1), &EngineConfig::default())
                .unwrap();

        assert_eq!(report.comparison.current.days_logged, 0);
        assert_eq!(report.completion_rate, 0);
        assert_eq!(report.efficiency_band, EfficiencyBand::Neutral);
        assert_eq!(report.rows.len(), Measure::ALL.len());
    }

    #[test]
    fn test_report_derives_missing_measures() {
        use chrono::TimeZone;

        let mut e = DiaryEntry::new("e1", date(1, 21));
        e.ttb = Some(Utc.with_ymd_and_hms(2024, 1, 20, 23, 0, 0).unwrap());
        e.tob = Some(Utc.with_ymd_and_hms(2024, 1, 21, 7, 0, 0).unwrap());
        let config = EngineConfig {
            derive_missing: true,
            ..EngineConfig::default()
        };

        let report = ProgressReport::build(&[e.clone()], date(1, 21), &config).unwrap();
        assert_eq!(report.comparison.current.avg_tib, Some(480.0));

        let report = ProgressReport::build(&[e], date(1, 21), &EngineConfig::default()).unwrap();
        assert_eq!(report.comparison.current.avg_tib, None);
    }

    #[test]
    fn test_report_serializes() {
        let report =
            ProgressReport::build(&sample_entries(), date(1, 21), &EngineConfig::default())
                .unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["producer"], PRODUCER_NAME);
        assert_eq!(json["comparison"]["current"]["avgSe"], 88.8);
        assert_eq!(json["efficiency_band"], "good");
    }
}

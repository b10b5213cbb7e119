//! Weekly aggregation
//!
//! Reduces a window of diary entries into one `WeeklySummary`: the rounded
//! mean of each measure over the days it was recorded, plus coverage counts.

use crate::numeric::mean;
use crate::types::{DiaryEntry, Measure, WeeklySummary};
use tracing::debug;

/// Default window length in days
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Aggregator for reducing diary entries to summaries
pub struct Aggregator;

impl Aggregator {
    /// Summarize entries over a window of `total_days`.
    ///
    /// `total_days` is not checked against the number of entries; fewer
    /// entries means missed days. Input order does not affect the result.
    pub fn summarize<'a, I>(entries: I, total_days: u32) -> WeeklySummary
    where
        I: IntoIterator<Item = &'a DiaryEntry>,
    {
        let entries: Vec<&DiaryEntry> = entries.into_iter().collect();
        let avg = |measure: Measure| mean(entries.iter().map(|e| e.value(measure)));

        let summary = WeeklySummary {
            avg_tst: avg(Measure::Tst),
            avg_tib: avg(Measure::Tib),
            avg_se: avg(Measure::Se),
            avg_sol: avg(Measure::Sol),
            avg_waso: avg(Measure::Waso),
            avg_ema: avg(Measure::Ema),
            avg_twt: avg(Measure::Twt),
            avg_quality: avg(Measure::Quality),
            days_logged: entries.len() as u32,
            total_days,
        };

        debug!(
            days_logged = summary.days_logged,
            total_days,
            avg_se = ?summary.avg_se,
            "summarized diary window"
        );

        summary
    }

    /// Summarize over the default seven-day window
    pub fn summarize_week<'a, I>(entries: I) -> WeeklySummary
    where
        I: IntoIterator<Item = &'a DiaryEntry>,
    {
        Self::summarize(entries, DEFAULT_WINDOW_DAYS)
    }
}

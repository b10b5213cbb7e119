//! Calendar date windows
//!
//! A window is a run of consecutive calendar days. Reports use three: the
//! current window ending on the report date, the window just before it,
//! and an optional fixed baseline window.

use crate::error::MetricsError;
use crate::types::DiaryEntry;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Consecutive calendar days starting at `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub days: u32,
}

impl DateWindow {
    /// Window of `days` starting on `start`
    pub fn new(start: NaiveDate, days: u32) -> Result<Self, MetricsError> {
        if days == 0 {
            return Err(MetricsError::InvalidWindow(
                "window must span at least one day".to_string(),
            ));
        }
        start
            .checked_add_days(Days::new(u64::from(days - 1)))
            .ok_or_else(|| MetricsError::InvalidWindow(format!("window starting {start} overflows")))?;
        Ok(Self { start, days })
    }

    /// Window of `days` whose last day is `end`
    pub fn ending_on(end: NaiveDate, days: u32) -> Result<Self, MetricsError> {
        if days == 0 {
            return Err(MetricsError::InvalidWindow(
                "window must span at least one day".to_string(),
            ));
        }
        let start = end
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .ok_or_else(|| MetricsError::InvalidWindow(format!("window ending {end} underflows")))?;
        Ok(Self { start, days })
    }

    /// Last day of the window (inclusive)
    pub fn end(&self) -> NaiveDate {
        self.start
            .checked_add_days(Days::new(u64::from(self.days.saturating_sub(1))))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }

    /// Window of the same length ending the day before this one starts
    pub fn preceding(&self) -> Result<Self, MetricsError> {
        let end = self
            .start
            .pred_opt()
            .ok_or_else(|| MetricsError::InvalidWindow(format!("no day before {}", self.start)))?;
        Self::ending_on(end, self.days)
    }

    /// Entries whose date falls inside the window
    pub fn select<'a>(&self, entries: &'a [DiaryEntry]) -> Vec<&'a DiaryEntry> {
        let selected: Vec<&DiaryEntry> = entries.iter().filter(|e| self.contains(e.date)).collect();
        trace!(
            start = %self.start,
            end = %self.end(),
            selected = selected.len(),
            "selected window entries"
        );
        selected
    }
}

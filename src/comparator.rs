//! Window comparison
//!
//! Compares the current summary against the previous window and a fixed
//! baseline. Sleep efficiency is the primary outcome, so only SE gets a
//! percent change; other measures are compared by absolute difference.

use crate::numeric::{diff, percent_change};
use crate::types::{Measure, MeasureDelta, MetricsComparison, WeeklySummary};
use tracing::debug;

/// Comparator for building `MetricsComparison` values
pub struct Comparator;

impl Comparator {
    /// Compare `current` to optional previous and baseline summaries
    pub fn compare(
        current: WeeklySummary,
        previous: Option<WeeklySummary>,
        baseline: Option<WeeklySummary>,
    ) -> MetricsComparison {
        let se_change = percent_change(current.avg_se, previous.as_ref().and_then(|p| p.avg_se));
        let se_baseline_change =
            percent_change(current.avg_se, baseline.as_ref().and_then(|b| b.avg_se));

        debug!(
            has_previous = previous.is_some(),
            has_baseline = baseline.is_some(),
            se_change = ?se_change,
            se_baseline_change = ?se_baseline_change,
            "compared diary windows"
        );

        MetricsComparison {
            current,
            previous,
            baseline,
            se_change,
            se_baseline_change,
        }
    }
}

impl MetricsComparison {
    /// Absolute change of a measure's average vs. previous and baseline
    pub fn delta(&self, measure: Measure) -> MeasureDelta {
        let current = self.current.average(measure);
        MeasureDelta {
            measure,
            vs_previous: diff(current, self.previous.as_ref().and_then(|p| p.average(measure))),
            vs_baseline: diff(current, self.baseline.as_ref().and_then(|b| b.average(measure))),
        }
    }

    /// Deltas for every measure, in display order
    pub fn deltas(&self) -> Vec<MeasureDelta> {
        Measure::ALL.iter().map(|m| self.delta(*m)).collect()
    }
}

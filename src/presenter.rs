//! Display formatting and classification
//!
//! Pure functions that turn engine output into display tokens. Thresholds
//! and symbol tables here are fixed; callers and tests depend on the literals.

use crate::numeric::round1;
use crate::types::{Measure, Polarity};
use serde::{Deserialize, Serialize};

/// Token shown in place of a missing value
pub const PLACEHOLDER: &str = "--";

/// Symbol for a quality rating outside 1-5 or missing
pub const UNKNOWN_QUALITY_SYMBOL: &str = "❔";

/// Format minutes as `{h}h {m}m`, dropping zero segments.
///
/// `125` becomes `"2h 5m"`, `60` becomes `"1h"`, `0` becomes `"0m"`.
pub fn format_duration(minutes: Option<f64>) -> String {
    let Some(total) = minutes else {
        return PLACEHOLDER.to_string();
    };

    let hours = (total / 60.0).floor() as i64;
    let mins = (total % 60.0).round() as i64;

    match (hours, mins) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

/// Format a percentage rounded to a whole number
pub fn format_percentage(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}%", v.round() as i64),
        None => PLACEHOLDER.to_string(),
    }
}

/// Severity band for a sleep efficiency value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EfficiencyBand {
    Excellent,
    Good,
    Fair,
    Poor,
    Neutral,
}

impl EfficiencyBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            EfficiencyBand::Excellent => "excellent",
            EfficiencyBand::Good => "good",
            EfficiencyBand::Fair => "fair",
            EfficiencyBand::Poor => "poor",
            EfficiencyBand::Neutral => "neutral",
        }
    }
}

/// Classify sleep efficiency: 90+ excellent, 85+ good, 80+ fair, else poor
pub fn efficiency_band(se: Option<f64>) -> EfficiencyBand {
    match se {
        None => EfficiencyBand::Neutral,
        Some(v) if v >= 90.0 => EfficiencyBand::Excellent,
        Some(v) if v >= 85.0 => EfficiencyBand::Good,
        Some(v) if v >= 80.0 => EfficiencyBand::Fair,
        Some(_) => EfficiencyBand::Poor,
    }
}

/// Direction of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendArrow {
    Up,
    Down,
    Flat,
}

impl TrendArrow {
    pub fn symbol(&self) -> &'static str {
        match self {
            TrendArrow::Up => "↑",
            TrendArrow::Down => "↓",
            TrendArrow::Flat => "→",
        }
    }
}

/// Display descriptor for a difference between two windows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trend {
    pub arrow: TrendArrow,
    /// Whether the change is clinically favorable
    pub favorable: bool,
    /// Absolute size of the change
    pub magnitude: String,
}

/// Describe a difference. With `inverse`, a decrease is favorable.
pub fn trend(diff: Option<f64>, inverse: bool) -> Option<Trend> {
    let d = diff?;

    let arrow = if d > 0.0 {
        TrendArrow::Up
    } else if d < 0.0 {
        TrendArrow::Down
    } else {
        TrendArrow::Flat
    };
    let favorable = if inverse { d < 0.0 } else { d > 0.0 };

    Some(Trend {
        arrow,
        favorable,
        magnitude: format!("{}", round1(d.abs())),
    })
}

/// Describe a difference using the measure's own polarity
pub fn trend_for(measure: Measure, diff: Option<f64>) -> Option<Trend> {
    match measure.polarity() {
        Polarity::HigherIsBetter => trend(diff, false),
        Polarity::LowerIsBetter => trend(diff, true),
        Polarity::Neutral => trend(diff, false).map(|t| Trend {
            favorable: false,
            ..t
        }),
    }
}

/// Share of the window with a logged entry, as a whole percent
pub fn completion_rate(logged: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(logged) / f64::from(total) * 100.0).round() as u32
}

/// Symbol for a 1-5 quality rating
pub fn quality_symbol(rating: Option<i64>) -> &'static str {
    match rating {
        Some(1) => "😫",
        Some(2) => "😟",
        Some(3) => "😐",
        Some(4) => "🙂",
        Some(5) => "😄",
        _ => UNKNOWN_QUALITY_SYMBOL,
    }
}

/// Symbol for an averaged quality rating, rounded half away from zero.
///
/// `3.5` shows as a 4, `3.4` as a 3.
pub fn quality_symbol_for_average(average: Option<f64>) -> &'static str {
    quality_symbol(average.map(|q| q.round() as i64))
}

/// Format a measure's value for display
pub fn format_measure(measure: Measure, value: Option<f64>) -> String {
    match measure {
        Measure::Se => format_percentage(value),
        Measure::Quality => value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{v}/5")),
        _ => format_duration(value),
    }
}

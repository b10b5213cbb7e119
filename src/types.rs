//! Core types for the sleep diary metrics engine
//!
//! This module defines the values that flow through the engine: daily diary
//! entries, weekly summaries, and comparisons across windows. `None` is the
//! "not recorded" sentinel throughout and is never replaced with zero.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Clinical measures recorded in a sleep diary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// Total sleep time (minutes)
    Tst,
    /// Time in bed (minutes)
    Tib,
    /// Sleep efficiency (percent, 0-100)
    Se,
    /// Sleep onset latency (minutes)
    Sol,
    /// Wake after sleep onset (minutes)
    Waso,
    /// Early morning awakening (minutes)
    Ema,
    /// Total wake time (minutes)
    Twt,
    /// Subjective sleep quality (1-5)
    Quality,
}

/// Which direction of change is clinically favorable for a measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
    /// Neither direction is favorable on its own (time in bed)
    Neutral,
}

impl Measure {
    /// All measures, in display order
    pub const ALL: [Measure; 8] = [
        Measure::Tst,
        Measure::Tib,
        Measure::Se,
        Measure::Sol,
        Measure::Waso,
        Measure::Ema,
        Measure::Twt,
        Measure::Quality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Measure::Tst => "tst",
            Measure::Tib => "tib",
            Measure::Se => "se",
            Measure::Sol => "sol",
            Measure::Waso => "waso",
            Measure::Ema => "ema",
            Measure::Twt => "twt",
            Measure::Quality => "quality",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Measure::Tst => "Total Sleep Time",
            Measure::Tib => "Time In Bed",
            Measure::Se => "Sleep Efficiency",
            Measure::Sol => "Sleep Onset Latency",
            Measure::Waso => "Wake After Sleep Onset",
            Measure::Ema => "Early Morning Awakening",
            Measure::Twt => "Total Wake Time",
            Measure::Quality => "Sleep Quality",
        }
    }

    pub fn polarity(&self) -> Polarity {
        match self {
            Measure::Tst | Measure::Se | Measure::Quality => Polarity::HigherIsBetter,
            Measure::Sol | Measure::Waso | Measure::Ema | Measure::Twt => Polarity::LowerIsBetter,
            Measure::Tib => Polarity::Neutral,
        }
    }

    /// Whether the measure is a duration in minutes
    pub fn is_duration(&self) -> bool {
        !matches!(self, Measure::Se | Measure::Quality)
    }
}

/// One calendar day's sleep diary record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    /// Opaque identifier assigned by the entry supplier
    pub id: String,
    /// Calendar date the entry describes
    pub date: NaiveDate,
    /// Total sleep time (minutes)
    pub tst: Option<f64>,
    /// Time in bed (minutes)
    pub tib: Option<f64>,
    /// Sleep efficiency (percent, 0-100)
    pub se: Option<f64>,
    /// Sleep onset latency (minutes)
    pub sol: Option<f64>,
    /// Wake after sleep onset (minutes)
    pub waso: Option<f64>,
    /// Early morning awakening (minutes)
    pub ema: Option<f64>,
    /// Total wake time (minutes)
    pub twt: Option<f64>,
    /// Subjective quality rating (1-5)
    pub quality_rating: Option<u8>,
    /// Time to bed
    pub ttb: Option<DateTime<Utc>>,
    /// Time the patient fell asleep
    pub tts: Option<DateTime<Utc>>,
    /// Time of final awakening
    pub tfa: Option<DateTime<Utc>>,
    /// Time out of bed
    pub tob: Option<DateTime<Utc>>,
}

impl DiaryEntry {
    /// Create an entry with no recorded measures
    pub fn new(id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            date,
            tst: None,
            tib: None,
            se: None,
            sol: None,
            waso: None,
            ema: None,
            twt: None,
            quality_rating: None,
            ttb: None,
            tts: None,
            tfa: None,
            tob: None,
        }
    }

    /// Recorded value of a measure, if any
    pub fn value(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::Tst => self.tst,
            Measure::Tib => self.tib,
            Measure::Se => self.se,
            Measure::Sol => self.sol,
            Measure::Waso => self.waso,
            Measure::Ema => self.ema,
            Measure::Twt => self.twt,
            Measure::Quality => self.quality_rating.map(f64::from),
        }
    }
}

/// Averaged measures over a window of diary entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub avg_tst: Option<f64>,
    pub avg_tib: Option<f64>,
    pub avg_se: Option<f64>,
    pub avg_sol: Option<f64>,
    pub avg_waso: Option<f64>,
    pub avg_ema: Option<f64>,
    pub avg_twt: Option<f64>,
    pub avg_quality: Option<f64>,
    /// Number of entries supplied for the window
    pub days_logged: u32,
    /// Intended window length in days
    pub total_days: u32,
}

impl WeeklySummary {
    /// Average of a measure over the window
    pub fn average(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::Tst => self.avg_tst,
            Measure::Tib => self.avg_tib,
            Measure::Se => self.avg_se,
            Measure::Sol => self.avg_sol,
            Measure::Waso => self.avg_waso,
            Measure::Ema => self.avg_ema,
            Measure::Twt => self.avg_twt,
            Measure::Quality => self.avg_quality,
        }
    }
}

/// Current window compared against the previous window and a baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsComparison {
    pub current: WeeklySummary,
    pub previous: Option<WeeklySummary>,
    pub baseline: Option<WeeklySummary>,
    /// Percent change of average SE vs. the previous window
    pub se_change: Option<f64>,
    /// Percent change of average SE vs. the baseline window
    pub se_baseline_change: Option<f64>,
}

/// Absolute change of one measure's average across windows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureDelta {
    pub measure: Measure,
    pub vs_previous: Option<f64>,
    pub vs_baseline: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity_table() {
        assert_eq!(Measure::Se.polarity(), Polarity::HigherIsBetter);
        assert_eq!(Measure::Tst.polarity(), Polarity::HigherIsBetter);
        assert_eq!(Measure::Quality.polarity(), Polarity::HigherIsBetter);
        assert_eq!(Measure::Sol.polarity(), Polarity::LowerIsBetter);
        assert_eq!(Measure::Waso.polarity(), Polarity::LowerIsBetter);
        assert_eq!(Measure::Ema.polarity(), Polarity::LowerIsBetter);
        assert_eq!(Measure::Twt.polarity(), Polarity::LowerIsBetter);
        assert_eq!(Measure::Tib.polarity(), Polarity::Neutral);
    }

    #[test]
    fn test_entry_value_accessor() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let mut entry = DiaryEntry::new("e1", date);
        entry.se = Some(91.0);
        entry.quality_rating = Some(4);

        assert_eq!(entry.value(Measure::Se), Some(91.0));
        assert_eq!(entry.value(Measure::Quality), Some(4.0));
        assert_eq!(entry.value(Measure::Tst), None);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = WeeklySummary {
            avg_tst: Some(410.5),
            avg_tib: None,
            avg_se: Some(88.8),
            avg_sol: None,
            avg_waso: None,
            avg_ema: None,
            avg_twt: None,
            avg_quality: None,
            days_logged: 5,
            total_days: 7,
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["avgSe"], 88.8);
        assert_eq!(json["avgTib"], serde_json::Value::Null);
        assert_eq!(json["daysLogged"], 5);
        assert_eq!(json["totalDays"], 7);
    }
}

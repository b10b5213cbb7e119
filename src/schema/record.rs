//! Raw diary record shape
//!
//! Every field is kept as an untyped JSON value so that a malformed measure
//! produces a `ValidationError` naming the field instead of a generic serde
//! failure. Unknown fields (notes, patient ids) are ignored.

use crate::error::ValidationError;
use crate::types::DiaryEntry;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inclusive range allowed for minute-valued measures
const MINUTES_RANGE: (f64, f64) = (0.0, 1440.0);
/// Inclusive range for sleep efficiency
const PERCENT_RANGE: (f64, f64) = (0.0, 100.0);
/// Inclusive range for the quality rating
const QUALITY_RANGE: (f64, f64) = (1.0, 5.0);

/// A diary record as supplied, before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDiaryRecord {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub date: Value,
    #[serde(default)]
    pub tst: Value,
    #[serde(default)]
    pub tib: Value,
    #[serde(default)]
    pub se: Value,
    #[serde(default)]
    pub sol: Value,
    #[serde(default)]
    pub waso: Value,
    #[serde(default)]
    pub ema: Value,
    #[serde(default)]
    pub twt: Value,
    #[serde(default, alias = "qualityRating")]
    pub quality_rating: Value,
    #[serde(default)]
    pub ttb: Value,
    #[serde(default)]
    pub tts: Value,
    #[serde(default)]
    pub tfa: Value,
    #[serde(default)]
    pub tob: Value,
}

impl RawDiaryRecord {
    /// Identifier as a display string, if one was supplied
    pub fn id_hint(&self) -> Option<String> {
        match &self.id {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Validate and convert into a typed entry.
    ///
    /// `index` is only used to locate the record in error messages.
    pub fn into_entry(self, index: usize) -> Result<DiaryEntry, ValidationError> {
        let id = self
            .id_hint()
            .ok_or(ValidationError::MissingField { index, field: "id" })?;
        let date = parse_date(index, &self.date)?;

        Ok(DiaryEntry {
            id,
            date,
            tst: parse_measure(index, "tst", &self.tst, MINUTES_RANGE)?,
            tib: parse_measure(index, "tib", &self.tib, MINUTES_RANGE)?,
            se: parse_measure(index, "se", &self.se, PERCENT_RANGE)?,
            sol: parse_measure(index, "sol", &self.sol, MINUTES_RANGE)?,
            waso: parse_measure(index, "waso", &self.waso, MINUTES_RANGE)?,
            ema: parse_measure(index, "ema", &self.ema, MINUTES_RANGE)?,
            twt: parse_measure(index, "twt", &self.twt, MINUTES_RANGE)?,
            quality_rating: parse_rating(index, &self.quality_rating)?,
            ttb: parse_timestamp(index, "ttb", &self.ttb)?,
            tts: parse_timestamp(index, "tts", &self.tts)?,
            tfa: parse_timestamp(index, "tfa", &self.tfa)?,
            tob: parse_timestamp(index, "tob", &self.tob)?,
        })
    }
}

fn parse_date(index: usize, value: &Value) -> Result<NaiveDate, ValidationError> {
    let raw = match value {
        Value::Null => return Err(ValidationError::MissingField { index, field: "date" }),
        Value::String(s) => s.trim(),
        other => {
            return Err(ValidationError::InvalidDate {
                index,
                value: other.to_string(),
            })
        }
    };

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    // Midnight timestamps from date columns serialized as datetimes
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.date_naive());
    }

    Err(ValidationError::InvalidDate {
        index,
        value: raw.to_string(),
    })
}

/// Numeric measure: null or empty string is "not recorded".
///
/// Decimal strings are accepted since SQL numeric columns often arrive as text.
fn parse_measure(
    index: usize,
    field: &'static str,
    value: &Value,
    (min, max): (f64, f64),
) -> Result<Option<f64>, ValidationError> {
    let non_numeric = || ValidationError::NonNumericMeasure {
        index,
        field,
        value: value.to_string(),
    };

    let number = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64().ok_or_else(non_numeric)?,
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| non_numeric())?,
        _ => return Err(non_numeric()),
    };

    if !number.is_finite() {
        return Err(non_numeric());
    }
    if number < min || number > max {
        return Err(ValidationError::OutOfRange {
            index,
            field,
            value: number,
            min,
            max,
        });
    }
    Ok(Some(number))
}

fn parse_rating(index: usize, value: &Value) -> Result<Option<u8>, ValidationError> {
    let Some(rating) = parse_measure(index, "quality_rating", value, QUALITY_RANGE)? else {
        return Ok(None);
    };
    if rating.fract() != 0.0 {
        return Err(ValidationError::OutOfRange {
            index,
            field: "quality_rating",
            value: rating,
            min: QUALITY_RANGE.0,
            max: QUALITY_RANGE.1,
        });
    }
    Ok(Some(rating as u8))
}

fn parse_timestamp(
    index: usize,
    field: &'static str,
    value: &Value,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| ValidationError::InvalidTimestamp {
                index,
                field,
                value: s.clone(),
            }),
        other => Err(ValidationError::InvalidTimestamp {
            index,
            field,
            value: other.to_string(),
        }),
    }
}

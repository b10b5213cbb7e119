//! Adapter for converting raw diary payloads into diary entries

use crate::error::{MetricsError, ValidationError};
use crate::schema::record::RawDiaryRecord;
use crate::types::DiaryEntry;
use tracing::warn;

/// Adapter for parsing raw diary records
pub struct DiaryRecordAdapter;

impl DiaryRecordAdapter {
    /// Parse a JSON array of raw records without validating them
    pub fn parse_records(json: &str) -> Result<Vec<RawDiaryRecord>, MetricsError> {
        let records: Vec<RawDiaryRecord> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON into raw records, keeping each record's 1-based line number
    pub fn parse_ndjson_records(ndjson: &str) -> Result<Vec<(usize, RawDiaryRecord)>, MetricsError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawDiaryRecord>(trimmed) {
                Ok(record) => records.push((line_num + 1, record)),
                Err(e) => {
                    return Err(MetricsError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Parse and validate a JSON array of diary records, sorted by date.
    ///
    /// Stops at the first invalid record.
    pub fn parse_array(json: &str) -> Result<Vec<DiaryEntry>, MetricsError> {
        let records = Self::parse_records(json)?;
        Self::to_entries(records.into_iter().enumerate())
    }

    /// Parse and validate NDJSON diary records, sorted by date
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<DiaryEntry>, MetricsError> {
        let records = Self::parse_ndjson_records(ndjson)?;
        Self::to_entries(records)
    }

    /// Validate records, collecting every failure
    pub fn validate_records<I>(records: I) -> Vec<ValidationError>
    where
        I: IntoIterator<Item = (usize, RawDiaryRecord)>,
    {
        records
            .into_iter()
            .filter_map(|(index, record)| record.into_entry(index).err())
            .collect()
    }

    fn to_entries<I>(records: I) -> Result<Vec<DiaryEntry>, MetricsError>
    where
        I: IntoIterator<Item = (usize, RawDiaryRecord)>,
    {
        let mut entries = Vec::new();
        for (index, record) in records {
            let id = record.id_hint();
            match record.into_entry(index) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!(index, id = ?id, error = %e, "rejected diary record");
                    return Err(e.into());
                }
            }
        }

        entries.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(entries)
    }
}

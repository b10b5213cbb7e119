//! Derived diary measures
//!
//! Fills measures the patient did not enter directly from the four diary
//! timestamps, using the standard sleep diary arithmetic:
//! - TIB = out of bed - to bed
//! - SOL = to sleep - to bed
//! - EMA = out of bed - final awakening
//! - TWT = SOL + WASO + EMA
//! - TST = TIB - TWT
//! - SE = TST / TIB * 100
//!
//! Recorded values are never overwritten.

use crate::numeric::round1;
use crate::types::DiaryEntry;
use chrono::{DateTime, Utc};

/// Fill missing measures of an entry from its timestamps
pub fn fill_missing(mut entry: DiaryEntry) -> DiaryEntry {
    if entry.tib.is_none() {
        entry.tib = minutes_between(entry.ttb, entry.tob);
    }
    if entry.sol.is_none() {
        entry.sol = minutes_between(entry.ttb, entry.tts);
    }
    if entry.ema.is_none() {
        entry.ema = minutes_between(entry.tfa, entry.tob);
    }
    if entry.twt.is_none() {
        entry.twt = match (entry.sol, entry.waso, entry.ema) {
            (Some(sol), Some(waso), Some(ema)) => Some(sol + waso + ema),
            _ => None,
        };
    }
    if entry.tst.is_none() {
        entry.tst = match (entry.tib, entry.twt) {
            (Some(tib), Some(twt)) if tib >= twt => Some(tib - twt),
            _ => None,
        };
    }
    if entry.se.is_none() {
        entry.se = match (entry.tst, entry.tib) {
            (Some(tst), Some(tib)) if tib > 0.0 => Some(round1((tst / tib * 100.0).clamp(0.0, 100.0))),
            _ => None,
        };
    }
    entry
}

/// Fill missing measures for a batch of entries
pub fn fill_missing_all(entries: Vec<DiaryEntry>) -> Vec<DiaryEntry> {
    entries.into_iter().map(fill_missing).collect()
}

/// Whole minutes from `start` to `end`; `None` for a negative interval
fn minutes_between(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Option<f64> {
    let minutes = (end? - start?).num_minutes();
    if minutes < 0 {
        return None;
    }
    Some(minutes as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn at(day: u32, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0).unwrap())
    }

    fn make_entry() -> DiaryEntry {
        let mut entry = DiaryEntry::new("e1", NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
        entry.ttb = at(15, 22, 30);
        entry.tts = at(15, 22, 50);
        entry.tfa = at(16, 6, 0);
        entry.tob = at(16, 6, 30);
        entry.waso = Some(25.0);
        entry
    }

    #[test]
    fn test_fill_from_timestamps() {
        let entry = fill_missing(make_entry());

        assert_eq!(entry.tib, Some(480.0));
        assert_eq!(entry.sol, Some(20.0));
        assert_eq!(entry.ema, Some(30.0));
        assert_eq!(entry.twt, Some(75.0));
        assert_eq!(entry.tst, Some(405.0));
        // 405 / 480 = 84.375%
        assert_eq!(entry.se, Some(84.4));
    }

    #[test]
    fn test_recorded_values_kept() {
        let mut entry = make_entry();
        entry.se = Some(91.0);
        entry.sol = Some(10.0);

        let entry = fill_missing(entry);

        assert_eq!(entry.se, Some(91.0));
        assert_eq!(entry.sol, Some(10.0));
    }

    #[test]
    fn test_unrecorded_waso_blocks_tst() {
        let mut entry = make_entry();
        entry.waso = None;

        let entry = fill_missing(entry);

        assert_eq!(entry.tib, Some(480.0));
        assert_eq!(entry.twt, None);
        assert_eq!(entry.tst, None);
        assert_eq!(entry.se, None);
    }

    #[test]
    fn test_negative_interval_is_none() {
        let mut entry = make_entry();
        entry.tob = at(15, 22, 0);

        let entry = fill_missing(entry);

        assert_eq!(entry.tib, None);
        assert_eq!(entry.ema, None);
    }
}

//! FFI bindings for the sleep diary metrics engine
//!
//! C-compatible functions taking and returning JSON strings. Returned strings
//! are allocated here and must be released with `diary_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::NaiveDate;

use crate::aggregator::Aggregator;
use crate::comparator::Comparator;
use crate::config::EngineConfig;
use crate::error::MetricsError;
use crate::report::ProgressReport;
use crate::schema::DiaryRecordAdapter;
use crate::types::WeeklySummary;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Required C string argument
unsafe fn required_str(ptr: *const c_char, name: &str) -> Result<String, MetricsError> {
    optional_str(ptr, name)?
        .ok_or_else(|| MetricsError::ParseError(format!("Invalid {name} string pointer")))
}

/// Optional C string argument: NULL means absent
unsafe fn optional_str(ptr: *const c_char, name: &str) -> Result<Option<String>, MetricsError> {
    if ptr.is_null() {
        return Ok(None);
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(|s| Some(s.to_string()))
        .map_err(|_| MetricsError::ParseError(format!("{name} is not valid UTF-8")))
}

/// Convert a result into an owned C string, recording any error
fn into_c_result(result: Result<String, MetricsError>) -> *mut c_char {
    match result {
        Ok(json) => match CString::new(json) {
            Ok(cstr) => cstr.into_raw(),
            Err(_) => {
                set_last_error("Result contained an interior NUL byte");
                ptr::null_mut()
            }
        },
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

fn parse_summary(json: Option<String>) -> Result<Option<WeeklySummary>, MetricsError> {
    json.map(|s| serde_json::from_str(&s).map_err(MetricsError::from))
        .transpose()
}

// ============================================================================
// Stateless API
// ============================================================================

/// Summarize a JSON array of diary records into a weekly summary JSON object.
///
/// # Safety
/// - `entries_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `diary_free_string`.
/// - Returns NULL on error; call `diary_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn diary_summarize(entries_json: *const c_char, total_days: u32) -> *mut c_char {
    clear_last_error();

    let result = required_str(entries_json, "entries_json").and_then(|json| {
        let entries = DiaryRecordAdapter::parse_array(&json)?;
        Ok(serde_json::to_string(&Aggregator::summarize(&entries, total_days))?)
    });
    into_c_result(result)
}

/// Compare weekly summary JSON objects.
///
/// # Safety
/// - `current_json` must be a valid null-terminated C string.
/// - `previous_json` and `baseline_json` may be NULL when that window is absent.
/// - Returns a newly allocated string that must be freed with `diary_free_string`.
/// - Returns NULL on error; call `diary_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn diary_compare(
    current_json: *const c_char,
    previous_json: *const c_char,
    baseline_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let result = (|| -> Result<String, MetricsError> {
        let current: WeeklySummary =
            serde_json::from_str(&required_str(current_json, "current_json")?)?;
        let previous = parse_summary(optional_str(previous_json, "previous_json")?)?;
        let baseline = parse_summary(optional_str(baseline_json, "baseline_json")?)?;

        Ok(serde_json::to_string(&Comparator::compare(current, previous, baseline))?)
    })();
    into_c_result(result)
}

/// Build a progress report for the window ending on `as_of` (YYYY-MM-DD).
///
/// # Safety
/// - `entries_json` and `as_of` must be valid null-terminated C strings.
/// - `config_json` may be NULL to use the default configuration.
/// - Returns a newly allocated string that must be freed with `diary_free_string`.
/// - Returns NULL on error; call `diary_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn diary_progress_report(
    entries_json: *const c_char,
    as_of: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let result = (|| -> Result<String, MetricsError> {
        let entries = DiaryRecordAdapter::parse_array(&required_str(entries_json, "entries_json")?)?;
        let as_of = required_str(as_of, "as_of")?;
        let as_of = NaiveDate::parse_from_str(&as_of, "%Y-%m-%d")
            .map_err(|e| MetricsError::DateParseError(format!("{as_of}: {e}")))?;
        let config = match optional_str(config_json, "config_json")? {
            Some(json) => EngineConfig::from_json(&json)?,
            None => EngineConfig::default(),
        };

        ProgressReport::build(&entries, as_of, &config)?.to_json()
    })();
    into_c_result(result)
}

/// Free a string returned by diary functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a diary function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn diary_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next diary function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn diary_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn diary_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entries_json() -> CString {
        CString::new(
            r#"[
                {"id": "1", "date": "2024-01-15", "se": 88, "sol": 20},
                {"id": "2", "date": "2024-01-16", "se": 92, "sol": 15},
                {"id": "3", "date": "2024-01-17", "se": null},
                {"id": "4", "date": "2024-01-18", "se": 85},
                {"id": "5", "date": "2024-01-19", "se": 90}
            ]"#,
        )
        .unwrap()
    }

    fn take_json(ptr: *mut c_char) -> serde_json::Value {
        assert!(!ptr.is_null());
        unsafe {
            let value = serde_json::from_str(CStr::from_ptr(ptr).to_str().unwrap()).unwrap();
            diary_free_string(ptr);
            value
        }
    }

    #[test]
    fn test_ffi_summarize() {
        let json = sample_entries_json();

        let summary = take_json(unsafe { diary_summarize(json.as_ptr(), 7) });

        assert_eq!(summary["avgSe"], 88.8);
        assert_eq!(summary["daysLogged"], 5);
        assert_eq!(summary["totalDays"], 7);
    }

    #[test]
    fn test_ffi_compare_with_null_windows() {
        let current = CString::new(
            r#"{"avgTst":null,"avgTib":null,"avgSe":88.0,"avgSol":null,"avgWaso":null,
                "avgEma":null,"avgTwt":null,"avgQuality":null,"daysLogged":7,"totalDays":7}"#,
        )
        .unwrap();

        let comparison =
            take_json(unsafe { diary_compare(current.as_ptr(), ptr::null(), ptr::null()) });

        assert_eq!(comparison["seChange"], serde_json::Value::Null);
        assert_eq!(comparison["previous"], serde_json::Value::Null);
    }

    #[test]
    fn test_ffi_progress_report() {
        let json = sample_entries_json();
        let as_of = CString::new("2024-01-21").unwrap();

        let report =
            take_json(unsafe { diary_progress_report(json.as_ptr(), as_of.as_ptr(), ptr::null()) });

        assert_eq!(report["completion_rate"], 71);
        assert_eq!(report["comparison"]["current"]["avgSe"], 88.8);
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid = CString::new(r#"[{"id": "1", "date": "2024-01-15", "se": "high"}]"#).unwrap();

            let result = diary_summarize(invalid.as_ptr(), 7);
            assert!(result.is_null());

            let error = diary_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.contains("se"));

            let result = diary_summarize(ptr::null(), 7);
            assert!(result.is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = diary_version();
            assert!(!version.is_null());
            assert!(!CStr::from_ptr(version).to_str().unwrap().is_empty());
        }
    }
}

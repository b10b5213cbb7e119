//! Sleep Diary Metrics - weekly aggregation and trend comparison for sleep diaries
//!
//! Daily diary entries flow through a deterministic pipeline:
//! entry validation → window selection → aggregation → comparison → presentation.
//!
//! ## Modules
//!
//! - **Aggregator**: reduce a window of entries into a `WeeklySummary`
//! - **Comparator**: compare current, previous and baseline summaries
//! - **Presenter**: format and classify values for display
//!
//! Missing data is `None` at every stage. Nothing in the core panics or
//! divides by zero on sparse input.

pub mod aggregator;
pub mod comparator;
pub mod config;
pub mod derive;
pub mod error;
pub mod numeric;
pub mod presenter;
pub mod report;
pub mod schema;
pub mod types;
pub mod window;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use aggregator::{Aggregator, DEFAULT_WINDOW_DAYS};
pub use comparator::Comparator;
pub use config::EngineConfig;
pub use error::{MetricsError, ValidationError};
pub use report::ProgressReport;
pub use schema::{DiaryRecordAdapter, RawDiaryRecord};
pub use types::{DiaryEntry, Measure, MeasureDelta, MetricsComparison, Polarity, WeeklySummary};
pub use window::DateWindow;

/// Engine version embedded in reports
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "sleep-diary-metrics";

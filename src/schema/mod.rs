//! Untyped diary record boundary
//!
//! Raw diary records arrive as JSON from the entry supplier. This module turns
//! them into typed `DiaryEntry` values and rejects malformed measures with a
//! named `ValidationError` before anything reaches the aggregator.

mod adapter;
mod record;

pub use adapter::*;
pub use record::*;

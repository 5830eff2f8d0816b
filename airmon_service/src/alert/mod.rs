//! Operator-facing status derived from station readings.
//!
//! Submodules:
//! - `categories` — alert / good grouping of the category labels stations report.

pub mod categories;

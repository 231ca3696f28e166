//! Data layer of the PV report generator.
//!
//! Responsible for discovering and parsing the per-day CSV exports, merging
//! them into one clean chronological series, and grouping that series by
//! calendar month and calendar day.

pub mod aggregator;
pub mod analysis;
pub mod merger;
pub mod reader;

pub use report_core as core;

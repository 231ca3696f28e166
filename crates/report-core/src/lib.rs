//! Shared vocabulary of the PV report generator: the measurement model,
//! configuration, error type and small formatting helpers.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{ReportError, Result};

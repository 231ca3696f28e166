//! Rendering layer of the PV report generator.
//!
//! Lays the analysed data out as a sequence of title and chart pages, draws
//! each page with [`plotters`], and writes the result as one multi-page PDF.

pub mod axis;
pub mod document;
pub mod pages;
pub mod palette;
pub mod writer;

pub use document::{ReportBuilder, ReportDocument};
pub use report_core as core;
pub use writer::{write_document, DocumentWriter};

//! Adapters layer: Concrete implementations of ports.
//!
//! - `http`: ureq client for the prediction service
//! - `export`: docx-rs report writer
//! - `sanitize`: credential filtering for logs

pub mod export;
pub mod http;
pub mod sanitize;

pub use export::DocxReportSink;
pub use http::HttpRiskApi;

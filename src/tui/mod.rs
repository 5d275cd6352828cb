//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides the five assessment screens:
//! - Welcome and facility type selection
//! - Parameter form with county picker
//! - Loading screen with the minimum-duration gate
//! - Results report with document export

mod app;
mod styles;
mod ui;
mod worker;

pub use app::App;
pub use styles::CareTheme;
pub use ui::results::rasterize;
pub use worker::{AssessmentWorkers, WorkerUpdate};

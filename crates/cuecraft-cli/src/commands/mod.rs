//! CLI command implementations

pub mod analyze;
pub mod generate;
pub mod library;
pub mod narration;
pub mod scene;

mod reporting;

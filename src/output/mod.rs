//! Output module for Shiori
//!
//! This module produces the artifacts of a run:
//! - The chapter document, written block by block in chapter order
//! - The terminal progress bar shown while chapters are captured

mod document;
mod progress;

pub use document::{document_path, DocumentWriter};
pub use progress::CaptureProgress;

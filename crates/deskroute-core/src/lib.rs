//! deskroute Core
//!
//! Core types and utilities shared across deskroute components.
//!
//! This crate provides:
//! - Error types and result handling
//! - Labeled text samples and the JSON Lines dataset format used for
//!   training, evaluation and the learned-queries journal

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{load_dataset, parse_dataset, LabeledText};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::LabeledText;
}

//! # plume-core
//!
//! Core types, traits, and abstractions for plume.
//!
//! This crate provides the request/result models, the error taxonomy, the
//! session quota tracker and the backend trait that the other plume crates
//! depend on.

pub mod defaults;
pub mod error;
pub mod history;
pub mod models;
pub mod quota;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, InputError, ParseError, Result};
pub use history::{HistoryEntry, HistoryOutcome, SessionHistory};
pub use models::*;
pub use quota::{QuotaPermit, QuotaState, QuotaTracker};
pub use traits::*;

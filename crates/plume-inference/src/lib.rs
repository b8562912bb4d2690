//! # plume-inference
//!
//! Structured generation and critique orchestration for plume.
//!
//! This crate provides:
//! - Input normalization and validation per mode
//! - Attachment transcoding to inline base64 parts
//! - Prompt assembly and per-mode system instructions
//! - Response schemas attached to every call
//! - Strict response parsing into typed results
//! - The Gemini backend (feature `gemini`, default)
//! - The [`Orchestrator`] that wires it together with the session quota
//!
//! # Feature Flags
//!
//! - `gemini` (default): Enable the Gemini backend
//! - `mock`: Expose [`mock::MockGenerationBackend`] to other crates
//!
//! # Example
//!
//! ```rust,no_run
//! use plume_inference::{CritiqueRequest, Orchestrator, Purpose};
//!
//! #[tokio::main]
//! async fn main() {
//!     let orchestrator = Orchestrator::from_env().unwrap();
//!     let request = CritiqueRequest::new("我用这个方法3个月瘦了10斤", "正文……", Purpose::Growth);
//!     let result = orchestrator.submit_critique(request).await.unwrap();
//!     println!("{} / 100", result.score);
//! }
//! ```

pub mod attachments;
pub mod invoker;
pub mod normalize;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod schema;

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use plume_core::*;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiBackend, GeminiConfig};

pub use orchestrator::Orchestrator;
pub use parser::parse;
pub use schema::response_schema;

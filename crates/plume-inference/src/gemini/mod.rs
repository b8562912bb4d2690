//! Gemini generation backend.
//!
//! Talks to the `generateContent` REST endpoint with a response schema
//! attached, so the service itself constrains output to the requested JSON
//! shape.
//!
//! # Example
//!
//! ```rust,no_run
//! use plume_inference::gemini::{GeminiBackend, GeminiConfig};
//! use plume_core::GenerationBackend;
//!
//! // From environment variables (GEMINI_API_KEY, PLUME_GEMINI_MODEL, ...)
//! let backend = GeminiBackend::from_env().unwrap();
//!
//! // Or with custom config
//! let config = GeminiConfig {
//!     base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
//!     api_key: Some("your-key".to_string()),
//!     model: "gemini-3-flash-preview".to_string(),
//! };
//! let backend = GeminiBackend::new(config).unwrap();
//! assert!(backend.ensure_configured().is_ok());
//! ```

mod backend;
mod error;
mod types;

pub use backend::{
    GeminiBackend, GeminiConfig, DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_URL, JSON_MIME_TYPE,
};
pub use error::{to_plume_error, GeminiErrorCode};
pub use types::*;

//! Core traits for plume abstractions.
//!
//! The generation backend is the only seam: everything above it (input
//! shaping, prompts, schemas, parsing, quota) is backend-agnostic.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::Result;

// =============================================================================
// PAYLOAD TYPES
// =============================================================================

/// An attachment ready for transmission: base64 bytes plus media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPart {
    /// Name of the attachment this part came from.
    pub name: String,
    pub mime_type: String,
    /// Standard base64 (with padding).
    pub data: String,
}

/// One element of the ordered user content sent to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    InlineData(EncodedPart),
    Text(String),
}

impl ContentPart {
    pub fn is_text(&self) -> bool {
        matches!(self, ContentPart::Text(_))
    }
}

/// Everything a backend needs for one schema-constrained call.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    /// Fixed per-mode template, sent as the system-level instruction.
    pub system_instruction: String,
    /// Ordered user content: inline data parts first, then the prompt text.
    pub parts: Vec<ContentPart>,
    /// Response-shape constraint the backend must honour.
    pub response_schema: JsonValue,
}

impl StructuredRequest {
    pub fn attachment_count(&self) -> usize {
        self.parts.iter().filter(|p| !p.is_text()).count()
    }

    pub fn prompt_len(&self) -> usize {
        self.parts
            .iter()
            .map(|p| match p {
                ContentPart::Text(text) => text.len(),
                ContentPart::InlineData(_) => 0,
            })
            .sum()
    }
}

// =============================================================================
// BACKEND TRAIT
// =============================================================================

/// Backend for schema-constrained text generation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run one generation and return the raw response text.
    ///
    /// Exactly one attempt; implementations do not retry and do not impose a
    /// timeout of their own.
    async fn generate_structured(&self, request: &StructuredRequest) -> Result<String>;

    /// Fail with `Error::Config` when the backend cannot be called at all
    /// (e.g. missing credentials). Must not touch the network.
    fn ensure_configured(&self) -> Result<()>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> StructuredRequest {
        StructuredRequest {
            system_instruction: "sys".to_string(),
            parts: vec![
                ContentPart::InlineData(EncodedPart {
                    name: "a.png".to_string(),
                    mime_type: "image/png".to_string(),
                    data: "AAAA".to_string(),
                }),
                ContentPart::Text("hello".to_string()),
            ],
            response_schema: serde_json::json!({"type": "OBJECT"}),
        }
    }

    #[test]
    fn test_attachment_count_ignores_text() {
        assert_eq!(sample_request().attachment_count(), 1);
    }

    #[test]
    fn test_prompt_len_counts_text_bytes_only() {
        assert_eq!(sample_request().prompt_len(), 5);
    }

    #[test]
    fn test_content_part_is_text() {
        assert!(ContentPart::Text(String::new()).is_text());
        assert!(!sample_request().parts[0].is_text());
    }
}

//! Single schema-constrained call to a generation backend.

use std::time::Instant;

use serde_json::Value;
use tracing::{debug, instrument};

use plume_core::{ContentPart, EncodedPart, Error, GenerationBackend, Result, StructuredRequest};

/// Build the ordered backend request: inline image parts, then the prompt.
pub fn build_request(
    system_instruction: &str,
    prompt: String,
    parts: Vec<EncodedPart>,
    schema: &Value,
) -> StructuredRequest {
    let mut content: Vec<ContentPart> = parts.into_iter().map(ContentPart::InlineData).collect();
    content.push(ContentPart::Text(prompt));
    StructuredRequest {
        system_instruction: system_instruction.to_string(),
        parts: content,
        response_schema: schema.clone(),
    }
}

/// Submit once and return the raw response text.
///
/// Credentials are checked before anything is sent. No retry and no timeout;
/// a caller that needs a deadline drops the future.
#[instrument(skip_all, fields(subsystem = "orchestrator", component = "invoker", op = "invoke", model = backend.model_name(), attachment_count = request.attachment_count()))]
pub async fn invoke(
    backend: &dyn GenerationBackend,
    request: &StructuredRequest,
) -> Result<String> {
    backend.ensure_configured()?;

    let start = Instant::now();
    let raw = backend.generate_structured(request).await?;
    if raw.trim().is_empty() {
        return Err(Error::EmptyResponse);
    }

    debug!(
        response_len = raw.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Backend responded"
    );
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGenerationBackend;
    use serde_json::json;

    fn part(name: &str) -> EncodedPart {
        EncodedPart {
            name: name.to_string(),
            mime_type: "image/jpeg".to_string(),
            data: "AA==".to_string(),
        }
    }

    #[test]
    fn test_build_request_puts_images_first() {
        let request = build_request(
            "sys",
            "prompt".to_string(),
            vec![part("a"), part("b")],
            &json!({"type": "OBJECT"}),
        );
        assert_eq!(request.parts.len(), 3);
        assert!(!request.parts[0].is_text());
        assert!(!request.parts[1].is_text());
        assert_eq!(request.parts[2], ContentPart::Text("prompt".to_string()));
        assert_eq!(request.attachment_count(), 2);
        assert_eq!(request.response_schema["type"], "OBJECT");
    }

    #[test]
    fn test_build_request_without_images() {
        let request = build_request("sys", "p".to_string(), vec![], &json!({}));
        assert_eq!(request.parts, vec![ContentPart::Text("p".to_string())]);
    }

    #[tokio::test]
    async fn test_invoke_returns_raw_text() {
        let backend = MockGenerationBackend::new().with_fixed_response("{\"ok\":true}");
        let request = build_request("sys", "p".to_string(), vec![], &json!({}));
        let raw = invoke(&backend, &request).await.unwrap();
        assert_eq!(raw, "{\"ok\":true}");
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_invoke_unconfigured_never_calls_backend() {
        let backend = MockGenerationBackend::new().unconfigured();
        let request = build_request("sys", "p".to_string(), vec![], &json!({}));
        let err = invoke(&backend, &request).await.unwrap_err();
        assert_eq!(err.kind(), "configuration");
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invoke_blank_response_is_empty() {
        let backend = MockGenerationBackend::new().with_fixed_response("  \n");
        let request = build_request("sys", "p".to_string(), vec![], &json!({}));
        let err = invoke(&backend, &request).await.unwrap_err();
        assert_eq!(err.kind(), "empty_response");
    }

    #[tokio::test]
    async fn test_invoke_passes_backend_error_through() {
        let backend = MockGenerationBackend::new().with_error("boom");
        let request = build_request("sys", "p".to_string(), vec![], &json!({}));
        let err = invoke(&backend, &request).await.unwrap_err();
        assert_eq!(err.kind(), "backend");
        assert!(err.to_string().contains("boom"));
    }
}

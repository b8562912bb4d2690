//! Gemini generation backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use plume_core::defaults;
use plume_core::{Error, GenerationBackend, Result, StructuredRequest};

use super::error::{to_plume_error, GeminiErrorCode};
use super::types::*;

/// Default Gemini endpoint.
pub const DEFAULT_GEMINI_URL: &str = defaults::GEMINI_URL;

/// Default generation model.
pub const DEFAULT_GEMINI_MODEL: &str = defaults::GEMINI_MODEL;

/// Response MIME type requested for every call.
pub const JSON_MIME_TYPE: &str = "application/json";

/// Configuration for the Gemini backend.
#[derive(Clone)]
pub struct GeminiConfig {
    /// Base URL, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub base_url: String,
    /// API key. Checked at call time, never at construction.
    pub api_key: Option<String>,
    /// Model to use for generation.
    pub model: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEMINI_URL.to_string(),
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl GeminiConfig {
    /// Load from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `GEMINI_API_KEY`, then `API_KEY` | (none) |
    /// | `PLUME_GEMINI_BASE_URL` | [`DEFAULT_GEMINI_URL`] |
    /// | `PLUME_GEMINI_MODEL` | [`DEFAULT_GEMINI_MODEL`] |
    pub fn from_env() -> Self {
        Self {
            base_url: non_empty_env(defaults::ENV_GEMINI_BASE_URL)
                .unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string()),
            api_key: non_empty_env(defaults::ENV_GEMINI_API_KEY)
                .or_else(|| non_empty_env(defaults::ENV_API_KEY)),
            model: non_empty_env(defaults::ENV_GEMINI_MODEL)
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Gemini base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }
        if self.model.trim().is_empty() {
            return Err(Error::Config("Gemini model cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Gemini `generateContent` backend.
///
/// The HTTP client has no timeout; cancellation belongs to the caller.
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Create a new Gemini backend with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "gemini",
            model = %config.model,
            base_url = %config.base_url,
            api_key_present = config.api_key.is_some(),
            "Initializing Gemini backend"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str> {
        self.config.api_key.as_deref().ok_or_else(|| {
            Error::Config(format!(
                "API key is missing; set {} or {}",
                defaults::ENV_GEMINI_API_KEY,
                defaults::ENV_API_KEY
            ))
        })
    }

    fn endpoint(&self) -> String {
        let model = self.config.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!(
            "{}/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model_path
        )
    }

    fn build_body(request: &StructuredRequest) -> GenerateContentRequest {
        let system_instruction = (!request.system_instruction.is_empty()).then(|| Content {
            role: None,
            parts: vec![Part::text(request.system_instruction.clone())],
        });

        GenerateContentRequest {
            system_instruction,
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: request.parts.iter().map(Part::from).collect(),
            }],
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME_TYPE.to_string(),
                response_schema: request.response_schema.clone(),
                temperature: None,
            },
        }
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    #[instrument(skip(self, request), fields(subsystem = "inference", component = "gemini", op = "generate_structured", model = %self.config.model, prompt_len = request.prompt_len(), attachment_count = request.attachment_count()))]
    async fn generate_structured(&self, request: &StructuredRequest) -> Result<String> {
        let api_key = self.api_key()?;
        let start = Instant::now();

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&Self::build_body(request))
            .send()
            .await
            .map_err(|e| Error::Backend(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let (error_status, message) = match serde_json::from_str::<GeminiErrorResponse>(&body) {
                Ok(parsed) => (parsed.error.status.unwrap_or_default(), parsed.error.message),
                Err(_) => (String::new(), body),
            };
            let code = GeminiErrorCode::from_response(status, &error_status, &message);
            warn!(status, error_code = ?code, "Gemini request failed");
            return Err(to_plume_error(code, status, &message));
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Backend(format!("Failed to parse response: {}", e)))?;

        if let Some(reason) = result
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(Error::Backend(format!("Prompt blocked: {}", reason)));
        }

        let Some(candidate) = result.candidates.first() else {
            return Err(Error::EmptyResponse);
        };

        let finish_reason = candidate.finish_reason.as_deref().unwrap_or("UNSPECIFIED");
        if finish_reason != "STOP" {
            warn!(finish_reason, "Gemini did not finish normally");
        }

        let text = candidate.text();
        if text.trim().is_empty() {
            return Err(Error::EmptyResponse);
        }

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            response_len = text.len(),
            duration_ms = elapsed,
            total_tokens = result.usage_metadata.as_ref().and_then(|u| u.total_token_count),
            "Generation complete"
        );
        if elapsed > defaults::SLOW_GENERATION_MS {
            warn!(duration_ms = elapsed, slow = true, "Slow generation");
        }

        Ok(text)
    }

    fn ensure_configured(&self) -> Result<()> {
        self.api_key().map(|_| ())
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plume_core::{ContentPart, EncodedPart};
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = GeminiConfig::default();
        assert_eq!(config.base_url, DEFAULT_GEMINI_URL);
        assert_eq!(config.model, DEFAULT_GEMINI_MODEL);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = GeminiConfig {
            api_key: Some("secret-key".to_string()),
            ..Default::default()
        };
        let dbg = format!("{:?}", config);
        assert!(!dbg.contains("secret-key"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = GeminiConfig {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().kind(), "configuration");
        assert!(GeminiBackend::new(config).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let config = GeminiConfig {
            model: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_key_fails_configuration_check() {
        let backend = GeminiBackend::new(GeminiConfig::default()).unwrap();
        let err = backend.ensure_configured().unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_present_key_passes_configuration_check() {
        let backend = GeminiBackend::new(GeminiConfig {
            api_key: Some("k".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(backend.ensure_configured().is_ok());
        assert_eq!(backend.model_name(), DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn test_endpoint_formats_model_path() {
        let backend = GeminiBackend::new(GeminiConfig {
            base_url: "http://localhost:9000/v1beta/".to_string(),
            model: "gemini-test".to_string(),
            api_key: None,
        })
        .unwrap();
        assert_eq!(
            backend.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-test:generateContent"
        );

        let backend = GeminiBackend::new(GeminiConfig {
            model: "models/gemini-test".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert!(backend.endpoint().ends_with("/models/gemini-test:generateContent"));
    }

    #[test]
    fn test_build_body_keeps_part_order() {
        let request = StructuredRequest {
            system_instruction: "sys".to_string(),
            parts: vec![
                ContentPart::InlineData(EncodedPart {
                    name: "a".to_string(),
                    mime_type: "image/png".to_string(),
                    data: "AA==".to_string(),
                }),
                ContentPart::Text("prompt".to_string()),
            ],
            response_schema: json!({"type": "OBJECT"}),
        };
        let body = serde_json::to_value(GeminiBackend::build_body(&request)).unwrap();
        assert!(body["contents"][0]["parts"][0].get("inlineData").is_some());
        assert_eq!(body["contents"][0]["parts"][1]["text"], "prompt");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "sys");
    }

    #[test]
    fn test_build_body_omits_empty_system_instruction() {
        let request = StructuredRequest {
            system_instruction: String::new(),
            parts: vec![ContentPart::Text("p".to_string())],
            response_schema: json!({}),
        };
        let body = serde_json::to_value(GeminiBackend::build_body(&request)).unwrap();
        assert!(body.get("systemInstruction").is_none());
    }
}

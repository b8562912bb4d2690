//! Mock generation backend for deterministic testing.
//!
//! Compiled for this crate's tests, or elsewhere with the `mock` feature.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use plume_inference::mock::MockGenerationBackend;
//!
//! let backend = MockGenerationBackend::new()
//!     .with_fixed_response(r#"{"score": 80}"#)
//!     .with_latency_ms(10);
//! assert_eq!(backend.call_count(), 0);
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use plume_core::{Error, GenerationBackend, Result, StructuredRequest};

/// Mock backend: returns a fixed response (or error) and records every call.
#[derive(Clone)]
pub struct MockGenerationBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    response: std::result::Result<String, String>,
    latency_ms: u64,
    configured: bool,
}

/// One recorded call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub request: StructuredRequest,
    pub timestamp: std::time::Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            response: Ok("{}".to_string()),
            latency_ms: 0,
            configured: true,
        }
    }
}

impl MockGenerationBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set a fixed response for every call.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).response = Ok(response.into());
        self
    }

    /// Fail every call with `Error::Backend(message)`.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).response = Err(message.into());
        self
    }

    /// Set simulated latency for every call.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Behave as if credentials were missing.
    pub fn unconfigured(mut self) -> Self {
        Arc::make_mut(&mut self.config).configured = false;
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.call_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear()
    }
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate_structured(&self, request: &StructuredRequest) -> Result<String> {
        self.call_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(MockCall {
                request: request.clone(),
                timestamp: std::time::Instant::now(),
            });

        if self.config.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        self.config.response.clone().map_err(Error::Backend)
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.config.configured {
            Ok(())
        } else {
            Err(Error::Config("mock backend has no API key".to_string()))
        }
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

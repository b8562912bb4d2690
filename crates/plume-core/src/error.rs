//! Error types for plume.

use thiserror::Error;

/// Result type alias using plume's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Generic failure message shown to end users for backend-side problems.
pub const USER_MESSAGE_GENERIC: &str = "生成失败，请检查 API Key 设置或重试。";

/// Failure message shown to end users when their input was rejected.
pub const USER_MESSAGE_INPUT: &str = "输入内容不完整或超出长度限制，请检查后重试。";

/// Failure message shown to end users when the session quota is used up.
pub const USER_MESSAGE_QUOTA: &str = "今日免费次数已用完，请明天再来。";

/// Core error type for plume operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller-fixable validation failure.
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    /// An attachment could not be read or transcoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Missing or invalid configuration (e.g. no API key).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or generation service failure.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend answered but produced no text.
    #[error("Backend returned an empty response")]
    EmptyResponse,

    /// The backend output did not satisfy the response contract.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// No invocations left in the current session.
    #[error("Quota exceeded: all {limit} invocations for this session are used")]
    QuotaExceeded { limit: u32 },
}

/// Local validation failures raised before any backend contact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("at least one image attachment is required")]
    MissingAttachments,

    #[error("key points must not be empty")]
    MissingKeyPoints,

    #[error("required field '{0}' is empty")]
    MissingField(&'static str),

    #[error("field '{field}' is {actual} characters long, maximum is {max}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// Backend output that violates the declared response contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Not decodable as JSON. Carries the offending raw text.
    #[error("malformed JSON ({reason})")]
    Malformed { raw: String, reason: String },

    /// Decoded, but a required field is missing or has the wrong type.
    #[error("schema violation at '{field}': {reason}")]
    SchemaViolation { field: String, reason: String },
}

impl ParseError {
    pub fn violation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ParseError::SchemaViolation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl Error {
    /// Stable snake_case tag for structured logs and assertions.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Input(_) => "input",
            Error::Encoding(_) => "encoding",
            Error::Config(_) => "configuration",
            Error::Backend(_) => "backend",
            Error::EmptyResponse => "empty_response",
            Error::Parse(ParseError::Malformed { .. }) => "parse_malformed",
            Error::Parse(ParseError::SchemaViolation { .. }) => "parse_schema_violation",
            Error::QuotaExceeded { .. } => "quota_exceeded",
        }
    }

    /// Localized message for the presentation layer.
    ///
    /// Everything that is not the user's own doing collapses into one generic
    /// message; the precise kind stays available through [`Error::kind`].
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::Input(_) => USER_MESSAGE_INPUT,
            Error::QuotaExceeded { .. } => USER_MESSAGE_QUOTA,
            _ => USER_MESSAGE_GENERIC,
        }
    }

    /// Whether the error happened before the backend was contacted.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::Input(_) | Error::Encoding(_) | Error::Config(_) | Error::QuotaExceeded { .. }
        )
    }
}

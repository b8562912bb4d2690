//! Centralized default constants for plume.
//!
//! **This module is the single source of truth** for shared limits and
//! defaults. Crates reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// GENERATION INPUT
// =============================================================================

/// Maximum number of images a generation request may carry.
///
/// Extra attachments are dropped silently by the normalizer.
pub const MAX_ATTACHMENTS: usize = 9;

/// Maximum number of images actually transmitted to the backend.
///
/// Smaller than [`MAX_ATTACHMENTS`] on purpose; the upload limit and the
/// transmission limit are independent.
pub const MAX_TRANSMITTED_ATTACHMENTS: usize = 4;

// =============================================================================
// CRITIQUE INPUT
// =============================================================================

/// Title ceiling, in Unicode code points.
pub const TITLE_LIMIT: usize = 50;

/// Body ceiling, in Unicode code points.
pub const BODY_LIMIT: usize = 2000;

// =============================================================================
// SCORING
// =============================================================================

/// Upper bound of the overall critique score.
pub const SCORE_MAX: u32 = 100;

/// Upper bound of the title component.
pub const TITLE_SCORE_MAX: u32 = 30;

/// Upper bound of the opening component.
pub const OPENING_SCORE_MAX: u32 = 25;

/// Upper bound of the structure component.
pub const STRUCTURE_SCORE_MAX: u32 = 25;

/// Upper bound of the engagement component.
pub const ENGAGEMENT_SCORE_MAX: u32 = 20;

/// Minimum score for the "excellent" display tier.
pub const SCORE_TIER_EXCELLENT: u32 = 80;

/// Minimum score for the "promising" display tier.
pub const SCORE_TIER_PROMISING: u32 = 60;

// =============================================================================
// SESSION
// =============================================================================

/// Free invocations per session.
pub const DAILY_LIMIT: u32 = 5;

/// Number of results kept in the in-memory session history.
pub const HISTORY_CAPACITY: usize = 20;

// =============================================================================
// BACKEND
// =============================================================================

/// Default Gemini REST endpoint.
pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default generation model.
pub const GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Slow-request warning threshold (milliseconds).
pub const SLOW_GENERATION_MS: u64 = 30_000;

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

/// Primary API key variable.
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// Fallback API key variable.
pub const ENV_API_KEY: &str = "API_KEY";

/// Override for the Gemini base URL.
pub const ENV_GEMINI_BASE_URL: &str = "PLUME_GEMINI_BASE_URL";

/// Override for the generation model.
pub const ENV_GEMINI_MODEL: &str = "PLUME_GEMINI_MODEL";

/// Override for the session quota.
pub const ENV_DAILY_LIMIT: &str = "PLUME_DAILY_LIMIT";

/// Override for the history capacity.
pub const ENV_HISTORY_CAPACITY: &str = "PLUME_HISTORY_CAPACITY";

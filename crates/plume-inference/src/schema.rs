//! Response schemas, one per mode.
//!
//! Written in the backend's response-schema dialect (an OpenAPI subset with
//! upper-case type names). The field name constants in [`fields`] are shared
//! with the parser so the declared shape and the validated shape cannot drift.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use plume_core::{Mode, Priority, SuggestionCategory};

/// JSON field names of both result shapes.
pub mod fields {
    pub const STRATEGY_A: &str = "strategyA";
    pub const STRATEGY_B: &str = "strategyB";

    pub const TITLE: &str = "title";
    pub const BODY: &str = "body";
    pub const TAGS: &str = "tags";

    pub const SCORE: &str = "score";
    pub const BREAKDOWN: &str = "breakdown";
    pub const TITLE_SCORE: &str = "titleScore";
    pub const OPENING_SCORE: &str = "openingScore";
    pub const STRUCTURE_SCORE: &str = "structureScore";
    pub const ENGAGEMENT_SCORE: &str = "engagementScore";
    pub const PROBLEMS: &str = "problems";
    pub const SUGGESTIONS: &str = "suggestions";
    pub const REWRITTEN_FULL_TEXT: &str = "rewrittenFullText";
    pub const HASHTAGS: &str = "hashtags";

    pub const CATEGORY: &str = "category";
    pub const PRIORITY: &str = "priority";
    pub const ORIGINAL: &str = "original";
    pub const REWRITES: &str = "rewrites";
    pub const NOTE: &str = "note";
    pub const REASON: &str = "reason";
}

use fields::*;

fn string_array() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

fn note_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            TITLE: { "type": "STRING" },
            BODY: { "type": "STRING" },
            TAGS: string_array(),
        },
        "required": [TITLE, BODY, TAGS],
    })
}

static GENERATION_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            STRATEGY_A: note_schema(),
            STRATEGY_B: note_schema(),
        },
        "required": [STRATEGY_A, STRATEGY_B],
    })
});

static CRITIQUE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    let categories: Vec<&str> = SuggestionCategory::ALL.iter().map(|c| c.as_str()).collect();
    let priorities: Vec<&str> = Priority::ALL.iter().map(|p| p.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            SCORE: { "type": "INTEGER" },
            BREAKDOWN: {
                "type": "OBJECT",
                "properties": {
                    TITLE_SCORE: { "type": "INTEGER" },
                    OPENING_SCORE: { "type": "INTEGER" },
                    STRUCTURE_SCORE: { "type": "INTEGER" },
                    ENGAGEMENT_SCORE: { "type": "INTEGER" },
                },
                "required": [TITLE_SCORE, OPENING_SCORE, STRUCTURE_SCORE, ENGAGEMENT_SCORE],
            },
            PROBLEMS: string_array(),
            SUGGESTIONS: {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        CATEGORY: { "type": "STRING", "enum": categories },
                        PRIORITY: { "type": "STRING", "enum": priorities },
                        ORIGINAL: { "type": "STRING" },
                        REWRITES: string_array(),
                        NOTE: { "type": "STRING" },
                        REASON: { "type": "STRING" },
                    },
                    "required": [CATEGORY, PRIORITY, REASON],
                },
            },
            REWRITTEN_FULL_TEXT: { "type": "STRING" },
            HASHTAGS: string_array(),
        },
        "required": [SCORE, BREAKDOWN, PROBLEMS, SUGGESTIONS, REWRITTEN_FULL_TEXT, HASHTAGS],
    })
});

/// The schema attached to every invocation of `mode`.
pub fn response_schema(mode: Mode) -> &'static Value {
    match mode {
        Mode::Generate => &GENERATION_SCHEMA,
        Mode::Critique => &CRITIQUE_SCHEMA,
    }
}

/// Top-level required field names for `mode`, in declaration order.
pub fn required_fields(mode: Mode) -> Vec<&'static str> {
    response_schema(mode)["required"]
        .as_array()
        .map(|fields| fields.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

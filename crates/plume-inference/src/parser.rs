//! Backend output validation.
//!
//! Backend text is untrusted. It is decoded into an untyped JSON tree first
//! and then validated field by field into the strong result types. The first
//! violation is reported with its dotted path; nothing is repaired or
//! defaulted.

use serde_json::{Map, Value};
use tracing::{trace, warn};

use plume_core::defaults::{
    ENGAGEMENT_SCORE_MAX, OPENING_SCORE_MAX, SCORE_MAX, STRUCTURE_SCORE_MAX, TITLE_SCORE_MAX,
};
use plume_core::{
    CritiqueResult, GenerationResult, Mode, NoteContent, ParseError, ParsedResult, Priority,
    ScoreBreakdown, SuggestionCategory, SuggestionItem,
};

use crate::schema::fields::*;

type Object = Map<String, Value>;

/// Parse raw backend text for `mode`.
pub fn parse(raw: &str, mode: Mode) -> Result<ParsedResult, ParseError> {
    match mode {
        Mode::Generate => parse_generation(raw).map(ParsedResult::Generation),
        Mode::Critique => parse_critique(raw).map(ParsedResult::Critique),
    }
}

pub fn parse_generation(raw: &str) -> Result<GenerationResult, ParseError> {
    let value = decode(raw)?;
    let root = as_object(&value, "")?;
    Ok(GenerationResult {
        strategy_a: note(root, STRATEGY_A)?,
        strategy_b: note(root, STRATEGY_B)?,
    })
}

pub fn parse_critique(raw: &str) -> Result<CritiqueResult, ParseError> {
    let value = decode(raw)?;
    let root = as_object(&value, "")?;

    let score = bounded_int(root, "", SCORE, SCORE_MAX)?;
    let breakdown = breakdown(root)?;
    let problems = string_array(root, "", PROBLEMS)?;

    let raw_suggestions = required(root, "", SUGGESTIONS)?
        .as_array()
        .ok_or_else(|| ParseError::violation(SUGGESTIONS, "expected an array"))?;
    let suggestions = raw_suggestions
        .iter()
        .enumerate()
        .map(|(i, item)| suggestion(item, &format!("{SUGGESTIONS}[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let result = CritiqueResult {
        score,
        breakdown,
        problems,
        suggestions,
        rewritten_full_text: string(root, "", REWRITTEN_FULL_TEXT)?,
        hashtags: string_array(root, "", HASHTAGS)?,
    };

    if !result.is_consistent() {
        warn!(
            subsystem = "orchestrator",
            component = "parser",
            score = result.score,
            breakdown_total = result.breakdown.total(),
            "Critique score does not match breakdown total"
        );
    }
    trace!(suggestion_count = result.suggestions.len(), "Critique parsed");
    Ok(result)
}

/// Decode JSON, tolerating one surrounding markdown code fence.
fn decode(raw: &str) -> Result<Value, ParseError> {
    serde_json::from_str(strip_code_fence(raw)).map_err(|e| ParseError::Malformed {
        raw: raw.to_string(),
        reason: e.to_string(),
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    match rest.find('\n') {
        Some(newline) => rest[newline + 1..].trim(),
        None => rest.trim(),
    }
}

fn path_of(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Object, ParseError> {
    value.as_object().ok_or_else(|| {
        let field = if path.is_empty() { "$" } else { path };
        ParseError::violation(field, format!("expected an object, got {}", type_name(value)))
    })
}

/// A present, non-null field.
fn required<'a>(obj: &'a Object, parent: &str, name: &str) -> Result<&'a Value, ParseError> {
    match obj.get(name) {
        None | Some(Value::Null) => Err(ParseError::violation(
            path_of(parent, name),
            "missing required field",
        )),
        Some(value) => Ok(value),
    }
}

fn string(obj: &Object, parent: &str, name: &str) -> Result<String, ParseError> {
    let value = required(obj, parent, name)?;
    value.as_str().map(str::to_string).ok_or_else(|| {
        ParseError::violation(
            path_of(parent, name),
            format!("expected a string, got {}", type_name(value)),
        )
    })
}

fn optional_string(obj: &Object, parent: &str, name: &str) -> Result<Option<String>, ParseError> {
    match obj.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ParseError::violation(
            path_of(parent, name),
            format!("expected a string, got {}", type_name(other)),
        )),
    }
}

fn strings_of(value: &Value, path: &str) -> Result<Vec<String>, ParseError> {
    let items = value.as_array().ok_or_else(|| {
        ParseError::violation(path, format!("expected an array, got {}", type_name(value)))
    })?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                ParseError::violation(
                    format!("{path}[{i}]"),
                    format!("expected a string, got {}", type_name(item)),
                )
            })
        })
        .collect()
}

fn string_array(obj: &Object, parent: &str, name: &str) -> Result<Vec<String>, ParseError> {
    let value = required(obj, parent, name)?;
    strings_of(value, &path_of(parent, name))
}

fn optional_string_array(
    obj: &Object,
    parent: &str,
    name: &str,
) -> Result<Option<Vec<String>>, ParseError> {
    match obj.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => strings_of(value, &path_of(parent, name)).map(Some),
    }
}

fn bounded_int(obj: &Object, parent: &str, name: &str, max: u32) -> Result<u32, ParseError> {
    let value = required(obj, parent, name)?;
    let path = path_of(parent, name);
    let n = value.as_u64().ok_or_else(|| {
        ParseError::violation(
            path.as_str(),
            format!("expected a non-negative integer, got {value}"),
        )
    })?;
    if n > u64::from(max) {
        return Err(ParseError::violation(
            path,
            format!("{n} is outside 0..={max}"),
        ));
    }
    Ok(n as u32)
}

fn note(root: &Object, name: &str) -> Result<NoteContent, ParseError> {
    let obj = as_object(required(root, "", name)?, name)?;
    Ok(NoteContent {
        title: string(obj, name, TITLE)?,
        body: string(obj, name, BODY)?,
        tags: string_array(obj, name, TAGS)?,
    })
}

fn breakdown(root: &Object) -> Result<ScoreBreakdown, ParseError> {
    let obj = as_object(required(root, "", BREAKDOWN)?, BREAKDOWN)?;
    Ok(ScoreBreakdown {
        title_score: bounded_int(obj, BREAKDOWN, TITLE_SCORE, TITLE_SCORE_MAX)?,
        opening_score: bounded_int(obj, BREAKDOWN, OPENING_SCORE, OPENING_SCORE_MAX)?,
        structure_score: bounded_int(obj, BREAKDOWN, STRUCTURE_SCORE, STRUCTURE_SCORE_MAX)?,
        engagement_score: bounded_int(obj, BREAKDOWN, ENGAGEMENT_SCORE, ENGAGEMENT_SCORE_MAX)?,
    })
}

fn suggestion(value: &Value, path: &str) -> Result<SuggestionItem, ParseError> {
    let obj = as_object(value, path)?;

    let category = string(obj, path, CATEGORY)?;
    let category = category.parse::<SuggestionCategory>().map_err(|e| {
        ParseError::violation(path_of(path, CATEGORY), e.to_string())
    })?;
    let priority = string(obj, path, PRIORITY)?;
    let priority = priority
        .parse::<Priority>()
        .map_err(|e| ParseError::violation(path_of(path, PRIORITY), e.to_string()))?;

    Ok(SuggestionItem {
        category,
        priority,
        original: optional_string(obj, path, ORIGINAL)?,
        rewrites: optional_string_array(obj, path, REWRITES)?,
        note: optional_string(obj, path, NOTE)?,
        reason: string(obj, path, REASON)?,
    })
}

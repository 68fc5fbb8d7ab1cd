use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Data types -- field names use camelCase in JSON to match stored documents.
// ---------------------------------------------------------------------------

/// One answered question inside a submitted form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    pub id: String,
    /// Raw submitted value; its shape depends on the question kind.
    #[serde(default)]
    pub answer: Value,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_correct: bool,
    #[serde(
        default,
        deserialize_with = "deserialize_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub completion_time: Option<f64>,
}

/// A completed or partial survey submission.
///
/// Stored documents are written by several client versions, so every field
/// past `id` and `ts` decodes leniently: wrong types and nulls fall back to
/// "not recorded" instead of failing the whole scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    pub id: String,
    /// Submission time in epoch seconds.
    pub ts: i64,
    #[serde(default, deserialize_with = "deserialize_string")]
    pub email: String,
    #[serde(
        default,
        deserialize_with = "deserialize_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub age: Option<u32>,
    #[serde(
        default,
        deserialize_with = "deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub gender: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub education_level: Option<String>,
    /// Kept as submitted; reports write it through unchanged.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub tried_moravec: Value,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_finished: bool,
    #[serde(
        default,
        deserialize_with = "deserialize_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub answered_questions_amount: Option<u32>,
    #[serde(
        default,
        deserialize_with = "deserialize_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub correct_questions_amount: Option<u32>,
    #[serde(
        default,
        deserialize_with = "deserialize_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_completion_time: Option<f64>,
    #[serde(
        default,
        deserialize_with = "deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub comment: Option<String>,
    #[serde(default)]
    pub questions: Vec<AnsweredQuestion>,
}

impl FormRecord {
    /// Minimal record with no answers or demographics.
    pub fn new(id: impl Into<String>, ts: i64, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ts,
            email: email.into(),
            age: None,
            gender: None,
            education_level: None,
            tried_moravec: Value::Null,
            is_finished: false,
            answered_questions_amount: None,
            correct_questions_amount: None,
            total_completion_time: None,
            comment: None,
            questions: Vec::new(),
        }
    }
}

/// Loose truthiness: null, `false`, zero, NaN and `""` are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ---------------------------------------------------------------------------
// Lenient field decoding
// ---------------------------------------------------------------------------

fn deserialize_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Value::deserialize(d).map(|v| is_truthy(&v))
}

fn deserialize_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    deserialize_text(d).map(Option::unwrap_or_default)
}

/// Strings and scalars as text; null, empty and structured values as `None`.
fn deserialize_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Numbers or numeric strings; anything else as `None`.
fn deserialize_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Non-negative whole numbers that fit a `u32`, given as numbers or strings.
fn deserialize_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    })
}

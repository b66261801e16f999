use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single answer as stored on an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Flag(bool),
    Empty,
}

impl AnswerValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// True when a required control would consider this answered.
    pub fn is_filled(&self) -> bool {
        match self {
            AnswerValue::Text(s) => !s.trim().is_empty(),
            AnswerValue::Flag(checked) => *checked,
            AnswerValue::Empty => false,
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        AnswerValue::Flag(value)
    }
}

/// Answers keyed by the field label they were given under.
pub type Answers = BTreeMap<String, AnswerValue>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnswersError {
    #[error("Answers must be valid JSON")]
    Malformed,
    #[error("Answers must be a JSON object")]
    NotAnObject,
    #[error("Answer for {0:?} must be text, a boolean or null")]
    UnsupportedValue(String),
}

/// Parses the JSON-encoded `answers` part of a submission.
///
/// Numbers are kept as their decimal text, which is what a number input
/// produces anyway. Arrays and nested objects are rejected.
pub fn parse_answers(raw: &str) -> Result<Answers, AnswersError> {
    if raw.trim().is_empty() {
        return Ok(Answers::new());
    }
    let value: Value = serde_json::from_str(raw).map_err(|_| AnswersError::Malformed)?;
    let Value::Object(map) = value else {
        return Err(AnswersError::NotAnObject);
    };

    map.into_iter()
        .map(|(key, value)| {
            let answer = match value {
                Value::String(s) => AnswerValue::Text(s),
                Value::Bool(b) => AnswerValue::Flag(b),
                Value::Null => AnswerValue::Empty,
                Value::Number(n) => AnswerValue::Text(n.to_string()),
                Value::Array(_) | Value::Object(_) => {
                    return Err(AnswersError::UnsupportedValue(key))
                }
            };
            Ok((key, answer))
        })
        .collect()
}

//! Boundary check for webhook payloads. Nothing from the webhook reaches the
//! quiz without passing through [`decode_questions`].

use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::quiz::QuizQuestion;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteQuestion {
    question: String,
    options: Vec<String>,
    correct_answer: i64,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    published_date: Option<String>,
}

impl RemoteQuestion {
    fn validate(&self) -> std::result::Result<usize, String> {
        if self.question.trim().is_empty() {
            return Err("`question` is empty".to_string());
        }
        if self.options.is_empty() {
            return Err("`options` is empty".to_string());
        }
        let index = usize::try_from(self.correct_answer)
            .map_err(|_| format!("`correctAnswer` {} is negative", self.correct_answer))?;
        if index >= self.options.len() {
            return Err(format!(
                "`correctAnswer` {index} is out of range for {} options",
                self.options.len()
            ));
        }
        Ok(index)
    }
}

/// Turns a webhook body into typed questions. `make_id` receives each
/// element's position. The first bad element rejects the whole payload.
pub fn decode_questions(
    payload: &Value,
    make_id: impl Fn(usize) -> String,
) -> Result<Vec<QuizQuestion>> {
    let items = payload
        .as_array()
        .ok_or_else(|| AppError::Decode(format!("expected a JSON array, got {}", kind_of(payload))))?;

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let remote = RemoteQuestion::deserialize(item)
                .map_err(|e| AppError::Decode(format!("question {}: {e}", idx + 1)))?;
            let correct_answer = remote
                .validate()
                .map_err(|reason| AppError::Decode(format!("question {}: {reason}", idx + 1)))?;
            Ok(QuizQuestion {
                id: make_id(idx),
                question: remote.question,
                options: remote.options,
                correct_answer,
                explanation: remote.explanation,
                is_live: true,
                published_date: remote.published_date,
            })
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub mod decode;
pub mod session;
pub mod sync;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
    /// Set for questions that arrived from the webhook.
    #[serde(default)]
    pub is_live: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

impl QuizQuestion {
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_answer
    }
}

/// The question the quiz starts with, and falls back to when a sync returns
/// nothing.
pub fn bootstrap_questions() -> Vec<QuizQuestion> {
    vec![QuizQuestion {
        id: "local-1".to_string(),
        question: "Which Constitutional Amendment is known as the 'Mini-Constitution' of India?"
            .to_string(),
        options: vec![
            "42nd Amendment".to_string(),
            "44th Amendment".to_string(),
            "24th Amendment".to_string(),
            "73rd Amendment".to_string(),
        ],
        correct_answer: 0,
        explanation: "The 42nd Amendment Act (1976) is called the Mini-Constitution because of the massive changes it brought to the Constitution.".to_string(),
        is_live: false,
        published_date: None,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_is_a_single_valid_local_question() {
        let questions = bootstrap_questions();
        assert_eq!(questions.len(), 1);
        let q = &questions[0];
        assert_eq!(q.id, "local-1");
        assert!(!q.is_live);
        assert!(q.correct_answer < q.options.len());
        assert!(q.is_correct(0));
        assert!(!q.is_correct(1));
    }
}

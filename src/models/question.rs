use crate::models::answer::Answer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub test_id: Uuid,
    pub text: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// A question together with its ordered answer options, as presented to the
/// session and the scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionWithAnswers {
    #[serde(flatten)]
    pub question: Question,
    pub answers: Vec<Answer>,
}

impl QuestionWithAnswers {
    /// Resolve a selected answer id against this question's own options.
    /// An id that belongs to a different question resolves to `None`.
    pub fn find_answer(&self, answer_id: Uuid) -> Option<&Answer> {
        self.answers.iter().find(|a| a.id == answer_id)
    }
}

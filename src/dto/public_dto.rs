use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::answer::Answer;
use crate::models::question::QuestionWithAnswers;
use crate::models::test::Test;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "First name must not be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name must not be empty"))]
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub participant_id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

/// Explicit participant context. The core never reads ambient session state;
/// callers resolve an identity and pass it along. A missing id is the
/// "not registered" redirect signal.
#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantQuery {
    pub participant_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCatalogEntry {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub timer_minutes: Option<i32>,
    pub question_count: i64,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCatalogResponse {
    pub tests: Vec<TestCatalogEntry>,
}

/// An answer option as shown to a participant: the correctness flag stays
/// server-side until scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicAnswer {
    pub id: Uuid,
    pub text: String,
    pub position: i32,
}

impl From<&Answer> for PublicAnswer {
    fn from(a: &Answer) -> Self {
        Self {
            id: a.id,
            text: a.text.clone(),
            position: a.position,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub text: String,
    pub position: i32,
    pub answers: Vec<PublicAnswer>,
}

impl From<&QuestionWithAnswers> for PublicQuestion {
    fn from(q: &QuestionWithAnswers) -> Self {
        Self {
            id: q.question.id,
            text: q.question.text.clone(),
            position: q.question.position,
            answers: q.answers.iter().map(PublicAnswer::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicTestSummary {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub show_result: bool,
    pub timer_minutes: Option<i32>,
    pub timer_seconds: Option<i32>,
    pub total_questions: usize,
}

impl PublicTestSummary {
    pub fn new(test: &Test, timer_seconds: Option<i32>, total_questions: usize) -> Self {
        Self {
            id: test.id,
            title: test.title.clone(),
            description: test.description.clone(),
            show_result: test.show_result,
            timer_minutes: test.timer_minutes,
            timer_seconds,
            total_questions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakeTestResponse {
    pub test: PublicTestSummary,
    pub questions: Vec<PublicQuestion>,
}

/// Replay of an already-taken test: point the client at the stored result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectToResult {
    pub status: String,
    pub result_id: Uuid,
}

impl RedirectToResult {
    pub fn new(result_id: Uuid) -> Self {
        Self {
            status: "already_completed".to_string(),
            result_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTestRequest {
    pub participant_id: Option<Uuid>,
    /// Selected answer per question; `null` is a valid "skipped" value.
    #[serde(default)]
    pub selections: HashMap<Uuid, Option<Uuid>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTestResponse {
    pub result_id: Uuid,
    pub status: String,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub percentage: f64,
    pub show_result: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub timer_minutes: Option<i32>,
    pub timer_seconds: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultAnswerView {
    pub question_id: Uuid,
    pub question_text: String,
    pub position: i32,
    pub selected_answer: Option<String>,
    pub is_correct: bool,
    /// Only populated when the test's answer-reveal policy allows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultResponse {
    pub result_id: Uuid,
    pub test_id: Uuid,
    pub test_title: String,
    pub participant_name: String,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub percentage: f64,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    pub show_result: bool,
    pub answers: Vec<ResultAnswerView>,
}

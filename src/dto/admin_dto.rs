use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAnswerPayload {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuestionPayload {
    pub text: String,
    pub position: Option<i32>,
    pub answers: Vec<CreateAnswerPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTestPayload {
    #[validate(length(min = 1))]
    pub title: String,
    pub description: Option<String>,
    /// One of `active`, `inactive`, `draft`. New tests default to `draft`.
    pub status: Option<String>,
    /// One of `after_each`, `at_end`, `never`.
    pub show_answers: Option<String>,
    pub show_result: Option<bool>,
    #[validate(range(min = 1, message = "Timer must be at least 1 minute"))]
    pub timer_minutes: Option<i32>,
    pub questions: Vec<CreateQuestionPayload>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTestPayload {
    // Empty strings are trimmed away to None so they cannot blank out a title.
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "trim_optional_string")]
    pub description: Option<String>,

    pub status: Option<String>,
    pub show_answers: Option<String>,
    pub show_result: Option<bool>,

    #[validate(range(min = 1, message = "Timer must be at least 1 minute"))]
    pub timer_minutes: Option<i32>,

    /// When present, replaces the whole question set of the test.
    pub questions: Option<Vec<CreateQuestionPayload>>,
}

fn trim_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

#[derive(Debug, Deserialize)]
pub struct TestListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ResultListQuery {
    pub test_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

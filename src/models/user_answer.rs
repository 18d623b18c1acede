use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A participant's recorded selection for one question of a completed attempt.
/// `selected_answer_id` is a weak reference: deleting the answer later nulls
/// it out without destroying this row. `is_correct` is the snapshot taken at
/// scoring time and is never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAnswer {
    pub id: Uuid,
    pub test_result_id: Uuid,
    pub question_id: Uuid,
    pub selected_answer_id: Option<Uuid>,
    pub is_correct: bool,
    pub created_at: DateTime<Utc>,
}

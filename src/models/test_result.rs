use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One participant's one attempt at one test. At most one row exists per
/// (test_id, participant_id); the pair is guarded by a unique index.
/// Created fully aggregated in a single transaction and never mutated after.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestResult {
    pub id: Uuid,
    pub test_id: Uuid,
    pub participant_id: Uuid,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub percentage: f64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub is_completed: bool,
}

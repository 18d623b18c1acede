use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Test lifecycle statuses. Only `active` tests are enumerable by participants.
pub mod status {
    pub const ACTIVE: &str = "active";
    pub const INACTIVE: &str = "inactive";
    pub const DRAFT: &str = "draft";

    pub const ALL: &[&str] = &[ACTIVE, INACTIVE, DRAFT];
}

/// When correct answers are revealed to the participant.
pub mod show_answers {
    pub const AFTER_EACH: &str = "after_each";
    pub const AT_END: &str = "at_end";
    pub const NEVER: &str = "never";

    pub const ALL: &[&str] = &[AFTER_EACH, AT_END, NEVER];
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Test {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub show_answers: String,
    pub show_result: bool,
    pub timer_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Test {
    pub fn is_active(&self) -> bool {
        self.status == status::ACTIVE
    }

    /// Client-facing countdown hint. No server-side expiry is enforced.
    pub fn timer_seconds(&self) -> Option<i32> {
        self.timer_minutes.map(|m| m * 60)
    }
}

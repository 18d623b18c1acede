use crate::error::{Error, Result};
use crate::models::participant::Participant;
use crate::utils::text::trimmed_non_empty;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ParticipantService {
    pool: PgPool,
}

impl ParticipantService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Idempotent upsert keyed by the (first, last) name pair. Registering
    /// twice with the same names returns the same participant row.
    pub async fn register(&self, first_name: &str, last_name: &str) -> Result<Participant> {
        let first = trimmed_non_empty(first_name)
            .ok_or_else(|| Error::BadRequest("First name must not be empty".to_string()))?;
        let last = trimmed_non_empty(last_name)
            .ok_or_else(|| Error::BadRequest("Last name must not be empty".to_string()))?;

        // The no-op DO UPDATE makes the conflicting row come back via RETURNING.
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            INSERT INTO participants (first_name, last_name)
            VALUES ($1, $2)
            ON CONFLICT (first_name, last_name)
                DO UPDATE SET first_name = EXCLUDED.first_name
            RETURNING *
            "#,
        )
        .bind(first)
        .bind(last)
        .fetch_one(&self.pool)
        .await?;

        Ok(participant)
    }

    /// Missing participants map to `NotRegistered` so the caller can bounce
    /// the client back to registration rather than treat it as a fault.
    pub async fn get_by_id(&self, participant_id: Uuid) -> Result<Participant> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"SELECT * FROM participants WHERE id = $1"#,
        )
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotRegistered("Unknown participant".to_string()))?;

        Ok(participant)
    }
}

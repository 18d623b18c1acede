use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::question::QuestionWithAnswers;
use crate::models::test::Test;
use crate::models::test_result::TestResult;
use crate::services::participant_service::ParticipantService;
use crate::services::scoring;
use crate::services::test_service::TestService;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// Outcome of asking for a test's question set. Replays of an already-taken
/// test resolve to the stored result instead of a fresh question set.
#[derive(Debug)]
pub enum TakeTest {
    AlreadyCompleted {
        result_id: Uuid,
    },
    Questions {
        test: Test,
        questions: Vec<QuestionWithAnswers>,
        timer_seconds: Option<i32>,
    },
}

/// Whether `submit` created the result or found one already in place.
#[derive(Debug)]
pub enum SubmitOutcome {
    Created(TestResult),
    Existing(TestResult),
}

impl SubmitOutcome {
    pub fn result(&self) -> &TestResult {
        match self {
            SubmitOutcome::Created(r) | SubmitOutcome::Existing(r) => r,
        }
    }
}

#[derive(Clone)]
pub struct SessionService {
    pool: PgPool,
    tests: TestService,
    participants: ParticipantService,
}

impl SessionService {
    pub fn new(pool: PgPool) -> Self {
        let tests = TestService::new(pool.clone());
        let participants = ParticipantService::new(pool.clone());
        Self {
            pool,
            tests,
            participants,
        }
    }

    /// Gate access to a test: the participant must exist, the test must be
    /// active, and a prior result short-circuits to a redirect. Idempotent
    /// against replayed requests.
    pub async fn begin_or_resume(
        &self,
        participant_id: Option<Uuid>,
        test_id: Uuid,
    ) -> Result<TakeTest> {
        let participant_id = require_participant(participant_id)?;
        self.participants.get_by_id(participant_id).await?;
        let test = self.tests.get_active(test_id).await?;

        if let Some(existing) = self.find_existing_result(test_id, participant_id).await? {
            return Ok(TakeTest::AlreadyCompleted {
                result_id: existing.id,
            });
        }

        let questions = self.tests.questions_with_answers(test_id).await?;
        let timer_seconds = test.timer_seconds();
        Ok(TakeTest::Questions {
            test,
            questions,
            timer_seconds,
        })
    }

    /// Score a selection mapping and persist the result atomically. The
    /// existence check plus the unique (test_id, participant_id) index make
    /// this idempotent: a double submission gets the first submission's
    /// result back, never a second row.
    pub async fn submit(
        &self,
        participant_id: Option<Uuid>,
        test_id: Uuid,
        selections: &HashMap<Uuid, Option<Uuid>>,
    ) -> Result<SubmitOutcome> {
        let participant_id = require_participant(participant_id)?;
        self.participants.get_by_id(participant_id).await?;
        self.tests.get_active(test_id).await?;

        if let Some(existing) = self.find_existing_result(test_id, participant_id).await? {
            return Ok(SubmitOutcome::Existing(existing));
        }

        let questions = self.tests.questions_with_answers(test_id).await?;
        let scorecard = scoring::score(&questions, selections);

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // DO NOTHING on the unique pair: a concurrent submission that lost
        // the race gets no row back and is answered with the winner's result.
        let inserted = sqlx::query_as::<_, TestResult>(
            r#"
            INSERT INTO test_results
                (test_id, participant_id, total_questions, correct_answers, percentage,
                 started_at, completed_at, is_completed)
            VALUES ($1, $2, $3, $4, $5, $6, $6, TRUE)
            ON CONFLICT (test_id, participant_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(test_id)
        .bind(participant_id)
        .bind(scorecard.total_questions)
        .bind(scorecard.correct_answers)
        .bind(scorecard.percentage)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(result) = inserted else {
            drop(tx);
            let existing = self
                .find_existing_result(test_id, participant_id)
                .await?
                .ok_or_else(|| {
                    Error::Internal("Result insert conflicted but no row exists".to_string())
                })?;
            return Ok(SubmitOutcome::Existing(existing));
        };

        for row in &scorecard.rows {
            sqlx::query(
                r#"
                INSERT INTO user_answers (test_result_id, question_id, selected_answer_id, is_correct)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(result.id)
            .bind(row.question_id)
            .bind(row.selected_answer_id)
            .bind(row.is_correct)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            result_id = %result.id,
            test_id = %test_id,
            participant_id = %participant_id,
            correct = scorecard.correct_answers,
            total = scorecard.total_questions,
            percentage = scorecard.percentage,
            "test submission scored"
        );

        Ok(SubmitOutcome::Created(result))
    }

    pub async fn find_existing_result(
        &self,
        test_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Option<TestResult>> {
        let result = sqlx::query_as::<_, TestResult>(
            r#"SELECT * FROM test_results WHERE test_id = $1 AND participant_id = $2"#,
        )
        .bind(test_id)
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(result)
    }
}

fn require_participant(participant_id: Option<Uuid>) -> Result<Uuid> {
    participant_id
        .ok_or_else(|| Error::NotRegistered("No participant in request context".to_string()))
}

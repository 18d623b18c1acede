use crate::dto::admin_dto::{CreateQuestionPayload, CreateTestPayload, UpdateTestPayload};
use crate::dto::public_dto::TestCatalogEntry;
use crate::error::{Error, Result};
use crate::models::answer::Answer;
use crate::models::question::{Question, QuestionWithAnswers};
use crate::models::test::{show_answers, status, Test};
use crate::utils::text::trimmed_non_empty;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, serde::Serialize)]
pub struct PaginatedTests {
    #[serde(rename = "items")]
    pub tests: Vec<Test>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Default)]
pub struct TestFilter {
    pub status: Option<String>,
    pub search: Option<String>,
}

/// Question content validated and trimmed, ready for insertion.
#[derive(Debug)]
struct PreparedQuestion {
    text: String,
    position: i32,
    answers: Vec<PreparedAnswer>,
}

#[derive(Debug)]
struct PreparedAnswer {
    text: String,
    is_correct: bool,
    position: i32,
}

#[derive(Clone)]
pub struct TestService {
    pool: PgPool,
}

impl TestService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateTestPayload) -> Result<(Test, Vec<QuestionWithAnswers>)> {
        let title = trimmed_non_empty(&payload.title)
            .ok_or_else(|| Error::BadRequest("Test title must not be empty".to_string()))?;
        let test_status = validate_status(payload.status.as_deref().unwrap_or(status::DRAFT))?;
        let reveal = validate_show_answers(
            payload.show_answers.as_deref().unwrap_or(show_answers::AFTER_EACH),
        )?;
        let prepared = prepare_questions(&payload.questions)?;

        let mut tx = self.pool.begin().await?;

        let test = sqlx::query_as::<_, Test>(
            r#"
            INSERT INTO tests (title, description, status, show_answers, show_result, timer_minutes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&title)
        .bind(&payload.description)
        .bind(test_status)
        .bind(reveal)
        .bind(payload.show_result.unwrap_or(true))
        .bind(payload.timer_minutes)
        .fetch_one(&mut *tx)
        .await?;

        insert_questions(&mut tx, test.id, &prepared).await?;
        tx.commit().await?;

        let questions = self.questions_with_answers(test.id).await?;
        Ok((test, questions))
    }

    pub async fn update(
        &self,
        test_id: Uuid,
        payload: UpdateTestPayload,
    ) -> Result<(Test, Vec<QuestionWithAnswers>)> {
        if let Some(ref s) = payload.status {
            validate_status(s)?;
        }
        if let Some(ref s) = payload.show_answers {
            validate_show_answers(s)?;
        }
        let prepared = match &payload.questions {
            Some(questions) => Some(prepare_questions(questions)?),
            None => None,
        };

        let mut tx = self.pool.begin().await?;

        let test = sqlx::query_as::<_, Test>(
            r#"
            UPDATE tests
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                show_answers = COALESCE($5, show_answers),
                show_result = COALESCE($6, show_result),
                timer_minutes = COALESCE($7, timer_minutes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(test_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.status)
        .bind(&payload.show_answers)
        .bind(payload.show_result)
        .bind(payload.timer_minutes)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Test not found".to_string()))?;

        // A supplied question set replaces the old one wholesale.
        if let Some(prepared) = prepared {
            sqlx::query(
                r#"DELETE FROM answers WHERE question_id IN (SELECT id FROM questions WHERE test_id = $1)"#,
            )
            .bind(test_id)
            .execute(&mut *tx)
            .await?;
            sqlx::query(r#"DELETE FROM questions WHERE test_id = $1"#)
                .bind(test_id)
                .execute(&mut *tx)
                .await?;
            insert_questions(&mut tx, test_id, &prepared).await?;
        }

        tx.commit().await?;

        let questions = self.questions_with_answers(test_id).await?;
        Ok((test, questions))
    }

    /// Owned-aggregate deletion: all children go explicitly, child-first,
    /// inside one transaction.
    pub async fn delete(&self, test_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<Uuid> =
            sqlx::query_scalar(r#"SELECT id FROM tests WHERE id = $1"#)
                .bind(test_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(Error::NotFound("Test not found".to_string()));
        }

        sqlx::query(
            r#"DELETE FROM user_answers WHERE test_result_id IN (SELECT id FROM test_results WHERE test_id = $1)"#,
        )
        .bind(test_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(r#"DELETE FROM test_results WHERE test_id = $1"#)
            .bind(test_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"DELETE FROM answers WHERE question_id IN (SELECT id FROM questions WHERE test_id = $1)"#,
        )
        .bind(test_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(r#"DELETE FROM questions WHERE test_id = $1"#)
            .bind(test_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(r#"DELETE FROM tests WHERE id = $1"#)
            .bind(test_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_by_id(&self, test_id: Uuid) -> Result<Test> {
        let test = sqlx::query_as::<_, Test>(r#"SELECT * FROM tests WHERE id = $1"#)
            .bind(test_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Test not found".to_string()))?;
        Ok(test)
    }

    /// Fetch a test only if participants may take it. Anything else is a
    /// benign NotFound (stale bookmark, deactivated test).
    pub async fn get_active(&self, test_id: Uuid) -> Result<Test> {
        let test = sqlx::query_as::<_, Test>(
            r#"SELECT * FROM tests WHERE id = $1 AND status = $2"#,
        )
        .bind(test_id)
        .bind(status::ACTIVE)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Test not found or not active".to_string()))?;
        Ok(test)
    }

    pub async fn get_detail(&self, test_id: Uuid) -> Result<(Test, Vec<QuestionWithAnswers>)> {
        let test = self.get_by_id(test_id).await?;
        let questions = self.questions_with_answers(test_id).await?;
        Ok((test, questions))
    }

    /// Ordered questions, each with its ordered answers.
    pub async fn questions_with_answers(&self, test_id: Uuid) -> Result<Vec<QuestionWithAnswers>> {
        let questions = sqlx::query_as::<_, Question>(
            r#"SELECT * FROM questions WHERE test_id = $1 ORDER BY position"#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;

        let answers = sqlx::query_as::<_, Answer>(
            r#"
            SELECT a.* FROM answers a
            JOIN questions q ON a.question_id = q.id
            WHERE q.test_id = $1
            ORDER BY q.position, a.position
            "#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out: Vec<QuestionWithAnswers> = questions
            .into_iter()
            .map(|question| QuestionWithAnswers {
                question,
                answers: Vec::new(),
            })
            .collect();
        for answer in answers {
            if let Some(slot) = out.iter_mut().find(|q| q.question.id == answer.question_id) {
                slot.answers.push(answer);
            }
        }
        Ok(out)
    }

    pub async fn list(&self, filter: TestFilter, page: i64, limit: i64) -> Result<PaginatedTests> {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);
        let offset = (page - 1) * limit;
        let search_pattern = filter.search.as_ref().map(|s| format!("%{}%", s));

        let tests = sqlx::query_as::<_, Test>(
            r#"
            SELECT * FROM tests
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR title ILIKE $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&filter.status)
        .bind(&search_pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM tests
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR title ILIKE $2)
            "#,
        )
        .bind(&filter.status)
        .bind(&search_pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok(PaginatedTests {
            tests,
            total,
            page,
            per_page: limit,
            total_pages: (total + limit - 1) / limit.max(1),
        })
    }

    /// The participant-facing catalog: active tests only, flagged `completed`
    /// for the given participant so the client can link to the stored result.
    pub async fn list_active_catalog(
        &self,
        participant_id: Option<Uuid>,
    ) -> Result<Vec<TestCatalogEntry>> {
        let rows = sqlx::query_as::<_, CatalogRow>(
            r#"
            SELECT t.id, t.title, t.description, t.timer_minutes,
                   (SELECT COUNT(*) FROM questions q WHERE q.test_id = t.id) AS question_count,
                   EXISTS (
                       SELECT 1 FROM test_results r
                       WHERE r.test_id = t.id AND r.participant_id = $2
                   ) AS completed
            FROM tests t
            WHERE t.status = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(status::ACTIVE)
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| TestCatalogEntry {
                id: r.id,
                title: r.title,
                description: r.description,
                timer_minutes: r.timer_minutes,
                question_count: r.question_count,
                completed: r.completed,
            })
            .collect())
    }
}

#[derive(sqlx::FromRow)]
struct CatalogRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    timer_minutes: Option<i32>,
    question_count: i64,
    completed: bool,
}

async fn insert_questions(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    test_id: Uuid,
    questions: &[PreparedQuestion],
) -> Result<()> {
    for q in questions {
        let question_id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO questions (test_id, text, position) VALUES ($1, $2, $3) RETURNING id"#,
        )
        .bind(test_id)
        .bind(&q.text)
        .bind(q.position)
        .fetch_one(&mut **tx)
        .await?;

        for a in &q.answers {
            sqlx::query(
                r#"INSERT INTO answers (question_id, text, is_correct, position) VALUES ($1, $2, $3, $4)"#,
            )
            .bind(question_id)
            .bind(&a.text)
            .bind(a.is_correct)
            .bind(a.position)
            .execute(&mut **tx)
            .await?;
        }
    }
    Ok(())
}

fn validate_status(value: &str) -> Result<String> {
    if status::ALL.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(Error::BadRequest(format!("Unknown test status '{}'", value)))
    }
}

fn validate_show_answers(value: &str) -> Result<String> {
    if show_answers::ALL.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(Error::BadRequest(format!(
            "Unknown answer-reveal policy '{}'",
            value
        )))
    }
}

/// Authoring-time validation: non-empty trimmed texts, at least one question,
/// two answers per question and at least one marked correct. Positions fall
/// back to payload order.
fn prepare_questions(questions: &[CreateQuestionPayload]) -> Result<Vec<PreparedQuestion>> {
    if questions.is_empty() {
        return Err(Error::BadRequest(
            "A test must have at least one question".to_string(),
        ));
    }

    let mut prepared = Vec::with_capacity(questions.len());
    for (q_index, q) in questions.iter().enumerate() {
        let text = trimmed_non_empty(&q.text).ok_or_else(|| {
            Error::BadRequest(format!("Question #{} text must not be empty", q_index + 1))
        })?;

        if q.answers.len() < 2 {
            return Err(Error::BadRequest(format!(
                "Question #{} must have at least 2 answer options",
                q_index + 1
            )));
        }

        let mut has_correct = false;
        let mut answers = Vec::with_capacity(q.answers.len());
        for (a_index, a) in q.answers.iter().enumerate() {
            let answer_text = trimmed_non_empty(&a.text).ok_or_else(|| {
                Error::BadRequest(format!(
                    "Answer text in question #{} must not be empty",
                    q_index + 1
                ))
            })?;
            if a.is_correct {
                has_correct = true;
            }
            answers.push(PreparedAnswer {
                text: answer_text,
                is_correct: a.is_correct,
                position: a.position.unwrap_or(a_index as i32),
            });
        }

        if !has_correct {
            return Err(Error::BadRequest(format!(
                "Question #{} must have at least one correct answer",
                q_index + 1
            )));
        }

        prepared.push(PreparedQuestion {
            text,
            position: q.position.unwrap_or(q_index as i32),
            answers,
        });
    }

    Ok(prepared)
}

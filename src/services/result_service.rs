use crate::dto::public_dto::{ResultAnswerView, ResultResponse};
use crate::error::{Error, Result};
use crate::models::test::show_answers;
use crate::models::test_result::TestResult;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, serde::Serialize, sqlx::FromRow)]
pub struct ResultOverview {
    pub id: Uuid,
    pub test_id: Uuid,
    pub test_title: String,
    pub participant_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub percentage: f64,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, serde::Serialize)]
pub struct PaginatedResults {
    #[serde(rename = "items")]
    pub results: Vec<ResultOverview>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(sqlx::FromRow)]
struct ResultRow {
    question_id: Uuid,
    question_text: String,
    position: i32,
    selected_answer: Option<String>,
    is_correct: bool,
    correct_answer: Option<String>,
}

#[derive(Clone)]
pub struct ResultService {
    pool: PgPool,
}

impl ResultService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A participant may only see their own result; anything else reads as a
    /// stale link and comes back NotFound.
    pub async fn get_for_participant(
        &self,
        result_id: Uuid,
        participant_id: Option<Uuid>,
    ) -> Result<ResultResponse> {
        let participant_id = participant_id
            .ok_or_else(|| Error::NotRegistered("No participant in request context".to_string()))?;

        let result = sqlx::query_as::<_, TestResult>(
            r#"SELECT * FROM test_results WHERE id = $1 AND participant_id = $2"#,
        )
        .bind(result_id)
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Result not found".to_string()))?;

        self.build_response(result, false).await
    }

    /// Admin view of a stored result. Read-only, reveal policy ignored.
    pub async fn get_by_id(&self, result_id: Uuid) -> Result<ResultResponse> {
        let result =
            sqlx::query_as::<_, TestResult>(r#"SELECT * FROM test_results WHERE id = $1"#)
                .bind(result_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| Error::NotFound("Result not found".to_string()))?;

        self.build_response(result, true).await
    }

    pub async fn list(
        &self,
        test_id: Option<Uuid>,
        page: i64,
        limit: i64,
    ) -> Result<PaginatedResults> {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);
        let offset = (page - 1) * limit;

        let results = sqlx::query_as::<_, ResultOverview>(
            r#"
            SELECT r.id, r.test_id, t.title AS test_title,
                   r.participant_id, p.first_name, p.last_name,
                   r.total_questions, r.correct_answers, r.percentage, r.completed_at
            FROM test_results r
            JOIN tests t ON r.test_id = t.id
            JOIN participants p ON r.participant_id = p.id
            WHERE ($1::uuid IS NULL OR r.test_id = $1)
            ORDER BY r.completed_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(test_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM test_results WHERE ($1::uuid IS NULL OR test_id = $1)"#,
        )
        .bind(test_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(PaginatedResults {
            results,
            total,
            page,
            per_page: limit,
            total_pages: (total + limit - 1) / limit.max(1),
        })
    }

    async fn build_response(
        &self,
        result: TestResult,
        reveal_override: bool,
    ) -> Result<ResultResponse> {
        let (test_title, test_show_answers, show_result): (String, String, bool) =
            sqlx::query_as(r#"SELECT title, show_answers, show_result FROM tests WHERE id = $1"#)
                .bind(result.test_id)
                .fetch_one(&self.pool)
                .await?;

        let participant_name: String =
            sqlx::query_scalar(r#"SELECT first_name || ' ' || last_name FROM participants WHERE id = $1"#)
                .bind(result.participant_id)
                .fetch_one(&self.pool)
                .await?;

        let reveal_correct = reveal_override || test_show_answers != show_answers::NEVER;

        // First correct option per question, in question order; the selected
        // answer joins weakly since the option may have been deleted since.
        let rows = sqlx::query_as::<_, ResultRow>(
            r#"
            SELECT q.id AS question_id, q.text AS question_text, q.position,
                   sel.text AS selected_answer, ua.is_correct,
                   (SELECT a.text FROM answers a
                    WHERE a.question_id = q.id AND a.is_correct
                    ORDER BY a.position LIMIT 1) AS correct_answer
            FROM user_answers ua
            JOIN questions q ON ua.question_id = q.id
            LEFT JOIN answers sel ON ua.selected_answer_id = sel.id
            WHERE ua.test_result_id = $1
            ORDER BY q.position
            "#,
        )
        .bind(result.id)
        .fetch_all(&self.pool)
        .await?;

        let answers = rows
            .into_iter()
            .map(|r| ResultAnswerView {
                question_id: r.question_id,
                question_text: r.question_text,
                position: r.position,
                selected_answer: r.selected_answer,
                is_correct: r.is_correct,
                correct_answer: if reveal_correct { r.correct_answer } else { None },
            })
            .collect();

        Ok(ResultResponse {
            result_id: result.id,
            test_id: result.test_id,
            test_title,
            participant_name,
            total_questions: result.total_questions,
            correct_answers: result.correct_answers,
            percentage: result.percentage,
            completed_at: result.completed_at,
            show_result,
            answers,
        })
    }
}

// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        candidate::{AssignedInterview, Candidate},
        criterion::Criterion,
        question::{Difficulty, PublicQuestion, Question},
        session::{Evaluation, InterviewSession, NewSession, SessionStatus, SubmittedAnswer},
    },
    store::{CandidateStore, CriteriaStore, QuestionStore, SessionStore},
};

const CRITERION_COLUMNS: &str = "id, name, category_id, easy, medium, hard, time_limit, \
     passing_marks, valid_from, valid_to, created_by, created_at";

const QUESTION_COLUMNS: &str =
    "id, qno, question, answer, difficulty, category_id, image_url, created_by";

/// Postgres-backed implementation of every store contract.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Helper struct for reading questions; difficulty is stored as TEXT.
#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: i64,
    qno: Option<i32>,
    question: String,
    answer: String,
    difficulty: String,
    category_id: i64,
    image_url: Option<String>,
    created_by: String,
}

impl TryFrom<QuestionRow> for Question {
    type Error = AppError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let difficulty = row
            .difficulty
            .parse::<Difficulty>()
            .map_err(AppError::InternalServerError)?;

        Ok(Question {
            id: row.id,
            qno: row.qno,
            question: row.question,
            answer: row.answer,
            difficulty,
            category_id: row.category_id,
            image_url: row.image_url,
            created_by: row.created_by,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CandidateRow {
    candidate_id: String,
    name: String,
    email: String,
    phone: String,
    password: String,
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    candidate_id: String,
    interview_name: String,
    criteria_id: i64,
    status: String,
    questions: Json<Vec<PublicQuestion>>,
    evaluation: Option<Json<Evaluation>>,
    answers_rev: i64,
    created_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct AnswerRow {
    question_id: i64,
    answer_text: String,
    answered_at: DateTime<Utc>,
}

#[async_trait]
impl CriteriaStore for PgStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Criterion>, AppError> {
        let sql = format!(
            "SELECT {CRITERION_COLUMNS} FROM criteria WHERE name = $1 \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        );

        sqlx::query_as::<_, Criterion>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch criterion by name: {:?}", e);
                AppError::from(e)
            })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Criterion>, AppError> {
        let sql = format!("SELECT {CRITERION_COLUMNS} FROM criteria WHERE id = $1");

        sqlx::query_as::<_, Criterion>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch criterion {}: {:?}", id, e);
                AppError::from(e)
            })
    }
}

#[async_trait]
impl QuestionStore for PgStore {
    async fn list_by_band(
        &self,
        category_id: i64,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, AppError> {
        let sql = format!(
            "SELECT {QUESTION_COLUMNS} FROM questions \
             WHERE category_id = $1 AND difficulty = $2 ORDER BY id"
        );

        let rows = sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(category_id)
            .bind(difficulty.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch {} questions: {:?}", difficulty, e);
                AppError::from(e)
            })?;

        rows.into_iter().map(Question::try_from).collect()
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Question>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // Use QueryBuilder for dynamic IN clause
        let mut query_builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id IN ("
        ));

        let mut separated = query_builder.separated(",");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows: Vec<QuestionRow> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch reference answers: {:?}", e);
                AppError::from(e)
            })?;

        rows.into_iter().map(Question::try_from).collect()
    }
}

#[async_trait]
impl CandidateStore for PgStore {
    async fn find(&self, candidate_id: &str) -> Result<Option<Candidate>, AppError> {
        let row = sqlx::query_as::<_, CandidateRow>(
            "SELECT candidate_id, name, email, phone, password FROM candidates WHERE candidate_id = $1",
        )
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let interviews = sqlx::query_as::<_, AssignedInterview>(
            r#"
            SELECT interview_name, interview_date, interview_time
            FROM candidate_interviews
            WHERE candidate_id = $1
            ORDER BY id
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Candidate {
            candidate_id: row.candidate_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            password: row.password,
            interviews,
        }))
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn create(&self, new: NewSession) -> Result<InterviewSession, AppError> {
        let session = InterviewSession {
            id: Uuid::new_v4(),
            candidate_id: new.candidate_id,
            interview_name: new.interview_name,
            criteria_id: new.criteria_id,
            status: SessionStatus::Ongoing,
            created_at: Utc::now(),
            questions: new.questions,
            answers: Vec::new(),
            finished_at: None,
            evaluation: None,
            answers_rev: 0,
        };

        sqlx::query(
            r#"
            INSERT INTO interview_sessions
                (id, candidate_id, interview_name, criteria_id, status, questions, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(session.id)
        .bind(&session.candidate_id)
        .bind(&session.interview_name)
        .bind(session.criteria_id)
        .bind(session.status.as_str())
        .bind(Json(&session.questions))
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert interview session: {:?}", e);
            AppError::from(e)
        })?;

        Ok(session)
    }

    async fn find_owned(
        &self,
        id: Uuid,
        candidate_id: &str,
    ) -> Result<Option<InterviewSession>, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, candidate_id, interview_name, criteria_id, status,
                   questions, evaluation, answers_rev, created_at, finished_at
            FROM interview_sessions
            WHERE id = $1 AND candidate_id = $2
            "#,
        )
        .bind(id)
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let answers = sqlx::query_as::<_, AnswerRow>(
            r#"
            SELECT question_id, answer_text, answered_at
            FROM session_answers
            WHERE session_id = $1
            ORDER BY seq
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let status = row
            .status
            .parse::<SessionStatus>()
            .map_err(AppError::InternalServerError)?;

        Ok(Some(InterviewSession {
            id: row.id,
            candidate_id: row.candidate_id,
            interview_name: row.interview_name,
            criteria_id: row.criteria_id,
            status,
            created_at: row.created_at,
            questions: row.questions.0,
            answers: answers
                .into_iter()
                .map(|a| SubmittedAnswer {
                    qid: a.question_id,
                    answer_text: a.answer_text,
                    at: a.answered_at,
                })
                .collect(),
            finished_at: row.finished_at,
            evaluation: row.evaluation.map(|e| e.0),
            answers_rev: row.answers_rev,
        }))
    }

    async fn upsert_answer(
        &self,
        id: Uuid,
        candidate_id: &str,
        qid: i64,
        answer_text: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        // The revision bump locks the session row, so this write and a
        // concurrent finish serialize. Ownership and status are checked there.
        let result = sqlx::query(
            r#"
            WITH bumped AS (
                UPDATE interview_sessions
                SET answers_rev = answers_rev + 1
                WHERE id = $1 AND candidate_id = $2 AND status = 'ongoing'
                RETURNING id
            )
            INSERT INTO session_answers (session_id, question_id, answer_text, answered_at)
            SELECT id, $3, $4, $5 FROM bumped
            ON CONFLICT (session_id, question_id) DO UPDATE SET
                answer_text = EXCLUDED.answer_text,
                answered_at = EXCLUDED.answered_at
            "#,
        )
        .bind(id)
        .bind(candidate_id)
        .bind(qid)
        .bind(answer_text)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert answer: {:?}", e);
            AppError::from(e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn complete(
        &self,
        id: Uuid,
        candidate_id: &str,
        answers_rev: i64,
        evaluation: &Evaluation,
        finished_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE interview_sessions
            SET status = 'finished', finished_at = $3, evaluation = $4
            WHERE id = $1 AND candidate_id = $2 AND status = 'ongoing'
              AND answers_rev = $5
            "#,
        )
        .bind(id)
        .bind(candidate_id)
        .bind(finished_at)
        .bind(Json(evaluation))
        .bind(answers_rev)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to finish interview session: {:?}", e);
            AppError::from(e)
        })?;

        Ok(result.rows_affected() == 1)
    }
}

// src/store/mod.rs

//! Persistence contracts used by the interview pipeline.
//!
//! Each trait is a read-only lookup except [`SessionStore`], which owns the
//! only mutable entity. Implementations must make answer upserts atomic per
//! question and the ongoing-to-finished transition a single conditional
//! update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        candidate::Candidate,
        criterion::Criterion,
        question::{Difficulty, Question},
        session::{Evaluation, InterviewSession, NewSession},
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait CriteriaStore: Send + Sync {
    /// Looks a criterion up by interview name across all admins.
    /// When several admins use the same name the most recently created wins.
    async fn find_by_name(&self, name: &str) -> Result<Option<Criterion>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Criterion>, AppError>;
}

#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// All questions of one band in a category, ordered by id.
    async fn list_by_band(
        &self,
        category_id: i64,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, AppError>;

    /// Questions for the given ids. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Question>, AppError>;
}

#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn find(&self, candidate_id: &str) -> Result<Option<Candidate>, AppError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Inserts a new `ongoing` session with no answers.
    async fn create(&self, new: NewSession) -> Result<InterviewSession, AppError>;

    /// Returns the session only if it belongs to `candidate_id`.
    async fn find_owned(
        &self,
        id: Uuid,
        candidate_id: &str,
    ) -> Result<Option<InterviewSession>, AppError>;

    /// Inserts or replaces the answer for `qid`.
    /// Returns `false` when the session is absent, not owned, or not ongoing.
    async fn upsert_answer(
        &self,
        id: Uuid,
        candidate_id: &str,
        qid: i64,
        answer_text: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Atomically moves an ongoing session to finished with its evaluation.
    /// Returns `false` when the session is absent, not owned, already finished,
    /// or its answers changed since `answers_rev` was read.
    async fn complete(
        &self,
        id: Uuid,
        candidate_id: &str,
        answers_rev: i64,
        evaluation: &Evaluation,
        finished_at: DateTime<Utc>,
    ) -> Result<bool, AppError>;
}

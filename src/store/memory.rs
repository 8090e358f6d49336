// src/store/memory.rs

//! In-process store used by tests and local runs without Postgres.
//!
//! Every operation runs under a single lock, which gives the same per-answer
//! atomicity and at-most-once finish as the conditional SQL statements.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        candidate::Candidate,
        criterion::Criterion,
        question::{Difficulty, Question},
        session::{Evaluation, InterviewSession, NewSession, SessionStatus, SubmittedAnswer},
    },
    store::{CandidateStore, CriteriaStore, QuestionStore, SessionStore},
};

#[derive(Default)]
struct Inner {
    criteria: Vec<Criterion>,
    questions: Vec<Question>,
    candidates: HashMap<String, Candidate>,
    sessions: HashMap<Uuid, InterviewSession>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock cannot leave a half-written record,
        // so a poisoned guard is still consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert_criterion(&self, criterion: Criterion) {
        self.lock().criteria.push(criterion);
    }

    pub fn remove_criterion(&self, id: i64) {
        self.lock().criteria.retain(|c| c.id != id);
    }

    pub fn insert_question(&self, question: Question) {
        self.lock().questions.push(question);
    }

    pub fn insert_candidate(&self, candidate: Candidate) {
        self.lock()
            .candidates
            .insert(candidate.candidate_id.clone(), candidate);
    }

    /// Reads a session regardless of owner.
    pub fn session(&self, id: Uuid) -> Option<InterviewSession> {
        self.lock().sessions.get(&id).cloned()
    }
}

#[async_trait]
impl CriteriaStore for MemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Criterion>, AppError> {
        Ok(self
            .lock()
            .criteria
            .iter()
            .filter(|c| c.name == name)
            .max_by_key(|c| (c.created_at, c.id))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Criterion>, AppError> {
        Ok(self.lock().criteria.iter().find(|c| c.id == id).cloned())
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn list_by_band(
        &self,
        category_id: i64,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, AppError> {
        let mut band: Vec<Question> = self
            .lock()
            .questions
            .iter()
            .filter(|q| q.category_id == category_id && q.difficulty == difficulty)
            .cloned()
            .collect();
        band.sort_by_key(|q| q.id);
        Ok(band)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Question>, AppError> {
        Ok(self
            .lock()
            .questions
            .iter()
            .filter(|q| ids.contains(&q.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CandidateStore for MemoryStore {
    async fn find(&self, candidate_id: &str) -> Result<Option<Candidate>, AppError> {
        Ok(self.lock().candidates.get(candidate_id).cloned())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
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

        self.lock().sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_owned(
        &self,
        id: Uuid,
        candidate_id: &str,
    ) -> Result<Option<InterviewSession>, AppError> {
        Ok(self
            .lock()
            .sessions
            .get(&id)
            .filter(|s| s.candidate_id == candidate_id)
            .cloned())
    }

    async fn upsert_answer(
        &self,
        id: Uuid,
        candidate_id: &str,
        qid: i64,
        answer_text: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut inner = self.lock();
        let Some(session) = inner.sessions.get_mut(&id).filter(|s| {
            s.candidate_id == candidate_id && s.status == SessionStatus::Ongoing
        }) else {
            return Ok(false);
        };

        match session.answers.iter_mut().find(|a| a.qid == qid) {
            Some(existing) => {
                existing.answer_text = answer_text.to_string();
                existing.at = at;
            }
            None => session.answers.push(SubmittedAnswer {
                qid,
                answer_text: answer_text.to_string(),
                at,
            }),
        }
        session.answers_rev += 1;
        Ok(true)
    }

    async fn complete(
        &self,
        id: Uuid,
        candidate_id: &str,
        answers_rev: i64,
        evaluation: &Evaluation,
        finished_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut inner = self.lock();
        let Some(session) = inner.sessions.get_mut(&id).filter(|s| {
            s.candidate_id == candidate_id
                && s.status == SessionStatus::Ongoing
                && s.answers_rev == answers_rev
        }) else {
            return Ok(false);
        };

        session.status = SessionStatus::Finished;
        session.finished_at = Some(finished_at);
        session.evaluation = Some(evaluation.clone());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::Verdict;

    fn new_session(candidate: &str) -> NewSession {
        NewSession {
            candidate_id: candidate.into(),
            interview_name: "DSA".into(),
            criteria_id: 1,
            questions: Vec::new(),
        }
    }

    fn evaluation() -> Evaluation {
        Evaluation {
            per_question: Vec::new(),
            overall: 0,
            passing_marks: 50,
            status: Verdict::Fail,
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_answer() {
        let store = MemoryStore::new();
        let session = store.create(new_session("c1")).await.unwrap();

        assert!(store.upsert_answer(session.id, "c1", 5, "first", Utc::now()).await.unwrap());
        assert!(store.upsert_answer(session.id, "c1", 6, "other", Utc::now()).await.unwrap());
        assert!(store.upsert_answer(session.id, "c1", 5, "second", Utc::now()).await.unwrap());

        let stored = store.session(session.id).unwrap();
        assert_eq!(stored.answers.len(), 2);
        assert_eq!(stored.answers[0].qid, 5);
        assert_eq!(stored.answers[0].answer_text, "second");
    }

    #[tokio::test]
    async fn test_upsert_rejects_foreign_candidate() {
        let store = MemoryStore::new();
        let session = store.create(new_session("c1")).await.unwrap();

        let saved = store
            .upsert_answer(session.id, "intruder", 5, "x", Utc::now())
            .await
            .unwrap();
        assert!(!saved);
        assert!(store.find_owned(session.id, "intruder").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_complete_only_once() {
        let store = MemoryStore::new();
        let session = store.create(new_session("c1")).await.unwrap();

        assert!(store.complete(session.id, "c1", 0, &evaluation(), Utc::now()).await.unwrap());
        assert!(!store.complete(session.id, "c1", 0, &evaluation(), Utc::now()).await.unwrap());
        assert!(!store.upsert_answer(session.id, "c1", 1, "late", Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_complete_rejects_stale_answer_revision() {
        let store = MemoryStore::new();
        let session = store.create(new_session("c1")).await.unwrap();
        store.upsert_answer(session.id, "c1", 1, "graded", Utc::now()).await.unwrap();
        let graded = store.find_owned(session.id, "c1").await.unwrap().unwrap();

        // Arrives after grading started but before the commit.
        store.upsert_answer(session.id, "c1", 2, "late", Utc::now()).await.unwrap();

        let stale = store
            .complete(session.id, "c1", graded.answers_rev, &evaluation(), Utc::now())
            .await
            .unwrap();
        assert!(!stale);
        assert_eq!(store.session(session.id).unwrap().status, SessionStatus::Ongoing);

        let current = store.find_owned(session.id, "c1").await.unwrap().unwrap();
        assert_eq!(current.answers.len(), 2);
        assert!(
            store
                .complete(session.id, "c1", current.answers_rev, &evaluation(), Utc::now())
                .await
                .unwrap()
        );
    }
}

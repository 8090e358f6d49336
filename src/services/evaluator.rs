// src/services/evaluator.rs

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    error::AppError,
    models::session::{Evaluation, InterviewSession, QuestionScore, Verdict},
    services::judge::{JudgeError, JudgeScore, ScoringJudge, clamp_score},
    store::{CriteriaStore, QuestionStore},
};

pub const REFERENCE_MISSING: &str = "Reference missing";

/// Grades the answers of a session against the question bank.
#[derive(Clone)]
pub struct Evaluator {
    criteria: Arc<dyn CriteriaStore>,
    questions: Arc<dyn QuestionStore>,
    judge: Arc<dyn ScoringJudge>,
}

impl Evaluator {
    pub fn new(
        criteria: Arc<dyn CriteriaStore>,
        questions: Arc<dyn QuestionStore>,
        judge: Arc<dyn ScoringJudge>,
    ) -> Self {
        Self {
            criteria,
            questions,
            judge,
        }
    }

    /// Scores every submitted answer and derives the verdict.
    ///
    /// Only answered questions count: unanswered ones from the frozen set are
    /// excluded from both the sum and the divisor. A judge failure on one
    /// answer degrades that answer to 0; only a missing judge credential
    /// aborts the whole evaluation.
    pub async fn evaluate(&self, session: &InterviewSession) -> Result<Evaluation, AppError> {
        let passing_marks = self
            .criteria
            .find_by_id(session.criteria_id)
            .await?
            .map(|c| c.passing_marks)
            .unwrap_or(0);

        let qids: Vec<i64> = session.answers.iter().map(|a| a.qid).collect();
        let references: HashMap<i64, String> = self
            .questions
            .find_by_ids(&qids)
            .await?
            .into_iter()
            .map(|q| (q.id, q.answer))
            .collect();

        let mut per_question = Vec::with_capacity(session.answers.len());
        for answer in &session.answers {
            let reference = references
                .get(&answer.qid)
                .map(|r| r.trim())
                .filter(|r| !r.is_empty());

            let verdict = match reference {
                None => JudgeScore {
                    score: 0,
                    justification: REFERENCE_MISSING.to_string(),
                },
                Some(reference) => self.judge_one(session, answer.qid, reference, &answer.answer_text).await?,
            };

            per_question.push(QuestionScore {
                qid: answer.qid,
                score: verdict.score,
                justification: verdict.justification,
            });
        }

        let scores: Vec<i32> = per_question.iter().map(|q| q.score).collect();
        let overall = overall_score(&scores);

        Ok(Evaluation {
            per_question,
            overall,
            passing_marks,
            status: verdict(overall, passing_marks),
        })
    }

    async fn judge_one(
        &self,
        session: &InterviewSession,
        qid: i64,
        reference: &str,
        candidate: &str,
    ) -> Result<JudgeScore, AppError> {
        match self.judge.score(reference, candidate).await {
            Ok(score) => Ok(JudgeScore {
                score: clamp_score(i64::from(score.score)),
                justification: score.justification,
            }),
            Err(JudgeError::Unavailable) => {
                tracing::error!(
                    "Scoring judge unavailable while finishing session {}",
                    session.id
                );
                Err(AppError::ServiceUnavailable(
                    "Scoring service unavailable".to_string(),
                ))
            }
            Err(e) => {
                tracing::warn!(
                    "Judge failed for question {} in session {}: {}",
                    qid,
                    session.id,
                    e
                );
                Ok(JudgeScore::malformed())
            }
        }
    }
}

/// Mean of the per-question scores, with ties rounded to the even integer.
/// The divisor never drops below 1.
pub fn overall_score(scores: &[i32]) -> i32 {
    let total: i64 = scores.iter().map(|s| i64::from(*s)).sum();
    let answered = scores.len().max(1) as f64;
    clamp_score((total as f64 / answered).round_ties_even() as i64)
}

pub fn verdict(overall: i32, passing_marks: i32) -> Verdict {
    if overall >= passing_marks {
        Verdict::Pass
    } else {
        Verdict::Fail
    }
}

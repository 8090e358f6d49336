// src/models/session.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::question::PublicQuestion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Ongoing,
    Finished,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Ongoing => "ongoing",
            SessionStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ongoing" => Ok(SessionStatus::Ongoing),
            "finished" => Ok(SessionStatus::Finished),
            other => Err(format!("unknown session status '{}'", other)),
        }
    }
}

/// One stored answer. At most one per question id in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubmittedAnswer {
    pub qid: i64,
    pub answer_text: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuestionScore {
    pub qid: i64,
    pub score: i32,
    pub justification: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

/// Result of grading a finished session. Stored as JSONB on the session row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Evaluation {
    pub per_question: Vec<QuestionScore>,
    pub overall: i32,
    pub passing_marks: i32,
    pub status: Verdict,
}

/// Represents the 'interview_sessions' table with its answers attached.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InterviewSession {
    pub id: Uuid,
    pub candidate_id: String,
    pub interview_name: String,
    pub criteria_id: i64,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    /// Questions served at start, frozen for the session's lifetime.
    pub questions: Vec<PublicQuestion>,
    /// In order of first submission.
    pub answers: Vec<SubmittedAnswer>,
    pub finished_at: Option<DateTime<Utc>>,
    pub evaluation: Option<Evaluation>,
    /// Bumped on every answer write. Finish commits only against the
    /// revision it graded.
    #[serde(skip)]
    pub answers_rev: i64,
}

/// Data required to open a session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub candidate_id: String,
    pub interview_name: String,
    pub criteria_id: i64,
    pub questions: Vec<PublicQuestion>,
}

/// Question id as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum QuestionRef {
    Number(i64),
    Text(String),
}

impl QuestionRef {
    pub fn parse(&self) -> Option<i64> {
        match self {
            QuestionRef::Number(n) => Some(*n),
            QuestionRef::Text(s) => s.trim().parse().ok(),
        }
    }
}

// Request fields are optional so that missing values surface as 400
// with our own message instead of the extractor's rejection.

#[derive(Debug, Deserialize, ToSchema)]
pub struct StartInterviewRequest {
    pub interview_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StartInterviewResponse {
    pub session_id: Uuid,
    pub interview_name: String,
    pub time: i32,
    pub passing_marks: i32,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitAnswerRequest {
    pub session_id: Option<String>,
    pub qid: Option<QuestionRef>,
    pub answer_text: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitAnswerResponse {
    pub message: String,
    pub session_id: Uuid,
    pub qid: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FinishInterviewRequest {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FinishInterviewResponse {
    pub session_id: Uuid,
    pub overall: i32,
    pub passing_marks: i32,
    pub status: Verdict,
    pub per_question: Vec<QuestionScore>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_ref_accepts_number_and_string() {
        let n: QuestionRef = serde_json::from_value(serde_json::json!(42)).unwrap();
        let s: QuestionRef = serde_json::from_value(serde_json::json!("42")).unwrap();
        let bad: QuestionRef = serde_json::from_value(serde_json::json!("abc")).unwrap();
        assert_eq!(n.parse(), Some(42));
        assert_eq!(s.parse(), Some(42));
        assert_eq!(bad.parse(), None);
    }

    #[test]
    fn test_verdict_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Verdict::Pass).unwrap(), "pass");
        assert_eq!(serde_json::to_value(SessionStatus::Finished).unwrap(), "finished");
    }
}

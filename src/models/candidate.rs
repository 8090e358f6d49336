// src/models/candidate.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Represents the 'candidates' table joined with its assigned interviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique candidate identifier issued by the admin's import.
    pub candidate_id: String,

    pub name: String,
    pub email: String,
    pub phone: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub interviews: Vec<AssignedInterview>,
}

impl Candidate {
    /// An assignment is the authorization record for starting a session.
    pub fn is_assigned(&self, interview_name: &str) -> bool {
        self.interviews
            .iter()
            .any(|i| i.interview_name == interview_name)
    }
}

/// Represents the 'candidate_interviews' table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct AssignedInterview {
    pub interview_name: String,
    pub interview_date: String,
    pub interview_time: String,
}

/// DTO for candidate login.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CandidateLoginRequest {
    #[serde(rename = "candidateId")]
    #[validate(length(min = 1, max = 100, message = "candidateId is required"))]
    pub candidate_id: String,
    #[validate(length(min = 1, max = 128, message = "password is required"))]
    pub password: String,
}

/// An assigned interview enriched with its criterion's schedule data.
#[derive(Debug, Serialize, ToSchema)]
pub struct InterviewSummary {
    pub interview_name: String,
    pub interview_date: String,
    pub interview_time: String,
    pub time: Option<i32>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CandidateProfile {
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub interviews: Vec<InterviewSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CandidateLoginResponse {
    pub message: String,
    pub access_token: String,
    pub token_type: String,
    pub candidate: CandidateProfile,
}

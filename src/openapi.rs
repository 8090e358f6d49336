// src/openapi.rs

use axum::{Json, response::IntoResponse};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::models::{
    candidate::{AssignedInterview, CandidateLoginRequest, CandidateLoginResponse, CandidateProfile, InterviewSummary},
    question::{Difficulty, PublicQuestion},
    session::{
        Evaluation, FinishInterviewRequest, FinishInterviewResponse, InterviewSession,
        QuestionRef, QuestionScore, SessionStatus, StartInterviewRequest, StartInterviewResponse,
        SubmitAnswerRequest, SubmitAnswerResponse, SubmittedAnswer, Verdict,
    },
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::auth::candidate_login,
        crate::handlers::interview::start_interview,
        crate::handlers::interview::submit_answer,
        crate::handlers::interview::finish_interview,
        crate::handlers::interview::get_session
    ),
    components(schemas(
        AssignedInterview,
        CandidateLoginRequest,
        CandidateLoginResponse,
        CandidateProfile,
        InterviewSummary,
        Difficulty,
        PublicQuestion,
        Evaluation,
        FinishInterviewRequest,
        FinishInterviewResponse,
        InterviewSession,
        QuestionRef,
        QuestionScore,
        SessionStatus,
        StartInterviewRequest,
        StartInterviewResponse,
        SubmitAnswerRequest,
        SubmitAnswerResponse,
        SubmittedAnswer,
        Verdict
    )),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_interview_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/candidate/login",
            "/api/interview/start",
            "/api/interview/answer",
            "/api/interview/finish",
            "/api/interview/sessions/{session_id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}

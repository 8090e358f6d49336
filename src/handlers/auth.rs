// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::candidate::{
        CandidateLoginRequest, CandidateLoginResponse, CandidateProfile, InterviewSummary,
    },
    state::AppState,
    utils::{
        extract::AppJson,
        hash::verify_password,
        jwt::{CANDIDATE_ROLE, sign_jwt},
    },
};

/// Authenticates a candidate and returns an access token.
///
/// The response lists the candidate's assigned interviews, each enriched with
/// the time limit and validity window of the criterion it resolves to.
#[utoipa::path(
    post,
    path = "/api/auth/candidate/login",
    request_body = CandidateLoginRequest,
    responses(
        (status = 200, body = CandidateLoginResponse),
        (status = 400, description = "Missing candidateId or password"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn candidate_login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CandidateLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        tracing::debug!("Login validation failed: {}", validation_errors);
        return Err(AppError::BadRequest(
            "candidateId and password are required".to_string(),
        ));
    }

    let invalid = || AppError::AuthError("Invalid credentials".to_string());

    let candidate = state
        .candidates
        .find(&payload.candidate_id)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &candidate.password)? {
        return Err(invalid());
    }

    let token = sign_jwt(
        &candidate.candidate_id,
        CANDIDATE_ROLE,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;

    let mut interviews = Vec::with_capacity(candidate.interviews.len());
    for assigned in candidate.interviews {
        let criterion = state.criteria.find_by_name(&assigned.interview_name).await?;
        interviews.push(InterviewSummary {
            time: criterion.as_ref().map(|c| c.time_limit),
            valid_from: criterion.as_ref().and_then(|c| c.valid_from),
            valid_to: criterion.as_ref().and_then(|c| c.valid_to),
            interview_name: assigned.interview_name,
            interview_date: assigned.interview_date,
            interview_time: assigned.interview_time,
        });
    }

    tracing::info!("Candidate {} logged in", candidate.candidate_id);

    Ok(Json(CandidateLoginResponse {
        message: "Login successful".to_string(),
        access_token: token,
        token_type: "Bearer".to_string(),
        candidate: CandidateProfile {
            candidate_id: candidate.candidate_id,
            name: candidate.name,
            email: candidate.email,
            phone: candidate.phone,
            interviews,
        },
    }))
}

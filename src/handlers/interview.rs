// src/handlers/interview.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::session::{
        FinishInterviewRequest, FinishInterviewResponse, InterviewSession, NewSession,
        SessionStatus, StartInterviewRequest, StartInterviewResponse, SubmitAnswerRequest,
        SubmitAnswerResponse,
    },
    services::{criteria, selector},
    state::AppState,
    utils::{extract::AppJson, jwt::Claims},
};

const MAX_FINISH_ATTEMPTS: u32 = 3;

fn inactive_session() -> AppError {
    AppError::NotFoundOrForbidden("Session not found or not active".to_string())
}

fn parse_session_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

/// Starts an interview session for the authenticated candidate.
///
/// * Checks the interview is assigned to the candidate.
/// * Resolves the criterion and checks its validity window against today (UTC).
/// * Draws the question set and freezes it on a new `ongoing` session.
#[utoipa::path(
    post,
    path = "/api/interview/start",
    request_body = StartInterviewRequest,
    responses(
        (status = 200, body = StartInterviewResponse),
        (status = 400, description = "interview_name missing"),
        (status = 403, description = "Not assigned or outside the validity window"),
        (status = 404, description = "No criteria or no questions")
    ),
    security(("bearer" = []))
)]
pub async fn start_interview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(req): AppJson<StartInterviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let interview_name = req.interview_name.as_deref().map(str::trim).unwrap_or_default();
    if interview_name.is_empty() {
        return Err(AppError::BadRequest("interview_name is required".to_string()));
    }

    let candidate = state
        .candidates
        .find(&claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("Candidate not found".to_string()))?;

    if !candidate.is_assigned(interview_name) {
        return Err(AppError::Forbidden(
            "Interview not assigned to this candidate".to_string(),
        ));
    }

    let criterion = criteria::resolve(state.criteria.as_ref(), interview_name).await?;

    if !criterion.is_available_on(Utc::now().date_naive()) {
        return Err(AppError::Forbidden(
            "Interview is not available at this time".to_string(),
        ));
    }

    let questions = selector::select_questions(
        state.questions.as_ref(),
        state.rng.as_ref(),
        criterion.category_id,
        criterion.band_counts(),
    )
    .await?;

    if questions.is_empty() {
        return Err(AppError::NotFound(
            "No criteria/questions found for this interview".to_string(),
        ));
    }

    let session = state
        .sessions
        .create(NewSession {
            candidate_id: candidate.candidate_id,
            interview_name: interview_name.to_string(),
            criteria_id: criterion.id,
            questions,
        })
        .await?;

    tracing::info!(
        "Session {} started: candidate={} interview='{}' questions={}",
        session.id,
        session.candidate_id,
        session.interview_name,
        session.questions.len()
    );

    Ok(Json(StartInterviewResponse {
        session_id: session.id,
        interview_name: session.interview_name,
        time: criterion.time_limit,
        passing_marks: criterion.passing_marks,
        questions: session.questions,
    }))
}

/// Saves (or replaces) the candidate's answer to one question.
///
/// The question id is not checked against the session's frozen set.
#[utoipa::path(
    post,
    path = "/api/interview/answer",
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, body = SubmitAnswerResponse),
        (status = 400, description = "Missing or malformed ids"),
        (status = 404, description = "Session not found or not active")
    ),
    security(("bearer" = []))
)]
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(req): AppJson<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(raw_session_id), Some(raw_qid)) = (req.session_id.as_deref(), req.qid.as_ref())
    else {
        return Err(AppError::BadRequest(
            "session_id and qid are required".to_string(),
        ));
    };

    let (Some(session_id), Some(qid)) = (parse_session_id(raw_session_id), raw_qid.parse()) else {
        return Err(AppError::BadRequest("Invalid session_id or qid".to_string()));
    };

    let answer_text = req.answer_text.as_deref().map(str::trim).unwrap_or_default();

    let saved = state
        .sessions
        .upsert_answer(session_id, &claims.sub, qid, answer_text, Utc::now())
        .await?;

    if !saved {
        return Err(inactive_session());
    }

    Ok(Json(SubmitAnswerResponse {
        message: "Saved".to_string(),
        session_id,
        qid,
    }))
}

/// Finishes an ongoing session: grades the answers and records the verdict.
///
/// A session is graded by one request at a time in this process; a second
/// finish arriving meanwhile gets 404 without calling the judge. The commit is
/// conditional on the session still being ongoing with the answer revision
/// that was graded. Answers landing mid-grading trigger a regrade, so a
/// stored evaluation always covers every stored answer.
#[utoipa::path(
    post,
    path = "/api/interview/finish",
    request_body = FinishInterviewRequest,
    responses(
        (status = 200, body = FinishInterviewResponse),
        (status = 400, description = "Missing or malformed session_id"),
        (status = 404, description = "Session not found or already finished"),
        (status = 503, description = "Scoring service unavailable")
    ),
    security(("bearer" = []))
)]
pub async fn finish_interview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(req): AppJson<FinishInterviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let raw_session_id = req
        .session_id
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("session_id is required".to_string()))?;
    let session_id = parse_session_id(raw_session_id)
        .ok_or_else(|| AppError::BadRequest("Invalid session_id".to_string()))?;

    let already_finished =
        || AppError::NotFoundOrForbidden("Session not found or already finished".to_string());

    let _claim = state.finishing.claim(session_id).ok_or_else(|| {
        tracing::warn!("Session {} is already being finished", session_id);
        already_finished()
    })?;

    let mut attempt = 0;
    let evaluation = loop {
        attempt += 1;

        let session = state
            .sessions
            .find_owned(session_id, &claims.sub)
            .await?
            .filter(|s| s.status == SessionStatus::Ongoing)
            .ok_or_else(already_finished)?;

        let evaluation = state.evaluator.evaluate(&session).await?;

        let committed = state
            .sessions
            .complete(
                session_id,
                &claims.sub,
                session.answers_rev,
                &evaluation,
                Utc::now(),
            )
            .await?;

        if committed {
            break evaluation;
        }
        if attempt >= MAX_FINISH_ATTEMPTS {
            tracing::error!(
                "Session {} kept receiving answers during {} grading attempts",
                session_id,
                attempt
            );
            return Err(AppError::ServiceUnavailable(
                "Answers are still being submitted; retry finishing".to_string(),
            ));
        }
        tracing::warn!("Session {} changed while grading; regrading", session_id);
    };

    tracing::info!(
        "Session {} finished: overall={} passing_marks={} status={:?}",
        session_id,
        evaluation.overall,
        evaluation.passing_marks,
        evaluation.status
    );

    Ok(Json(FinishInterviewResponse {
        session_id,
        overall: evaluation.overall,
        passing_marks: evaluation.passing_marks,
        status: evaluation.status,
        per_question: evaluation.per_question,
    }))
}

/// Returns one of the caller's own sessions, including its evaluation once finished.
#[utoipa::path(
    get,
    path = "/api/interview/sessions/{session_id}",
    params(("session_id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, body = InterviewSession),
        (status = 400, description = "Malformed session_id"),
        (status = 404, description = "Session not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(raw_session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = parse_session_id(&raw_session_id)
        .ok_or_else(|| AppError::BadRequest("Invalid session_id".to_string()))?;

    let session = state
        .sessions
        .find_owned(session_id, &claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFoundOrForbidden("Session not found".to_string()))?;

    Ok(Json(session))
}

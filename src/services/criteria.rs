// src/services/criteria.rs

use crate::{error::AppError, models::criterion::Criterion, store::CriteriaStore};

/// Resolves the criterion behind an interview name.
///
/// Lookup is global: a candidate's assignment names an interview, not the
/// admin who defined it.
pub async fn resolve(store: &dyn CriteriaStore, interview_name: &str) -> Result<Criterion, AppError> {
    store
        .find_by_name(interview_name)
        .await?
        .ok_or_else(|| AppError::NotFound("No criteria/questions found for this interview".to_string()))
}

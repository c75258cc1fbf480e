//! Job definition REST endpoints

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::put,
};

use super::{decode_body, run_blocking};
use crate::app::AppState;
use crate::error::RestError;
use crate::resources::job_definition::JobDefinitionSuspensionStateDto;

async fn update_suspension_state(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, RestError> {
    let dto: JobDefinitionSuspensionStateDto = decode_body(&body)?;
    run_blocking(move || dto.update(state.engine.as_ref(), &state.coercer)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Single job definition; the path id is the selector, the rest of the body still applies
async fn update_definition_suspension_state(
    State(state): State<AppState>,
    Path(job_definition_id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, RestError> {
    let mut dto: JobDefinitionSuspensionStateDto = decode_body(&body)?;
    dto.job_definition_id = Some(job_definition_id);
    run_blocking(move || dto.update(state.engine.as_ref(), &state.coercer)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/job-definition/suspended", put(update_suspension_state))
        .route(
            "/job-definition/{id}/suspended",
            put(update_definition_suspension_state),
        )
}

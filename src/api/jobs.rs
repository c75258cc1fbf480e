//! Job REST endpoints

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};

use super::{QueryPairs, body_params, decode_body, run_blocking};
use crate::app::AppState;
use crate::compiler::RequestParams;
use crate::engine::JobDto;
use crate::engine::dto::CountResultDto;
use crate::error::RestError;
use crate::resources::job::{self, JobSuspensionStateDto, SetJobRetriesDto};

/// List jobs matching the query string
async fn list_jobs(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<Vec<JobDto>>, RestError> {
    let params = RequestParams::from_pairs(pairs);
    run_blocking(move || job::list_jobs(state.engine.as_ref(), &state.coercer, &params))
        .await
        .map(Json)
}

/// List jobs matching a JSON query; paging stays in the query string
async fn query_jobs(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
    body: Bytes,
) -> Result<Json<Vec<JobDto>>, RestError> {
    let params = body_params(pairs, &body)?;
    run_blocking(move || job::list_jobs(state.engine.as_ref(), &state.coercer, &params))
        .await
        .map(Json)
}

async fn count_jobs(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<CountResultDto>, RestError> {
    let params = RequestParams::from_pairs(pairs);
    run_blocking(move || job::count_jobs(state.engine.as_ref(), &state.coercer, &params))
        .await
        .map(Json)
}

async fn query_job_count(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
    body: Bytes,
) -> Result<Json<CountResultDto>, RestError> {
    let params = body_params(pairs, &body)?;
    run_blocking(move || job::count_jobs(state.engine.as_ref(), &state.coercer, &params))
        .await
        .map(Json)
}

/// Activate or suspend jobs selected by the body
async fn update_suspension_state(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, RestError> {
    let dto: JobSuspensionStateDto = decode_body(&body)?;
    run_blocking(move || dto.update(state.engine.as_ref())).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Activate or suspend a single job; the path id is the job selector
async fn update_job_suspension_state(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, RestError> {
    let mut dto: JobSuspensionStateDto = decode_body(&body)?;
    dto.job_id = Some(job_id);
    run_blocking(move || dto.update(state.engine.as_ref())).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_retries(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, RestError> {
    let dto: SetJobRetriesDto = decode_body(&body)?;
    run_blocking(move || dto.execute(state.engine.as_ref(), &state.coercer)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/job", get(list_jobs).post(query_jobs))
        .route("/job/count", get(count_jobs).post(query_job_count))
        .route("/job/suspended", put(update_suspension_state))
        .route("/job/retries", put(set_retries))
        .route("/job/{id}/suspended", put(update_job_suspension_state))
}

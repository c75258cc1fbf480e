//! Task REST endpoints

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
use crate::compiler::coerce::VariableValueDto;
use crate::engine::TaskDto;
use crate::engine::dto::CountResultDto;
use crate::error::RestError;
use crate::resources::task;

async fn list_tasks(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<Vec<TaskDto>>, RestError> {
    let params = RequestParams::from_pairs(pairs);
    run_blocking(move || task::list_tasks(state.engine.as_ref(), &state.coercer, &params))
        .await
        .map(Json)
}

async fn query_tasks(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
    body: Bytes,
) -> Result<Json<Vec<TaskDto>>, RestError> {
    let params = body_params(pairs, &body)?;
    run_blocking(move || task::list_tasks(state.engine.as_ref(), &state.coercer, &params))
        .await
        .map(Json)
}

async fn count_tasks(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<CountResultDto>, RestError> {
    let params = RequestParams::from_pairs(pairs);
    run_blocking(move || task::count_tasks(state.engine.as_ref(), &state.coercer, &params))
        .await
        .map(Json)
}

async fn query_task_count(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
    body: Bytes,
) -> Result<Json<CountResultDto>, RestError> {
    let params = body_params(pairs, &body)?;
    run_blocking(move || task::count_tasks(state.engine.as_ref(), &state.coercer, &params))
        .await
        .map(Json)
}

/// Set a task variable from a typed value body
async fn put_variable(
    State(state): State<AppState>,
    Path((task_id, name)): Path<(String, String)>,
    body: Bytes,
) -> Result<StatusCode, RestError> {
    let value: VariableValueDto = decode_body(&body)?;
    run_blocking(move || {
        task::put_variable(state.engine.as_ref(), &state.coercer, &task_id, &name, &value)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/task", get(list_tasks).post(query_tasks))
        .route("/task/count", get(count_tasks).post(query_task_count))
        .route("/task/{id}/variables/{name}", put(put_variable))
}

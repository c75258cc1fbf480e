//! Process instance REST endpoints

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, put},
};

use super::{QueryPairs, body_params, decode_body, run_blocking};
use crate::app::AppState;
use crate::compiler::RequestParams;
use crate::engine::ProcessInstanceDto;
use crate::engine::dto::CountResultDto;
use crate::error::RestError;
use crate::resources::process_instance::{self, ProcessInstanceSuspensionStateDto};

async fn list_process_instances(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<Vec<ProcessInstanceDto>>, RestError> {
    let params = RequestParams::from_pairs(pairs);
    run_blocking(move || {
        process_instance::list_process_instances(state.engine.as_ref(), &state.coercer, &params)
    })
    .await
    .map(Json)
}

async fn query_process_instances(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
    body: Bytes,
) -> Result<Json<Vec<ProcessInstanceDto>>, RestError> {
    let params = body_params(pairs, &body)?;
    run_blocking(move || {
        process_instance::list_process_instances(state.engine.as_ref(), &state.coercer, &params)
    })
    .await
    .map(Json)
}

async fn count_process_instances(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<CountResultDto>, RestError> {
    let params = RequestParams::from_pairs(pairs);
    run_blocking(move || {
        process_instance::count_process_instances(state.engine.as_ref(), &state.coercer, &params)
    })
    .await
    .map(Json)
}

async fn query_process_instance_count(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
    body: Bytes,
) -> Result<Json<CountResultDto>, RestError> {
    let params = body_params(pairs, &body)?;
    run_blocking(move || {
        process_instance::count_process_instances(state.engine.as_ref(), &state.coercer, &params)
    })
    .await
    .map(Json)
}

async fn update_suspension_state(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, RestError> {
    let dto: ProcessInstanceSuspensionStateDto = decode_body(&body)?;
    run_blocking(move || dto.update(state.engine.as_ref())).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/process-instance",
            get(list_process_instances).post(query_process_instances),
        )
        .route(
            "/process-instance/count",
            get(count_process_instances).post(query_process_instance_count),
        )
        .route("/process-instance/suspended", put(update_suspension_state))
}

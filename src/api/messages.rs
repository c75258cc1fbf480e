//! Message correlation endpoint

use axum::{Router, body::Bytes, extract::State, http::StatusCode, routing::post};

use super::{decode_body, run_blocking};
use crate::app::AppState;
use crate::error::RestError;
use crate::resources::message::CorrelationMessageDto;

async fn deliver_message(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, RestError> {
    let dto: CorrelationMessageDto = decode_body(&body)?;
    run_blocking(move || dto.correlate(state.engine.as_ref(), &state.coercer)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/message", post(deliver_message))
}

//! HTTP route definitions
//!
//! One module per resource, each exposing `router()`. Handlers only extract
//! the request and forward it to [`crate::resources`]; engine calls are
//! synchronous and run on the blocking pool.

pub mod health;
pub mod job_definitions;
pub mod jobs;
pub mod messages;
pub mod process_instances;
pub mod tasks;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::compiler::RequestParams;
use crate::error::RestError;

/// Query-string pairs as extracted by `Query<QueryPairs>`
pub type QueryPairs = Vec<(String, String)>;

/// Decode a JSON body. An empty body yields the default value.
pub(crate) fn decode_body<T>(body: &Bytes) -> Result<T, RestError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| RestError::invalid(format!("Invalid request body: {err}")))
}

/// Parameters of a `POST` query: body first, then the query string
pub(crate) fn body_params(pairs: QueryPairs, body: &Bytes) -> Result<RequestParams, RestError> {
    Ok(RequestParams::from_json(decode_body(body)?)?.with_pairs(pairs))
}

/// Run an engine interaction off the async runtime
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, RestError>
where
    F: FnOnce() -> Result<T, RestError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| RestError::Engine(format!("Engine call aborted: {err}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_empty_body_is_default() {
        let value: Value = decode_body(&Bytes::from_static(b"  ")).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_malformed_body() {
        let err = decode_body::<Value>(&Bytes::from_static(b"{")).unwrap_err();
        assert!(err.to_string().starts_with("Invalid request body"));
    }

    #[test]
    fn test_body_wins_over_query_string() {
        let params = body_params(
            vec![
                ("jobId".to_string(), "from-query".to_string()),
                ("active".to_string(), "true".to_string()),
            ],
            &Bytes::from_static(br#"{"jobId": "from-body"}"#),
        )
        .unwrap();
        assert_eq!(params.text("jobId").unwrap().as_deref(), Some("from-body"));
        assert!(params.contains("active"));
    }
}

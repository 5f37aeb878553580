//! GraphQL endpoint adapter. Decodes the request envelope (JSON body,
//! `application/graphql` body, form-urlencoded body, or URL parameters) and
//! delegates parsing, validation, and execution to the async-graphql engine.

use std::sync::Arc;

use async_graphql::Variables;
use axum::{
    body::Bytes,
    extract::{Extension, Query},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::infrastructure::state::AppState;
use crate::schema::DiceSchema;

pub fn router() -> Router {
    Router::new()
        .route(
            "/graphql",
            get(execute_get)
                .post(execute_post)
                .options(preflight)
                .put(method_not_allowed)
                .patch(method_not_allowed)
                .delete(method_not_allowed),
        )
        .layer(map_response(set_allow_header))
}

/// Rejections raised while decoding the request envelope. Anything that makes
/// it past this layer is answered by the engine inside a 200 response.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("POST body sent invalid JSON.")]
    InvalidJsonBody,
    #[error("Must provide query string.")]
    MissingQuery,
    #[error("Variables are invalid JSON.")]
    InvalidVariables,
    #[error("GraphQL only supports GET and POST requests.")]
    MethodNotAllowed,
}

impl EnvelopeError {
    fn status_code(&self) -> StatusCode {
        match self {
            EnvelopeError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for EnvelopeError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "errors": [{ "message": self.to_string() }] });
        (self.status_code(), Json(body)).into_response()
    }
}

/// The POST body shape for `application/json` requests.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Envelope {
    query: Option<String>,
    variables: Option<Value>,
    operation_name: Option<String>,
}

/// Envelope fields carried in the URL query string. These take precedence
/// over the POST body when both are present.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct UrlParams {
    query: Option<String>,
    variables: Option<String>,
    operation_name: Option<String>,
}

struct ExecutableRequest {
    query: String,
    variables: Variables,
    operation_name: Option<String>,
}

impl ExecutableRequest {
    async fn execute(self, schema: &DiceSchema) -> async_graphql::Response {
        let mut request = async_graphql::Request::new(self.query).variables(self.variables);
        if let Some(name) = self.operation_name {
            request = request.operation_name(name);
        }
        schema.execute(request).await
    }
}

async fn execute_get(
    Extension(state): Extension<Arc<AppState>>,
    method: Method,
    Query(params): Query<UrlParams>,
) -> Result<Response, EnvelopeError> {
    if method == Method::HEAD {
        return Ok(StatusCode::OK.into_response());
    }

    let query = non_empty(params.query).ok_or(EnvelopeError::MissingQuery)?;
    let variables = match non_empty(params.variables) {
        Some(text) => parse_variables_text(&text)?,
        None => Variables::default(),
    };

    let request = ExecutableRequest {
        query,
        variables,
        operation_name: non_empty(params.operation_name),
    };

    let response = request.execute(&state.schema).await;
    debug!(errors = response.errors.len(), "executed graphql get request");
    Ok(Json(response).into_response())
}

async fn execute_post(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<UrlParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<async_graphql::Response>, EnvelopeError> {
    let url_query = non_empty(params.query);
    let url_variables = match non_empty(params.variables) {
        Some(text) => Some(parse_variables_text(&text)?),
        None => None,
    };
    let url_operation = non_empty(params.operation_name);

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    let request = if content_type.contains("application/json") {
        let envelope: Envelope =
            serde_json::from_slice(&body).map_err(|_| EnvelopeError::InvalidJsonBody)?;

        let query = url_query
            .or_else(|| non_empty(envelope.query))
            .ok_or(EnvelopeError::MissingQuery)?;
        let variables = match url_variables {
            Some(variables) => variables,
            None => match envelope.variables {
                Some(value) => variables_from_value(value)?,
                None => Variables::default(),
            },
        };

        ExecutableRequest {
            query,
            variables,
            operation_name: url_operation.or_else(|| non_empty(envelope.operation_name)),
        }
    } else if content_type.contains("application/x-www-form-urlencoded") {
        let form: UrlParams = serde_urlencoded::from_bytes(&body).unwrap_or_default();

        let query = url_query
            .or_else(|| non_empty(form.query))
            .ok_or(EnvelopeError::MissingQuery)?;
        let variables = match url_variables {
            Some(variables) => variables,
            None => match non_empty(form.variables) {
                Some(text) => parse_variables_text(&text)?,
                None => Variables::default(),
            },
        };

        ExecutableRequest {
            query,
            variables,
            operation_name: url_operation.or_else(|| non_empty(form.operation_name)),
        }
    } else if content_type.contains("application/graphql") {
        // The raw body is the query document itself.
        let body_query = std::str::from_utf8(&body)
            .ok()
            .map(str::to_owned)
            .and_then(non_empty_str);

        ExecutableRequest {
            query: url_query.or(body_query).ok_or(EnvelopeError::MissingQuery)?,
            variables: url_variables.unwrap_or_default(),
            operation_name: url_operation,
        }
    } else {
        // Unrecognized content type; URL parameters may still carry a query.
        ExecutableRequest {
            query: url_query.ok_or(EnvelopeError::MissingQuery)?,
            variables: url_variables.unwrap_or_default(),
            operation_name: url_operation,
        }
    };

    let response = request.execute(&state.schema).await;
    debug!(errors = response.errors.len(), "executed graphql request");
    Ok(Json(response))
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn method_not_allowed() -> EnvelopeError {
    EnvelopeError::MethodNotAllowed
}

async fn set_allow_header(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static("GET, POST, OPTIONS"));
    response
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(non_empty_str)
}

fn non_empty_str(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_variables_text(text: &str) -> Result<Variables, EnvelopeError> {
    let value: Value = serde_json::from_str(text).map_err(|_| EnvelopeError::InvalidVariables)?;
    variables_from_value(value)
}

/// Accepts variables either as a JSON object or as JSON text holding an
/// object, which GraphiQL and some clients send escaped inside the envelope.
fn variables_from_value(value: Value) -> Result<Variables, EnvelopeError> {
    match value {
        Value::Null => Ok(Variables::default()),
        Value::String(text) if text.trim().is_empty() => Ok(Variables::default()),
        Value::String(text) => {
            let nested: Value =
                serde_json::from_str(&text).map_err(|_| EnvelopeError::InvalidVariables)?;
            match nested {
                Value::Object(_) => Ok(Variables::from_json(nested)),
                _ => Err(EnvelopeError::InvalidVariables),
            }
        }
        Value::Object(_) => Ok(Variables::from_json(value)),
        _ => Err(EnvelopeError::InvalidVariables),
    }
}

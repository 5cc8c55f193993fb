//! HTTP surface.
//!
//! | Route | Body | Response |
//! |-------|------|----------|
//! | `GET /iiif/{identifier}` | | the built document, or `404 {"detail": "Unknown IIIF identifier"}` |
//! | `POST /api/action/{name}` | JSON object | `{"success": true, "result": ...}` |
//!
//! The identifier is the whole remaining path, slashes included; an empty
//! one is unknown.
//! Failed actions answer `{"success": false, "error": {"__type", "message"}}`
//! with 400 for bad input, 404 for an unknown action and 500 otherwise.
//! Builds read from the store synchronously, so they run on the blocking
//! pool.

use crate::actions::{Action, ActionError, Actions};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub const UNKNOWN_IDENTIFIER: &str = "Unknown IIIF identifier";

/// Shared state for the handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub actions: Actions,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/iiif/", get(empty_identifier))
        .route("/iiif/*identifier", get(iiif_resource))
        .route("/api/action/:name", post(api_action))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve `app` until the process is stopped.
pub async fn serve(addr: SocketAddr, app: Router) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Serving IIIF resources on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}

async fn iiif_resource(State(state): State<AppState>, Path(identifier): Path<String>) -> Response {
    let result = run_blocking(move || {
        state.actions.build_iiif_resource(&identifier).map(|doc| (identifier, doc))
    })
    .await;

    match result {
        Ok((_, Some(doc))) => Json(doc).into_response(),
        Ok((identifier, None)) => {
            info!(identifier = %identifier, "{UNKNOWN_IDENTIFIER}");
            unknown_identifier()
        }
        Err(HandlerError::Action(e @ ActionError::Validation(_))) => {
            (StatusCode::BAD_REQUEST, Json(json!({"detail": e.to_string()}))).into_response()
        }
        Err(e) => {
            error!(error = %e, "IIIF request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": "Internal Server Error"})),
            )
                .into_response()
        }
    }
}

async fn empty_identifier() -> Response {
    unknown_identifier()
}

fn unknown_identifier() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"detail": UNKNOWN_IDENTIFIER}))).into_response()
}

async fn api_action(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let Some(action) = Action::from_name(&name) else {
        return action_failure(
            StatusCode::NOT_FOUND,
            "Not Found Error",
            format!("Action name not known: {name}"),
        );
    };
    let Value::Object(data) = body else {
        return action_failure(
            StatusCode::BAD_REQUEST,
            "Validation Error",
            "Request body must be a JSON object".to_string(),
        );
    };

    match run_blocking(move || state.actions.call(action, &data)).await {
        Ok(result) => Json(json!({"success": true, "result": result})).into_response(),
        Err(HandlerError::Action(
            e @ (ActionError::Validation(_) | ActionError::InvalidArgument(_)),
        )) => action_failure(StatusCode::BAD_REQUEST, "Validation Error", e.to_string()),
        Err(e) => {
            error!(action = %name, error = %e, "action failed");
            action_failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                e.to_string(),
            )
        }
    }
}

fn action_failure(status: StatusCode, kind: &str, message: String) -> Response {
    let body = json!({
        "success": false,
        "error": {"__type": kind, "message": message},
    });
    (status, Json(body)).into_response()
}

#[derive(Debug, thiserror::Error)]
enum HandlerError {
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

async fn run_blocking<T, F>(f: F) -> Result<T, HandlerError>
where
    F: FnOnce() -> Result<T, ActionError> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

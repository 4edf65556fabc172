//! Axum HTTP layer.
//!
//! Thin glue between the web and the pipeline: multipart extraction, flash
//! redirects on validation failure, and artifact streaming. All policy lives
//! in [`crate::pipeline`]; handlers only translate outcomes into responses.
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | `GET`  | `/` | Submission form (shows and clears a pending flash) |
//! | `POST` | `/upload` | Multipart `file` + `prompt`; renders the result view |
//! | `GET`  | `/uploads/{id}` | Stream a stored upload |
//! | `GET`  | `/output/{id}` | Stream a produced result |

use crate::config::AppConfig;
use crate::flash;
use crate::pages;
use crate::pipeline::{EditRequest, Pipeline, PipelineError};
use crate::store::{ArtifactKind, ArtifactStore, StoreError};
use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub store: Arc<ArtifactStore>,
    pub secret: Arc<String>,
}

/// Build the application router.
///
/// The body limit leaves headroom above the payload cap for multipart
/// framing; the exact 16 MiB cap on the file itself is enforced by the
/// pipeline's validation.
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .route("/uploads/{id}", get(serve_upload))
        .route("/output/{id}", get(serve_output))
        .layer(DefaultBodyLimit::max(max_upload_bytes + 64 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process exits.
pub async fn serve(cfg: &AppConfig, state: AppState) -> std::io::Result<()> {
    let app = build_router(state, cfg.max_upload_bytes);
    let listener = tokio::net::TcpListener::bind(cfg.listen_addr()).await?;
    info!(addr = %cfg.listen_addr(), "promptbrush listening");
    axum::serve(listener, app).await
}

/// `GET /` — submission form.
async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let pending = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| flash::from_cookie_header(&state.secret, cookies));

    let mut response = Html(pages::index_page(pending.as_deref()).into_string()).into_response();
    if pending.is_some() {
        // One-shot: clear the cookie with the render that displayed it.
        if let Ok(value) =
            format!("{}=; Path=/; Max-Age=0; HttpOnly", flash::COOKIE_NAME).parse()
        {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

/// `POST /upload` — run the pipeline on a multipart (file, prompt) pair.
async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut instruction = String::new();
    let mut original_name = String::new();
    let mut source_bytes = Vec::new();

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => match field.name().map(str::to_owned).as_deref() {
                Some("prompt") => match field.text().await {
                    Ok(text) => instruction = text,
                    Err(_) => return flash_redirect(&state.secret, "Invalid form submission"),
                },
                Some("file") => {
                    original_name = field.file_name().unwrap_or_default().to_string();
                    match field.bytes().await {
                        Ok(bytes) => source_bytes = bytes.to_vec(),
                        Err(_) => {
                            return flash_redirect(
                                &state.secret,
                                "Upload failed or exceeded the size limit",
                            );
                        }
                    }
                }
                _ => {}
            },
            Ok(None) => break,
            Err(_) => return flash_redirect(&state.secret, "Invalid form submission"),
        }
    }

    let shown_instruction = instruction.trim().to_string();
    let request = EditRequest {
        instruction,
        source_bytes,
        original_name,
    };

    match state.pipeline.handle(request).await {
        Ok(outcome) => Html(
            pages::result_page(
                &shown_instruction,
                &outcome.upload_id,
                outcome.result_id.as_deref(),
                outcome.succeeded(),
            )
            .into_string(),
        )
        .into_response(),
        Err(PipelineError::Validation(e)) => flash_redirect(&state.secret, &e.to_string()),
        Err(e) => {
            error!(error = %e, "upload could not be processed");
            flash_redirect(&state.secret, "Something went wrong. Please try again.")
        }
    }
}

/// `GET /uploads/{id}`.
async fn serve_upload(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    serve_artifact(&state, ArtifactKind::Upload, &id)
}

/// `GET /output/{id}`.
async fn serve_output(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    serve_artifact(&state, ArtifactKind::Result, &id)
}

fn serve_artifact(state: &AppState, kind: ArtifactKind, id: &str) -> Response {
    match state.store.get(kind, id) {
        Ok(bytes) => {
            let mime = mime_guess::from_path(id).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                bytes,
            )
                .into_response()
        }
        Err(StoreError::NotFound) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!(kind = ?kind, id = %id, error = %e, "artifact read failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// 303 back to the form with a signed, user-facing message.
fn flash_redirect(secret: &str, message: &str) -> Response {
    let cookie = format!(
        "{}={}; Path=/; HttpOnly",
        flash::COOKIE_NAME,
        flash::sign(secret, message)
    );
    (
        StatusCode::SEE_OTHER,
        [
            (header::SET_COOKIE, cookie),
            (header::LOCATION, "/".to_string()),
        ],
    )
        .into_response()
}

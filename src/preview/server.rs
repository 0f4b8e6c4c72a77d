use crate::event::AppEvent;
use crate::preview::PreviewDocument;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::mpsc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Scripts run, but the document gets an opaque origin: no cookies, storage
/// or DOM access to anything the host serves.
pub const SANDBOX_POLICY: &str = "sandbox allow-scripts";

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("failed to bind preview server on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("preview server stopped: {0}")]
    Serve(#[source] std::io::Error),
}

#[derive(Clone)]
pub struct PreviewState {
    document: watch::Receiver<PreviewDocument>,
    events: mpsc::Sender<AppEvent>,
}

/// UI-side end of the preview pipeline; publishing replaces the served page.
#[derive(Debug)]
pub struct PreviewPublisher {
    tx: watch::Sender<PreviewDocument>,
}

impl PreviewPublisher {
    pub fn publish(&self, document: PreviewDocument) {
        debug!(revision = document.revision, bytes = document.html.len(), "preview published");
        self.tx.send_replace(document);
    }
}

pub fn channel(
    initial: PreviewDocument,
    events: mpsc::Sender<AppEvent>,
) -> (PreviewPublisher, PreviewState) {
    let (tx, rx) = watch::channel(initial);
    (
        PreviewPublisher { tx },
        PreviewState {
            document: rx,
            events,
        },
    )
}

pub fn router(state: PreviewState) -> Router {
    Router::new()
        .route("/", get(serve_document))
        .route("/status", get(status))
        .with_state(state)
}

async fn serve_document(State(state): State<PreviewState>) -> Response {
    let (revision, html) = {
        let document = state.document.borrow();
        (document.revision, document.html.clone())
    };
    let _ = state.events.send(AppEvent::PreviewLoaded { revision });

    (
        StatusCode::OK,
        [
            (header::CONTENT_SECURITY_POLICY, SANDBOX_POLICY),
            (header::CACHE_CONTROL, "no-store"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        Html(html),
    )
        .into_response()
}

async fn status(State(state): State<PreviewState>) -> impl IntoResponse {
    let (revision, bytes) = {
        let document = state.document.borrow();
        (document.revision, document.html.len())
    };
    Json(json!({
        "revision": revision,
        "bytes": bytes,
    }))
}

pub async fn bind(addr: SocketAddr) -> Result<TcpListener, PreviewError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| PreviewError::Bind { addr, source })
}

/// Binds and serves on the given runtime, reporting the outcome as events.
pub fn spawn(runtime_handle: &Handle, addr: SocketAddr, state: PreviewState) {
    let events = state.events.clone();
    runtime_handle.spawn(async move {
        let listener = match bind(addr).await {
            Ok(listener) => listener,
            Err(err) => {
                error!(error = %err, "preview server unavailable");
                let _ = events.send(AppEvent::PreviewServerFailed(err.to_string()));
                return;
            }
        };

        let local_addr = listener.local_addr().unwrap_or(addr);
        info!(addr = %local_addr, "preview sandbox listening");
        let _ = events.send(AppEvent::PreviewServerStarted(local_addr));

        if let Err(err) = axum::serve(listener, router(state)).await {
            let err = PreviewError::Serve(err);
            error!(error = %err, "preview server exited");
            let _ = events.send(AppEvent::PreviewServerFailed(err.to_string()));
        }
    });
}

//! Console server
//!
//! Serves one pipeline session over HTTP. Every action is a form post that
//! runs the controller and redirects back to the page. The session sits
//! behind an async mutex, so requests are served one at a time; while a
//! backend call is in flight the page shows the busy indicator instead.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::services::ServeDir;
use tracing::{debug, info};

use crate::busy::BusyIndicator;
use crate::config::Settings;
use crate::controller::{Outcome, PipelineController, Tab};
use crate::gateway::{Gateway, HttpGateway, UploadFile};
use crate::model::{Layout, VizKind};
use crate::mount::MountedArtifact;
use crate::page::{VizSelection, render_busy, render_console};
use crate::render::RenderError;
use crate::state::{Controls, Stage};
use crate::status::StatusReporter;

/// Largest document the backend accepts
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

const ASSETS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");

struct Session<G> {
    controller: PipelineController<G>,
    selection: VizSelection,
}

pub struct AppState<G> {
    session: Arc<Mutex<Session<G>>>,
    busy: BusyIndicator,
    backend_url: Arc<str>,
}

impl<G> Clone for AppState<G> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            busy: self.busy.clone(),
            backend_url: Arc::clone(&self.backend_url),
        }
    }
}

/// JSON view of the session, served at `/api/state`
#[derive(Debug, Serialize)]
pub struct StateSnapshot {
    pub stage: Stage,
    pub artifact_id: Option<String>,
    pub controls: Controls,
    pub active_tab: Tab,
    pub selection: VizSelection,
    pub status: StatusReporter,
    pub busy: Option<String>,
    pub mounted: Option<MountedArtifact>,
    pub has_graph_info: bool,
    pub has_analytics: bool,
}

#[derive(Debug, Deserialize)]
struct VisualizeForm {
    kind: Option<VizKind>,
    layout: Option<Layout>,
}

struct PageError(RenderError);

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

impl From<RenderError> for PageError {
    fn from(err: RenderError) -> Self {
        Self(err)
    }
}

/// Build the console router around a controller.
pub fn router<G: Gateway + 'static>(
    controller: PipelineController<G>,
    backend_url: &str,
) -> Router {
    let state = AppState {
        busy: controller.busy(),
        session: Arc::new(Mutex::new(Session {
            controller,
            selection: VizSelection::default(),
        })),
        backend_url: Arc::from(backend_url.trim_end_matches('/')),
    };

    Router::new()
        .route("/", get(index::<G>))
        .route("/upload", post(upload::<G>))
        .route("/build", post(build::<G>))
        .route("/visualize", post(visualize::<G>))
        .route("/analyze", post(analyze::<G>))
        .route("/alert/dismiss", post(dismiss_alert::<G>))
        .route("/tab/{name}", post(select_tab::<G>))
        .route("/api/state", get(snapshot::<G>))
        .nest_service("/assets", ServeDir::new(ASSETS_DIR))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn index<G: Gateway>(State(state): State<AppState<G>>) -> Result<Html<String>, PageError> {
    let Ok(session) = state.session.try_lock() else {
        let label = state.busy.label().unwrap_or_default();
        return Ok(Html(render_busy(&label)?));
    };
    let html = render_console(&session.controller, session.selection, &state.backend_url)?;
    Ok(Html(html))
}

async fn upload<G: Gateway>(
    State(state): State<AppState<G>>,
    mut multipart: Multipart,
) -> Result<Redirect, (StatusCode, String)> {
    let mut file = UploadFile::new("", Vec::new());
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.body_text()))?;
        file = UploadFile::new(name, bytes.to_vec());
    }

    let mut session = state.session.lock().await;
    log_outcome("upload", session.controller.upload(file).await);
    Ok(Redirect::to("/"))
}

async fn build<G: Gateway>(State(state): State<AppState<G>>) -> Redirect {
    let mut session = state.session.lock().await;
    log_outcome("build", session.controller.build_graph().await);
    Redirect::to("/")
}

async fn visualize<G: Gateway>(
    State(state): State<AppState<G>>,
    Form(form): Form<VisualizeForm>,
) -> Redirect {
    let mut session = state.session.lock().await;
    let selection = VizSelection {
        kind: form.kind.unwrap_or(session.selection.kind),
        layout: form.layout.unwrap_or(session.selection.layout),
    };
    session.selection = selection;
    let outcome = session
        .controller
        .visualize(selection.kind, selection.layout)
        .await;
    log_outcome("visualize", outcome);
    Redirect::to("/")
}

async fn analyze<G: Gateway>(State(state): State<AppState<G>>) -> Redirect {
    let mut session = state.session.lock().await;
    log_outcome("analyze", session.controller.analyze().await);
    Redirect::to("/")
}

async fn dismiss_alert<G: Gateway>(State(state): State<AppState<G>>) -> Redirect {
    state.session.lock().await.controller.dismiss_alert();
    Redirect::to("/")
}

async fn select_tab<G: Gateway>(
    State(state): State<AppState<G>>,
    Path(name): Path<String>,
) -> Result<Redirect, (StatusCode, String)> {
    let tab = name
        .parse::<Tab>()
        .map_err(|e| (StatusCode::NOT_FOUND, e))?;
    state.session.lock().await.controller.select_tab(tab);
    Ok(Redirect::to("/"))
}

async fn snapshot<G: Gateway>(State(state): State<AppState<G>>) -> Json<StateSnapshot> {
    let session = state.session.lock().await;
    let controller = &session.controller;
    let results = controller.results();
    Json(StateSnapshot {
        stage: controller.stage(),
        artifact_id: controller.state().artifact_id().map(str::to_owned),
        // The server never sees the browser's file input.
        controls: controller.controls(false, session.selection.kind),
        active_tab: results.active_tab,
        selection: session.selection,
        status: controller.status().clone(),
        busy: state.busy.label(),
        mounted: results.mount.current().cloned(),
        has_graph_info: results.graph_info.is_some(),
        has_analytics: results.analytics.is_some(),
    })
}

fn log_outcome(action: &str, outcome: Outcome) {
    match outcome {
        Outcome::Skipped => debug!(action, "skipped, prerequisite missing"),
        Outcome::Succeeded => debug!(action, "succeeded"),
        Outcome::Failed(message) => debug!(action, %message, "failed"),
    }
}

/// Start the console against the configured backend.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let gateway = HttpGateway::new(settings.gateway())?;
    let app = router(PipelineController::new(gateway), &settings.backend_url);

    let addr = SocketAddr::new(settings.bind, settings.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, backend = %settings.backend_url, "console listening");
    println!("Console running at http://{addr}");
    println!("Press Ctrl+C to stop");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

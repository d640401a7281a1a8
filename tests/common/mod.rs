//! Fake pipeline backend for integration tests.
//!
//! Speaks the backend's `/api/*` envelopes with canned documents, records
//! what it receives, and can be told to fail builds or to declare an odd
//! visualization type.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::oneshot;

#[derive(Default)]
struct Script {
    build_error: Option<String>,
    analytics_error: Option<String>,
    viz_type: Option<String>,
    visualize_requests: Vec<Value>,
    build_requests: Vec<Value>,
}

type Shared = Arc<Mutex<Script>>;

pub struct FakeBackend {
    pub url: String,
    script: Shared,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FakeBackend {
    /// Start the backend on an ephemeral port.
    pub async fn start() -> Self {
        let script = Shared::default();
        let app = Router::new()
            .route("/api/upload", post(upload))
            .route("/api/build_graph", post(build_graph))
            .route("/api/visualize", post(visualize))
            .route("/api/analytics", post(analytics))
            .with_state(Arc::clone(&script));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Failed to get local address");
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await
                .expect("Fake backend error");
        });

        Self {
            url: format!("http://{addr}"),
            script,
            shutdown: Some(tx),
        }
    }

    pub fn fail_builds_with(&self, message: &str) {
        self.script.lock().unwrap().build_error = Some(message.to_string());
    }

    pub fn heal_builds(&self) {
        self.script.lock().unwrap().build_error = None;
    }

    pub fn fail_analytics_with(&self, message: &str) {
        self.script.lock().unwrap().analytics_error = Some(message.to_string());
    }

    /// Declare this embed type on every visualization response.
    pub fn declare_viz_type(&self, kind: &str) {
        self.script.lock().unwrap().viz_type = Some(kind.to_string());
    }

    pub fn visualize_requests(&self) -> Vec<Value> {
        self.script.lock().unwrap().visualize_requests.clone()
    }

    pub fn build_requests(&self) -> Vec<Value> {
        self.script.lock().unwrap().build_requests.clone()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// A document of exactly `len` characters.
pub fn document(len: usize) -> String {
    "knowledge graph ".chars().cycle().take(len).collect()
}

async fn upload(mut multipart: Multipart) -> (StatusCode, Json<Value>) {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let text = field.text().await.unwrap_or_default();
        if name.is_empty() {
            break;
        }
        let stem = name.split('.').next().unwrap_or_default().to_string();
        let preview: String = text.chars().take(50).collect();
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "filename": stem,
                "text_length": text.chars().count(),
                "text_preview": preview,
            })),
        );
    }
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "No file provided"})),
    )
}

async fn build_graph(
    State(script): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut script = script.lock().unwrap();
    script.build_requests.push(body);
    if let Some(message) = &script.build_error {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": message})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"success": true, "graph_data": graph()})),
    )
}

async fn visualize(State(script): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut script = script.lock().unwrap();
    let requested = body["type"].as_str().unwrap_or_default().to_string();
    script.visualize_requests.push(body);

    let (path, kind) = match requested.as_str() {
        "interactive_2d" | "interactive_3d" => ("outputs/graph.html", "html"),
        _ => ("viz/doc1.png", "image"),
    };
    let kind = script.viz_type.clone().unwrap_or_else(|| kind.to_string());
    Json(json!({"success": true, "path": path, "type": kind}))
}

async fn analytics(
    State(script): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    assert!(body["graph_data"]["nodes"].is_array());
    if let Some(message) = &script.lock().unwrap().analytics_error {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": message})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"success": true, "analytics": report()})),
    )
}

pub fn graph() -> Value {
    json!({
        "title": "Citations",
        "theme": "Science",
        "abstract": "Three papers citing each other.",
        "aspects": ["structure", "content"],
        "nodes": [
            {"id": 1, "name": "Alpha", "type": "paper", "description": "First paper"},
            {"id": 2, "name": "Beta", "type": "paper"},
            {"id": 3, "name": "Gamma", "type": "author"}
        ],
        "edges": [
            {"source": 1, "target": 2, "relation": "cites", "weight": 7},
            {"source": 2, "target": 3, "relation": "written_by"}
        ]
    })
}

pub fn report() -> Value {
    json!({
        "basic_stats": {
            "node_count": 3, "edge_count": 2, "density": 0.3333333,
            "average_degree": 1.3333333, "is_connected": true, "num_components": 1
        },
        "centrality": {
            "degree_centrality": {
                "description": "Degree centrality",
                "top_nodes": [
                    {"id": 2, "name": "Beta", "score": 1.0},
                    {"id": 1, "name": "Alpha", "score": 0.5}
                ]
            }
        },
        "type_distribution": {
            "node_types": [
                {"type": "paper", "count": 2, "percentage": 66.67},
                {"type": "author", "count": 1, "percentage": 33.33}
            ],
            "relation_types": [
                {"relation": "cites", "count": 1},
                {"relation": "written_by", "count": 1}
            ]
        },
        "community": {
            "description": "Greedy modularity",
            "num_communities": 1,
            "communities": [
                {"community_id": 0, "size": 3,
                 "nodes": [{"name": "Alpha"}, {"name": "Beta"}, {"name": "Gamma"}]}
            ]
        }
    })
}

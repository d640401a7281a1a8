//! Backend gateway
//!
//! The remote service that parses documents, builds graphs, renders
//! visualizations and computes analytics is reached through the [`Gateway`]
//! trait. Every backend response is a discriminated envelope (a `success`
//! flag plus an `error` string on failure); the envelopes here turn that into
//! a `Result` so callers never inspect the flag themselves.

mod http;

pub use http::{HttpGateway, HttpGatewayConfig};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::model::{AnalyticsReport, GraphDocument, Layout, VizKind};

/// Errors returned by a gateway call
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The backend answered with `success: false`; the message is shown verbatim
    #[error("{0}")]
    Remote(String),

    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A non-success HTTP status without a decodable envelope
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response was not the envelope we expected
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// A document selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// A file counts as selected once it has a name.
    pub fn is_selected(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// The stored artifact behind a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedArtifact {
    /// Opaque id, threaded into the build call as-is
    pub artifact_id: String,
    pub char_count: u64,
    pub preview: Option<String>,
}

/// A rendered visualization as declared by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualizationArtifact {
    pub path: String,
    /// Declared embed kind, interpreted by the mount
    pub kind: String,
}

/// The four remote pipeline operations.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn upload(&self, file: &UploadFile) -> GatewayResult<UploadedArtifact>;

    async fn build_graph(&self, artifact_id: &str) -> GatewayResult<GraphDocument>;

    /// `layout` is `None` for kinds that are not laid out.
    async fn visualize(
        &self,
        graph: &GraphDocument,
        kind: VizKind,
        layout: Option<Layout>,
    ) -> GatewayResult<VisualizationArtifact>;

    async fn analyze(&self, graph: &GraphDocument) -> GatewayResult<AnalyticsReport>;
}

fn remote_failure(error: Option<String>) -> GatewayError {
    GatewayError::Remote(error.unwrap_or_else(|| "unknown error".to_string()))
}

fn missing(field: &str) -> GatewayError {
    GatewayError::Decode(format!("successful response is missing `{field}`"))
}

/// Upload envelope. A missing `success` flag counts as failure.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResult {
    #[serde(rename = "success", default)]
    pub ok: bool,
    #[serde(rename = "filename")]
    pub artifact_id: Option<String>,
    #[serde(rename = "text_length")]
    pub char_count: Option<u64>,
    #[serde(rename = "text_preview")]
    pub preview: Option<String>,
    #[serde(rename = "error")]
    pub error_message: Option<String>,
}

impl UploadResult {
    pub fn into_result(self) -> GatewayResult<UploadedArtifact> {
        if !self.ok {
            return Err(remote_failure(self.error_message));
        }
        Ok(UploadedArtifact {
            artifact_id: self.artifact_id.ok_or_else(|| missing("filename"))?,
            char_count: self.char_count.unwrap_or_default(),
            preview: self.preview,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildResult {
    #[serde(default)]
    pub success: bool,
    pub graph_data: Option<GraphDocument>,
    pub error: Option<String>,
}

impl BuildResult {
    pub fn into_result(self) -> GatewayResult<GraphDocument> {
        if !self.success {
            return Err(remote_failure(self.error));
        }
        self.graph_data.ok_or_else(|| missing("graph_data"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisualizeResult {
    #[serde(default)]
    pub success: bool,
    pub path: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub error: Option<String>,
}

impl VisualizeResult {
    pub fn into_result(self) -> GatewayResult<VisualizationArtifact> {
        if !self.success {
            return Err(remote_failure(self.error));
        }
        Ok(VisualizationArtifact {
            path: self.path.ok_or_else(|| missing("path"))?,
            kind: self.kind.ok_or_else(|| missing("type"))?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsResult {
    #[serde(default)]
    pub success: bool,
    pub analytics: Option<AnalyticsReport>,
    pub error: Option<String>,
}

impl AnalyticsResult {
    pub fn into_result(self) -> GatewayResult<AnalyticsReport> {
        if !self.success {
            return Err(remote_failure(self.error));
        }
        self.analytics.ok_or_else(|| missing("analytics"))
    }
}

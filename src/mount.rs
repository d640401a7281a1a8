//! Visualization mount
//!
//! Holds the currently mounted visualization artifact. The backend's declared
//! kind is trusted as-is; the artifact content is never inspected.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MountError {
    #[error("unsupported visualization type: {0}")]
    UnknownKind(String),
}

/// How an artifact is embedded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedKind {
    /// Inline frame (`html`)
    EmbeddableDocument,
    /// Image reference (`image`)
    StaticImage,
}

impl FromStr for EmbedKind {
    type Err = MountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(EmbedKind::EmbeddableDocument),
            "image" => Ok(EmbedKind::StaticImage),
            other => Err(MountError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for EmbedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedKind::EmbeddableDocument => f.write_str("html"),
            EmbedKind::StaticImage => f.write_str("image"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountedArtifact {
    pub kind: EmbedKind,
    /// Backend-relative path, e.g. `outputs/graph.html`
    pub path: String,
}

impl MountedArtifact {
    /// Absolute reference to the artifact on the backend.
    pub fn src(&self, backend_url: &str) -> String {
        format!(
            "{}/{}",
            backend_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct VisualizationMount {
    current: Option<MountedArtifact>,
}

impl VisualizationMount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the mounted artifact. An unknown kind mounts nothing and
    /// leaves the previous artifact in place.
    pub fn mount(
        &mut self,
        declared_kind: &str,
        path: impl Into<String>,
    ) -> Result<&MountedArtifact, MountError> {
        let kind = declared_kind.parse::<EmbedKind>()?;
        Ok(&*self.current.insert(MountedArtifact {
            kind,
            path: path.into(),
        }))
    }

    pub fn current(&self) -> Option<&MountedArtifact> {
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

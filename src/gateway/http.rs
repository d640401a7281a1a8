//! HTTP implementation of the backend gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{
    AnalyticsResult, BuildResult, Gateway, GatewayError, GatewayResult, UploadFile, UploadResult,
    UploadedArtifact, VisualizationArtifact, VisualizeResult,
};
use crate::model::{AnalyticsReport, GraphDocument, Layout, VizKind};

/// Longest slice of an unexpected response body kept in error messages
const BODY_SNIPPET_LEN: usize = 200;

/// Connection settings for [`HttpGateway`]
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Backend root, e.g. `http://localhost:5000`
    pub base_url: String,
    /// Whole-request timeout. Graph builds routinely take minutes.
    pub timeout: Duration,
}

impl Default for HttpGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Gateway that talks to the backend's `/api/*` endpoints.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    config: HttpGatewayConfig,
    client: Client,
}

#[derive(Serialize)]
struct BuildRequest<'a> {
    filename: &'a str,
}

#[derive(Serialize)]
struct VisualizeRequest<'a> {
    graph_data: &'a GraphDocument,
    #[serde(rename = "type")]
    kind: VizKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<Layout>,
}

#[derive(Serialize)]
struct AnalyticsRequest<'a> {
    graph_data: &'a GraphDocument,
}

impl HttpGateway {
    pub fn new(config: HttpGatewayConfig) -> GatewayResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> GatewayResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.client.post(self.endpoint(path)).json(body).send().await?;
        decode(response).await
    }
}

/// Decode an envelope regardless of HTTP status; the backend sends
/// `{"error": ...}` bodies with 4xx/5xx codes.
async fn decode<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
    let status = response.status();
    let body = response.bytes().await?;
    debug!(status = status.as_u16(), bytes = body.len(), "backend response");

    match serde_json::from_slice::<T>(&body) {
        Ok(envelope) => Ok(envelope),
        Err(err) if status.is_success() => Err(GatewayError::Decode(err.to_string())),
        Err(_) => Err(GatewayError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body)
                .chars()
                .take(BODY_SNIPPET_LEN)
                .collect(),
        }),
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    #[instrument(skip(self, file), fields(file = %file.name, bytes = file.bytes.len()))]
    async fn upload(&self, file: &UploadFile) -> GatewayResult<UploadedArtifact> {
        let part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        decode::<UploadResult>(response).await?.into_result()
    }

    #[instrument(skip(self))]
    async fn build_graph(&self, artifact_id: &str) -> GatewayResult<GraphDocument> {
        let request = BuildRequest {
            filename: artifact_id,
        };
        self.post_json::<_, BuildResult>("build_graph", &request)
            .await?
            .into_result()
    }

    #[instrument(skip(self, graph), fields(nodes = graph.nodes.len()))]
    async fn visualize(
        &self,
        graph: &GraphDocument,
        kind: VizKind,
        layout: Option<Layout>,
    ) -> GatewayResult<VisualizationArtifact> {
        let request = VisualizeRequest {
            graph_data: graph,
            kind,
            layout,
        };
        self.post_json::<_, VisualizeResult>("visualize", &request)
            .await?
            .into_result()
    }

    #[instrument(skip(self, graph), fields(nodes = graph.nodes.len()))]
    async fn analyze(&self, graph: &GraphDocument) -> GatewayResult<AnalyticsReport> {
        let request = AnalyticsRequest { graph_data: graph };
        self.post_json::<_, AnalyticsResult>("analytics", &request)
            .await?
            .into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Id, Node};
    use serde_json::{Value, json};
    use wiremock::matchers::{body_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway_for(server: &MockServer) -> HttpGateway {
        HttpGateway::new(HttpGatewayConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
        })
        .expect("client should build")
    }

    fn small_graph() -> GraphDocument {
        GraphDocument {
            nodes: vec![Node {
                id: Id::Number(1),
                name: "Ada".into(),
                node_type: "person".into(),
                description: None,
            }],
            ..Default::default()
        }
    }

    async fn last_request_body(server: &MockServer) -> Value {
        let requests = server.received_requests().await.expect("recording enabled");
        let last = requests.last().expect("at least one request");
        serde_json::from_slice(&last.body).expect("json body")
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let gateway = HttpGateway::new(HttpGatewayConfig {
            base_url: "http://backend:5000/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(gateway.endpoint("upload"), "http://backend:5000/api/upload");
    }

    #[tokio::test]
    async fn upload_sends_multipart_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .and(header_exists("content-type"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "filename": "doc1.txt", "text_length": 11
            })))
            .mount(&server)
            .await;

        let artifact = gateway_for(&server)
            .upload(&UploadFile::new("doc1.txt", "hello world"))
            .await
            .unwrap();
        assert_eq!(artifact.artifact_id, "doc1.txt");
        assert_eq!(artifact.char_count, 11);

        let requests = server.received_requests().await.unwrap();
        let content_type = requests[0]
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data"));
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("filename=\"doc1.txt\""));
        assert!(body.contains("hello world"));
    }

    #[tokio::test]
    async fn build_graph_threads_artifact_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/build_graph"))
            .and(body_json(json!({"filename": "doc1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "graph_data": {"title": "Doc", "nodes": [], "edges": []}
            })))
            .mount(&server)
            .await;

        let graph = gateway_for(&server).build_graph("doc1").await.unwrap();
        assert_eq!(graph.title.as_deref(), Some("Doc"));
    }

    #[tokio::test]
    async fn build_graph_decodes_integer_ids() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/build_graph"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "graph_data": {
                    "nodes": [{"id": 0, "name": "Ada", "type": "person"}],
                    "edges": [{"source": 0, "target": 0, "relation": "knows"}]
                }
            })))
            .mount(&server)
            .await;

        let graph = gateway_for(&server).build_graph("doc1").await.unwrap();
        assert_eq!(graph.nodes[0].id, Id::Number(0));
        assert_eq!(graph.edges[0].source, Id::Number(0));
    }

    #[tokio::test]
    async fn error_status_with_envelope_is_a_remote_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/build_graph"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"error": "parse timeout"})),
            )
            .mount(&server)
            .await;

        let err = gateway_for(&server).build_graph("doc1").await.unwrap_err();
        assert!(matches!(err, GatewayError::Remote(ref m) if m == "parse timeout"));
    }

    #[tokio::test]
    async fn error_status_without_envelope_keeps_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analytics"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = gateway_for(&server).analyze(&small_graph()).await.unwrap_err();
        match err {
            GatewayError::Status { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "Bad Gateway");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_success_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analytics"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = gateway_for(&server).analyze(&small_graph()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[tokio::test]
    async fn visualize_sends_layout_for_spatial_kinds_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/visualize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "type": "html", "path": "outputs/graph.html"
            })))
            .mount(&server)
            .await;
        let gateway = gateway_for(&server);
        let graph = small_graph();

        gateway
            .visualize(&graph, VizKind::Interactive2d, Some(Layout::Circular))
            .await
            .unwrap();
        let body = last_request_body(&server).await;
        assert_eq!(body["type"], "interactive_2d");
        assert_eq!(body["layout"], "circular");
        assert_eq!(body["graph_data"]["nodes"][0]["id"], 1);

        gateway
            .visualize(&graph, VizKind::Heatmap, None)
            .await
            .unwrap();
        let body = last_request_body(&server).await;
        assert_eq!(body["type"], "heatmap");
        assert!(body.get("layout").is_none());
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        // Bind then drop a listener so the port is very likely closed
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let gateway = HttpGateway::new(HttpGatewayConfig {
            base_url: format!("http://127.0.0.1:{port}"),
            timeout: Duration::from_secs(2),
        })
        .unwrap();

        let err = gateway.build_graph("doc1").await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
        assert!(err.to_string().starts_with("request failed"));
    }
}

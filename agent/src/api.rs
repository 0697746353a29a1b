use crate::{channel::DesiredPush, store::ConfigStore};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use log::{error, info};
use serde_json::{Value, json};
use telemetry::{DesiredDocument, ReportedDocument};
use tokio::sync::mpsc::UnboundedSender;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// # API Documentation
///
/// `ApiDoc` generates the OpenAPI specification for the local observer API,
/// which exposes the reported state of a running agent and accepts desired
/// configuration documents.
#[derive(OpenApi)]
#[openapi(
    paths(root, get_state, push_desired),
    tags(
        (name = "Telemetry Agent API", description = "Local API of a running telemetry agent")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct ApiState {
    pub store: ConfigStore,
    pub desired_tx: UnboundedSender<DesiredPush>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(root))
        .route("/state", get(get_state))
        .route("/desired", post(push_desired))
        .with_state(state)
}

#[utoipa::path(get, path = "/", tag = "Telemetry Agent", responses(
    (status = 200, description = "Agent is running")
))]
pub async fn root() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Telemetry agent is running" }))
}

/// Current reported document.
#[utoipa::path(get, path = "/state", tag = "Telemetry Agent", responses(
    (status = 200, description = "Reported document")
))]
pub async fn get_state(State(state): State<ApiState>) -> Json<ReportedDocument> {
    Json(state.store.document())
}

/// Queues a desired document, exactly as if it had been pushed remotely.
#[utoipa::path(
    post,
    path = "/desired",
    tag = "Telemetry Agent",
    request_body(content = String, description = "Desired document", content_type = "application/json"),
    responses(
        (status = 200, description = "Document queued")
    )
)]
pub async fn push_desired(State(state): State<ApiState>, body: Bytes) -> Json<Value> {
    let push = DesiredDocument::parse(&body);
    info!("[API] Received desired document: {:?}", push);

    if state.desired_tx.send(push).is_err() {
        error!("Failed to queue desired document, agent is not running");

        return Json(json!({"status": "error", "message": "Agent is not running"}));
    }

    Json(json!({"status": "ok", "message": "Desired document queued"}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry::{Configuration, state::StatusKind};
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn state_endpoint_returns_reported_document() {
        let (desired_tx, _rx) = mpsc::unbounded_channel();
        let state = ApiState {
            store: ConfigStore::new(5),
            desired_tx,
        };

        let Json(document) = get_state(State(state)).await;
        assert_eq!(document.telemetry_config.config_id, "0");
        assert_eq!(document.telemetry_config.status, StatusKind::Idle);
    }

    #[tokio::test]
    async fn desired_endpoint_queues_parsed_push() {
        let (desired_tx, mut rx) = mpsc::unbounded_channel();
        let state = ApiState {
            store: ConfigStore::new(5),
            desired_tx,
        };

        let body = Bytes::from_static(br#"{"telemetryConfig":{"configId":"9","sendFrequency":2}}"#);
        let Json(response) = push_desired(State(state), body).await;

        assert_eq!(response["status"], "ok");
        assert_eq!(rx.recv().await, Some(Some(Configuration::new("9", 2))));
    }

    #[tokio::test]
    async fn desired_endpoint_reports_stopped_agent() {
        let (desired_tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let state = ApiState {
            store: ConfigStore::new(5),
            desired_tx,
        };

        let Json(response) = push_desired(State(state), Bytes::from_static(b"{}")).await;
        assert_eq!(response["status"], "error");
    }
}

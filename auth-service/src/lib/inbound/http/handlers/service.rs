use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use serde_json::Value;

use crate::inbound::http::router::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: &'static str,
    pub status: &'static str,
}

pub async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: state.app_name.to_string(),
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
    })
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

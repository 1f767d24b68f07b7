//! API 路由模块。
//!
//! 组装文件系统路由、健康检查与 API 说明，并挂载 CORS 与请求追踪中间件。

pub mod filesystem;
pub mod state;

use std::sync::Arc;

use axum::{
    Json, Router,
    http::{Method, StatusCode, header},
    routing::get,
};
use cubert_api_types::{HealthCheckResponse, SuccessResponse};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use filesystem::{FILESYSTEM_PREFIX, create_filesystem_router};
pub use state::AppState;

pub const SERVICE_NAME: &str = "cubert-filesystem-api";

/// 构建完整的应用路由。
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api", get(api_info))
        .merge(create_filesystem_router())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn health() -> Json<SuccessResponse<HealthCheckResponse>> {
    Json(SuccessResponse::new(
        StatusCode::OK.as_u16(),
        HealthCheckResponse::healthy(SERVICE_NAME, env!("CARGO_PKG_VERSION")),
    ))
}

async fn api_info() -> Json<SuccessResponse<Value>> {
    let endpoint = |suffix: &str| format!("{FILESYSTEM_PREFIX}{suffix}");
    Json(SuccessResponse::new(
        StatusCode::OK.as_u16(),
        json!({
            "name": "Cubert Filesystem API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Local filesystem exploration API",
            "endpoints": {
                "scan": endpoint("/scan?path=/your/path"),
                "list": endpoint("/list?path=/your/path"),
                "info": endpoint("/info?path=/your/path"),
                "stats": endpoint("/stats?path=/your/path"),
                "search": endpoint("/search?path=/your/path&q=query"),
                "roots": endpoint("/roots"),
                "validate": endpoint("/validate"),
            },
        }),
    ))
}

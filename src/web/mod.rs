pub mod handlers;
pub mod middleware;
pub mod ui;

use crate::{models, utils::error::SegError, Config, Result};
use axum::{
    extract::{DefaultBodyLimit, State},
    middleware as axum_middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

/// 应用共享状态。模型在进程启动时加载一次，
/// 加载失败时 engine 为 None，服务以降级模式运行。
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub engine: Option<Arc<dyn models::SegmentationModel>>,
}

pub async fn serve(config: Config) -> Result<()> {
    // 初始化推理引擎。失败不阻止启动，只进入降级模式
    let engine = match models::init(&config) {
        Ok(engine) => Some(engine),
        Err(e) => {
            tracing::error!("Error loading models: {}", e);
            tracing::warn!("Serving in degraded mode: masks will be omitted");
            None
        }
    };

    let state = AppState {
        config: config.clone(),
        engine,
    };
    let app = create_app(state);

    // 解析绑定地址
    let addr: SocketAddr = config.bind_addr.parse().map_err(|e| {
        SegError::Config(format!("Invalid bind address {}: {}", config.bind_addr, e))
    })?;

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /            - Landing page");
    tracing::info!("  GET  /prediction  - Upload form");
    tracing::info!("  POST /prediction  - Multipart upload, HTML result");
    tracing::info!("  POST /api/predict - Multipart upload, JSON result");
    tracing::info!("  GET  /health      - Health check");
    tracing::info!("  GET  /api/info    - Service information");

    // 启动服务器
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        SegError::Internal(format!("Failed to bind to address {}: {}", addr, e))
    })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| SegError::Internal(format!("Server failed to start: {}", e)))?;

    Ok(())
}

pub fn create_app(state: AppState) -> Router {
    let max_request_size = state.config.server_config.max_request_size;
    let request_timeout = state.config.server_config.request_timeout;

    Router::new()
        // 预测路由
        .route(
            "/prediction",
            get(ui::prediction_form_handler).post(handlers::prediction_handler),
        )
        .route("/api/predict", post(handlers::api_predict_handler))
        // 静态页面路由
        .route("/", get(ui::landing_handler))
        .route("/home", get(ui::home_handler))
        .route("/about", get(ui::about_handler))
        // 系统路由
        .route("/health", get(health_handler))
        .route("/api/info", get(info_handler))
        // 中间件 - 使用分层模式避免复杂类型嵌套
        .layer(axum_middleware::from_fn(middleware::request_logging))
        .layer(axum_middleware::from_fn(middleware::security_headers))
        .layer(DefaultBodyLimit::max(max_request_size))
        .layer(RequestBodyLimitLayer::new(max_request_size))
        .layer(TimeoutLayer::new(Duration::from_secs(request_timeout)))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// 健康检查端点。模型未加载时报告降级状态而非失败
async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let models_loaded = state.engine.is_some();
    Json(json!({
        "status": if models_loaded { "healthy" } else { "degraded" },
        "models_loaded": models_loaded,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// 服务信息端点
async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let stats = models::ModelStats::collect(state.engine.as_deref(), &state.config);
    let segmentation_available = stats.loaded;
    Json(json!({
        "service": "MRI Segmentation Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "models": stats,
        "features": {
            "html_upload": true,
            "json_api": true,
            "segmentation": segmentation_available,
        }
    }))
}

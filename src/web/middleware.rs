use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use std::time::Instant;

/// 请求日志中间件
pub async fn request_logging(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let start_time = Instant::now();

    tracing::debug!(
        "Request started: {} {} - User-Agent: {}",
        method,
        uri,
        user_agent
    );

    // 执行请求
    let response = next.run(req).await;

    let duration = start_time.elapsed();
    let status = response.status();

    tracing::info!(
        "Request completed: {} {} - {} - {}ms",
        method,
        uri,
        status,
        duration.as_millis()
    );

    response
}

/// 安全头中间件
pub async fn security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    let headers = response.headers_mut();
    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("X-XSS-Protection", HeaderValue::from_static("1; mode=block"));

    response
}

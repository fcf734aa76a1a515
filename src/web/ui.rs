use crate::seg::PredictionResult;
use axum::{
    extract::Query,
    response::{Html, IntoResponse},
};
use serde::Deserialize;

/// GET /prediction 的查询参数。重定向回来的flash错误消息经此传递
#[derive(Debug, Deserialize)]
pub struct PredictionQuery {
    pub error: Option<String>,
}

/// 首页处理器
pub async fn landing_handler() -> impl IntoResponse {
    Html(include_str!("../../templates/landing.html"))
}

pub async fn home_handler() -> impl IntoResponse {
    Html(include_str!("../../templates/home.html"))
}

pub async fn about_handler() -> impl IntoResponse {
    Html(include_str!("../../templates/about.html"))
}

/// 上传表单处理器
pub async fn prediction_form_handler(Query(query): Query<PredictionQuery>) -> impl IntoResponse {
    Html(render_prediction_page(query.error.as_deref(), None))
}

/// 渲染带预测结果的页面
pub fn render_prediction_result(result: &PredictionResult) -> String {
    render_prediction_page(None, Some(result))
}

fn render_prediction_page(error: Option<&str>, result: Option<&PredictionResult>) -> String {
    let template = include_str!("../../templates/prediction.html");

    let flash_block = match error {
        Some(message) => format!(
            r#"<div class="flash error">{}</div>"#,
            escape_html(message)
        ),
        None => String::new(),
    };

    let result_block = match result {
        Some(result) => {
            let mask_card = match &result.mask_image {
                Some(uri) => format!(
                    r#"<div class="image-card">
                <h3>Segmentation Mask</h3>
                <img src="{}" alt="Segmentation mask">
            </div>"#,
                    uri
                ),
                None => r#"<div class="image-card degraded">
                <h3>Segmentation Mask</h3>
                <p>Segmentation model is unavailable. The mask could not be generated.</p>
            </div>"#
                    .to_string(),
            };

            format!(
                r#"<div class="results">
            <div class="result-summary">
                <span class="result-label">{}</span>
                <span class="result-confidence">Confidence: {:.1}%</span>
            </div>
            <div class="image-grid">
                <div class="image-card">
                    <h3>Original Image</h3>
                    <img src="{}" alt="Original upload">
                </div>
                {}
            </div>
        </div>"#,
                escape_html(&result.label),
                result.confidence,
                result.original_image,
                mask_card
            )
        }
        None => String::new(),
    };

    template
        .replace("{{flash}}", &flash_block)
        .replace("{{result}}", &result_block)
}

/// flash消息来自查询参数，渲染前必须转义
fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_flash_markup() {
        let page = render_prediction_page(Some("<script>alert(1)</script>"), None);
        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn renders_degraded_result_without_mask() {
        let result = PredictionResult {
            label: "MRI".to_string(),
            confidence: 100.0,
            original_image: "data:image/png;base64,AAAA".to_string(),
            mask_image: None,
        };
        let page = render_prediction_result(&result);
        assert!(page.contains("data:image/png;base64,AAAA"));
        assert!(page.contains("could not be generated"));
    }
}

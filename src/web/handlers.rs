use crate::{
    seg::{PredictionResult, SegPipeline},
    utils::error::SegError,
    web::{ui, AppState},
    Result,
};
use axum::{
    extract::{Multipart, State},
    response::{Html, IntoResponse, Json, Redirect, Response},
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::time::Instant;

/// JSON预测处理器 (POST /api/predict)
pub async fn api_predict_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PredictionResult>> {
    let start_time = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();

    tracing::info!("Processing JSON prediction request: request_id={}", request_id);

    let image_data = extract_image_field(&mut multipart).await?;
    let result = SegPipeline::process_bytes(&image_data, state.engine.as_ref()).await?;

    tracing::info!(
        "JSON prediction completed: request_id={}, mask={}, time={:.3}s",
        request_id,
        result.mask_image.is_some(),
        start_time.elapsed().as_secs_f32()
    );

    Ok(Json(result))
}

/// HTML表单预测处理器 (POST /prediction)。
/// 失败时带着错误消息重定向回表单页，对应上游的flash消息语义
pub async fn prediction_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let start_time = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();

    tracing::info!("Processing form prediction request: request_id={}", request_id);

    let outcome = async {
        let image_data = extract_image_field(&mut multipart).await?;
        SegPipeline::process_bytes(&image_data, state.engine.as_ref()).await
    }
    .await;

    match outcome {
        Ok(result) => {
            tracing::info!(
                "Form prediction completed: request_id={}, mask={}, time={:.3}s",
                request_id,
                result.mask_image.is_some(),
                start_time.elapsed().as_secs_f32()
            );
            Html(ui::render_prediction_result(&result)).into_response()
        }
        Err(e) => {
            tracing::warn!("Form prediction failed: request_id={}, error={}", request_id, e);
            let message = match &e {
                SegError::MissingFile | SegError::EmptyFile => "No file selected".to_string(),
                other => format!("Error processing image: {}", other),
            };
            Redirect::to(&flash_url(&message)).into_response()
        }
    }
}

/// 从multipart表单中提取必需的 image 字段
async fn extract_image_field(multipart: &mut Multipart) -> Result<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| SegError::InvalidInput(format!("Failed to read multipart field: {}", e)))?
    {
        let field_name = field.name().unwrap_or("unknown").to_string();
        if field_name != "image" {
            tracing::debug!("Ignoring unknown field: {}", field_name);
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| SegError::InvalidInput(format!("Failed to read file data: {}", e)))?;

        // 浏览器未选择文件时会提交空文件名的空字段
        if data.is_empty() {
            return Err(SegError::EmptyFile);
        }

        tracing::debug!("Received file '{}': {} bytes", file_name, data.len());
        return Ok(data.to_vec());
    }

    Err(SegError::MissingFile)
}

fn flash_url(message: &str) -> String {
    let encoded = utf8_percent_encode(message, NON_ALPHANUMERIC);
    format!("/prediction?error={}", encoded)
}

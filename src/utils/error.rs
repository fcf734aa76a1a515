use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    /// POST /api/predict 缺少 image 字段时的固定响应文案
    #[error("No file provided")]
    MissingFile,

    /// 上传了空文件时的固定响应文案
    #[error("No file selected")]
    EmptyFile,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {0} bytes, max allowed: {1} bytes")]
    FileTooLarge(usize, usize),

    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("Segmentation inference failed: {0}")]
    Inference(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ORT error: {0}")]
    Ort(#[from] ort::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl SegError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SegError::MissingFile => StatusCode::BAD_REQUEST,
            SegError::EmptyFile => StatusCode::BAD_REQUEST,
            SegError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SegError::FileTooLarge(_, _) => StatusCode::PAYLOAD_TOO_LARGE,
            SegError::ModelLoad(_) => StatusCode::SERVICE_UNAVAILABLE,
            // 解码失败与推理失败都属于处理异常
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            SegError::ModelLoad(_) => "MODEL_LOAD_ERROR",
            SegError::MissingFile => "MISSING_FILE",
            SegError::EmptyFile => "EMPTY_FILE",
            SegError::InvalidInput(_) => "INVALID_INPUT",
            SegError::FileTooLarge(_, _) => "FILE_TOO_LARGE",
            SegError::ImageDecode(_) => "IMAGE_DECODE_ERROR",
            SegError::Inference(_) => "INFERENCE_ERROR",
            SegError::Config(_) => "CONFIG_ERROR",
            SegError::Io(_) => "IO_ERROR",
            SegError::Json(_) => "JSON_ERROR",
            SegError::Ort(_) => "ORT_ERROR",
            SegError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for SegError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // 与上游API保持一致的扁平错误体： {"error": "<message>"}
        let error_response = serde_json::json!({
            "error": self.to_string(),
        });

        tracing::error!("Request failed: {} [{}] ({})", self, self.error_code(), status);

        (status, axum::Json(error_response)).into_response()
    }
}

use serde::Serialize;

/// 固定分类标签。上游产品已停用真实分类逻辑，
/// 标签是产品占位符，不是计算结果。
pub const PLACEHOLDER_LABEL: &str = "MRI";

/// 固定置信度占位符，与 [`PLACEHOLDER_LABEL`] 配套
pub const PLACEHOLDER_CONFIDENCE: f32 = 100.0;

/// 单次预测的完整结果
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub label: String,
    pub confidence: f32,

    /// 原始上传图像的 data URI (PNG)
    pub original_image: String,

    /// 分割掩码的 data URI。模型不可用（降级模式）时整个字段缺省
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_image: Option<String>,
}

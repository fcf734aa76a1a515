use crate::{
    imaging::{ImageEncoder, ImageLoader, ImagePreprocessor},
    models::SegmentationModel,
    seg::{PredictionResult, PLACEHOLDER_CONFIDENCE, PLACEHOLDER_LABEL},
    Result,
};
use image::DynamicImage;
use std::sync::Arc;
use std::time::Instant;

/// 分割处理流水线：解码 -> 预处理 -> 推理 -> 掩码渲染 -> 编码。
/// 每个请求单趟执行，无重试，无跨请求状态。
pub struct SegPipeline;

impl SegPipeline {
    /// 处理上传的图像字节流
    pub async fn process_bytes(
        bytes: &[u8],
        engine: Option<&Arc<dyn SegmentationModel>>,
    ) -> Result<PredictionResult> {
        let start_time = Instant::now();

        if let Some(format) = ImageLoader::detect_format(bytes) {
            tracing::debug!("Detected upload format: {:?}", format);
        }

        let image = ImageLoader::from_bytes(bytes)?;
        ImageLoader::validate_dimensions(&image)?;

        // 回传的是上传原图，不是灰度缩放后的版本
        let original_image = ImageEncoder::png_data_uri(&image)?;

        let mask_image = match engine {
            Some(engine) => Some(Self::predict_mask(&image, engine.as_ref())?),
            None => {
                // 降级模式：模型不可用时跳过推理，仅省略掩码，请求本身成功
                tracing::warn!("Segmentation model unavailable, omitting mask");
                None
            }
        };

        tracing::info!(
            "Prediction completed: mask={}, time={:.3}s",
            mask_image.is_some(),
            start_time.elapsed().as_secs_f32()
        );

        Ok(PredictionResult {
            label: PLACEHOLDER_LABEL.to_string(),
            confidence: PLACEHOLDER_CONFIDENCE,
            original_image,
            mask_image,
        })
    }

    /// 预处理 -> 推理 -> 掩码编码
    fn predict_mask(image: &DynamicImage, engine: &dyn SegmentationModel) -> Result<String> {
        let inference_start = Instant::now();

        let tensor = ImagePreprocessor::to_model_tensor(image)?;
        let mask = engine.infer(tensor)?;

        let (mask_height, mask_width) = mask.dim();
        tracing::debug!(
            "Inference done: mask {}x{}, time={:.3}s",
            mask_width,
            mask_height,
            inference_start.elapsed().as_secs_f32()
        );

        let mask_img = ImageEncoder::mask_to_image(&mask)?;
        ImageEncoder::png_data_uri(&DynamicImage::ImageLuma8(mask_img))
    }
}

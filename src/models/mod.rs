pub mod segmenter;

pub use segmenter::Segmenter;

use crate::imaging::preprocessing::MODEL_INPUT_SIZE;
use crate::{Config, Result};
use ndarray::{Array2, Array4};
use std::sync::Arc;

/// 分割模型抽象。输入为 (1,512,512,1) 归一化张量，
/// 输出为第一通道的 512x512 概率掩码。
///
/// 通过该接口注入推理能力，测试中可用常量模型替换真实会话。
pub trait SegmentationModel: Send + Sync {
    fn infer(&self, input: Array4<f32>) -> Result<Array2<f32>>;

    /// 模型期望的输入空间尺寸 (height, width)
    fn input_size(&self) -> (usize, usize);
}

/// 启动时加载分割模型，返回显式的加载结果。
/// 加载失败时由调用方决定进入降级模式（省略掩码），而非终止进程。
pub fn init(config: &Config) -> Result<Arc<dyn SegmentationModel>> {
    tracing::info!("Loading segmentation model...");
    let segmenter = Segmenter::new(config)?;
    tracing::info!("Segmentation model loaded successfully");
    Ok(Arc::new(segmenter))
}

/// 模型统计信息
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelStats {
    pub loaded: bool,
    pub input_height: usize,
    pub input_width: usize,
    pub intra_threads: usize,
    pub optimization_level: i32,
}

impl ModelStats {
    pub fn collect(engine: Option<&dyn SegmentationModel>, config: &Config) -> Self {
        let (input_height, input_width) = engine
            .map(|engine| engine.input_size())
            .unwrap_or((MODEL_INPUT_SIZE as usize, MODEL_INPUT_SIZE as usize));

        Self {
            loaded: engine.is_some(),
            input_height,
            input_width,
            intra_threads: config.onnx_config.intra_threads,
            optimization_level: config.onnx_config.optimization_level,
        }
    }
}

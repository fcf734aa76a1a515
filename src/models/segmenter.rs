use crate::imaging::preprocessing::MODEL_INPUT_SIZE;
use crate::models::SegmentationModel;
use crate::utils::error::SegError;
use crate::{Config, Result};
use ndarray::{s, Array2, Array4};
use ort::{
    inputs,
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use parking_lot::Mutex;

/// ONNX分割模型。会话在请求间共享，推理调用经互斥锁串行化。
pub struct Segmenter {
    session: Mutex<Session>,
    input_name: String,
    output_name: String, // 动态发现的输出名称
    input_size: (usize, usize),
}

impl Segmenter {
    pub fn new(config: &Config) -> Result<Self> {
        let model_path = config.seg_model_path();

        if !model_path.exists() {
            return Err(SegError::ModelLoad(format!(
                "Segmentation model not found: {}",
                model_path.display()
            )));
        }

        tracing::info!("Loading segmentation model from: {}", model_path.display());

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(config.onnx_config.intra_threads)?
            .commit_from_file(&model_path)?;

        // 动态发现输入/输出名称，避免对导出工具的命名约定做假设
        if session.inputs.is_empty() || session.outputs.is_empty() {
            return Err(SegError::ModelLoad(
                "Segmentation model has no inputs or outputs".to_string(),
            ));
        }

        let input_name = session.inputs[0].name.clone();
        let output_name = session.outputs[0].name.clone();
        tracing::info!(
            "Segmentation model io: input '{}', output '{}'",
            input_name,
            output_name
        );

        for (i, output) in session.outputs.iter().enumerate() {
            tracing::debug!("Segmentation output[{}]: '{}'", i, output.name);
        }

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            input_size: (MODEL_INPUT_SIZE as usize, MODEL_INPUT_SIZE as usize),
        })
    }
}

impl SegmentationModel for Segmenter {
    /// 分割推理：输入 (1,H,W,1)，输出第一通道的 HxW 概率掩码
    fn infer(&self, input: Array4<f32>) -> Result<Array2<f32>> {
        let (height, width) = self.input_size;
        let expected = [1, height, width, 1];
        if input.shape() != expected.as_slice() {
            return Err(SegError::Inference(format!(
                "Unexpected input shape {:?}, expected {:?}",
                input.shape(),
                expected
            )));
        }

        // 推理 - 立即提取数据避免生命周期冲突
        let input_tensor = Tensor::from_array(input)?;
        let prediction = {
            let mut session = self.session.lock();
            let outputs = session.run(inputs![self.input_name.as_str() => input_tensor])?;

            match outputs.get(&self.output_name) {
                Some(output) => output.try_extract_array::<f32>()?.into_owned(),
                None => {
                    let available: Vec<String> =
                        outputs.keys().map(|name| name.to_string()).collect();
                    return Err(SegError::Inference(format!(
                        "Output '{}' not found. Available outputs: {:?}",
                        self.output_name, available
                    )));
                }
            }
        };

        // 模型输出 (1,H,W,1) 或 (1,H,W)，取第一通道切片
        let mask: Array2<f32> = match prediction.shape() {
            [1, _, _, _] => prediction.slice(s![0, .., .., 0]).to_owned(),
            [1, _, _] => prediction.slice(s![0, .., ..]).to_owned(),
            shape => {
                return Err(SegError::Inference(format!(
                    "Unsupported prediction shape: {:?}. Expected (1,H,W,1) or (1,H,W)",
                    shape
                )));
            }
        };

        if mask.dim() != self.input_size {
            return Err(SegError::Inference(format!(
                "Unexpected mask size {:?}, expected {:?}",
                mask.dim(),
                self.input_size
            )));
        }

        Ok(mask)
    }

    fn input_size(&self) -> (usize, usize) {
        self.input_size
    }
}

use crate::Result;
use image::{imageops, imageops::FilterType, DynamicImage};
use ndarray::Array4;

/// 模型输入的固定空间尺寸。无论上传图像多大，
/// 预处理输出恒为 (1, 512, 512, 1)，模型依赖该不变量。
pub const MODEL_INPUT_SIZE: u32 = 512;

pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// 预处理流水线：灰度 -> 双线性缩放到512x512 -> [0,1]归一化 -> NHWC张量
    pub fn to_model_tensor(image: &DynamicImage) -> Result<Array4<f32>> {
        // 1. 标准亮度变换转单通道灰度
        let gray = image.to_luma8();

        // 2. 双线性插值缩放到固定尺寸
        let resized = imageops::resize(
            &gray,
            MODEL_INPUT_SIZE,
            MODEL_INPUT_SIZE,
            FilterType::Triangle,
        );

        // 3. u8 -> f32, /255.0, 并补上batch与channel维度
        let side = MODEL_INPUT_SIZE as usize;
        let mut tensor = Array4::<f32>::zeros((1, side, side, 1));
        for (x, y, pixel) in resized.enumerate_pixels() {
            tensor[[0, y as usize, x as usize, 0]] = pixel.0[0] as f32 / 255.0;
        }

        Ok(tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb};

    fn solid_gray(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(ImageBuffer::from_pixel(width, height, Luma([value])))
    }

    #[test]
    fn output_shape_is_fixed_for_arbitrary_inputs() {
        for (width, height) in [(1, 1), (37, 123), (512, 512), (1920, 1080)] {
            let image = solid_gray(width, height, 77);
            let tensor = ImagePreprocessor::to_model_tensor(&image).unwrap();
            assert_eq!(tensor.shape(), &[1, 512, 512, 1]);
        }
    }

    #[test]
    fn values_are_normalized_to_unit_range() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_fn(300, 200, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }));
        let tensor = ImagePreprocessor::to_model_tensor(&image).unwrap();
        assert!(tensor.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn solid_white_maps_to_ones() {
        let tensor =
            ImagePreprocessor::to_model_tensor(&solid_gray(512, 512, 255)).unwrap();
        assert!(tensor.iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn solid_black_maps_to_zeros() {
        let tensor = ImagePreprocessor::to_model_tensor(&solid_gray(512, 512, 0)).unwrap();
        assert!(tensor.iter().all(|&v| v.abs() < 1e-6));
    }

    #[test]
    fn rgb_input_gets_single_channel() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(
            64,
            64,
            Rgb([255u8, 255u8, 255u8]),
        ));
        let tensor = ImagePreprocessor::to_model_tensor(&image).unwrap();
        assert_eq!(tensor.shape(), &[1, 512, 512, 1]);
        assert!(tensor.iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }
}

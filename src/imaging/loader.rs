use crate::utils::error::SegError;
use crate::Result;
use image::{DynamicImage, GenericImageView, ImageFormat};

/// 单次上传允许的最大字节数，与HTTP层的请求体限制一致
pub const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024;

/// 解码后允许的最大边长
const MAX_DIMENSION: u32 = 8192;

pub struct ImageLoader;

impl ImageLoader {
    /// 从字节流加载图像
    pub fn from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(SegError::FileTooLarge(bytes.len(), MAX_IMAGE_BYTES));
        }

        let image = image::load_from_memory(bytes)?;
        Ok(image)
    }

    /// 检测图像格式
    pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }

    /// 验证图像尺寸上限。预处理会缩放到固定尺寸，
    /// 这里只拦截会耗尽内存的超大输入。
    pub fn validate_dimensions(image: &DynamicImage) -> Result<()> {
        let (width, height) = image.dimensions();

        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(SegError::InvalidInput(format!(
                "Image too large: {}x{}, maximum {}x{}",
                width, height, MAX_DIMENSION, MAX_DIMENSION
            )));
        }

        Ok(())
    }
}

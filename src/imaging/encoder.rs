use crate::utils::error::SegError;
use crate::Result;
use base64::Engine;
use image::{DynamicImage, GrayImage, ImageFormat};
use ndarray::Array2;
use std::io::Cursor;

pub struct ImageEncoder;

impl ImageEncoder {
    /// 概率掩码转8位灰度图： round(x * 255)，裁剪到 [0, 255]
    pub fn mask_to_image(mask: &Array2<f32>) -> Result<GrayImage> {
        let (height, width) = mask.dim();

        let mut pixels = Vec::with_capacity(width * height);
        for value in mask.iter() {
            pixels.push((value * 255.0).round().clamp(0.0, 255.0) as u8);
        }

        GrayImage::from_raw(width as u32, height as u32, pixels)
            .ok_or_else(|| SegError::Internal("Mask pixel buffer size mismatch".to_string()))
    }

    /// 图像序列化为PNG并包装成 data URI
    pub fn png_data_uri(image: &DynamicImage) -> Result<String> {
        let mut png_bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)?;

        let payload = base64::engine::general_purpose::STANDARD.encode(&png_bytes);
        Ok(format!("data:image/png;base64,{}", payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageBuffer, Rgb};
    use ndarray::array;

    #[test]
    fn mask_scaling_rounds_and_clips() {
        let mask = array![[0.0f32, 0.5, 1.0], [1.5, -0.2, 0.25]];
        let image = ImageEncoder::mask_to_image(&mask).unwrap();

        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(0, 0).0[0], 0);
        assert_eq!(image.get_pixel(1, 0).0[0], 128);
        assert_eq!(image.get_pixel(2, 0).0[0], 255);
        // 超出 [0,1] 的值被裁剪
        assert_eq!(image.get_pixel(0, 1).0[0], 255);
        assert_eq!(image.get_pixel(1, 1).0[0], 0);
        assert_eq!(image.get_pixel(2, 1).0[0], 64);
    }

    #[test]
    fn data_uri_round_trips_pixel_data() {
        let original = DynamicImage::ImageRgb8(ImageBuffer::from_fn(5, 4, |x, y| {
            Rgb([x as u8 * 40, y as u8 * 60, 200])
        }));

        let uri = ImageEncoder::png_data_uri(&original).unwrap();
        let payload = uri.strip_prefix("data:image/png;base64,").unwrap();

        let png_bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .unwrap();
        let decoded = image::load_from_memory(&png_bytes).unwrap();

        assert_eq!(decoded.dimensions(), original.dimensions());
        assert_eq!(decoded.to_rgb8().as_raw(), original.to_rgb8().as_raw());
    }
}

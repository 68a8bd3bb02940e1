use crate::domain::dimensions::Dimensions;
use crate::domain::image_processor_trait::{ImageInfo, ImageProcessor};
use crate::domain::layout::LayoutPlan;
use super::error::InfrastructureError;
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, ColorType, DynamicImage, ImageFormat, RgbImage, RgbaImage};
use std::io::Cursor;

// Inputs are decoded as JPEG only; other formats are rejected by the decoder.
pub struct DefaultImageProcessor;

impl DefaultImageProcessor {
    pub fn new() -> Self {
        Self
    }

    fn decode_jpeg(&self, image_bytes: &[u8]) -> Result<DynamicImage, InfrastructureError> {
        let reader = image::io::Reader::with_format(Cursor::new(image_bytes), ImageFormat::Jpeg);
        reader.decode().map_err(InfrastructureError::ImageLibError)
    }
}

impl Default for DefaultImageProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageProcessor for DefaultImageProcessor {
    fn decode(&self, image_bytes: &[u8]) -> Result<RgbaImage, InfrastructureError> {
        Ok(self.decode_jpeg(image_bytes)?.to_rgba8())
    }

    fn compose(&self, plan: &LayoutPlan, images: &[RgbaImage]) -> Result<RgbaImage, InfrastructureError> {
        if plan.placements.len() != images.len() {
            return Err(InfrastructureError::ImageProcessingError(format!(
                "layout has {} placements but {} images were supplied",
                plan.placements.len(),
                images.len()
            )));
        }

        for (index, placement) in plan.clipped() {
            log::warn!(
                "image #{} ({}x{} at {},{}) exceeds the {}x{} canvas and will be clipped",
                index,
                placement.size.width,
                placement.size.height,
                placement.x,
                placement.y,
                plan.canvas.width,
                plan.canvas.height,
            );
        }

        // 透明なキャンバスに順番に貼り付ける (はみ出した部分は切り捨て)
        let mut canvas = RgbaImage::new(plan.canvas.width, plan.canvas.height);
        for (placement, img) in plan.placements.iter().zip(images) {
            let actual = Dimensions::new(img.width(), img.height());
            if actual != placement.size {
                return Err(InfrastructureError::ImageProcessingError(format!(
                    "image is {}x{} but its placement expects {}x{}",
                    actual.width, actual.height, placement.size.width, placement.size.height
                )));
            }
            log::debug!("pasting {}x{} image at ({}, {})", actual.width, actual.height, placement.x, placement.y);
            imageops::overlay(&mut canvas, img, placement.x, placement.y);
        }
        Ok(canvas)
    }

    fn encode_jpeg(&self, canvas: &RgbaImage, quality: u8) -> Result<Vec<u8>, InfrastructureError> {
        // JPEG carries no alpha; uncovered canvas areas come out black.
        let rgb: RgbImage = canvas.convert();
        let mut buffer = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut buffer, quality)
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
            .map_err(InfrastructureError::EncodeFailed)?;
        Ok(buffer.into_inner())
    }

    fn inspect(&self, image_bytes: &[u8]) -> Result<ImageInfo, InfrastructureError> {
        let img = self.decode_jpeg(image_bytes)?;
        Ok(ImageInfo {
            dimensions: Dimensions::new(img.width(), img.height()),
            // グレースケールならDeviceGrayで埋め込む
            grayscale: !img.color().has_color(),
        })
    }
}

use crate::domain::dimensions::Dimensions;
use crate::domain::layout::LayoutPlan;
use crate::infrastructure::error::InfrastructureError;
use image::RgbaImage;

/// What the exporter needs to know about an encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub dimensions: Dimensions,
    pub grayscale: bool,
}

// Raster work behind one seam so the service can be driven with a mock.
#[cfg_attr(test, mockall::automock)]
pub trait ImageProcessor {
    fn decode(&self, image_bytes: &[u8]) -> Result<RgbaImage, InfrastructureError>;

    /// Pastes `images` onto a blank canvas at the offsets in `plan`.
    /// Pixels outside the canvas are dropped.
    fn compose(&self, plan: &LayoutPlan, images: &[RgbaImage]) -> Result<RgbaImage, InfrastructureError>;

    fn encode_jpeg(&self, canvas: &RgbaImage, quality: u8) -> Result<Vec<u8>, InfrastructureError>;

    fn inspect(&self, image_bytes: &[u8]) -> Result<ImageInfo, InfrastructureError>;
}

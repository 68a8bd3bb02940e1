use serde::{Deserialize, Serialize};

use crate::domain::dimensions::Dimensions;
use crate::domain::error::DomainError;

pub const MM_PER_INCH: f32 = 25.4;
pub const POINTS_PER_INCH: f32 = 72.0;

// mm -> pt (1pt = 1/72 inch)
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_INCH / MM_PER_INCH
}

/// Physical page size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSize {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl Default for PageSize {
    fn default() -> Self {
        Self::a4()
    }
}

/// Result of fitting an image onto a page: the uniform scale and the
/// resulting drawn size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFit {
    pub scale: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageSize {
    /// A4 portrait.
    pub fn a4() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
        }
    }

    pub fn width_pt(&self) -> f32 {
        mm_to_pt(self.width_mm)
    }

    pub fn height_pt(&self) -> f32 {
        mm_to_pt(self.height_mm)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let ok = |v: f32| v.is_finite() && v > 0.0;
        if ok(self.width_mm) && ok(self.height_mm) {
            Ok(())
        } else {
            Err(DomainError::InvalidInput(format!(
                "page size must be positive, got {}x{} mm",
                self.width_mm, self.height_mm
            )))
        }
    }

    /// Largest uniform scale that keeps the whole image on the page.
    /// One image pixel counts as one millimetre before scaling.
    pub fn fit(&self, image: Dimensions) -> Result<PageFit, DomainError> {
        if image.is_empty() {
            return Err(DomainError::InvalidInput(format!(
                "cannot fit an empty {}x{} image onto a page",
                image.width, image.height
            )));
        }
        // 縦横どちらか小さい方の倍率に合わせる
        let width = image.width as f32;
        let height = image.height as f32;
        let scale = (self.width_mm / width).min(self.height_mm / height);
        Ok(PageFit {
            scale,
            width_mm: width * scale,
            height_mm: height * scale,
        })
    }
}

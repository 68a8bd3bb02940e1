use crate::domain::image_processor_trait::ImageInfo;
use crate::domain::page::PageSize;
use crate::infrastructure::error::InfrastructureError;

#[cfg_attr(test, mockall::automock)]
pub trait DocumentRenderer {
    /// Builds a one-page document with `jpeg_bytes` scaled to fit `page`,
    /// anchored at the top-left corner. Returns the serialized document.
    fn render_single_page(
        &self,
        jpeg_bytes: &[u8],
        image: &ImageInfo,
        page: &PageSize,
    ) -> Result<Vec<u8>, InfrastructureError>;
}

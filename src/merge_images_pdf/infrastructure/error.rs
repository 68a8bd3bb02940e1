use std::path::PathBuf;

use thiserror::Error;
use crate::domain::error::DomainError;

#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("Image processing failed: {0}")]
    ImageProcessingError(String),

    #[error("Unable to open image {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to decode image {}: {source}", path.display())]
    DecodeFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode image: {0}")]
    EncodeFailed(#[source] image::ImageError),

    #[error("Failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF generation failed: {0}")]
    PdfError(String),

    #[error("Underlying image library error: {0}")]
    ImageLibError(#[from] image::ImageError),

    #[error("Domain Error Wrapper: {0}")]
    DomainErrorWrapper(#[from] DomainError),
}

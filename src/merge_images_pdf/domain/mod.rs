pub mod dimensions;
pub mod document_renderer_trait;
pub mod error;
pub mod image_processor_trait;
pub mod layout;
pub mod page;

use crate::domain::document_renderer_trait::DocumentRenderer;
use crate::domain::image_processor_trait::ImageInfo;
use crate::domain::page::{mm_to_pt, PageSize};
use super::error::InfrastructureError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

const IMAGE_RESOURCE_NAME: &str = "Im0";

/// Single-page PDF writer. The JPEG stream is embedded untouched
/// (`DCTDecode`), so no pixel data is re-encoded.
pub struct LopdfRenderer;

impl LopdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LopdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn pdf_error(err: impl std::fmt::Display) -> InfrastructureError {
    InfrastructureError::PdfError(err.to_string())
}

impl DocumentRenderer for LopdfRenderer {
    fn render_single_page(
        &self,
        jpeg_bytes: &[u8],
        image: &ImageInfo,
        page: &PageSize,
    ) -> Result<Vec<u8>, InfrastructureError> {
        // ページに収まる倍率を計算 (画像のpxをmmとして扱う)
        page.validate()?;
        let fit = page.fit(image.dimensions)?;
        let page_width = page.width_pt();
        let page_height = page.height_pt();
        let draw_width = mm_to_pt(fit.width_mm);
        let draw_height = mm_to_pt(fit.height_mm);
        log::debug!(
            "placing {}x{} image at scale {:.4} ({:.1}x{:.1} mm)",
            image.dimensions.width,
            image.dimensions.height,
            fit.scale,
            fit.width_mm,
            fit.height_mm
        );

        // 1ページだけのドキュメント
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        // JPEGはそのまま埋め込む
        let color_space = if image.grayscale { "DeviceGray" } else { "DeviceRGB" };
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.dimensions.width),
                "Height" => i64::from(image.dimensions.height),
                "ColorSpace" => color_space,
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg_bytes.to_vec(),
        ));

        // PDFの原点は左下なので、上端に揃えるためにy方向へずらす
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        draw_width.into(),
                        0.into(),
                        0.into(),
                        draw_height.into(),
                        0.into(),
                        (page_height - draw_height).into(),
                    ],
                ),
                Operation::new("Do", vec![IMAGE_RESOURCE_NAME.into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().map_err(pdf_error)?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    IMAGE_RESOURCE_NAME => image_id,
                },
            },
        });

        // 用紙サイズはPagesのMediaBoxで指定
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), page_width.into(), page_height.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).map_err(pdf_error)?;
        Ok(buffer)
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::config::{EqualSizedJob, MixedSizedJob, OutputPaths};
use super::error::ApplicationError;
use image::RgbaImage;

use crate::domain::dimensions::Dimensions;
use crate::domain::document_renderer_trait::DocumentRenderer;
use crate::domain::image_processor_trait::ImageProcessor;
use crate::domain::layout::{plan_mixed, plan_stacked, LayoutPlan};
use crate::domain::page::PageSize;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::file_storage::LocalFileStorage;

/// Summary of one finished merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    pub canvas: Dimensions,
    /// Placements that did not fit on the canvas and were clipped.
    pub clipped: usize,
    pub image_path: PathBuf,
    pub pdf_path: PathBuf,
}

/// Runs load → compose → export for one job at a time.
///
/// Every input is loaded and decoded before anything is written, so a bad
/// input leaves previous artifacts untouched.
pub struct MergeService {
    image_processor: Arc<dyn ImageProcessor + Send + Sync>,
    document_renderer: Arc<dyn DocumentRenderer + Send + Sync>,
    storage: LocalFileStorage,
    page: PageSize,
    jpeg_quality: u8,
}

fn dimensions_of(images: &[RgbaImage]) -> Vec<Dimensions> {
    images.iter().map(|img| Dimensions::from(img.dimensions())).collect()
}

impl MergeService {
    pub fn new(
        image_processor: Arc<dyn ImageProcessor + Send + Sync>,
        document_renderer: Arc<dyn DocumentRenderer + Send + Sync>,
        storage: LocalFileStorage,
        page: PageSize,
        jpeg_quality: u8,
    ) -> Self {
        Self {
            image_processor,
            document_renderer,
            storage,
            page,
            jpeg_quality,
        }
    }

    // 画像ライブラリのエラーにファイルパスを付ける
    fn with_path(&self, path: &Path, err: InfrastructureError) -> InfrastructureError {
        match err {
            InfrastructureError::ImageLibError(source) => InfrastructureError::DecodeFailed {
                path: self.storage.resolve(path),
                source,
            },
            other => other,
        }
    }

    async fn load_images(&self, paths: &[PathBuf]) -> Result<Vec<RgbaImage>, ApplicationError> {
        let mut images = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = self.storage.read_image(path).await?;
            let img = self
                .image_processor
                .decode(&bytes)
                .map_err(|e| self.with_path(path, e))?;
            log::debug!("decoded {} ({}x{})", path.display(), img.width(), img.height());
            images.push(img);
        }
        Ok(images)
    }

    /// Stacks every image top to bottom and exports the result.
    pub async fn merge_equal_sized(&self, job: &EqualSizedJob) -> Result<MergeReport, ApplicationError> {
        log::info!("merging {} equal-sized images", job.images.len());
        let images = self.load_images(&job.images).await?;
        let plan = plan_stacked(&dimensions_of(&images))?;
        self.compose_and_export(&plan, &images, &job.output).await
    }

    /// Stacked column followed by side-by-side pairs, then exports the result.
    pub async fn merge_different_sized(&self, job: &MixedSizedJob) -> Result<MergeReport, ApplicationError> {
        log::info!(
            "merging {} stacked and {} paired images",
            job.stacked.len(),
            job.paired.len()
        );
        let mut images = self.load_images(&job.stacked).await?;
        let paired = self.load_images(&job.paired).await?;
        let plan = plan_mixed(&dimensions_of(&images), &dimensions_of(&paired), &job.layout)?;
        images.extend(paired);
        self.compose_and_export(&plan, &images, &job.output).await
    }

    async fn compose_and_export(
        &self,
        plan: &LayoutPlan,
        images: &[RgbaImage],
        output: &OutputPaths,
    ) -> Result<MergeReport, ApplicationError> {
        if plan.canvas.is_empty() {
            return Err(ApplicationError::MergeFailed(format!(
                "nothing to draw on a {}x{} canvas",
                plan.canvas.width, plan.canvas.height
            )));
        }
        let clipped = plan.clipped().count();

        let canvas = self.image_processor.compose(plan, images)?;
        let jpeg = self.image_processor.encode_jpeg(&canvas, self.jpeg_quality)?;
        let image_path = self.storage.save_file(&output.image, &jpeg).await?;
        log::info!(
            "wrote {} ({}x{})",
            image_path.display(),
            plan.canvas.width,
            plan.canvas.height
        );

        let pdf_path = self.export_pdf(&output.image, &output.pdf).await?;
        log::info!("Process completed successfully!");

        Ok(MergeReport {
            canvas: plan.canvas,
            clipped,
            image_path,
            pdf_path,
        })
    }

    /// Reads the JPEG at `image` back from disk and writes a one-page PDF
    /// with it scaled to fit the configured page.
    pub async fn export_pdf(&self, image: &Path, pdf: &Path) -> Result<PathBuf, ApplicationError> {
        let jpeg = self.storage.read_image(image).await?;
        let info = self
            .image_processor
            .inspect(&jpeg)
            .map_err(|e| self.with_path(image, e))?;
        let document = self
            .document_renderer
            .render_single_page(&jpeg, &info, &self.page)?;
        let pdf_path = self.storage.save_file(pdf, &document).await?;
        log::info!("wrote {}", pdf_path.display());
        Ok(pdf_path)
    }
}

mod application;
mod domain;
mod infrastructure;

use std::process;
use std::sync::Arc;

use anyhow::Context;

use application::config::{base_dir_from_env, MergeConfig};
use application::merge_service::MergeService;
use infrastructure::file_storage::LocalFileStorage;
use infrastructure::image_processor::DefaultImageProcessor;
use infrastructure::pdf_renderer::LopdfRenderer;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 最初のエラーで終了する
    if let Err(err) = run().await {
        log::error!("{:#}", err);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = MergeConfig::from_env().await?;
    config.validate()?;

    let base_dir = base_dir_from_env();
    log::debug!("resolving inputs against {}", base_dir.display());

    let service = MergeService::new(
        Arc::new(DefaultImageProcessor::new()),
        Arc::new(LopdfRenderer::new()),
        LocalFileStorage::new(base_dir),
        config.page,
        config.jpeg_quality,
    );

    let report = service
        .merge_equal_sized(&config.equal_sized)
        .await
        .context("merging equal-sized images failed")?;
    log::info!(
        "equal-sized merge: {}x{} canvas -> {}, {}",
        report.canvas.width,
        report.canvas.height,
        report.image_path.display(),
        report.pdf_path.display()
    );

    let report = service
        .merge_different_sized(&config.different_sized)
        .await
        .context("merging different-sized images failed")?;
    if report.clipped > 0 {
        log::warn!("{} image(s) were clipped by the canvas bounds", report.clipped);
    }
    log::info!(
        "different-sized merge: {}x{} canvas -> {}, {}",
        report.canvas.width,
        report.canvas.height,
        report.image_path.display(),
        report.pdf_path.display()
    );

    Ok(())
}

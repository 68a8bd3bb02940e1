use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use super::error::ApplicationError;
use crate::domain::layout::MixedLayoutOptions;
use crate::domain::page::PageSize;

/// JSON file overriding the built-in job definitions.
pub const CONFIG_ENV: &str = "MERGE_IMAGES_CONFIG";
/// Directory that relative input and output paths resolve against.
pub const BASE_DIR_ENV: &str = "MERGE_IMAGES_DIR";

pub const DEFAULT_JPEG_QUALITY: u8 = 75;

fn numbered_images(range: std::ops::RangeInclusive<u32>) -> Vec<PathBuf> {
    range.map(|i| PathBuf::from(format!("pt{}.jpg", i))).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPaths {
    pub image: PathBuf,
    pub pdf: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            image: PathBuf::from("merged_image.jpg"),
            pdf: PathBuf::from("output.pdf"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqualSizedJob {
    pub images: Vec<PathBuf>,
    pub output: OutputPaths,
}

impl Default for EqualSizedJob {
    fn default() -> Self {
        Self {
            images: numbered_images(1..=12),
            output: OutputPaths::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixedSizedJob {
    pub stacked: Vec<PathBuf>,
    pub paired: Vec<PathBuf>,
    #[serde(flatten)]
    pub layout: MixedLayoutOptions,
    pub output: OutputPaths,
}

impl Default for MixedSizedJob {
    fn default() -> Self {
        Self {
            stacked: numbered_images(1..=9),
            paired: numbered_images(10..=15),
            layout: MixedLayoutOptions::default(),
            output: OutputPaths::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub equal_sized: EqualSizedJob,
    pub different_sized: MixedSizedJob,
    pub page: PageSize,
    pub jpeg_quality: u8,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            equal_sized: EqualSizedJob::default(),
            different_sized: MixedSizedJob::default(),
            page: PageSize::a4(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl MergeConfig {
    pub fn from_json(text: &str) -> Result<Self, ApplicationError> {
        serde_json::from_str(text)
            .map_err(|e| ApplicationError::ConfigurationError(format!("invalid config JSON: {}", e)))
    }

    pub async fn load(path: &Path) -> Result<Self, ApplicationError> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            ApplicationError::ConfigurationError(format!("unable to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    /// Built-in defaults unless `MERGE_IMAGES_CONFIG` points at a file.
    pub async fn from_env() -> Result<Self, ApplicationError> {
        match env::var_os(CONFIG_ENV) {
            Some(path) => {
                let path = PathBuf::from(path);
                log::info!("loading configuration from {}", path.display());
                Self::load(&path).await
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ApplicationError> {
        // 空のジョブは実行前に弾く
        if self.equal_sized.images.is_empty() {
            return Err(ApplicationError::ConfigurationError(
                "equal_sized.images must name at least one image".to_string(),
            ));
        }
        if self.different_sized.stacked.is_empty() && self.different_sized.paired.is_empty() {
            return Err(ApplicationError::ConfigurationError(
                "different_sized needs at least one stacked or paired image".to_string(),
            ));
        }
        self.page
            .validate()
            .map_err(|e| ApplicationError::ConfigurationError(e.to_string()))?;
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ApplicationError::ConfigurationError(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

pub fn base_dir_from_env() -> PathBuf {
    env::var_os(BASE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

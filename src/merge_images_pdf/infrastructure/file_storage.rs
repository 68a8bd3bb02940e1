use super::error::InfrastructureError;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Reads inputs and writes artifacts relative to one base directory.
/// Absolute paths are used as given.
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    pub async fn read_image(&self, path: &Path) -> Result<Vec<u8>, InfrastructureError> {
        let full_path = self.resolve(path);
        fs::read(&full_path)
            .await
            .map_err(|source| InfrastructureError::ReadFailed { path: full_path, source })
    }

    /// Creates or truncates the target file.
    pub async fn save_file(&self, path: &Path, data: &[u8]) -> Result<PathBuf, InfrastructureError> {
        let full_path = self.resolve(path);
        match fs::write(&full_path, data).await {
            Ok(()) => Ok(full_path),
            Err(source) => Err(InfrastructureError::WriteFailed { path: full_path, source }),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::ops::Deref;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

    /// Scratch directory under the system temp dir, removed again on drop.
    pub struct ScratchDir {
        path: PathBuf,
    }

    impl Deref for ScratchDir {
        type Target = Path;

        fn deref(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            // テスト終了時に後片付け
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }

    /// Fresh, empty scratch directory.
    pub fn scratch_dir(label: &str) -> ScratchDir {
        let id = NEXT_DIR.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "merge_images_pdf-{}-{}-{}",
            label,
            std::process::id(),
            id
        ));
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).unwrap();
        ScratchDir { path }
    }
}

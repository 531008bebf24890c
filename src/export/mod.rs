//! Declaration card export
//!
//! The pipeline runs in three steps:
//! 1. [`card::render`] turns a validated [`Declaration`] into a [`RenderTree`]
//! 2. a [`Rasterizer`] draws the tree and encodes it as PNG
//! 3. [`ArtifactExporter::save`] writes the PNG under its download name
//!
//! Rasterization runs on a blocking worker. Only one export may be in flight
//! per exporter; a second request while busy gets [`ExportError::Busy`].

pub mod card;
pub mod raster;
pub mod share;

pub use card::{Node, RenderTree};
pub use raster::{Bitmap, BitmapRasterizer, RasterError, RasterOptions, Rasterizer};
pub use share::{
    share, Clipboard, NativeShare, Osc52Clipboard, PrintShare, ShareError, ShareOutcome,
    SharePayload,
};

use crate::models::Declaration;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::{debug, info};

const DOWNLOAD_SUFFIX: &str = "_Limitless_Brain_Declaration.png";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("An export is already in progress")]
    Busy,

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error("Failed to write card: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export worker failed: {0}")]
    Worker(String),
}

/// A rendered declaration card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub bitmap: Bitmap,
}

static UNSAFE_FILE_CHARS: OnceLock<Regex> = OnceLock::new();

/// Path separators, characters reserved on Windows, control characters
fn unsafe_file_chars() -> &'static Regex {
    UNSAFE_FILE_CHARS.get_or_init(|| Regex::new(r#"[/\\:*?"<>|\p{Cc}]"#).unwrap())
}

/// File name offered for a saved card
pub fn download_file_name(display_name: &str) -> String {
    let name = display_name.trim();
    let name = if name.is_empty() { "braintype" } else { name };
    let sanitized = unsafe_file_chars().replace_all(name, "_");
    format!("{sanitized}{DOWNLOAD_SUFFIX}")
}

/// Renders declarations into PNG artifacts, one at a time
pub struct ArtifactExporter<R: Rasterizer = BitmapRasterizer> {
    rasterizer: Arc<R>,
    options: RasterOptions,
    busy: AtomicBool,
}

impl ArtifactExporter<BitmapRasterizer> {
    pub fn with_options(options: RasterOptions) -> Self {
        Self::new(BitmapRasterizer, options)
    }
}

impl<R: Rasterizer + 'static> ArtifactExporter<R> {
    pub fn new(rasterizer: R, options: RasterOptions) -> Self {
        Self {
            rasterizer: Arc::new(rasterizer),
            options,
            busy: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &RasterOptions {
        &self.options
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Render and rasterize a declaration
    pub async fn export(&self, declaration: &Declaration) -> Result<Artifact, ExportError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        self.render(declaration).await
    }

    /// Export and write the PNG into `dir`, returning the written path
    pub async fn save(&self, declaration: &Declaration, dir: &Path) -> Result<PathBuf, ExportError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        let artifact = self.render(declaration).await?;

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&artifact.file_name);
        tokio::fs::write(&path, &artifact.bitmap.png).await?;

        info!(
            "Saved declaration card {} ({}x{}, {} bytes)",
            path.display(),
            artifact.bitmap.width,
            artifact.bitmap.height,
            artifact.bitmap.png.len()
        );
        Ok(path)
    }

    async fn render(&self, declaration: &Declaration) -> Result<Artifact, ExportError> {
        let tree = card::render(declaration);
        let rasterizer = Arc::clone(&self.rasterizer);
        let options = self.options;

        debug!("Rasterizing card at scale {}", options.scale);
        let bitmap = tokio::task::spawn_blocking(move || rasterizer.rasterize(&tree, &options))
            .await
            .map_err(|e| ExportError::Worker(e.to_string()))??;

        Ok(Artifact {
            file_name: download_file_name(declaration.display_name()),
            bitmap,
        })
    }
}

/// Holds the busy flag for the duration of one export
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ExportError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::Busy)?;
        Ok(Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::test_profile;
    use crate::models::BrainType;
    use std::sync::atomic::AtomicUsize;

    fn declaration(name: &str) -> Declaration {
        Declaration::new(name, test_profile(BrainType::Cheetah), "Practice daily").unwrap()
    }

    /// Fails the first call, then delegates to the real rasterizer
    #[derive(Default)]
    struct FlakyRasterizer {
        calls: AtomicUsize,
    }

    impl Rasterizer for FlakyRasterizer {
        fn rasterize(
            &self,
            tree: &RenderTree,
            options: &RasterOptions,
        ) -> Result<Bitmap, RasterError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(RasterError::InvalidScale);
            }
            BitmapRasterizer.rasterize(tree, options)
        }
    }

    #[test]
    fn test_download_file_name() {
        assert_eq!(
            download_file_name("Lee"),
            "Lee_Limitless_Brain_Declaration.png"
        );
        assert_eq!(
            download_file_name("../a/b:c"),
            ".._a_b_c_Limitless_Brain_Declaration.png"
        );
        assert_eq!(
            download_file_name("tab\there"),
            "tab_here_Limitless_Brain_Declaration.png"
        );
        assert_eq!(
            download_file_name("이수"),
            "이수_Limitless_Brain_Declaration.png"
        );
        assert_eq!(
            download_file_name("   "),
            "braintype_Limitless_Brain_Declaration.png"
        );
    }

    #[test]
    fn test_busy_guard_is_exclusive() {
        let flag = AtomicBool::new(false);
        let guard = BusyGuard::acquire(&flag).unwrap();
        assert!(matches!(BusyGuard::acquire(&flag), Err(ExportError::Busy)));
        drop(guard);
        assert!(BusyGuard::acquire(&flag).is_ok());
    }

    #[tokio::test]
    async fn test_export_produces_png() {
        let exporter = ArtifactExporter::with_options(RasterOptions::default());
        let artifact = exporter.export(&declaration("Lee")).await.unwrap();
        assert_eq!(artifact.file_name, "Lee_Limitless_Brain_Declaration.png");
        assert!(artifact.bitmap.png.starts_with(b"\x89PNG"));
        assert!(!exporter.is_busy());
    }

    #[tokio::test]
    async fn test_failed_export_is_retryable() {
        let exporter = ArtifactExporter::new(FlakyRasterizer::default(), RasterOptions::default());
        let decl = declaration("Lee");

        let first = exporter.export(&decl).await;
        assert!(matches!(first, Err(ExportError::Raster(_))));
        assert!(!exporter.is_busy());

        assert!(exporter.export(&decl).await.is_ok());
    }

    #[tokio::test]
    async fn test_save_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("cards");
        let exporter = ArtifactExporter::with_options(RasterOptions::default());

        let path = exporter.save(&declaration("Lee"), &out).await.unwrap();
        assert_eq!(path, out.join("Lee_Limitless_Brain_Declaration.png"));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[tokio::test]
    async fn test_failed_save_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ArtifactExporter::new(FlakyRasterizer::default(), RasterOptions::default());

        assert!(exporter.save(&declaration("Lee"), dir.path()).await.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}

//! PNG export: file naming and the capture pipeline.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::render::{CardScene, RasterSurface, RenderSurface};
use crate::state::AppState;

/// Name used when the requested one has nothing usable left.
pub const DEFAULT_FILE_STEM: &str = "semester-wrapped";
const MAX_FILE_STEM: usize = 80;
/// Exports are painted at this multiple of the preset size.
pub const SUPERSAMPLE: u32 = 2;

static PNG_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.png$").expect("valid suffix regex"));
static ILLEGAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).expect("valid filename regex"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("render surface is not ready: {0}")]
    NotReady(String),
    #[error("surface size {actual:?} does not match export size {expected:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("rasterization failed: {0}")]
    Rasterize(String),
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Turn free text into a file stem that is legal on common filesystems.
///
/// A trailing `.png` is dropped, illegal and control characters removed,
/// whitespace collapsed and the result cut to 80 characters.
pub fn sanitize_file_name(name: &str) -> String {
    let trimmed = name.trim();
    let stem = PNG_SUFFIX.replace(trimmed, "");
    let stem = ILLEGAL_CHARS.replace_all(&stem, "");
    let stem = WHITESPACE.replace_all(&stem, " ");
    let stem = stem.trim();
    let chosen = if stem.chars().any(char::is_alphanumeric) {
        stem
    } else {
        DEFAULT_FILE_STEM
    };
    chosen.chars().take(MAX_FILE_STEM).collect()
}

/// Drives a [`RenderSurface`] to produce a PNG file for a wrap document.
pub struct ExportPipeline<S = RasterSurface> {
    surface: S,
    supersample: u32,
}

impl Default for ExportPipeline<RasterSurface> {
    fn default() -> Self {
        Self::new(RasterSurface)
    }
}

impl<S: RenderSurface> ExportPipeline<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            supersample: SUPERSAMPLE,
        }
    }

    /// Render `state` and write `<dir>/<sanitized name>.png`.
    ///
    /// The image is staged in a temporary file inside `dir` and only renamed
    /// into place once fully written, so a failure leaves no partial output.
    pub fn export(&self, state: &AppState, dir: &Path, name: &str) -> Result<PathBuf, ExportError> {
        let result = self.try_export(state, dir, name);
        if let Err(err) = &result {
            tracing::error!(error = %err, dir = %dir.display(), "export failed");
        }
        result
    }

    fn try_export(&self, state: &AppState, dir: &Path, name: &str) -> Result<PathBuf, ExportError> {
        let dims = state.format.dims();
        // The scene is always built at the preset size, never the preview size.
        let scene = CardScene::build(state);
        self.surface.wait_until_ready()?;
        let bytes =
            self.surface
                .render_to_image_bytes(&scene, dims.width, dims.height, self.supersample)?;

        fs::create_dir_all(dir)?;
        let target = dir.join(format!("{}.png", sanitize_file_name(name)));
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(&bytes)?;
        staged.as_file().sync_all()?;
        // Dropping the rejected temp file removes it from `dir`.
        staged.persist(&target).map_err(|err| err.error)?;

        tracing::info!(
            path = %target.display(),
            format = %state.format,
            bytes = bytes.len(),
            "card exported"
        );
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ExportFormat;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[test]
    fn sanitizer_strips_illegal_characters_and_extension() {
        assert_eq!(sanitize_file_name("My:Report*.png"), "MyReport");
        assert_eq!(sanitize_file_name("  spring   2026 wrap.PNG "), "spring 2026 wrap");
        assert_eq!(sanitize_file_name("a\u{0007}b<c>d"), "abcd");
    }

    #[test]
    fn sanitizer_falls_back_without_alphanumerics() {
        assert_eq!(sanitize_file_name("   "), DEFAULT_FILE_STEM);
        assert_eq!(sanitize_file_name("..."), DEFAULT_FILE_STEM);
        assert_eq!(sanitize_file_name("???.png"), DEFAULT_FILE_STEM);
        assert_eq!(sanitize_file_name(""), DEFAULT_FILE_STEM);
    }

    #[test]
    fn sanitizer_truncates_to_eighty_characters() {
        let long = "x".repeat(200);
        assert_eq!(sanitize_file_name(&long).chars().count(), 80);
        let accented = "é".repeat(100);
        assert_eq!(sanitize_file_name(&accented), "é".repeat(80));
    }

    struct FailingSurface {
        ready_checked: Cell<bool>,
    }

    impl RenderSurface for FailingSurface {
        fn wait_until_ready(&self) -> Result<(), ExportError> {
            self.ready_checked.set(true);
            Ok(())
        }

        fn render_to_image_bytes(
            &self,
            _scene: &CardScene,
            _width: u32,
            _height: u32,
            _supersample: u32,
        ) -> Result<Vec<u8>, ExportError> {
            Err(ExportError::Rasterize("canvas lost".to_string()))
        }
    }

    /// Records the arguments it was driven with and returns a tiny PNG.
    #[derive(Default)]
    struct RecordingSurface {
        seen: Cell<Option<(u32, u32, u32, u32, u32)>>,
    }

    impl RenderSurface for RecordingSurface {
        fn render_to_image_bytes(
            &self,
            scene: &CardScene,
            width: u32,
            height: u32,
            supersample: u32,
        ) -> Result<Vec<u8>, ExportError> {
            self.seen
                .set(Some((scene.width, scene.height, width, height, supersample)));
            Ok(b"png".to_vec())
        }
    }

    #[test]
    fn surface_is_driven_at_export_size_with_supersampling() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::default();
        state.format = ExportFormat::InstagramStory;
        let pipeline = ExportPipeline::new(RecordingSurface::default());
        let path = pipeline.export(&state, dir.path(), "story").unwrap();
        assert_eq!(path, dir.path().join("story.png"));
        assert_eq!(
            pipeline.surface.seen.get(),
            Some((1080, 1920, 1080, 1920, SUPERSAMPLE))
        );
        assert_eq!(fs::read(&path).unwrap(), b"png");
    }

    #[test]
    fn failed_capture_leaves_no_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ExportPipeline::new(FailingSurface {
            ready_checked: Cell::new(false),
        });
        let err = pipeline
            .export(&AppState::default(), dir.path(), "wrap")
            .unwrap_err();
        assert!(matches!(err, ExportError::Rasterize(_)));
        assert!(pipeline.surface.ready_checked.get());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn failed_rename_removes_staged_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory already holds the target name.
        fs::create_dir(dir.path().join("wrap.png")).unwrap();
        let pipeline = ExportPipeline::new(RecordingSurface::default());
        let err = pipeline
            .export(&AppState::default(), dir.path(), "wrap")
            .unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
        assert!(pipeline.surface.seen.get().is_some());
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("wrap.png")]);
        assert!(dir.path().join("wrap.png").is_dir());
    }

    #[test]
    fn raster_export_writes_png_at_preset_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::default();
        state.template = crate::state::CardTemplate::Classic;
        let path = ExportPipeline::new(RasterSurface)
            .export(&state, dir.path(), "My:Report*.png")
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "MyReport.png");
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1200, 1200));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}

//! PDF page rasterization pipeline
//!
//! Runs an external rasterizer over an uploaded PDF and packages the
//! resulting page images into a single ZIP archive, built fully in memory
//! before any response bytes are produced.
//!
//! The rasterizer is a capability trait so the `pdftoppm` process can be
//! swapped for an in-process renderer without touching pipeline logic.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Converts a PDF into one numbered image file per page under
/// `output_prefix`. The rasterizer's own numbering convention is
/// authoritative for page order.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, input: &Path, output_prefix: &Path) -> Result<()>;
}

/// Rasterizer backed by the `pdftoppm` binary from poppler-utils.
///
/// Invoked as `pdftoppm -png <input> <prefix>`; on success it writes
/// `<prefix>-<page>.png` files with the page number zero-padded to the
/// document's width, so lexicographic filename order is page order.
pub struct PdftoppmRasterizer {
    program: PathBuf,
}

impl PdftoppmRasterizer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

#[async_trait]
impl Rasterizer for PdftoppmRasterizer {
    async fn rasterize(&self, input: &Path, output_prefix: &Path) -> Result<()> {
        let output = tokio::process::Command::new(&self.program)
            .arg("-png")
            .arg(input)
            .arg(output_prefix)
            .output()
            .await
            .map_err(|e| Error::RasterizationFailure {
                reason: format!("failed to launch {}: {}", self.program.display(), e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::RasterizationFailure {
                reason: format!(
                    "{} {}: {}",
                    self.program.display(),
                    output.status,
                    stderr.trim()
                ),
            });
        }

        Ok(())
    }
}

/// Rasterize `pdf_path` and return a ZIP archive of the page images.
///
/// A uniquely named working directory holds the intermediate images; it is
/// removed on every exit path. RAII covers the failure returns, and the
/// explicit close surfaces release failures in the log instead of
/// swallowing them. The uploaded source file belongs to the caller and is
/// not touched here.
pub async fn rasterize_to_archive(rasterizer: &dyn Rasterizer, pdf_path: &Path) -> Result<Vec<u8>> {
    let workdir = tempfile::Builder::new()
        .prefix("pagesmith-raster-")
        .tempdir()?;
    let prefix = workdir.path().join("page");

    tracing::debug!(input = %pdf_path.display(), workdir = %workdir.path().display(), "rasterizing");

    let archive = match rasterizer.rasterize(pdf_path, &prefix).await {
        Ok(()) => build_archive(workdir.path()),
        Err(e) => Err(e),
    };

    if let Err(e) = workdir.close() {
        tracing::warn!(error = %e, "failed to remove rasterizer working directory");
    }

    archive
}

/// Package every file in `dir` into an in-memory deflate ZIP, in filename
/// order.
fn build_archive(dir: &Path) -> Result<Vec<u8>> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    entries.sort();

    if entries.is_empty() {
        tracing::warn!(dir = %dir.display(), "rasterizer produced no page images");
    }

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &entries {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        zip.start_file(name, options)?;
        let data = std::fs::read(path)?;
        zip.write_all(&data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

//! HTTP server: router, multipart handling, and the five operation handlers
//!
//! Each request is self-contained: uploads are read fully out of the
//! multipart body, validated, processed through the pdf/raster modules, and
//! answered with a single attachment response. Nothing is shared or cached
//! across requests.

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::pdf::{assemble, images, parse_page_spec, ImageUpload, SpecMode};
use crate::raster::{rasterize_to_archive, PdftoppmRasterizer, Rasterizer};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handler state. Request documents never live here; only the
/// configuration and the rasterizer capability do.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    rasterizer: Arc<dyn Rasterizer>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let rasterizer = Arc::new(PdftoppmRasterizer::new(config.pdftoppm_path.clone()));
        Self {
            config: Arc::new(config),
            rasterizer,
        }
    }

    /// Swap in a different rasterizer implementation (used by tests).
    pub fn with_rasterizer(config: ServerConfig, rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self {
            config: Arc::new(config),
            rasterizer,
        }
    }
}

// ============================================================================
// Multipart form collection
// ============================================================================

struct UploadedFile {
    field: String,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// A fully read multipart form: file parts and plain text fields.
struct UploadForm {
    files: Vec<UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// All file parts uploaded under `field`, in body order.
    fn files(&self, field: &str) -> Vec<&UploadedFile> {
        self.files.iter().filter(|f| f.field == field).collect()
    }

    /// Exactly one file part under `field`; absent is a validation error.
    fn single_file(&self, field: &str) -> Result<&UploadedFile> {
        self.files(field)
            .into_iter()
            .next()
            .ok_or_else(|| Error::MissingInput {
                reason: "No file uploaded.".to_string(),
            })
    }

    /// A non-blank text field; absent or blank is a validation error.
    fn spec(&self, field: &'static str) -> Result<&str> {
        self.fields
            .get(field)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or(Error::MissingSpec { field })
    }
}

/// Read every part of the multipart body into memory. Parts carrying a
/// filename are treated as file uploads, everything else as text fields.
async fn collect_form(mut multipart: Multipart) -> Result<UploadForm> {
    let mut files = Vec::new();
    let mut fields = HashMap::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if field.file_name().is_some() {
            let content_type = field.content_type().map(|s| s.to_string());
            let data = field.bytes().await?.to_vec();
            files.push(UploadedFile {
                field: name,
                content_type,
                data,
            });
        } else {
            let value = field.text().await?;
            fields.insert(name, value);
        }
    }

    Ok(UploadForm { files, fields })
}

// ============================================================================
// Responses
// ============================================================================

fn attachment(content_type: &'static str, filename: String, bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        bytes,
    )
        .into_response()
}

fn timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Operation handlers
// ============================================================================

/// POST /split — extract the pages named by `range` from the uploaded `pdf`.
async fn process_split(multipart: Multipart) -> Result<Response> {
    let form = collect_form(multipart).await?;
    let file = form.single_file("pdf")?;
    let range = form.spec("range")?;

    let total_pages = assemble::page_count(&file.data)?;
    let indices = parse_page_spec(range, total_pages, SpecMode::UniqueSorted)?;
    tracing::info!(range, total_pages, selected = indices.len(), "splitting PDF");

    let output = assemble::assemble_from_indices(&file.data, &indices)?;
    Ok(attachment(
        "application/pdf",
        format!("split-{}.pdf", timestamp_ms()),
        output,
    ))
}

/// POST /merge — concatenate the uploaded `pdfs` in upload order.
async fn process_merge(multipart: Multipart) -> Result<Response> {
    let form = collect_form(multipart).await?;
    let files = form.files("pdfs");
    if files.len() < 2 {
        return Err(Error::MissingInput {
            reason: "Please upload at least 2 PDF files.".to_string(),
        });
    }

    let inputs: Vec<&[u8]> = files.iter().map(|f| f.data.as_slice()).collect();
    tracing::info!(count = inputs.len(), "merging PDFs");

    let output = assemble::concatenate(&inputs)?;
    Ok(attachment(
        "application/pdf",
        format!("merged-{}.pdf", timestamp_ms()),
        output,
    ))
}

/// POST /image-to-pdf — one page per uploaded image, sized to the image.
async fn process_images(multipart: Multipart) -> Result<Response> {
    let form = collect_form(multipart).await?;
    let files = form.files("images");
    if files.is_empty() {
        return Err(Error::MissingInput {
            reason: "Please upload at least one image.".to_string(),
        });
    }

    let uploads: Vec<ImageUpload> = files
        .into_iter()
        .map(|f| ImageUpload {
            mime_type: f.content_type.clone().unwrap_or_default(),
            data: f.data.clone(),
        })
        .collect();
    tracing::info!(count = uploads.len(), "converting images to PDF");

    let output = images::images_to_pdf(&uploads)?;
    Ok(attachment(
        "application/pdf",
        format!("images-to-pdf-{}.pdf", timestamp_ms()),
        output,
    ))
}

/// POST /rearrange — reorder/duplicate pages of the uploaded `pdf` per
/// `order`.
async fn process_rearrange(multipart: Multipart) -> Result<Response> {
    let form = collect_form(multipart).await?;
    let file = form.single_file("pdf")?;
    let order = form.spec("order")?;

    let total_pages = assemble::page_count(&file.data)?;
    let indices = parse_page_spec(order, total_pages, SpecMode::OrderedDuplicates)?;
    tracing::info!(order, total_pages, placed = indices.len(), "rearranging PDF");

    let output = assemble::assemble_from_indices(&file.data, &indices)?;
    Ok(attachment(
        "application/pdf",
        format!("rearranged-{}.pdf", timestamp_ms()),
        output,
    ))
}

/// POST /pdf-to-image — rasterize every page and answer with a ZIP archive.
///
/// The upload is spooled to a named temp file for the rasterizer process and
/// removed exactly once, whichever way the pipeline ends.
async fn process_pdf_to_images(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response> {
    let form = collect_form(multipart).await?;
    let file = form.single_file("pdf")?;

    let upload = tempfile::Builder::new()
        .prefix("pagesmith-upload-")
        .suffix(".pdf")
        .tempfile()?;
    std::fs::write(upload.path(), &file.data)?;
    tracing::info!(bytes = file.data.len(), "rasterizing PDF to images");

    let result = rasterize_to_archive(state.rasterizer.as_ref(), upload.path()).await;
    if let Err(e) = upload.close() {
        tracing::warn!(error = %e, "failed to remove uploaded file");
    }
    let archive = result?;

    Ok(attachment(
        "application/zip",
        "converted-images.zip".to_string(),
        archive,
    ))
}

// ============================================================================
// Router / entry points
// ============================================================================

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/health", get(health))
        .route("/split", post(process_split))
        .route("/merge", post(process_merge))
        .route("/image-to-pdf", post(process_images))
        .route("/rearrange", post(process_rearrange))
        .route("/pdf-to-image", post(process_pdf_to_images))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the server with configuration taken from the environment.
pub async fn run_server() -> anyhow::Result<()> {
    run_server_with_config(ServerConfig::from_env()).await
}

/// Run the server with an explicit configuration.
pub async fn run_server_with_config(config: ServerConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let app = router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Pagesmith listening");
    axum::serve(listener, app).await?;
    Ok(())
}

//! Pagesmith Library
//!
//! This crate provides the PDF page-operations web service:
//! - `/split`: extract a page range from a PDF
//! - `/merge`: concatenate uploaded PDFs
//! - `/image-to-pdf`: build a PDF from uploaded images
//! - `/rearrange`: reorder or duplicate pages
//! - `/pdf-to-image`: rasterize pages into a ZIP archive

pub mod config;
pub mod error;
pub mod pdf;
pub mod raster;
pub mod server;

pub use config::ServerConfig;
pub use error::{Error, Result};
pub use server::{router, run_server, run_server_with_config, AppState};

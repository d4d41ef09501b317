//! Error types for Pagesmith

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Result type alias for Pagesmith
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Pagesmith
#[derive(Error, Debug)]
pub enum Error {
    /// Required upload absent, or fewer files than the operation needs
    #[error("{reason}")]
    MissingInput { reason: String },

    /// Required form field (range/order) absent or blank
    #[error("Missing form field: {field}")]
    MissingSpec { field: &'static str },

    /// Range spec present but resolved to zero usable pages
    #[error("Invalid page range: {spec}")]
    InvalidRange { spec: String },

    /// Order spec present but resolved to zero usable pages
    #[error("Invalid page order: {spec}")]
    InvalidOrder { spec: String },

    /// Source PDF failed to load
    #[error("Failed to load PDF: {reason}")]
    CorruptDocument { reason: String },

    /// Page copy or document serialization failed
    #[error("Failed to assemble PDF: {reason}")]
    AssemblyFailure { reason: String },

    /// A supported image type failed to decode
    #[error("Failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// External rasterizer failed to launch or exited non-zero
    #[error("Rasterization failed: {reason}")]
    RasterizationFailure { reason: String },

    /// Archive build failure
    #[error("Failed to build archive: {0}")]
    Packaging(#[from] zip::result::ZipError),

    /// Malformed multipart request body
    #[error("Failed to read upload: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status classification: input-validation errors are the client's
    /// fault; everything arising from the document model, the rasterizer
    /// process, or the filesystem is a server error.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::MissingInput { .. }
            | Error::MissingSpec { .. }
            | Error::InvalidRange { .. }
            | Error::InvalidOrder { .. }
            | Error::Multipart(_) => StatusCode::BAD_REQUEST,
            Error::CorruptDocument { .. }
            | Error::AssemblyFailure { .. }
            | Error::ImageDecode(_)
            | Error::RasterizationFailure { .. }
            | Error::Packaging(_)
            | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    /// Every failure is a single non-2xx `text/plain` response. The cause
    /// text is included in the body (internal-tool policy); server-class
    /// causes are logged with full detail before the response is built.
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "rejected request");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_client_class() {
        let errors = [
            Error::MissingInput {
                reason: "No file uploaded.".to_string(),
            },
            Error::MissingSpec { field: "range" },
            Error::InvalidRange {
                spec: "99".to_string(),
            },
            Error::InvalidOrder {
                spec: "x,y".to_string(),
            },
        ];
        for err in errors {
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn processing_errors_are_server_class() {
        let errors = [
            Error::CorruptDocument {
                reason: "bad xref".to_string(),
            },
            Error::AssemblyFailure {
                reason: "write failed".to_string(),
            },
            Error::RasterizationFailure {
                reason: "exit status 1".to_string(),
            },
        ];
        for err in errors {
            assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

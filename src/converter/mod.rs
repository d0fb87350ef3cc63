//! Converters - turn an HTML string plus options into PDF bytes.
//!
//! The crate never interprets the options; they are handed to the converter
//! as-is. `NodeConverter` is the production implementation, driving a
//! headless-Chrome script through a child process.

pub mod node;

pub use node::NodeConverter;

use serde_json::{Map, Value};
use thiserror::Error;

/// Converter options keyed by the converter's own option names
/// (`format`, `landscape`, `margin`, `headerTemplate`, ...).
pub type PdfOptions = Map<String, Value>;

/// Errors that can occur while producing a PDF.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("failed to start converter process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("failed to communicate with converter process: {0}")]
    Io(#[source] std::io::Error),
    #[error("failed to encode converter input: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("converter exited with status {code}: {stderr}")]
    Exit { code: i32, stderr: String },
    #[error("converter output is not valid base64: {0}")]
    Decode(#[source] base64::DecodeError),
    #[error("converter produced no output")]
    EmptyOutput,
}

/// The external HTML-to-PDF collaborator.
pub trait Converter: Send + Sync {
    /// Convert `html` to PDF bytes using `options`.
    fn convert(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, ConversionError>;
}

impl actix_web::ResponseError for ConversionError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        actix_web::HttpResponse::InternalServerError()
            .json(crate::ErrorResponse::new("ConversionFailed", &self.to_string()))
    }
}

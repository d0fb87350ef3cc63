//! PDF document builder and responder.
//!
//! A `Pdf` collects the HTML payload and converter options for one document,
//! then converts them and wraps the bytes in an `HttpResponse`. Converting
//! consumes the builder; clone it first to produce more than one response,
//! in which case the converter runs again for each.
//!
//! ```ignore
//! let response = factory
//!     .pdf()
//!     .load_view("invoice", json!({"id": 42}), Value::Null)?
//!     .set_option("format", "A4")
//!     .download("invoice-42.pdf")?;
//! ```

use std::fmt;
use std::sync::Arc;

use actix_web::{
    body::BoxBody,
    http::{header, StatusCode},
    HttpRequest, HttpResponse, Responder, ResponseError,
};
use log::{debug, info, warn};
use serde_json::Value;

use crate::converter::{ConversionError, Converter, PdfOptions};
use crate::view::{TemplateRenderError, ViewFactory};

pub const DEFAULT_FILENAME: &str = "document.pdf";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// How the browser should treat the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Inline => f.write_str("inline"),
            Disposition::Attachment => f.write_str("attachment"),
        }
    }
}

/// Strip characters that would break the quoted header value or act as a
/// path, falling back to `document.pdf` when nothing is left.
pub fn pdf_filename(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .filter(|c| !matches!(*c, '"' | '\\' | '/') && !c.is_control())
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Build the `Content-Disposition` value, e.g. `inline; filename="report.pdf"`.
pub fn content_disposition(disposition: Disposition, filename: &str) -> String {
    format!("{}; filename=\"{}\"", disposition, pdf_filename(filename))
}

#[derive(Clone)]
pub struct Pdf {
    views: Arc<dyn ViewFactory>,
    converter: Arc<dyn Converter>,
    html: String,
    options: PdfOptions,
}

impl Pdf {
    pub fn new(views: Arc<dyn ViewFactory>, converter: Arc<dyn Converter>) -> Self {
        Self {
            views,
            converter,
            html: String::new(),
            options: PdfOptions::new(),
        }
    }

    /// Render `view` and use the result as the document content.
    pub fn load_view(
        mut self,
        view: &str,
        data: Value,
        merge_data: Value,
    ) -> Result<Self, TemplateRenderError> {
        self.html = self.views.render(view, &data, &merge_data)?;
        Ok(self)
    }

    /// Use raw HTML as the document content.
    pub fn load_html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }

    pub fn set_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn set_options<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        for (key, value) in options {
            self.options.insert(key, value);
        }
        self
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn options(&self) -> &PdfOptions {
        &self.options
    }

    /// Response that displays the PDF in the browser.
    pub fn inline(self, filename: &str) -> Result<HttpResponse, ConversionError> {
        self.inline_with_status(filename, StatusCode::OK)
    }

    pub fn inline_with_status(
        self,
        filename: &str,
        status: StatusCode,
    ) -> Result<HttpResponse, ConversionError> {
        self.respond(Disposition::Inline, filename, status)
    }

    /// Response that makes the browser download the PDF.
    pub fn download(self, filename: &str) -> Result<HttpResponse, ConversionError> {
        self.download_with_status(filename, StatusCode::OK)
    }

    pub fn download_with_status(
        self,
        filename: &str,
        status: StatusCode,
    ) -> Result<HttpResponse, ConversionError> {
        self.respond(Disposition::Attachment, filename, status)
    }

    /// Convert without building a response.
    pub fn output(self) -> Result<Vec<u8>, ConversionError> {
        if self.html.is_empty() {
            warn!("Converting a PDF with no content; output is up to the converter");
        }
        debug!("PDF options: {:?}", self.options);
        self.converter.convert(&self.html, &self.options)
    }

    fn respond(
        self,
        disposition: Disposition,
        filename: &str,
        status: StatusCode,
    ) -> Result<HttpResponse, ConversionError> {
        info!("Generating {} PDF response for '{}'", disposition, filename);
        let pdf = self.output()?;
        Ok(pdf_response(pdf, disposition, filename, status))
    }
}

/// Wrap converted bytes in a PDF response.
pub fn pdf_response(
    body: Vec<u8>,
    disposition: Disposition,
    filename: &str,
    status: StatusCode,
) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(PDF_CONTENT_TYPE)
        .insert_header((
            header::CONTENT_DISPOSITION,
            content_disposition(disposition, filename),
        ))
        .body(body)
}

/// Returning a `Pdf` from a handler displays it inline as `document.pdf`.
///
/// The conversion runs inside `respond_to`, on the calling worker thread.
/// Async handlers that cannot afford to block should convert through
/// `web::block` and `pdf_response` instead.
impl Responder for Pdf {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        match self.inline(DEFAULT_FILENAME) {
            Ok(response) => response,
            Err(e) => e.error_response(),
        }
    }
}

//! HTTP endpoints that expose the PDF builder.
//!
//! Conversion blocks on the converter process, so it runs on the blocking
//! thread pool via `web::block`.

use actix_web::{http::StatusCode, web, HttpResponse, Responder, ResponseError};
use log::{error, info};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::converter::PdfOptions;
use crate::pdf::{pdf_response, Disposition, Pdf, DEFAULT_FILENAME};
use crate::state::PdfFactory;
use crate::ErrorResponse;

#[derive(Debug, Deserialize, ToSchema)]
pub struct HtmlPdfRequest {
    /// Raw HTML to convert.
    pub html: String,
    /// Converter options, passed through untouched.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub options: PdfOptions,
    #[serde(default)]
    pub filename: Option<String>,
    /// Send as an attachment instead of inline.
    #[serde(default)]
    pub download: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ViewPdfRequest {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: Value,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub merge_data: Value,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub options: PdfOptions,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub download: bool,
}

async fn deliver(pdf: Pdf, filename: Option<String>, download: bool) -> HttpResponse {
    let filename = filename.unwrap_or_else(|| DEFAULT_FILENAME.to_string());
    let disposition = if download {
        Disposition::Attachment
    } else {
        Disposition::Inline
    };

    match web::block(move || pdf.output()).await {
        Ok(Ok(bytes)) => {
            info!("Serving {} byte PDF as {} '{}'", bytes.len(), disposition, filename);
            pdf_response(bytes, disposition, &filename, StatusCode::OK)
        }
        Ok(Err(e)) => {
            error!("PDF conversion failed: {}", e);
            e.error_response()
        }
        Err(e) => {
            error!("PDF conversion task failed: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("PDF conversion task failed"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "PDF",
    post,
    path = "/pdf/html",
    request_body = HtmlPdfRequest,
    responses(
        (status = 200, description = "PDF document"),
        (status = 500, description = "Conversion failed", body = ErrorResponse)
    )
)]
pub async fn render_html(
    factory: web::Data<PdfFactory>,
    body: web::Json<HtmlPdfRequest>,
) -> impl Responder {
    let request = body.into_inner();
    info!("Executing render_html handler ({} bytes)", request.html.len());

    let pdf = factory
        .pdf()
        .load_html(request.html)
        .set_options(request.options);

    deliver(pdf, request.filename, request.download).await
}

#[utoipa::path(
    context_path = "/api",
    tag = "PDF",
    post,
    path = "/pdf/views/{view}",
    params(
        ("view" = String, Path, description = "View name in dot notation, e.g. emails.welcome")
    ),
    request_body = ViewPdfRequest,
    responses(
        (status = 200, description = "PDF document"),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 404, description = "View not found", body = ErrorResponse),
        (status = 422, description = "View could not be rendered", body = ErrorResponse),
        (status = 500, description = "Conversion failed", body = ErrorResponse)
    )
)]
pub async fn render_view(
    factory: web::Data<PdfFactory>,
    path: web::Path<String>,
    body: web::Bytes,
) -> impl Responder {
    let view = path.into_inner();
    info!("Executing render_view handler for view: {}", view);

    // An empty body renders the view with no data; anything else must parse.
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ViewPdfRequest::default()
    } else {
        match serde_json::from_slice::<ViewPdfRequest>(&body) {
            Ok(request) => request,
            Err(e) => {
                error!("Invalid request body for view '{}': {}", view, e);
                return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!(
                    "Invalid request body: {}",
                    e
                )));
            }
        }
    };

    let pdf = match factory
        .pdf()
        .load_view(&view, request.data, request.merge_data)
    {
        Ok(pdf) => pdf.set_options(request.options),
        Err(e) => {
            error!("Failed to render view '{}': {}", view, e);
            return e.error_response();
        }
    };

    deliver(pdf, request.filename, request.download).await
}

#[utoipa::path(
    context_path = "/api",
    tag = "PDF",
    get,
    path = "/pdf/views/{view}",
    params(
        ("view" = String, Path, description = "View name in dot notation")
    ),
    responses(
        (status = 200, description = "PDF document shown inline as document.pdf"),
        (status = 404, description = "View not found", body = ErrorResponse),
        (status = 422, description = "View could not be rendered", body = ErrorResponse),
        (status = 500, description = "Conversion failed", body = ErrorResponse)
    )
)]
pub async fn show_view(
    factory: web::Data<PdfFactory>,
    path: web::Path<String>,
) -> impl Responder {
    let view = path.into_inner();
    info!("Executing show_view handler for view: {}", view);

    match factory.pdf().load_view(&view, Value::Null, Value::Null) {
        Ok(pdf) => deliver(pdf, None, false).await,
        Err(e) => {
            error!("Failed to render view '{}': {}", view, e);
            e.error_response()
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/pdf/html").route(web::post().to(render_html)))
        .service(
            web::resource("/pdf/views/{view}")
                .route(web::get().to(show_view))
                .route(web::post().to(render_view)),
        );
}

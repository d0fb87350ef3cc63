//! Generate PDF responses for actix-web from Tera views or raw HTML.
//!
//! Conversion is delegated to an external process. The default
//! `NodeConverter` runs `node ./node/converter.js`, which ships with the
//! repository and needs its Puppeteer dependency installed first
//! (`npm install --prefix node`). Point `CHROME_PDF_NODE_BINARY` and
//! `CHROME_PDF_CONVERTER_SCRIPT` at another program that reads
//! `{"html", "options"}` JSON on stdin and prints base64 PDF on stdout to
//! replace it.

use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod converter;
pub mod handlers;
pub mod pdf;
pub mod state;
pub mod view;

pub use crate::config::PdfConfig;
pub use crate::converter::{ConversionError, Converter, NodeConverter, PdfOptions};
pub use crate::pdf::{Disposition, Pdf, DEFAULT_FILENAME};
pub use crate::state::PdfFactory;
pub use crate::view::{TemplateRenderError, TeraViewFactory, ViewFactory};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::render_html,
        crate::handlers::render_view,
        crate::handlers::show_view
    ),
    components(schemas(
        handlers::HtmlPdfRequest,
        handlers::ViewPdfRequest,
        ErrorResponse
    )),
    tags(
        (name = "PDF", description = "HTML and view to PDF endpoints.")
    )
)]
pub struct ApiDoc;

pub async fn run() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match PdfConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let factory = match PdfFactory::from_config(&config) {
        Ok(factory) => web::Data::new(factory),
        Err(e) => {
            log::error!(
                "Failed to load views from {}. Error: {}",
                config.views_dir.display(),
                e
            );
            std::process::exit(1);
        }
    };

    let prometheus = PrometheusMetricsBuilder::new("chrome_pdf")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    log::info!(
        "Starting server at http://{}:{} (converter: {} {})",
        config.bind_addr,
        config.port,
        config.node_binary,
        config.converter_script.display()
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .expose_headers(vec![header::CONTENT_DISPOSITION])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors)
            .app_data(factory.clone())
            .service(web::scope("/api").configure(handlers::config))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}

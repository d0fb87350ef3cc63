//! Views - named HTML templates rendered with Tera.
//!
//! View names use dot notation relative to the views directory, so
//! `emails.welcome` resolves to `emails/welcome.html`.

use std::path::Path;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::debug;
use serde_json::{Map, Value};
use tera::{Context, Tera};
use thiserror::Error;

use crate::ErrorResponse;

const VIEW_EXTENSION: &str = ".html";

#[derive(Debug, Error)]
pub enum TemplateRenderError {
    #[error("view '{0}' not found")]
    NotFound(String),
    #[error("failed to render view '{view}': {message}")]
    Render { view: String, message: String },
    #[error("failed to load views: {0}")]
    Load(String),
    #[error("data for view '{0}' must be a JSON object")]
    InvalidData(String),
}

impl ResponseError for TemplateRenderError {
    fn status_code(&self) -> StatusCode {
        match self {
            TemplateRenderError::NotFound(_) => StatusCode::NOT_FOUND,
            TemplateRenderError::Render { .. } | TemplateRenderError::InvalidData(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            TemplateRenderError::Load(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            TemplateRenderError::NotFound(_) => ErrorResponse::not_found(&self.to_string()),
            TemplateRenderError::Load(_) => ErrorResponse::internal_error(&self.to_string()),
            _ => ErrorResponse::new("UnprocessableEntity", &self.to_string()),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// The templating collaborator.
pub trait ViewFactory: Send + Sync {
    /// Render `view` with `data` layered over `merge_data`.
    fn render(&self, view: &str, data: &Value, merge_data: &Value)
        -> Result<String, TemplateRenderError>;

    fn exists(&self, view: &str) -> bool;
}

/// Convert a dotted view name to the template file name.
pub fn view_path(view: &str) -> String {
    let trimmed = view.trim().trim_end_matches(VIEW_EXTENSION);
    format!("{}{}", trimmed.replace('.', "/"), VIEW_EXTENSION)
}

pub struct TeraViewFactory {
    tera: Tera,
    shared: Map<String, Value>,
}

impl TeraViewFactory {
    /// Load every `*.html` file below `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, TemplateRenderError> {
        let glob = dir.as_ref().join("**").join("*.html");
        let tera = Tera::new(&glob.to_string_lossy())
            .map_err(|e| TemplateRenderError::Load(error_chain(&e)))?;
        debug!(
            "Loaded {} views from {}",
            tera.get_template_names().count(),
            dir.as_ref().display()
        );
        Ok(Self {
            tera,
            shared: Map::new(),
        })
    }

    /// Build a factory from in-memory templates keyed by file name
    /// (e.g. `invoice.html`).
    pub fn from_templates<I, N, C>(templates: I) -> Result<Self, TemplateRenderError>
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        let mut tera = Tera::default();
        let templates: Vec<(String, String)> = templates
            .into_iter()
            .map(|(n, c)| (n.as_ref().to_string(), c.as_ref().to_string()))
            .collect();
        tera.add_raw_templates(templates)
            .map_err(|e| TemplateRenderError::Load(error_chain(&e)))?;
        Ok(Self {
            tera,
            shared: Map::new(),
        })
    }

    /// Make `value` available to every view under `key`.
    pub fn share(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.shared.insert(key.into(), value.into());
        self
    }

    fn build_context(
        &self,
        view: &str,
        data: &Value,
        merge_data: &Value,
    ) -> Result<Context, TemplateRenderError> {
        let mut merged = self.shared.clone();
        for layer in [merge_data, data] {
            match layer {
                Value::Null => {}
                Value::Object(map) => {
                    for (key, value) in map {
                        merged.insert(key.clone(), value.clone());
                    }
                }
                _ => return Err(TemplateRenderError::InvalidData(view.to_string())),
            }
        }

        Context::from_value(Value::Object(merged))
            .map_err(|_| TemplateRenderError::InvalidData(view.to_string()))
    }
}

impl ViewFactory for TeraViewFactory {
    fn render(
        &self,
        view: &str,
        data: &Value,
        merge_data: &Value,
    ) -> Result<String, TemplateRenderError> {
        if !self.exists(view) {
            return Err(TemplateRenderError::NotFound(view.to_string()));
        }

        let context = self.build_context(view, data, merge_data)?;
        let html = self
            .tera
            .render(&view_path(view), &context)
            .map_err(|e| TemplateRenderError::Render {
                view: view.to_string(),
                message: error_chain(&e),
            })?;

        debug!("Rendered view '{}' ({} bytes)", view, html.len());
        Ok(html)
    }

    fn exists(&self, view: &str) -> bool {
        let name = view_path(view);
        self.tera.get_template_names().any(|n| n == name)
    }
}

/// Tera nests the useful detail in the error's sources.
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    message
}

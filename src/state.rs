//! Shared application state that hands out a fresh `Pdf` per request.

use std::sync::Arc;

use crate::config::PdfConfig;
use crate::converter::{Converter, NodeConverter, PdfOptions};
use crate::pdf::Pdf;
use crate::view::{TeraViewFactory, TemplateRenderError, ViewFactory};

#[derive(Clone)]
pub struct PdfFactory {
    views: Arc<dyn ViewFactory>,
    converter: Arc<dyn Converter>,
    default_options: PdfOptions,
}

impl PdfFactory {
    pub fn new(views: Arc<dyn ViewFactory>, converter: Arc<dyn Converter>) -> Self {
        Self {
            views,
            converter,
            default_options: PdfOptions::new(),
        }
    }

    /// Views from `config.views_dir`, converter from the configured Node script.
    pub fn from_config(config: &PdfConfig) -> Result<Self, TemplateRenderError> {
        let views = TeraViewFactory::from_dir(&config.views_dir)?;
        let converter = NodeConverter::from_config(config);
        Ok(Self::new(Arc::new(views), Arc::new(converter))
            .with_default_options(config.default_options.clone()))
    }

    pub fn with_default_options(mut self, options: PdfOptions) -> Self {
        self.default_options = options;
        self
    }

    /// A new builder seeded with the default options.
    pub fn pdf(&self) -> Pdf {
        Pdf::new(self.views.clone(), self.converter.clone())
            .set_options(self.default_options.clone())
    }
}

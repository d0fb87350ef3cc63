#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrome_pdf::{ConversionError, Converter, PdfFactory, PdfOptions, TeraViewFactory};

/// Records every conversion and answers with `%PDF-fake:<html>`.
#[derive(Default)]
pub struct RecordingConverter {
    calls: Mutex<Vec<(String, PdfOptions)>>,
}

impl RecordingConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(String, PdfOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Converter for RecordingConverter {
    fn convert(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, ConversionError> {
        self.calls
            .lock()
            .unwrap()
            .push((html.to_string(), options.clone()));
        Ok(format!("%PDF-fake:{}", html).into_bytes())
    }
}

/// Always fails the way a crashed renderer does.
pub struct FailingConverter;

impl Converter for FailingConverter {
    fn convert(&self, _html: &str, _options: &PdfOptions) -> Result<Vec<u8>, ConversionError> {
        Err(ConversionError::Exit {
            code: 1,
            stderr: "renderer crashed".to_string(),
        })
    }
}

pub fn test_views() -> TeraViewFactory {
    TeraViewFactory::from_templates([
        ("invoice.html", "<html>Invoice #{{ id }}</html>"),
        ("reports/summary.html", "<h1>{{ title }}</h1><p>{{ author }}</p>"),
        ("broken.html", "{{ undefined_value }}"),
        ("cover.html", "<h1>Cover</h1>"),
    ])
    .expect("test views should parse")
}

pub fn recording_factory() -> (PdfFactory, Arc<RecordingConverter>) {
    let converter = Arc::new(RecordingConverter::new());
    let factory = PdfFactory::new(Arc::new(test_views()), converter.clone());
    (factory, converter)
}

pub fn failing_factory() -> PdfFactory {
    PdfFactory::new(Arc::new(test_views()), Arc::new(FailingConverter))
}

mod common;

use actix_web::{
    body::to_bytes,
    http::{header, StatusCode},
    test::TestRequest,
    Responder,
};
use chrome_pdf::{PdfOptions, TemplateRenderError, DEFAULT_FILENAME};
use serde_json::{json, Value};

use common::{failing_factory, recording_factory};

fn header_str(response: &actix_web::HttpResponse, name: header::HeaderName) -> String {
    response
        .headers()
        .get(name)
        .expect("header should be set")
        .to_str()
        .unwrap()
        .to_string()
}

#[actix_web::test]
async fn test_invoice_download_end_to_end() {
    let (factory, converter) = recording_factory();

    let response = factory
        .pdf()
        .load_view("invoice", json!({"id": 42}), Value::Null)
        .unwrap()
        .set_option("format", "A4")
        .download("invoice-42.pdf")
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "application/pdf");
    assert_eq!(
        header_str(&response, header::CONTENT_DISPOSITION),
        "attachment; filename=\"invoice-42.pdf\""
    );

    let calls = converter.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "<html>Invoice #42</html>");
    assert_eq!(calls[0].1.len(), 1);
    assert_eq!(calls[0].1["format"], "A4");

    let body = to_bytes(response.into_body()).await.unwrap();
    assert_eq!(&body[..], b"%PDF-fake:<html>Invoice #42</html>");
}

#[actix_web::test]
async fn test_inline_defaults() {
    let (factory, _) = recording_factory();
    let response = factory.pdf().load_html("<p>x</p>").inline(DEFAULT_FILENAME).unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, header::CONTENT_DISPOSITION),
        "inline; filename=\"document.pdf\""
    );
}

#[test]
fn test_inline_and_download_differ_only_in_disposition() {
    let (factory, _) = recording_factory();
    let pdf = factory.pdf().load_html("<p>same</p>");

    let inline = pdf.clone().inline("report.pdf").unwrap();
    let download = pdf.download("report.pdf").unwrap();

    assert_eq!(inline.status(), download.status());
    assert_eq!(
        header_str(&inline, header::CONTENT_TYPE),
        header_str(&download, header::CONTENT_TYPE)
    );
    assert_eq!(
        header_str(&inline, header::CONTENT_DISPOSITION),
        "inline; filename=\"report.pdf\""
    );
    assert_eq!(
        header_str(&download, header::CONTENT_DISPOSITION),
        "attachment; filename=\"report.pdf\""
    );
}

#[test]
fn test_options_survive_content_changes() {
    let (factory, converter) = recording_factory();

    let mut margins = PdfOptions::new();
    margins.insert("margin".to_string(), json!({"top": "1cm"}));
    margins.insert("landscape".to_string(), json!(true));

    factory
        .pdf()
        .set_option("landscape", false)
        .load_html("first")
        .set_options(margins)
        .load_view("invoice", json!({"id": 7}), Value::Null)
        .unwrap()
        .set_option("scale", 0.8)
        .load_html("last")
        .inline("x.pdf")
        .unwrap();

    let (html, options) = &converter.calls()[0];
    assert_eq!(html, "last");
    assert_eq!(options["landscape"], true);
    assert_eq!(options["margin"]["top"], "1cm");
    assert_eq!(options["scale"], 0.8);
}

#[test]
fn test_merge_data_is_overridden_by_data() {
    let (factory, _) = recording_factory();
    let pdf = factory
        .pdf()
        .load_view(
            "reports.summary",
            json!({"title": "Q3"}),
            json!({"title": "ignored", "author": "Finance"}),
        )
        .unwrap();
    assert_eq!(pdf.html(), "<h1>Q3</h1><p>Finance</p>");
}

#[test]
fn test_template_errors_pass_through() {
    let (factory, converter) = recording_factory();

    let missing = factory.pdf().load_view("missing", Value::Null, Value::Null);
    assert!(matches!(missing, Err(TemplateRenderError::NotFound(_))));

    let broken = factory.pdf().load_view("broken", Value::Null, Value::Null);
    assert!(matches!(broken, Err(TemplateRenderError::Render { .. })));

    assert!(converter.calls().is_empty());
}

#[test]
fn test_conversion_error_passes_through() {
    let err = failing_factory()
        .pdf()
        .load_html("<p>x</p>")
        .download("x.pdf")
        .unwrap_err();
    assert!(err.to_string().contains("renderer crashed"));
}

#[actix_web::test]
async fn test_responder_uses_inline_defaults() {
    let (factory, converter) = recording_factory();
    let req = TestRequest::default().to_http_request();

    let response = factory.pdf().load_html("<p>hook</p>").respond_to(&req);

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, header::CONTENT_DISPOSITION),
        "inline; filename=\"document.pdf\""
    );
    assert_eq!(converter.calls().len(), 1);
}

#[actix_web::test]
async fn test_responder_turns_conversion_failure_into_500() {
    let req = TestRequest::default().to_http_request();
    let response = failing_factory().pdf().load_html("<p>x</p>").respond_to(&req);

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = to_bytes(response.into_body()).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "ConversionFailed");
}

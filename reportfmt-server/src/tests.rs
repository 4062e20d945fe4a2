//! HTTP surface tests.
//!
//! Requests are driven through the router with `tower::ServiceExt`, no
//! socket involved. Fixtures are fabricated in memory the same way the
//! core pipeline tests build theirs.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use reportfmt_core::rules::Validator;
use reportfmt_core::{DocxPackage, StyleConfig};

use crate::router;
use crate::state::AppState;

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const BOUNDARY: &str = "reportfmt-test-boundary";

fn app(strict: bool) -> axum::Router {
    let state = AppState::new(StyleConfig::default(), strict).unwrap();
    router(Arc::new(state))
}

fn document_xml(body: &str) -> String {
    format!(r#"<w:document xmlns:w="{WML_NS}"><w:body>{body}</w:body></w:document>"#)
}

fn paragraph(text: &str) -> String {
    if text.is_empty() {
        "<w:p/>".to_string()
    } else {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }
}

/// A report the pipeline can format into full compliance.
fn formattable_docx() -> Vec<u8> {
    let body = format!(
        "{}{}{}{}{}",
        paragraph("ACME MINING CORP. (formerly Beta Resources Inc.)"),
        paragraph("Condensed Interim Financial Statements"),
        paragraph("September 30, 2025"),
        paragraph("(Unaudited - expressed in Canadian dollars)"),
        "<w:tbl><w:tblPr/><w:tblGrid>\
         <w:gridCol w:w=\"9000\"/><w:gridCol w:w=\"9000\"/>\
         <w:gridCol w:w=\"9000\"/><w:gridCol w:w=\"9000\"/></w:tblGrid>\
         <w:tr><w:tc><w:p><w:r><w:t>Description</w:t></w:r></w:p></w:tc>\
         <w:tc><w:p><w:r><w:t>Notes</w:t></w:r></w:p></w:tc>\
         <w:tc><w:p><w:r><w:t>Sep 2025</w:t></w:r></w:p></w:tc>\
         <w:tc><w:p><w:r><w:t>Sep 2024</w:t></w:r></w:p></w:tc></w:tr>\
         <w:tr><w:tc><w:p><w:r><w:t>Cash</w:t></w:r></w:p></w:tc>\
         <w:tc><w:p><w:r><w:t>4</w:t></w:r></w:p></w:tc>\
         <w:tc><w:p><w:r><w:t>1,200</w:t></w:r></w:p></w:tc>\
         <w:tc><w:p><w:r><w:t>900</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"
    );
    DocxPackage::from_document_xml(&document_xml(&body))
        .unwrap()
        .to_bytes()
        .unwrap()
}

/// A report with no title line anywhere — validation must fail.
fn untitled_docx() -> Vec<u8> {
    let body = format!("{}{}", paragraph("September 30, 2025"), paragraph("(Unaudited)"));
    DocxPackage::from_document_xml(&document_xml(&body))
        .unwrap()
        .to_bytes()
        .unwrap()
}

fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(field: &str, filename: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process-document")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, filename, data)))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

#[tokio::test]
async fn health_returns_ok() {
    let response = app(false)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"OK");
}

#[tokio::test]
async fn upload_is_processed_and_returned_compliant() {
    let response = app(false)
        .oneshot(upload_request("file", "q3_report.docx", &formattable_docx()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("q3_report_processed.docx"));

    // the returned bytes are a compliant report
    let bytes = body_bytes(response).await;
    let package = DocxPackage::from_bytes(&bytes).unwrap();
    let config = StyleConfig::default();
    let report = Validator::new(&config).validate(&package.document);
    assert!(report.pass, "returned issues: {:#?}", report.issues);
}

#[tokio::test]
async fn non_docx_filename_is_rejected() {
    let response = app(false)
        .oneshot(upload_request("file", "report.pdf", b"%PDF-1.4"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value =
        serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body["error"].as_str().unwrap().contains("unsupported file type"));
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let response = app(false)
        .oneshot(upload_request("attachment", "report.docx", b"data"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unreadable_package_is_a_load_error() {
    let response = app(false)
        .oneshot(upload_request("file", "report.docx", b"plainly not a zip"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn strict_mode_rejects_noncompliant_report_with_issue_list() {
    let response = app(true)
        .oneshot(upload_request("file", "untitled.docx", &untitled_docx()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: serde_json::Value =
        serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["pass"], false);
    let issues = body["issues"].as_array().unwrap();
    assert!(issues
        .iter()
        .any(|i| i["rule"] == "cover-title-present"));
}

#[tokio::test]
async fn strict_mode_still_returns_compliant_reports() {
    let response = app(true)
        .oneshot(upload_request("file", "q3_report.docx", &formattable_docx()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn diagnostic_mode_returns_noncompliant_artifact() {
    let response = app(false)
        .oneshot(upload_request("file", "untitled.docx", &untitled_docx()))
        .await
        .unwrap();
    // the artifact comes back for visual diagnosis
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body_bytes(response).await;
    assert!(DocxPackage::from_bytes(&bytes).is_ok());
}

#[tokio::test]
async fn five_column_table_maps_to_unprocessable() {
    let body = format!(
        "{}{}",
        paragraph("ACME CORP"),
        "<w:tbl><w:tblPr/><w:tblGrid>\
         <w:gridCol w:w=\"1\"/><w:gridCol w:w=\"1\"/><w:gridCol w:w=\"1\"/>\
         <w:gridCol w:w=\"1\"/><w:gridCol w:w=\"1\"/></w:tblGrid>\
         <w:tr><w:tc><w:p/></w:tc><w:tc><w:p/></w:tc><w:tc><w:p/></w:tc>\
         <w:tc><w:p/></w:tc><w:tc><w:p/></w:tc></w:tr></w:tbl>"
    );
    let bytes = DocxPackage::from_document_xml(&document_xml(&body))
        .unwrap()
        .to_bytes()
        .unwrap();

    let response = app(false)
        .oneshot(upload_request("file", "wide.docx", &bytes))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

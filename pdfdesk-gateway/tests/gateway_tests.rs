//! Gateway tests against an in-process mock of the processing service

use axum::{
    extract::{DefaultBodyLimit, Json, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use pdfdesk::cv::CvProfile;
use pdfdesk::library::StoredFile;
use pdfdesk::operations::{OperationKind, RotationAngle};
use pdfdesk::{DocumentHandle, OperationOptions, WorkflowStatus};
use pdfdesk_gateway::{GatewayError, GatewayOutcome, HttpGateway, ToolSession};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const TOKEN: &str = "test-token";
const RESULT_PDF: &[u8] = b"%PDF-1.7\n1 0 obj << >> endobj\n%%EOF";

#[derive(Debug, Clone, PartialEq)]
struct Recorded {
    path: String,
    auth: Option<String>,
    fields: Vec<(String, String)>,
}

#[derive(Clone, Default)]
struct Mock {
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Mock {
    fn record(&self, path: &str, headers: &HeaderMap, fields: Vec<(String, String)>) {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push(Recorded {
            path: path.to_string(),
            auth,
            fields,
        });
    }

    fn last(&self, path: &str) -> Recorded {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.path == path)
            .cloned()
            .unwrap_or_else(|| panic!("no request to {path}"))
    }
}

/// Text fields verbatim, file fields as `name (len bytes)`
async fn read_fields(mut multipart: Multipart) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.unwrap();
        let value = match file_name {
            Some(file_name) => format!("{file_name} ({} bytes)", data.len()),
            None => String::from_utf8_lossy(&data).into_owned(),
        };
        fields.push((name, value));
    }
    fields
}

fn pdf_response(disposition: Option<&str>, body: &'static [u8]) -> Response {
    let mut response = (StatusCode::OK, body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, "application/pdf".parse().unwrap());
    if let Some(disposition) = disposition {
        headers.insert(header::CONTENT_DISPOSITION, disposition.parse().unwrap());
    }
    response
}

fn stored(id: &str, name: &str, size: u64) -> Value {
    json!({
        "id": id,
        "name": name,
        "size": size,
        "contentType": "application/pdf",
        "createdAt": "2026-03-01T10:00:00Z"
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {TOKEN}").as_str())
}

async fn page_count(State(mock): State<Mock>, headers: HeaderMap, multipart: Multipart) -> Json<Value> {
    mock.record("/api/pdf/page-count", &headers, read_fields(multipart).await);
    Json(json!({ "pageCount": 5 }))
}

async fn delete_pages(State(mock): State<Mock>, headers: HeaderMap, multipart: Multipart) -> Response {
    mock.record("/api/pdf/delete-pages", &headers, read_fields(multipart).await);
    pdf_response(Some("attachment; filename=\"report-trimmed.pdf\""), RESULT_PDF)
}

async fn rotate(State(mock): State<Mock>, headers: HeaderMap, multipart: Multipart) -> Response {
    mock.record("/api/pdf/rotate", &headers, read_fields(multipart).await);
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": "Rotation failed: page 3 is damaged" })),
    )
        .into_response()
}

async fn compress(State(mock): State<Mock>, headers: HeaderMap, multipart: Multipart) -> Response {
    mock.record("/api/pdf/compress", &headers, read_fields(multipart).await);
    pdf_response(None, b"")
}

async fn merge(State(mock): State<Mock>, headers: HeaderMap, multipart: Multipart) -> Response {
    mock.record("/api/pdf/merge", &headers, read_fields(multipart).await);
    pdf_response(None, RESULT_PDF)
}

async fn generate_cv(State(mock): State<Mock>, headers: HeaderMap, Json(profile): Json<Value>) -> Response {
    let name = profile["fullName"].as_str().unwrap_or_default().to_string();
    mock.record("/api/cv/generate", &headers, vec![("fullName".to_string(), name)]);
    pdf_response(Some("attachment; filename*=UTF-8''Jane%20Doe%20CV.pdf"), RESULT_PDF)
}

async fn list_files(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Sign in first" }))).into_response();
    }
    Json(json!([stored("f1", "a.pdf", 1200), stored("f2", "b.pdf", 3400)])).into_response()
}

async fn quota() -> Json<Value> {
    Json(json!({ "used": 4600, "limit": 10000 }))
}

async fn upload(State(mock): State<Mock>, headers: HeaderMap, multipart: Multipart) -> Json<Value> {
    mock.record("/api/files/upload", &headers, read_fields(multipart).await);
    Json(stored("f3", "upload.pdf", 8))
}

async fn save(State(mock): State<Mock>, headers: HeaderMap, multipart: Multipart) -> Json<Value> {
    let fields = read_fields(multipart).await;
    let name = fields
        .first()
        .map(|(_, v)| v.split(" (").next().unwrap_or_default().to_string())
        .unwrap_or_default();
    mock.record("/api/files/save", &headers, fields);
    Json(stored("f4", &name, RESULT_PDF.len() as u64))
}

async fn download(Path(id): Path<String>) -> Response {
    if id == "f1" {
        pdf_response(None, RESULT_PDF)
    } else {
        (StatusCode::NOT_FOUND, "no such file").into_response()
    }
}

async fn delete_file(Path(id): Path<String>) -> Response {
    if id == "f1" {
        StatusCode::NO_CONTENT.into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "message": "File not found" }))).into_response()
    }
}

fn router(mock: Mock) -> Router {
    Router::new()
        .route("/api/pdf/page-count", post(page_count))
        .route("/api/pdf/delete-pages", post(delete_pages))
        .route("/api/pdf/rotate", post(rotate))
        .route("/api/pdf/compress", post(compress))
        .route("/api/pdf/merge", post(merge))
        .route("/api/cv/generate", post(generate_cv))
        .route("/api/files", get(list_files))
        .route("/api/files/quota", get(quota))
        .route("/api/files/upload", post(upload))
        .route("/api/files/save", post(save))
        .route("/api/files/{id}/download", get(download))
        .route("/api/files/{id}", delete(delete_file))
        .layer(DefaultBodyLimit::max(64 * 1024 * 1024))
        .with_state(mock)
}

async fn spawn_backend() -> (HttpGateway, Mock) {
    let mock = Mock::default();
    let app = router(mock.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let gateway = HttpGateway::connect(format!("http://{addr}"), Some(TOKEN.to_string())).unwrap();
    (gateway, mock)
}

/// Gateway pointed at a port nothing listens on
async fn unreachable_gateway() -> HttpGateway {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    HttpGateway::connect(format!("http://{addr}"), None).unwrap()
}

fn pdf_of_size(name: &str, size: usize) -> DocumentHandle {
    let mut bytes = b"%PDF-1.7\n".to_vec();
    bytes.resize(size, b' ');
    DocumentHandle::from_bytes(name, bytes)
}

#[tokio::test]
async fn test_delete_pages_end_to_end() {
    let (gateway, mock) = spawn_backend().await;
    let mut session = ToolSession::for_operation(gateway, OperationKind::DeletePages).unwrap();
    let mut trail = vec![session.status()];

    let document = pdf_of_size("report.pdf", 5 * 1024 * 1024);
    trail.push(session.load(document).await.unwrap());

    let validation = session.edit_range("1,3").unwrap().unwrap();
    assert!(validation.valid);
    assert_eq!(validation.message, "2 pages will be deleted, 3 will remain");

    trail.push(session.submit().unwrap());
    trail.push(session.confirm().unwrap());

    let artifact = session.process().await.unwrap();
    assert_eq!(artifact.filename, "report-trimmed.pdf");
    assert_eq!(artifact.content_type, "application/pdf");
    assert_eq!(artifact.bytes, RESULT_PDF);
    trail.push(session.status());

    assert_eq!(
        trail,
        vec![
            WorkflowStatus::Empty,
            WorkflowStatus::Configuring,
            WorkflowStatus::Confirming,
            WorkflowStatus::Processing,
            WorkflowStatus::Done,
        ]
    );

    let dir = tempfile::tempdir().unwrap();
    let written = session.download(dir.path()).unwrap();
    assert_eq!(written, dir.path().join("report-trimmed.pdf"));
    assert_eq!(std::fs::read(written).unwrap(), RESULT_PDF);

    let request = mock.last("/api/pdf/delete-pages");
    assert_eq!(request.auth.as_deref(), Some("Bearer test-token"));
    assert_eq!(
        request.fields,
        vec![
            ("file".to_string(), "report.pdf (5242880 bytes)".to_string()),
            ("pages".to_string(), "1".to_string()),
            ("pages".to_string(), "3".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_rejection_carries_backend_message() {
    let (gateway, mock) = spawn_backend().await;
    let mut session = ToolSession::for_operation(gateway, OperationKind::Rotate).unwrap();

    session.load(pdf_of_size("scan.pdf", 2048)).await.unwrap();
    session.edit_range("2-3").unwrap();
    session
        .set_options(OperationOptions::Rotate {
            angle: RotationAngle::Clockwise270,
        })
        .unwrap();
    assert_eq!(session.submit().unwrap(), WorkflowStatus::Processing);

    let err = session.process().await.unwrap_err();
    match &err {
        GatewayError::Rejected { status, message } => {
            assert_eq!(*status, 422);
            assert_eq!(message, "Rotation failed: page 3 is damaged");
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
    assert_eq!(session.status(), WorkflowStatus::Error);
    assert_eq!(session.workflow().error_message(), Some(err.to_string().as_str()));

    let fields = mock.last("/api/pdf/rotate").fields;
    assert_eq!(fields[1..].to_vec(), vec![
        ("pages".to_string(), "2".to_string()),
        ("pages".to_string(), "3".to_string()),
        ("angle".to_string(), "270".to_string()),
    ]);

    assert_eq!(session.retry().unwrap(), WorkflowStatus::Configuring);
}

#[tokio::test]
async fn test_zero_byte_result_is_empty_response() {
    let (gateway, _mock) = spawn_backend().await;
    let mut session = ToolSession::for_operation(gateway, OperationKind::Compress).unwrap();

    session.load(pdf_of_size("big.pdf", 4096)).await.unwrap();
    session.submit().unwrap();

    let err = session.process().await.unwrap_err();
    assert!(matches!(err, GatewayError::EmptyResponse));
    assert_eq!(session.status(), WorkflowStatus::Error);
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let gateway = unreachable_gateway().await;
    let mut session = ToolSession::for_operation(gateway, OperationKind::ExtractPages).unwrap();

    let err = session.load(pdf_of_size("a.pdf", 100)).await.unwrap_err();
    assert!(err.is_network());
    assert_eq!(session.status(), WorkflowStatus::Error);
}

#[tokio::test]
async fn test_merge_sends_files_in_order() {
    let (gateway, mock) = spawn_backend().await;

    let artifact = gateway
        .merge(&[pdf_of_size("second.pdf", 20), pdf_of_size("first.pdf", 30)])
        .await
        .unwrap();
    assert_eq!(artifact.filename, "merged.pdf");

    assert_eq!(
        mock.last("/api/pdf/merge").fields,
        vec![
            ("files".to_string(), "second.pdf (20 bytes)".to_string()),
            ("files".to_string(), "first.pdf (30 bytes)".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_merge_needs_two_files_before_sending() {
    let (gateway, mock) = spawn_backend().await;

    let err = gateway.merge(&[pdf_of_size("only.pdf", 20)]).await.unwrap_err();
    assert!(matches!(err, GatewayError::Desk(_)));
    assert!(mock.requests.lock().unwrap().is_empty());
}

fn cv_profile() -> CvProfile {
    CvProfile {
        full_name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        skills: vec!["Rust".to_string()],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_generate_cv_uses_encoded_filename() {
    let (gateway, mock) = spawn_backend().await;

    let outcome = gateway.generate_cv(&cv_profile()).await.unwrap();
    assert!(!outcome.is_fallback());
    assert_eq!(outcome.artifact().filename, "Jane Doe CV.pdf");
    assert_eq!(
        mock.last("/api/cv/generate").fields,
        vec![("fullName".to_string(), "Jane Doe".to_string())]
    );
}

#[tokio::test]
async fn test_generate_cv_falls_back_when_unreachable() {
    let gateway = unreachable_gateway().await;

    match gateway.generate_cv(&cv_profile()).await.unwrap() {
        GatewayOutcome::Fallback { artifact, reason } => {
            assert_eq!(artifact.filename, "jane-doe-cv.txt");
            assert!(String::from_utf8(artifact.bytes).unwrap().starts_with("Jane Doe\n"));
            assert!(reason.starts_with("Network error"));
        }
        other => panic!("expected a fallback, got {other:?}"),
    }
}

#[tokio::test]
async fn test_my_files_listing_and_quota() {
    let (gateway, _mock) = spawn_backend().await;

    let files = gateway.list_files().await.unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[1].name, "b.pdf");
    assert!(files[0].created_at.is_some());

    let quota = gateway.quota().await.unwrap();
    assert_eq!(quota.remaining(), 5400);
}

#[tokio::test]
async fn test_listing_without_token_is_unauthorized() {
    let (gateway, _mock) = spawn_backend().await;
    let anonymous = HttpGateway::connect(gateway.base_url(), None).unwrap();

    let err = anonymous.list_files().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Request rejected (401): Sign in first");
}

#[tokio::test]
async fn test_stored_file_round_trip() {
    let (gateway, mock) = spawn_backend().await;

    let uploaded = gateway.upload(&pdf_of_size("upload.pdf", 8)).await.unwrap();
    assert_eq!(uploaded.id, "f3");
    assert_eq!(
        mock.last("/api/files/upload").fields,
        vec![("file".to_string(), "upload.pdf (8 bytes)".to_string())]
    );

    let err = gateway
        .upload(&DocumentHandle::from_stored(&uploaded))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Desk(_)));

    let listed = StoredFile {
        id: "f1".to_string(),
        name: "a.pdf".to_string(),
        size: 1200,
        content_type: "application/pdf".to_string(),
        created_at: None,
    };
    let artifact = gateway.download(&listed).await.unwrap();
    assert_eq!(artifact.filename, "a.pdf");

    let missing = gateway.download_by_id("nope").await.unwrap_err();
    match missing {
        GatewayError::Rejected { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "no such file");
        }
        other => panic!("expected a rejection, got {other:?}"),
    }

    gateway.delete_file("f1").await.unwrap();
    let err = gateway.delete_file("f9").await.unwrap_err();
    assert_eq!(err.to_string(), "Request rejected (404): File not found");
}

#[tokio::test]
async fn test_session_on_stored_document_sends_id_and_saves_result() {
    let (gateway, mock) = spawn_backend().await;
    let listed = gateway.list_files().await.unwrap();

    let mut session = ToolSession::for_operation(gateway, OperationKind::DeletePages).unwrap();
    session.load(DocumentHandle::from_stored(&listed[0])).await.unwrap();
    assert_eq!(
        mock.last("/api/pdf/page-count").fields,
        vec![("fileId".to_string(), "f1".to_string())]
    );

    session.edit_range("5").unwrap();
    session.submit().unwrap();
    session.confirm().unwrap();
    session.process().await.unwrap();

    let saved = session.save().await.unwrap();
    assert_eq!(saved.id, "f4");
    assert_eq!(saved.name, "report-trimmed.pdf");
}

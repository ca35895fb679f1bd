//! PDF export and status probe against a mock consultation backend

use medimate_ai::{ClientError, ExportRequest, MediMateClient};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn disable_system_proxy_for_tests() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        // Safety: set once for the process before any HTTP clients are built.
        unsafe {
            std::env::set_var("MEDIMATE_DISABLE_SYSTEM_PROXY", "1");
        }
    });
}

fn sample_export() -> ExportRequest {
    ExportRequest {
        history: vec![(
            "I have chest pain".to_string(),
            "⚠️ **POTENTIAL EMERGENCY DETECTED**... Please seek care.".to_string(),
        )],
        patient_type: "auto".to_string(),
        is_emergency: true,
    }
}

#[tokio::test]
async fn test_export_returns_pdf_bytes() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;
    let pdf = b"%PDF-1.4\n%fake\n".to_vec();
    Mock::given(method("POST"))
        .and(path("/api/export/pdf"))
        .and(body_json(serde_json::json!({
            "history": [["I have chest pain", "⚠️ **POTENTIAL EMERGENCY DETECTED**... Please seek care."]],
            "patient_type": "auto",
            "is_emergency": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(pdf.clone(), "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;

    let client = MediMateClient::new(&server.uri()).unwrap();
    let bytes = client.export_pdf(&sample_export()).await.unwrap();

    assert_eq!(bytes, pdf);
}

#[tokio::test]
async fn test_export_decodes_json_error_from_binary_body() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/export/pdf"))
        .respond_with(ResponseTemplate::new(501).set_body_raw(
            br#"{"error":"PDF export is disabled."}"#.to_vec(),
            "application/octet-stream",
        ))
        .mount(&server)
        .await;

    let client = MediMateClient::new(&server.uri()).unwrap();
    let err = client.export_pdf(&sample_export()).await.unwrap_err();

    match err {
        ClientError::Export(message) => assert_eq!(message, "PDF export is disabled."),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_export_with_unreadable_error_body() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/export/pdf"))
        .respond_with(ResponseTemplate::new(500).set_body_raw(vec![0xff, 0x00, 0x13], "application/pdf"))
        .mount(&server)
        .await;

    let client = MediMateClient::new(&server.uri()).unwrap();
    let err = client.export_pdf(&sample_export()).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "An unknown error occurred during PDF export."
    );
}

#[tokio::test]
async fn test_status_reports_backend_details() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "service_status": "running",
            "active_chat_method": "ollama",
            "local_transcription_model": "base"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = MediMateClient::new(&server.uri()).unwrap();
    let status = client.status().await.unwrap();

    assert_eq!(status.service_status, "running");
    assert_eq!(status.active_chat_method.as_deref(), Some("ollama"));
}

#[tokio::test]
async fn test_status_failure_carries_http_status() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(serde_json::json!({"error": "No AI chat service is available."})),
        )
        .mount(&server)
        .await;

    let client = MediMateClient::new(&server.uri()).unwrap();
    let err = client.status().await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().contains("No AI chat service is available."));
}

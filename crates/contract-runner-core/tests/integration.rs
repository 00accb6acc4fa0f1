//! Integration tests for Contract Runner Core

use contract_runner_core::client::{FetchError, SchemaClient};
use contract_runner_core::engine::VerificationEngine;
use contract_runner_core::message;
use contract_runner_core::proof::SourceProofs;
use contract_runner_core::schema::InterfaceDocument;
use contract_runner_core::*;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UPLOADS_DOC_PATH: &str = "/api/v1/uploads/openapi.json";

fn uploads_document(response_fields: Value) -> Value {
    json!({
        "openapi": "3.0.3",
        "paths": {
            "/api/v1/uploads/{id}/complete": {
                "post": {
                    "security": [{"bearerAuth": []}],
                    "parameters": [
                        {"name": "id", "in": "path"},
                        {"name": "Idempotency-Key", "in": "header"}
                    ],
                    "requestBody": {"content": {"application/json": {"schema": {
                        "properties": {"checksumSha256": {"type": "string"}}
                    }}}},
                    "responses": {
                        "200": {"content": {"application/json": {"schema": {
                            "properties": response_fields
                        }}}},
                        "409": {"content": {"application/json": {"schema": {
                            "properties": {
                                "error": {"properties": {"code": {}, "message": {}, "details": {}}},
                                "requestId": {}
                            }
                        }}}}
                    }
                }
            }
        }
    })
}

fn complete_requirement() -> ContractRequirement {
    ContractRequirement::new("uploads", "post", "/api/v1/uploads/{uploadId}/complete")
        .with_request_headers(["idempotency-key"])
        .with_request_fields(["checksumSha256"])
        .with_response_fields(["mediaId", "status", "deduplicated"])
}

async fn serve(document: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(UPLOADS_DOC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(document))
        .mount(&server)
        .await;
    server
}

async fn evaluate_against(document: Value) -> ApiOutcome {
    let server = serve(document).await;
    let client = SchemaClient::new(5).unwrap();
    let provider = ProviderSpec::new("uploads", UPLOADS_DOC_PATH);
    let document = client.fetch_provider(&provider, &server.uri()).await.unwrap();

    let mut documents = BTreeMap::new();
    documents.insert("uploads".to_string(), document);

    VerificationEngine::new(SourceProofs::none())
        .evaluate(&[complete_requirement()], &documents)
        .unwrap()
}

#[tokio::test]
async fn test_complete_upload_contract_passes() {
    let outcome = evaluate_against(uploads_document(json!({
        "mediaId": {}, "status": {}, "deduplicated": {}
    })))
    .await;

    assert!(outcome.is_success(), "{:?}", outcome.violations());
    assert_eq!(
        outcome.requirements[0].resolved_path.as_deref(),
        Some("/api/v1/uploads/{id}/complete")
    );
}

#[tokio::test]
async fn test_removed_response_field_yields_single_violation() {
    let outcome = evaluate_against(uploads_document(json!({
        "mediaId": {}, "status": {}
    })))
    .await;

    let violations = outcome.violations();
    assert_eq!(violations.len(), 1);
    assert!(violations[0].message.contains("deduplicated"));
    assert_eq!(
        violations[0].to_string(),
        "uploads POST /api/v1/uploads/{uploadId}/complete: missing response field 'deduplicated' in 200 schema"
    );
}

#[tokio::test]
async fn test_fetch_records_digest_and_url() {
    let server = serve(json!({"paths": {}})).await;
    let client = SchemaClient::new(5).unwrap();
    let provider = ProviderSpec::new("uploads", UPLOADS_DOC_PATH);

    let document = client.fetch_provider(&provider, &server.uri()).await.unwrap();
    assert_eq!(document.url, format!("{}{}", server.uri(), UPLOADS_DOC_PATH));
    assert_eq!(document.digest.len(), 64);
}

#[tokio::test]
async fn test_fetch_non_200_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), UPLOADS_DOC_PATH);
    let err = client::fetch(&url, 5).await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_fetch_malformed_body_is_malformed_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), UPLOADS_DOC_PATH);
    let err = client::fetch(&url, 5).await.unwrap_err();
    assert!(matches!(err, FetchError::Malformed { .. }));
}

#[tokio::test]
async fn test_fetch_unreachable_is_unreachable_error() {
    // Port 9 (discard) on loopback is not expected to accept HTTP
    let err = client::fetch("http://127.0.0.1:9/openapi.json", 2)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FetchError::Unreachable { .. } | FetchError::Timeout { .. }
    ));
}

#[test]
fn test_header_proof_satisfies_undeclared_header() {
    let set = ContractSet::builtin().unwrap();
    let proof = set.header_proof("idempotency-key").unwrap().clone();

    let mut sources = BTreeMap::new();
    sources.insert(
        PathBuf::from(&proof.artifact),
        "readIdempotencyKey(request.headers);\nreadIdempotencyKey(request.headers);\n".to_string(),
    );
    let proofs = SourceProofs::evaluate_sources(&[proof], &sources);

    let mut document = uploads_document(json!({"mediaId": {}, "status": {}, "deduplicated": {}}));
    document["paths"]["/api/v1/uploads/{id}/complete"]["post"]["parameters"] =
        json!([{"name": "id", "in": "path"}]);
    let document = InterfaceDocument::from_value("uploads", document);

    let with_proof = VerificationEngine::new(proofs).evaluate_requirement(&complete_requirement(), &document);
    assert!(with_proof.passed());

    let without_proof = VerificationEngine::default().evaluate_requirement(&complete_requirement(), &document);
    assert_eq!(
        without_proof.violations()[0].message,
        "missing required request header parameter 'idempotency-key'"
    );
}

#[test]
fn test_builtin_queue_contract_against_sources() {
    let set = ContractSet::builtin().unwrap();
    let spec = &set.queues[0];

    let source = r#"
await app.queues.mediaProcess.add("media.process", {
  mediaId: media.id,
  ownerId: userId,
  relativePath,
  checksumSha256: checksum,
  uploadedAt: now.toISOString()
});
"#;
    let docs = r#"`media.process`: {"mediaId", "ownerId", "relativePath", "checksumSha256", "uploadedAt"}"#;

    let outcome = message::check(source, docs, spec).unwrap();
    assert!(outcome.is_success(), "{:?}", outcome.violations());

    let outcome = message::check(&source.replace("  relativePath,\n", ""), docs, spec).unwrap();
    let violations = outcome.violations();
    assert_eq!(violations.len(), 1);
    assert!(violations[0].message.contains("relativePath"));
}

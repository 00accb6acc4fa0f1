//! Contract checks
//!
//! One pure function per check category plus the [`ContractCheck`] wrappers
//! the engine runs. Every function returns violation messages; an empty list
//! means the check passed.

use std::collections::BTreeSet;

use crate::contracts::*;
use crate::engine::{CheckContext, ContractCheck};
use crate::schema::{flatten, Operation};

/// Header satisfied by a declared request body rather than a parameter
pub const CONTENT_TYPE_HEADER: &str = "content-type";

/// Success statuses scanned for a response schema, in preference order
pub const SUCCESS_STATUSES: [&str; 2] = ["200", "201"];

/// Fields every 4xx/5xx JSON response must expose, in report order
pub const ERROR_ENVELOPE_FIELDS: [&str; 5] = [
    "error",
    "error.code",
    "error.details",
    "error.message",
    "requestId",
];

/// Required request headers must be declared, proven in source, or (for
/// `content-type`) implied by a request body
pub fn check_request_headers(
    requirement: &ContractRequirement,
    operation: Operation<'_>,
    ctx: &CheckContext<'_>,
) -> Vec<String> {
    let wanted: BTreeSet<String> = requirement
        .request_headers
        .iter()
        .map(|h| h.to_lowercase())
        .collect();
    if wanted.is_empty() {
        return Vec::new();
    }

    let available: BTreeSet<String> = operation.header_parameters().into_iter().collect();
    let mut errors = Vec::new();

    for header in &wanted {
        if header == CONTENT_TYPE_HEADER {
            if !operation.declares_request_body() {
                errors.push("missing requestBody for Content-Type contract".to_string());
            }
            continue;
        }

        if available.contains(header) {
            continue;
        }

        if ctx.proofs.holds(header) {
            tracing::debug!(header = %header, "header accepted on source-level proof");
            continue;
        }

        errors.push(format!("missing required request header parameter '{}'", header));
    }

    errors
}

/// The JSON request schema must declare every required field path
pub fn check_request_fields(requirement: &ContractRequirement, operation: Operation<'_>) -> Vec<String> {
    if requirement.request_fields.is_empty() {
        return Vec::new();
    }

    if operation.request_body().is_none() {
        return vec!["missing requestBody".to_string()];
    }

    let Some(schema) = operation.request_schema() else {
        return vec!["missing application/json request schema".to_string()];
    };

    let available = flatten(schema);
    requirement
        .request_fields
        .iter()
        .filter(|field| !available.contains(field.as_str()))
        .map(|field| format!("missing request field '{}'", field))
        .collect()
}

/// The first JSON success schema (200, then 201) must declare every required
/// field path
pub fn check_response_fields(requirement: &ContractRequirement, operation: Operation<'_>) -> Vec<String> {
    if requirement.response_fields.is_empty() {
        return Vec::new();
    }

    for status in SUCCESS_STATUSES {
        let Some(schema) = operation.response_schema(status) else {
            continue;
        };

        let available = flatten(schema);
        return requirement
            .response_fields
            .iter()
            .filter(|field| !available.contains(field.as_str()))
            .map(|field| format!("missing response field '{}' in {} schema", field, status))
            .collect();
    }

    vec![format!(
        "missing JSON response schema for {}",
        SUCCESS_STATUSES.join("/")
    )]
}

/// The operation's security list must contain the required scheme
pub fn check_security(requirement: &ContractRequirement, operation: Operation<'_>) -> Vec<String> {
    let Some(wanted) = requirement.security_scheme.as_deref() else {
        return Vec::new();
    };

    let declared = operation
        .security()
        .map(|list| {
            list.iter()
                .any(|item| item.as_object().map(|o| o.contains_key(wanted)).unwrap_or(false))
        })
        .unwrap_or(false);

    if declared {
        Vec::new()
    } else {
        vec![format!("missing security requirement '{}'", wanted)]
    }
}

/// Every 4xx/5xx JSON response must carry the standard error envelope
pub fn check_error_envelope(operation: Operation<'_>) -> Vec<String> {
    let Some(responses) = operation.responses() else {
        return Vec::new();
    };

    let mut errors = Vec::new();

    for status in responses.keys() {
        if !(status.starts_with('4') || status.starts_with('5')) {
            continue;
        }
        let Some(schema) = operation.response_schema(status) else {
            continue;
        };

        let fields = flatten(schema);
        for field in ERROR_ENVELOPE_FIELDS {
            if !fields.contains(field) {
                errors.push(format!("error response {} missing '{}'", status, field));
            }
        }
    }

    errors
}

/// Request header check
pub struct RequestHeadersCheck;

impl ContractCheck for RequestHeadersCheck {
    fn name(&self) -> CheckName {
        CheckName::RequestHeaders
    }

    fn applies_to(&self, requirement: &ContractRequirement) -> bool {
        !requirement.request_headers.is_empty()
    }

    fn evaluate(
        &self,
        requirement: &ContractRequirement,
        operation: Operation<'_>,
        ctx: &CheckContext<'_>,
    ) -> Vec<String> {
        check_request_headers(requirement, operation, ctx)
    }
}

/// Request field check
pub struct RequestFieldsCheck;

impl ContractCheck for RequestFieldsCheck {
    fn name(&self) -> CheckName {
        CheckName::RequestFields
    }

    fn applies_to(&self, requirement: &ContractRequirement) -> bool {
        !requirement.request_fields.is_empty()
    }

    fn evaluate(
        &self,
        requirement: &ContractRequirement,
        operation: Operation<'_>,
        _ctx: &CheckContext<'_>,
    ) -> Vec<String> {
        check_request_fields(requirement, operation)
    }
}

/// Response field check
pub struct ResponseFieldsCheck;

impl ContractCheck for ResponseFieldsCheck {
    fn name(&self) -> CheckName {
        CheckName::ResponseFields
    }

    fn applies_to(&self, requirement: &ContractRequirement) -> bool {
        !requirement.response_fields.is_empty()
    }

    fn evaluate(
        &self,
        requirement: &ContractRequirement,
        operation: Operation<'_>,
        _ctx: &CheckContext<'_>,
    ) -> Vec<String> {
        check_response_fields(requirement, operation)
    }
}

/// Security scheme check
pub struct SecurityCheck;

impl ContractCheck for SecurityCheck {
    fn name(&self) -> CheckName {
        CheckName::Security
    }

    fn applies_to(&self, requirement: &ContractRequirement) -> bool {
        requirement.security_scheme.is_some()
    }

    fn evaluate(
        &self,
        requirement: &ContractRequirement,
        operation: Operation<'_>,
        _ctx: &CheckContext<'_>,
    ) -> Vec<String> {
        check_security(requirement, operation)
    }
}

/// Error envelope check; applies to every requirement
pub struct ErrorEnvelopeCheck;

impl ContractCheck for ErrorEnvelopeCheck {
    fn name(&self) -> CheckName {
        CheckName::ErrorEnvelope
    }

    fn applies_to(&self, _requirement: &ContractRequirement) -> bool {
        true
    }

    fn evaluate(
        &self,
        _requirement: &ContractRequirement,
        operation: Operation<'_>,
        _ctx: &CheckContext<'_>,
    ) -> Vec<String> {
        check_error_envelope(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::SourceProofs;
    use serde_json::{json, Value};

    fn envelope() -> Value {
        json!({
            "properties": {
                "error": {"properties": {"code": {}, "message": {}, "details": {}}},
                "requestId": {}
            }
        })
    }

    fn ctx(proofs: &SourceProofs) -> CheckContext<'_> {
        CheckContext { proofs }
    }

    #[test]
    fn test_content_type_requires_request_body() {
        let req = ContractRequirement::new("auth", "post", "/api/v1/auth/login")
            .with_request_headers(["content-type"]);
        let proofs = SourceProofs::none();

        let without = json!({"responses": {}});
        assert_eq!(
            check_request_headers(&req, Operation::new(&without), &ctx(&proofs)),
            vec!["missing requestBody for Content-Type contract"]
        );

        let with = json!({"requestBody": {"content": {}}});
        assert!(check_request_headers(&req, Operation::new(&with), &ctx(&proofs)).is_empty());
    }

    #[test]
    fn test_header_parameter_matched_case_insensitively() {
        let req = ContractRequirement::new("uploads", "post", "/api/v1/uploads/init")
            .with_request_headers(["idempotency-key"]);
        let op = json!({"parameters": [{"name": "Idempotency-Key", "in": "header"}]});
        assert!(check_request_headers(&req, Operation::new(&op), &ctx(&SourceProofs::none())).is_empty());
    }

    #[test]
    fn test_query_parameter_does_not_satisfy_header() {
        let req = ContractRequirement::new("uploads", "post", "/api/v1/uploads/init")
            .with_request_headers(["idempotency-key"]);
        let op = json!({"parameters": [{"name": "idempotency-key", "in": "query"}]});
        assert_eq!(
            check_request_headers(&req, Operation::new(&op), &ctx(&SourceProofs::none())),
            vec!["missing required request header parameter 'idempotency-key'"]
        );
    }

    #[test]
    fn test_header_satisfied_by_source_proof() {
        let req = ContractRequirement::new("uploads", "post", "/api/v1/uploads/init")
            .with_request_headers(["idempotency-key"]);
        let proof = HeaderProof {
            header: "idempotency-key".to_string(),
            artifact: "routes.js".into(),
            pattern: "readIdempotencyKey(request.headers)".to_string(),
            min_occurrences: 2,
        };
        let mut sources = std::collections::BTreeMap::new();
        sources.insert(
            std::path::PathBuf::from("routes.js"),
            "readIdempotencyKey(request.headers)\nreadIdempotencyKey(request.headers)".to_string(),
        );
        let proofs = SourceProofs::evaluate_sources(&[proof], &sources);
        let op = json!({});
        assert!(check_request_headers(&req, Operation::new(&op), &ctx(&proofs)).is_empty());
    }

    #[test]
    fn test_request_fields_distinct_failures() {
        let req = ContractRequirement::new("auth", "post", "/api/v1/auth/register")
            .with_request_fields(["email", "password"]);

        let no_body = json!({});
        assert_eq!(check_request_fields(&req, Operation::new(&no_body)), vec!["missing requestBody"]);

        let no_json = json!({"requestBody": {"content": {"multipart/form-data": {"schema": {}}}}});
        assert_eq!(
            check_request_fields(&req, Operation::new(&no_json)),
            vec!["missing application/json request schema"]
        );

        let partial = json!({"requestBody": {"content": {"application/json": {"schema": {"properties": {"email": {}}}}}}});
        assert_eq!(
            check_request_fields(&req, Operation::new(&partial)),
            vec!["missing request field 'password'"]
        );
    }

    #[test]
    fn test_response_fields_names_exact_missing_path() {
        let req = ContractRequirement::new("auth", "get", "/api/v1/me")
            .with_response_fields(["user", "user.id"]);
        let op = json!({
            "responses": {
                "200": {"content": {"application/json": {"schema": {
                    "properties": {"user": {"properties": {"email": {}}}}
                }}}}
            }
        });
        assert_eq!(
            check_response_fields(&req, Operation::new(&op)),
            vec!["missing response field 'user.id' in 200 schema"]
        );
    }

    #[test]
    fn test_response_fields_fall_back_to_201() {
        let req = ContractRequirement::new("auth", "post", "/api/v1/admin/users")
            .with_response_fields(["user"]);
        let op = json!({
            "responses": {
                "200": {"description": "not json"},
                "201": {"content": {"application/json": {"schema": {"properties": {"user": {}}}}}}
            }
        });
        assert!(check_response_fields(&req, Operation::new(&op)).is_empty());
    }

    #[test]
    fn test_response_fields_missing_success_schema() {
        let req = ContractRequirement::new("library", "get", "/api/v1/library/timeline")
            .with_response_fields(["items"]);
        let op = json!({"responses": {"204": {}}});
        assert_eq!(
            check_response_fields(&req, Operation::new(&op)),
            vec!["missing JSON response schema for 200/201"]
        );
    }

    #[test]
    fn test_security_scheme() {
        let req = ContractRequirement::new("auth", "get", "/api/v1/me").with_security_scheme("bearerAuth");

        let none = json!({});
        assert_eq!(
            check_security(&req, Operation::new(&none)),
            vec!["missing security requirement 'bearerAuth'"]
        );

        let declared = json!({"security": [{"bearerAuth": []}]});
        assert!(check_security(&req, Operation::new(&declared)).is_empty());

        let other = json!({"security": [{"apiKey": []}]});
        assert_eq!(check_security(&req, Operation::new(&other)).len(), 1);

        let unrequired = ContractRequirement::new("auth", "get", "/api/v1/me");
        assert!(check_security(&unrequired, Operation::new(&none)).is_empty());
    }

    #[test]
    fn test_error_envelope_missing_details() {
        let op = json!({
            "responses": {
                "200": {"content": {"application/json": {"schema": {}}}},
                "404": {"content": {"application/json": {"schema": {
                    "properties": {
                        "error": {"properties": {"code": {}, "message": {}}},
                        "requestId": {}
                    }
                }}}}
            }
        });
        assert_eq!(
            check_error_envelope(Operation::new(&op)),
            vec!["error response 404 missing 'error.details'"]
        );
    }

    #[test]
    fn test_error_envelope_reports_missing_fields_sorted() {
        let op = json!({
            "responses": {
                "500": {"content": {"application/json": {"schema": {
                    "properties": {"error": {}}
                }}}}
            }
        });
        assert_eq!(
            check_error_envelope(Operation::new(&op)),
            vec![
                "error response 500 missing 'error.code'",
                "error response 500 missing 'error.details'",
                "error response 500 missing 'error.message'",
                "error response 500 missing 'requestId'",
            ]
        );
    }

    #[test]
    fn test_error_envelope_ignores_non_json_errors() {
        let op = json!({
            "responses": {
                "400": {"content": {"application/json": {"schema": envelope()}}},
                "500": {"description": "plain text"}
            }
        });
        assert!(check_error_envelope(Operation::new(&op)).is_empty());
    }
}

//! Integration tests for plantbook-sdk using wiremock.
//!
//! These tests mock the Open Plantbook API and exercise the complete flow
//! through the reqwest transport: token exchange, bearer header and the
//! operation endpoints.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use plantbook_sdk::{
    CallOptions, Error, InstanceRegistration, JtsDocument, Outcome, PlantbookClient, Result,
    TimeSeries, TransportError, TsRecord,
};

/// Client pointed at the mock server's `/api/v1`.
fn create_test_client(mock_uri: &str) -> PlantbookClient {
    PlantbookClient::builder()
        .client_id("test-client")
        .secret("test-secret")
        .base_url(format!("{mock_uri}/api/v1"))
        .build()
        .unwrap()
}

/// Mount a token endpoint that must be hit exactly `times` times.
async fn mount_token(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/v1/token/"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=test-client"))
        .and(body_string_contains("client_secret=test-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-access-token",
            "expires_in": 3600,
            "token_type": "Bearer",
            "scope": "read write"
        })))
        .expect(times)
        .mount(server)
        .await;
}

// ============================================================================
// Token handling
// ============================================================================

#[tokio::test]
async fn test_token_is_cached_across_calls() -> Result<()> {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/plant/search"))
        .and(query_param("alias", "acer"))
        .and(header("authorization", "Bearer test-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "results": [{"pid": "acer palmatum", "display_pid": "Acer palmatum", "alias": "japanese maple", "category": "Sapindaceae"}]
        })))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    for _ in 0..3 {
        let found = client.search("acer").await?.ok().unwrap();
        assert_eq!(found.count, 1);
        assert_eq!(found.results[0].pid, "acer palmatum");
    }
    Ok(())
}

#[tokio::test]
async fn test_wrong_credentials_is_permission_denied() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_client"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let err = client.search("acer").await.unwrap_err();
    assert!(matches!(err, Error::PermissionDenied));
    assert!(err.requires_reauth());
}

#[tokio::test]
async fn test_missing_credentials_never_hits_network() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = PlantbookClient::builder()
        .base_url(format!("{}/api/v1", mock_server.uri()))
        .build()
        .unwrap();
    let err = client.plant_detail("acer palmatum", None).await.unwrap_err();
    assert!(matches!(err, Error::MissingCredentials));
}

// ============================================================================
// Plant lookup
// ============================================================================

#[tokio::test]
async fn test_plant_detail_with_lang() -> Result<()> {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/plant/detail/acer%20palmatum"))
        .and(query_param("lang", "de"))
        .and(header("authorization", "Bearer test-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pid": "acer palmatum",
            "display_pid": "Acer palmatum",
            "alias": "Fächerahorn",
            "max_temp": 32,
            "min_temp": 5,
            "max_soil_moist": 60,
            "min_soil_moist": 15,
            "image_url": "https://example.invalid/acer.jpg"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let detail = client.plant_detail("acer palmatum", Some("de")).await?.ok().unwrap();
    assert_eq!(detail.alias.as_deref(), Some("Fächerahorn"));
    let temp = detail.temperature().unwrap();
    assert!(temp.contains(20.0));
    assert!(!temp.contains(40.0));
    Ok(())
}

#[tokio::test]
async fn test_unknown_plant_is_unavailable() -> Result<()> {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/plant/detail/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let outcome = client.plant_detail("nope", None).await?;
    assert!(matches!(outcome.failure(), Some(TransportError::Status { status: 404, .. })));
    Ok(())
}

#[tokio::test]
async fn test_slow_response_times_out() -> Result<()> {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/plant/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"count": 0, "results": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let opts = CallOptions::new().timeout(Duration::from_millis(100));
    let outcome = client.search_with("acer", &opts).await?;
    assert_eq!(outcome, Outcome::Unavailable(TransportError::Timeout));
    Ok(())
}

#[tokio::test]
async fn test_redirect_loop_is_unavailable() -> Result<()> {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server, 1).await;

    let loop_target = format!("{}/api/v1/plant/search?alias=acer", mock_server.uri());
    Mock::given(method("GET"))
        .and(path("/api/v1/plant/search"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", loop_target.as_str()))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let opts = CallOptions::new().max_redirects(2);
    let outcome = client.search_with("acer", &opts).await?;
    assert_eq!(outcome, Outcome::Unavailable(TransportError::TooManyRedirects));
    Ok(())
}

// ============================================================================
// Instance registration
// ============================================================================

#[tokio::test]
async fn test_register_instances() -> Result<()> {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server, 1).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/sensor-data/instance"))
        .and(header("authorization", "Bearer test-access-token"))
        .and(body_string_contains("\"custom_id\":\"Sensor-1\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "101", "custom_id": "Sensor-1", "pid": "acer palmatum", "location_country": "AU"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/sensor-data/instance"))
        .and(body_string_contains("\"custom_id\":\"Sensor-2\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "102", "custom_id": "Sensor-2", "pid": "abelia chinensis", "location_country": "AU"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let registration = InstanceRegistration::new()
        .sensor("Sensor-1", "acer palmatum")
        .sensor("Sensor-2", "abelia chinensis")
        .country("AU");

    let created = client.register_instances(&registration).await?.ok().unwrap();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0].id().as_deref(), Some("101"));
    assert_eq!(created[1].pid(), Some("abelia chinensis"));
    Ok(())
}

#[tokio::test]
async fn test_register_validation_error() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server, 1).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/sensor-data/instance"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "type": "validation_error",
            "errors": [{"code": "invalid", "detail": "non_existent_pid_1 does not exist", "attr": "pid"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let registration = InstanceRegistration::new()
        .sensor("Sensor-1", "non_existent_pid_1")
        .sensor("Sensor-2", "acer palmatum");

    let err = client.register_instances(&registration).await.unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.field_errors()[0].attr.as_deref(), Some("pid"));
}

// ============================================================================
// Sensor data upload
// ============================================================================

#[tokio::test]
async fn test_upload_jts_document() -> Result<()> {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server, 1).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/sensor-data/upload"))
        .and(query_param("dry_run", "true"))
        .and(header("authorization", "Bearer test-access-token"))
        .and(body_string_contains("\"docType\":\"jts\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/sensor-data/upload"))
        .and(query_param("dry_run", "false"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"errors": ["bad column"]})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let doc = JtsDocument::new().with_series([TimeSeries::new("101", "temp")
        .with_record(TsRecord::new(chrono::Utc::now(), 21.5))]);

    assert_eq!(client.upload(&doc, true).await?, Outcome::Success(true));
    let rejected = client.upload(&doc, false).await?;
    assert!(matches!(rejected.failure(), Some(TransportError::Status { status: 400, .. })));
    Ok(())
}

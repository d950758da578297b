//! End-to-end tests: credential exchange, token commit and authenticated
//! requests against a mock platform.

use serde_json::json;
use wiremock::matchers::{basic_auth, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wwsdk_common::auth::TokenState;
use wwsdk_common::graphql::FieldSpec;
use wwsdk_common::normalize::Picked;
use wwsdk_common::testing::jwt_expiring_in;
use wwsdk_domain::{SdkConfig, SdkError};
use wwsdk_infra::WorkspaceClient;

const APP_ID: &str = "01234567-89ab-cdef-0123-456789abcdef";
const APP_SECRET: &str = "abcdefghijklmnopqrstuvwxyz01";

fn config(server: &MockServer) -> SdkConfig {
    SdkConfig { base_url: server.uri(), ..SdkConfig::with_credentials(APP_ID, APP_SECRET) }
}

#[tokio::test]
async fn connect_acquires_token_and_authenticates_requests() {
    let server = MockServer::start().await;
    let token = jwt_expiring_in(3600);

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(basic_auth(APP_ID, APP_SECRET))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": token})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"me": {"id": "app"}}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = WorkspaceClient::connect(config(&server)).await.unwrap();
    assert_eq!(client.app_id(), Some(APP_ID));
    assert!(matches!(client.token_state(), Some(TokenState::Valid { .. })));

    let me = client.get_me(FieldSpec::new()).await.unwrap();
    assert_eq!(me, Picked::Found(json!({"id": "app"})));

    client.shutdown().await;
    assert_eq!(client.token_state(), Some(TokenState::Unstarted));
}

#[tokio::test]
async fn requests_after_shutdown_fail_without_reaching_the_server() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": jwt_expiring_in(3600)})),
        )
        .mount(&server)
        .await;

    let client = WorkspaceClient::connect(config(&server)).await.unwrap();
    client.shutdown().await;

    let err = client.send_message("space", "hello").await.unwrap_err();
    assert!(matches!(err, SdkError::AcquisitionFailed(_)));

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() == "/oauth/token"));
}

#[tokio::test]
async fn server_errors_propagate_unretried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": jwt_expiring_in(3600)})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/spaces/s1/messages"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let client = WorkspaceClient::connect(config(&server)).await.unwrap();
    let err = client.send_message("s1", "hello").await.unwrap_err();
    assert_eq!(err, SdkError::Http { status: 503, body: "maintenance".into() });
}

#![allow(clippy::unwrap_used)]
// Integration tests for `TokenClient` using wiremock.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sfcdp_api::{
    Credentials, Error, Failure, TokenClient, TokenHop, UpstreamBody, sign_assertion,
    token_url_for,
};

const PRIVATE_KEY: &str = include_str!("fixtures/test_key.pem");

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, TokenClient, Credentials) {
    let server = MockServer::start().await;
    let client = TokenClient::with_client(reqwest::Client::new());
    let creds = Credentials::new(
        "3MVG9.consumer-key",
        "integration@example.com",
        Url::parse(&server.uri()).unwrap(),
        SecretString::from(PRIVATE_KEY.to_owned()),
    );
    (server, client, creds)
}

fn core_token_body(instance_url: &str) -> serde_json::Value {
    json!({
        "access_token": "00D5e000000abcd!AQ4AQF.core.token.value",
        "instance_url": instance_url,
        "token_type": "Bearer",
        "scope": "cdp_query_api cdp_profile_api api",
        "id": "https://login.salesforce.com/id/00D5e000000abcd/0055e000001xyz"
    })
}

// ── Core hop ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_core_exchange_success() {
    let (server, client, creds) = setup().await;

    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion=ey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(core_token_body(&server.uri())))
        .expect(1)
        .mount(&server)
        .await;

    let assertion = sign_assertion(&creds).unwrap();
    let token_url = token_url_for(&creds.login_url).unwrap();
    let token = client
        .exchange_core_token(&token_url, &assertion)
        .await
        .unwrap();

    assert_eq!(
        token.access_token.expose_secret(),
        "00D5e000000abcd!AQ4AQF.core.token.value"
    );
    assert_eq!(token.token_type, "Bearer");
    assert_eq!(token.scope, "cdp_query_api cdp_profile_api api");
    assert!(token.id.ends_with("0055e000001xyz"));
}

#[tokio::test]
async fn test_core_exchange_rejected_keeps_body() {
    let (server, client, creds) = setup().await;

    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "user hasn't approved this consumer"
        })))
        .mount(&server)
        .await;

    let assertion = sign_assertion(&creds).unwrap();
    let token_url = token_url_for(&creds.login_url).unwrap();
    let err = client
        .exchange_core_token(&token_url, &assertion)
        .await
        .unwrap_err();

    match err {
        Error::TokenExchange {
            hop: TokenHop::Core,
            failure: Failure::Status { status, ref body },
        } => {
            assert_eq!(status, 400);
            let Some(UpstreamBody::Json(value)) = body else {
                panic!("expected JSON body, got {body:?}");
            };
            assert_eq!(value["error"], "invalid_grant");
        }
        other => panic!("expected core TokenExchange error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_core_exchange_non_200_success_status_is_rejected() {
    let (server, client, creds) = setup().await;

    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let assertion = sign_assertion(&creds).unwrap();
    let token_url = token_url_for(&creds.login_url).unwrap();
    let err = client
        .exchange_core_token(&token_url, &assertion)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(204));
    assert!(err.upstream_body().is_none());
}

#[tokio::test]
async fn test_core_exchange_missing_access_token_is_malformed() {
    let (server, client, creds) = setup().await;

    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "instance_url": server.uri(),
            "token_type": "Bearer"
        })))
        .mount(&server)
        .await;

    let assertion = sign_assertion(&creds).unwrap();
    let token_url = token_url_for(&creds.login_url).unwrap();
    let err = client
        .exchange_core_token(&token_url, &assertion)
        .await
        .unwrap_err();

    match err {
        Error::MalformedResponse { ref message, .. } => {
            assert!(message.contains("access_token"), "got: {message}");
        }
        other => panic!("expected MalformedResponse, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_core_exchange_connection_refused_is_token_exchange_error() {
    let client = TokenClient::with_client(reqwest::Client::new());
    let creds = Credentials::new(
        "id",
        "user",
        Url::parse("http://127.0.0.1:1").unwrap(),
        SecretString::from(PRIVATE_KEY.to_owned()),
    );

    let assertion = sign_assertion(&creds).unwrap();
    let token_url = token_url_for(&creds.login_url).unwrap();
    let err = client
        .exchange_core_token(&token_url, &assertion)
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            Error::TokenExchange {
                hop: TokenHop::Core,
                failure: Failure::Network { .. }
            }
        ),
        "got: {err:?}"
    );
    assert!(err.status().is_none());
}

// ── Data Cloud hop ──────────────────────────────────────────────────

#[tokio::test]
async fn test_data_cloud_exchange_success() {
    let (server, client, creds) = setup().await;

    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(core_token_body(&server.uri())))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/services/a360/token"))
        .and(body_string_contains(
            "grant_type=urn%3Asalesforce%3Agrant-type%3Aexternal%3Acdp",
        ))
        .and(body_string_contains("subject_token=00D5e000000abcd%21AQ4AQF.core.token.value"))
        .and(body_string_contains(
            "subject_token_type=urn%3Aietf%3Aparams%3Aoauth%3Atoken-type%3Aaccess_token",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "eyJraWQiOiJDT1JFLjAwRDVlMDAwMDAwYWJjZCJ9.dc",
            "instance_url": "gy3tmyzzg8ztmmjqmnrdm.c360a.salesforce.com",
            "token_type": "Bearer",
            "issued_token_type": "urn:salesforce:grant-type:external:cdp",
            "expires_in": 7191
        })))
        .expect(1)
        .mount(&server)
        .await;

    let assertion = sign_assertion(&creds).unwrap();
    let token_url = token_url_for(&creds.login_url).unwrap();
    let core = client
        .exchange_core_token(&token_url, &assertion)
        .await
        .unwrap();
    let dc = client.exchange_data_cloud_token(&core).await.unwrap();

    assert_eq!(dc.instance_url, "gy3tmyzzg8ztmmjqmnrdm.c360a.salesforce.com");
    assert_eq!(dc.issued_token_type, "urn:salesforce:grant-type:external:cdp");
    assert_eq!(dc.expires_in, 7191);
    assert_eq!(
        dc.base_url().unwrap().as_str(),
        "https://gy3tmyzzg8ztmmjqmnrdm.c360a.salesforce.com/"
    );
}

#[tokio::test]
async fn test_data_cloud_exchange_rejected() {
    let (server, client, creds) = setup().await;

    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(core_token_body(&server.uri())))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/services/a360/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Bad_OAuth_Token"))
        .mount(&server)
        .await;

    let assertion = sign_assertion(&creds).unwrap();
    let token_url = token_url_for(&creds.login_url).unwrap();
    let core = client
        .exchange_core_token(&token_url, &assertion)
        .await
        .unwrap();
    let err = client.exchange_data_cloud_token(&core).await.unwrap_err();

    assert!(
        matches!(
            err,
            Error::TokenExchange {
                hop: TokenHop::DataCloud,
                ..
            }
        ),
        "got: {err:?}"
    );
    assert_eq!(
        err.upstream_body(),
        Some(&UpstreamBody::Text("Bad_OAuth_Token".into()))
    );
}

#[tokio::test]
async fn test_malformed_token_response_does_not_echo_the_token() {
    let (server, client, creds) = setup().await;

    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "00D5e000000abcd!leaky.secret",
            "token_type": "Bearer"
        })))
        .mount(&server)
        .await;

    let assertion = sign_assertion(&creds).unwrap();
    let token_url = token_url_for(&creds.login_url).unwrap();
    let err = client
        .exchange_core_token(&token_url, &assertion)
        .await
        .unwrap_err();

    match err {
        Error::MalformedResponse { message, body, .. } => {
            assert!(message.contains("instance_url"), "got: {message}");
            assert!(!message.contains("leaky.secret"));
            assert!(body.is_empty());
        }
        other => panic!("expected MalformedResponse, got: {other:?}"),
    }
}

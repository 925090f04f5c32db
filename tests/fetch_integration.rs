//! Integration tests for the fetch module.
//!
//! These tests verify retry, redirect-following and HEAD-probing behavior
//! against mock HTTP servers.

use std::time::Duration;

use linkprobe::{fetch, FetchError, FetchOptions};
use reqwest::Method;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn get_options() -> FetchOptions {
    FetchOptions {
        method: Method::GET,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_fetch_plain_get() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello world"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/page", mock_server.uri());
    let response = fetch(&url, &get_options()).await.expect("fetch should succeed");

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "hello world");
    assert_eq!(response.href, url);
    assert_eq!(response.host, "127.0.0.1");
    assert!(response.redirects.is_empty(), "no redirects occurred");
}

#[tokio::test]
async fn test_fetch_follows_redirect_chain_and_records_trail() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/hop"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hop"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/end"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/end"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let url = format!("{}/start", mock_server.uri());
    let response = fetch(&url, &FetchOptions::default())
        .await
        .expect("chain should resolve");

    assert_eq!(response.status, 200);
    assert_eq!(response.redirects.len(), 2);
    assert_eq!(response.redirects[0].status, 302);
    assert_eq!(response.redirects[0].target, format!("{}/hop", mock_server.uri()));
    assert_eq!(response.redirects[1].status, 301);
    assert_eq!(response.redirects[1].target, format!("{}/end", mock_server.uri()));
    // href stays attributed to the originating URL, not the terminal target.
    assert_eq!(response.href, url);
}

#[tokio::test]
async fn test_fetch_redirect_budget_exhausted() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/b"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/c"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let url = format!("{}/a", mock_server.uri());
    let options = FetchOptions {
        redirect_times: 2,
        ..Default::default()
    };
    let result = fetch(&url, &options).await;

    match result {
        Err(FetchError::RedirectLimit { limit, .. }) => assert_eq!(limit, 2),
        other => panic!("Expected RedirectLimit, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_budget_of_zero_rejects_before_any_request() {
    let mock_server = MockServer::start().await;

    let url = format!("{}/anything", mock_server.uri());
    let options = FetchOptions {
        redirect_times: 0,
        ..Default::default()
    };
    let result = fetch(&url, &options).await;

    assert!(matches!(result, Err(FetchError::RedirectLimit { .. })));
    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty(), "no request may be issued with a zero budget");
}

#[tokio::test]
async fn test_head_rejected_with_405_falls_back_to_get() {
    let mock_server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/doc"))
        .respond_with(ResponseTemplate::new(405))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/doc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("full body"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/doc", mock_server.uri());
    let options = FetchOptions {
        method: Method::HEAD,
        use_fake_head: false,
        ..Default::default()
    };
    let response = fetch(&url, &options).await.expect("fallback should succeed");

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "full body", "the follow-up is observably a GET");
}

#[tokio::test]
async fn test_fake_head_goes_out_as_get_and_discards_body() {
    let mock_server = MockServer::start().await;
    // Only a GET mock is mounted; a true HEAD on the wire would not match.
    Mock::given(method("GET"))
        .and(path("/probe"))
        .respond_with(ResponseTemplate::new(200).set_body_string("body to discard"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/probe", mock_server.uri());
    let response = fetch(&url, &FetchOptions::default())
        .await
        .expect("probe should succeed");

    assert_eq!(response.status, 200);
    assert!(response.body.is_empty(), "fake HEAD must not report a body");
}

#[tokio::test]
async fn test_true_head_when_fake_head_disabled() {
    let mock_server = MockServer::start().await;
    // Only a HEAD mock is mounted; a GET on the wire would not match.
    Mock::given(method("HEAD"))
        .and(path("/probe"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let url = format!("{}/probe", mock_server.uri());
    let options = FetchOptions {
        method: Method::HEAD,
        use_fake_head: false,
        ..Default::default()
    };
    let response = fetch(&url, &options).await.expect("HEAD should succeed");
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_fetch_sends_configured_referer() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/with-referer"))
        .and(header("referer", "http://referrer.example/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/with-referer", mock_server.uri());
    let options = FetchOptions {
        referer: Some("http://referrer.example/".to_string()),
        ..get_options()
    };
    let response = fetch(&url, &options).await.expect("fetch should succeed");
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_fetch_retries_transient_timeouts_then_fails() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .expect(3)
        .mount(&mock_server)
        .await;

    let url = format!("{}/slow", mock_server.uri());
    let options = FetchOptions {
        timeout: Duration::from_millis(200),
        retry_times: 2,
        ..get_options()
    };
    let result = fetch(&url, &options).await;

    assert!(
        matches!(result, Err(FetchError::Timeout { .. })),
        "timeout must surface once the retry budget is exhausted: {result:?}"
    );
    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 3, "initial attempt plus two retries");
}

#[tokio::test]
async fn test_fetch_encodes_raw_characters_without_double_encoding() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let url = format!("{}/a b/caf%C3%A9", mock_server.uri());
    fetch(&url, &get_options()).await.expect("fetch should succeed");

    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url.path(),
        "/a%20b/caf%C3%A9",
        "raw space encoded, existing escape left alone"
    );
}

#[tokio::test]
async fn test_fetch_redirect_not_followed_when_disabled() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/elsewhere"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/start", mock_server.uri());
    let options = FetchOptions {
        follow_redirect: false,
        ..Default::default()
    };
    let response = fetch(&url, &options).await.expect("fetch should succeed");

    assert_eq!(response.status, 301);
    assert!(response.redirects.is_empty(), "hop was not consumed");
}

#[tokio::test]
async fn test_fetch_invalid_url() {
    let result = fetch("not a url at all", &FetchOptions::default()).await;
    assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
}

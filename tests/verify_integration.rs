//! Integration tests for batch link verification.

use std::sync::Arc;

use linkprobe::{verify_links, FetchOptions, LinkError, Verdict, VerifyOptions};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts the standard trio: a plain 200, a 301 hop onto it, and a 404.
async fn setup_trio() -> (MockServer, Vec<String>) {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/redir"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/ok"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let links = vec![
        format!("{}/ok", mock_server.uri()),
        format!("{}/redir", mock_server.uri()),
        format!("{}/missing", mock_server.uri()),
    ];
    (mock_server, links)
}

#[tokio::test]
async fn test_verify_partitions_success_and_error() {
    let (mock_server, links) = setup_trio().await;

    let report = verify_links(links.clone(), &VerifyOptions::default()).await;

    assert_eq!(report.success.len(), 2);
    assert_eq!(report.error.len(), 1);
    assert_eq!(report.len(), 3, "every link lands in exactly one map");

    assert_eq!(report.success.get(&links[0]).map(String::as_str), Some("200"));
    let redirected = report.success.get(&links[1]).expect("redirect link succeeds");
    assert_eq!(
        redirected,
        &format!("301=>{}/ok|200", mock_server.uri()),
        "descriptor encodes the hop then the final status"
    );
    assert!(matches!(
        report.error.get(&links[2]),
        Some(LinkError::HttpStatus { status: 404 })
    ));
}

#[tokio::test]
async fn test_validator_chain_short_circuits_in_order() {
    let (_mock_server, links) = setup_trio().await;

    let options = VerifyOptions {
        validators: vec![
            // Rejects anything that redirected, overriding the default
            // 200-based policy for the /redir link.
            Arc::new(|response| {
                if response.was_redirected() {
                    Verdict::Failure("redirected".to_string())
                } else {
                    Verdict::Undecided
                }
            }),
            // Accepts 404s, so /missing becomes a success.
            Arc::new(|response| {
                if response.status == 404 {
                    Verdict::Success
                } else {
                    Verdict::Undecided
                }
            }),
            // Rejects everything that reaches it.
            Arc::new(|_| Verdict::Failure("rejected".to_string())),
        ],
        ..Default::default()
    };
    let report = verify_links(links.clone(), &options).await;

    assert_eq!(report.success.len(), 1);
    assert_eq!(report.error.len(), 2);
    assert_eq!(report.success.get(&links[2]).map(String::as_str), Some("404"));
    for link in [&links[0], &links[1]] {
        let error = report.error.get(link).expect("link must be rejected");
        let message = error.to_string();
        assert!(
            message == "rejected" || message == "redirected",
            "unexpected message: {message}"
        );
    }
    // The final always-reject rule never sees the redirected link: the
    // first rule already decided it.
    assert_eq!(report.error.get(&links[1]).map(ToString::to_string).as_deref(), Some("redirected"));
}

#[tokio::test]
async fn test_verify_bounded_workers_cover_every_link() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    // More links than workers, with repetition of paths but distinct URLs.
    let links: Vec<String> = (0..12)
        .map(|i| {
            if i % 3 == 0 {
                format!("{}/missing?i={i}", mock_server.uri())
            } else {
                format!("{}/ok?i={i}", mock_server.uri())
            }
        })
        .collect();

    let options = VerifyOptions {
        concurrency: 3,
        ..Default::default()
    };
    let report = verify_links(links.clone(), &options).await;

    assert_eq!(report.len(), 12);
    assert_eq!(report.error.len(), 4);
    for link in &links {
        assert!(
            report.success.contains_key(link) ^ report.error.contains_key(link),
            "link must appear in exactly one map: {link}"
        );
    }
}

#[tokio::test]
async fn test_verify_empty_input() {
    let report = verify_links(Vec::new(), &VerifyOptions::default()).await;
    assert!(report.is_empty());
    assert!(report.is_all_ok());
}

#[tokio::test]
async fn test_verify_records_fetch_failures_per_link() {
    let (_mock_server, mut links) = setup_trio().await;
    // Port 1 refuses connections immediately.
    links.push("http://127.0.0.1:1/unreachable".to_string());

    let options = VerifyOptions {
        fetch: FetchOptions {
            retry_times: 0,
            ..Default::default()
        },
        ..Default::default()
    };
    let report = verify_links(links.clone(), &options).await;

    assert_eq!(report.len(), 4, "the bad link must not abort the batch");
    assert!(matches!(
        report.error.get(&links[3]),
        Some(LinkError::Fetch(_))
    ));
    assert_eq!(report.success.len(), 2);
}

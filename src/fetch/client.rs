//! The fetch engine: defensive URL encoding, transient-failure retry,
//! fake-HEAD probing, HEAD-405 fallback and manual redirect following.

use std::error::Error as _;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CACHE_CONTROL,
    CONNECTION, LOCATION, REFERER,
};
use reqwest::{redirect, Client, Method, Proxy, StatusCode};
use tracing::{debug, instrument, trace, warn};
use url::Url;

use super::error::FetchError;
use super::options::FetchOptions;
use super::{FetchResponse, RedirectHop};

/// Characters that must be percent-encoded when they appear raw in a link.
///
/// Mirrors the conservative browser set: controls, space, quote, angle
/// brackets, backslash, caret, backtick, braces, pipe and square brackets.
/// `%` is deliberately absent so existing escapes are never double-encoded.
const ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}')
    .add(b'[')
    .add(b']');

/// Redirecting status codes that are followed manually.
const REDIRECT_STATUSES: [u16; 3] = [301, 302, 307];

/// Percent-encodes raw characters in a URL without touching existing
/// percent escapes.
///
/// Upstream link text may contain raw non-ASCII or reserved characters;
/// this makes such links sendable while leaving already-encoded URLs
/// byte-identical.
#[must_use]
pub fn encode_url(raw: &str) -> String {
    utf8_percent_encode(raw, ENCODE_SET).to_string()
}

/// Performs one logical fetch of `link`.
///
/// The fetch retries transient network failures per attempt, substitutes
/// HEAD with a truncated GET when [`FetchOptions::use_fake_head`] is set,
/// re-issues a rejected HEAD (status 405) as a full GET, and follows
/// 301/302/307 redirects manually while recording the trail.
///
/// The returned [`FetchResponse`] reports `href` as the originally
/// requested URL even after redirects were followed; the terminal location
/// is the last entry of the trail.
///
/// # Errors
///
/// Returns [`FetchError::RedirectLimit`] when the hop budget is exhausted
/// before a terminal response (a budget of 0 rejects before any request),
/// [`FetchError::Timeout`] / [`FetchError::Network`] when the transport
/// fails after the retry budget, and [`FetchError::InvalidUrl`] when the
/// link or a redirect target cannot be parsed.
#[instrument(skip(options), fields(method = %options.method))]
pub async fn fetch(link: &str, options: &FetchOptions) -> Result<FetchResponse, FetchError> {
    let encoded = encode_url(link);
    let origin = Url::parse(&encoded).map_err(|_| FetchError::invalid_url(link))?;
    let client = build_client(link, options)?;

    let mut current = origin.clone();
    let mut remaining = options.redirect_times;
    let mut trail: Vec<RedirectHop> = Vec::new();

    loop {
        // The budget gates every hop including the first, so a budget of 0
        // rejects before any request is issued.
        if remaining == 0 {
            return Err(FetchError::redirect_limit(
                origin.as_str(),
                options.redirect_times,
            ));
        }

        let mut response = send_with_retry(&client, options, &current, &options.method).await?;

        // Servers that reject HEAD outright get one full GET, unless the
        // fake-HEAD probe (already a GET on the wire) was in play.
        if response.status == StatusCode::METHOD_NOT_ALLOWED.as_u16()
            && options.method == Method::HEAD
            && !options.use_fake_head
        {
            debug!(url = %current, "HEAD rejected with 405, re-issuing as GET");
            response = send_with_retry(&client, options, &current, &Method::GET).await?;
        }

        if options.follow_redirect && REDIRECT_STATUSES.contains(&response.status) {
            let Some(location) = header_str(&response.headers, &LOCATION) else {
                // A redirect status without a Location header has nowhere to
                // go; report it as the terminal response.
                warn!(url = %current, status = response.status, "redirect without Location header");
                return Ok(finish(&origin, &current, response, trail));
            };
            let target = current
                .join(&encode_url(&location))
                .map_err(|_| FetchError::invalid_url(&location))?;
            trace!(from = %current, to = %target, status = response.status, "following redirect");
            trail.push(RedirectHop {
                status: response.status,
                target: target.to_string(),
            });
            remaining -= 1;
            current = target;
            continue;
        }

        return Ok(finish(&origin, &current, response, trail));
    }
}

/// Raw per-attempt response before trail assembly.
struct RawResponse {
    status: u16,
    headers: HeaderMap,
    body: String,
}

fn finish(origin: &Url, current: &Url, raw: RawResponse, trail: Vec<RedirectHop>) -> FetchResponse {
    FetchResponse {
        host: current.host_str().unwrap_or_default().to_string(),
        href: origin.to_string(),
        body: raw.body,
        headers: raw.headers,
        status: raw.status,
        redirects: trail,
    }
}

/// Issues one request, retrying transient network failures up to the
/// configured budget. Non-transient transport errors are fatal immediately.
async fn send_with_retry(
    client: &Client,
    options: &FetchOptions,
    url: &Url,
    method: &Method,
) -> Result<RawResponse, FetchError> {
    let mut attempt: u32 = 0;
    loop {
        match send_once(client, options, url, method).await {
            Ok(response) => return Ok(response),
            Err(error) if is_transient(&error) && attempt < options.retry_times => {
                attempt += 1;
                debug!(
                    url = %url,
                    attempt,
                    max = options.retry_times,
                    error = %error,
                    "transient network failure, retrying"
                );
            }
            Err(error) if error.is_timeout() => {
                return Err(FetchError::timeout(url.as_str()));
            }
            Err(error) => return Err(FetchError::network(url.as_str(), error)),
        }
    }
}

/// Issues a single request attempt.
///
/// For a fake-HEAD probe the request goes out as GET and the response is
/// dropped once headers arrive, which aborts the in-flight connection and
/// skips the body download.
async fn send_once(
    client: &Client,
    options: &FetchOptions,
    url: &Url,
    method: &Method,
) -> Result<RawResponse, reqwest::Error> {
    let fake_head = *method == Method::HEAD && options.use_fake_head;
    let wire_method = if fake_head { Method::GET } else { method.clone() };

    let response = client.request(wire_method, url.clone()).send().await?;
    let status = response.status().as_u16();
    let headers = response.headers().clone();

    let body = if fake_head {
        // Dropping the response aborts the connection; reachability is
        // already known from the status line and headers.
        drop(response);
        String::new()
    } else {
        response.text().await?
    };

    Ok(RawResponse {
        status,
        headers,
        body,
    })
}

/// Transient failures worth re-issuing the identical request for: timeouts
/// and reset/refused connections. Everything else (TLS, malformed
/// responses, ...) will not get better on retry.
fn is_transient(error: &reqwest::Error) -> bool {
    if error.is_timeout() || error.is_connect() {
        return true;
    }
    // Connection resets mid-transfer surface as body/request errors with an
    // io::Error somewhere in the chain.
    let mut source = error.source();
    while let Some(inner) = source {
        if let Some(io) = inner.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::ConnectionAborted
            ) {
                return true;
            }
        }
        source = inner.source();
    }
    false
}

/// Builds a client with redirects disabled so hops can be followed and
/// recorded manually.
fn build_client(link: &str, options: &FetchOptions) -> Result<Client, FetchError> {
    let mut builder = Client::builder()
        .timeout(options.timeout)
        .redirect(redirect::Policy::none())
        .user_agent(&options.user_agent)
        .default_headers(request_headers(options));

    if let Some(proxy_url) = options.proxy.clone().or_else(env_proxy) {
        let proxy = Proxy::all(&proxy_url).map_err(|e| FetchError::network(link, e))?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(|e| FetchError::network(link, e))
}

fn request_headers(options: &FetchOptions) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, ACCEPT, &options.accept);
    insert_header(&mut headers, ACCEPT_LANGUAGE, &options.accept_language);
    insert_header(&mut headers, CACHE_CONTROL, &options.cache_control);
    insert_header(&mut headers, CONNECTION, &options.connection);
    if let Some(ref encoding) = options.accept_encoding {
        insert_header(&mut headers, ACCEPT_ENCODING, encoding);
    }
    if let Some(ref referer) = options.referer {
        insert_header(&mut headers, REFERER, referer);
    }
    headers
}

fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(parsed) => {
            headers.insert(name, parsed);
        }
        Err(_) => warn!(header = %name, "dropping header with invalid value"),
    }
}

fn header_str(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn env_proxy() -> Option<String> {
    ["http_proxy", "HTTP_PROXY"].iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

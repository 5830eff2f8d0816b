/// Station API client (`/api/v1/estaciones/{code}`)
///
/// Retrieves the current state of one monitoring station as a JSON document.
/// Every call is a single GET with no caching and no retries; failures are
/// classified into [`FetchError`] for display to the operator.
///
/// The API needs no credentials. It does expect browser-like request
/// headers, and its certificate chain often fails validation, so TLS
/// verification is a per-call choice of the caller.

use crate::config::{Protocol, StationApiConfig};
use crate::logging::{self, Source};
use crate::model::{truncate_chars, FetchError, StationSnapshot, BODY_SNIPPET_CHARS};
use chrono::{FixedOffset, Utc};
use reqwest::blocking::Client;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION,
    PRAGMA, USER_AGENT,
};
use serde_json::Value;
use std::error::Error;
use std::time::Duration;

/// Fixed request timeout for a station fetch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Substrings that mark a TLS failure somewhere in an error's source chain.
const TLS_MARKERS: &[&str] = &["certificate", "tls", "ssl", "handshake"];

// ============================================================================
// Client
// ============================================================================

#[derive(Debug, Clone)]
pub struct StationClient {
    base_url: String,
    timeout: Duration,
}

impl StationClient {
    /// Creates a client for `base_url` (without trailing station code).
    pub fn new(base_url: impl Into<String>) -> Self {
        StationClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_config(config: &StationApiConfig, protocol: Protocol) -> Self {
        Self::new(config.base_url(protocol)).with_timeout(config.timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for a station. The code is forwarded as given
    /// (trimmed); the API decides whether it exists.
    pub fn station_url(&self, station_code: &str) -> String {
        format!("{}/{}", self.base_url, station_code.trim())
    }

    /// Fetches the raw document for one station.
    ///
    /// # Parameters
    /// - `station_code`: code as typed or selected by the operator
    /// - `verify_tls`: validate the server certificate when `true`
    ///
    /// # Returns
    /// The parsed JSON body of a 200 response.
    pub fn fetch(&self, station_code: &str, verify_tls: bool) -> Result<Value, FetchError> {
        let url = self.station_url(station_code);
        logging::debug(
            Source::StationApi,
            Some(station_code),
            &format!("GET {} (verify_tls={})", url, verify_tls),
        );

        let result = self.fetch_url(&url, verify_tls);
        match &result {
            Ok(_) => logging::info(
                Source::StationApi,
                Some(station_code),
                &format!("Fetched station {}", station_code.trim()),
            ),
            Err(e) => logging::log_fetch_failure(station_code, "Station fetch", e),
        }
        result
    }

    /// Fetches a station and stamps the result with the local time at which
    /// it arrived.
    pub fn fetch_snapshot(
        &self,
        station_code: &str,
        verify_tls: bool,
        offset: FixedOffset,
    ) -> Result<StationSnapshot, FetchError> {
        let document = self.fetch(station_code, verify_tls)?;
        let fetched_at = Utc::now().with_timezone(&offset);
        Ok(StationSnapshot::new(station_code.trim(), document, fetched_at))
    }

    fn fetch_url(&self, url: &str, verify_tls: bool) -> Result<Value, FetchError> {
        let client = build_http_client(verify_tls, self.timeout)?;

        let response = client
            .get(url)
            .send()
            .map_err(|e| classify_request_error(&e))?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|e| classify_request_error(&e))?;

        parse_body(status, &body)
    }
}

// ============================================================================
// Request construction
// ============================================================================

/// Header set the station API sees from a desktop browser.
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("es-ES,es;q=0.9,en;q=0.8"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

fn build_http_client(verify_tls: bool, timeout: Duration) -> Result<Client, FetchError> {
    Client::builder()
        .default_headers(browser_headers())
        .timeout(timeout)
        .danger_accept_invalid_certs(!verify_tls)
        .build()
        .map_err(|e| FetchError::Unknown(format!("could not build HTTP client: {}", e)))
}

// ============================================================================
// Response handling
// ============================================================================

/// Turns a status code and body into a document or a protocol error.
/// Only status 200 is accepted.
pub fn parse_body(status: u16, body: &str) -> Result<Value, FetchError> {
    if status != 200 {
        return Err(FetchError::Status {
            code: status,
            snippet: truncate_chars(body, BODY_SNIPPET_CHARS),
        });
    }
    serde_json::from_str(body).map_err(|e| FetchError::MalformedJson(e.to_string()))
}

/// Maps a transport-level `reqwest` failure onto the fetch error taxonomy.
///
/// TLS is only considered for failures raised while connecting; a body that
/// arrives but cannot be decoded (e.g. a corrupt gzip stream) is a protocol
/// error.
pub fn classify_request_error(err: &reqwest::Error) -> FetchError {
    let detail = error_chain(err);
    if err.is_timeout() {
        FetchError::Timeout(detail)
    } else if err.is_decode() {
        FetchError::MalformedJson(detail)
    } else if err.is_body() {
        FetchError::Unknown(detail)
    } else if err.is_connect() && is_tls_failure(err) {
        FetchError::Tls(detail)
    } else if err.is_connect() {
        FetchError::Connection(detail)
    } else {
        FetchError::Unknown(detail)
    }
}

/// rustls reports handshake and certificate failures as `InvalidData` I/O
/// errors; other stacks only leave a message behind.
fn is_tls_failure(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::InvalidData {
                return true;
            }
        }
        if mentions_tls(&cause.to_string()) {
            return true;
        }
        source = cause.source();
    }
    false
}

fn mentions_tls(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    TLS_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// `reqwest`'s own message is generic; the useful detail is in the sources.
/// hyper already embeds a cause in its own message, so a cause whose text
/// appears in an earlier part is skipped.
fn error_chain(err: &dyn Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !parts.iter().any(|part| part.contains(&text)) {
            parts.push(text);
        }
        source = cause.source();
    }
    parts.join(": ")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_station_url_joins_base_and_code() {
        let client = StationClient::new("https://marco.cornare.gov.co/api/v1/estaciones/");
        assert_eq!(
            client.station_url(" 204 "),
            "https://marco.cornare.gov.co/api/v1/estaciones/204"
        );
    }

    #[test]
    fn test_from_config_picks_protocol_and_timeout() {
        let config = StationApiConfig::default();
        let https = StationClient::from_config(&config, Protocol::Https);
        let http = StationClient::from_config(&config, Protocol::Http);
        assert!(https.base_url().starts_with("https://"));
        assert!(http.base_url().starts_with("http://"));
        assert_eq!(https.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_browser_headers_cover_required_set() {
        let headers = browser_headers();
        for name in [
            USER_AGENT,
            ACCEPT,
            ACCEPT_LANGUAGE,
            ACCEPT_ENCODING,
            CONNECTION,
            CACHE_CONTROL,
            PRAGMA,
        ] {
            assert!(headers.contains_key(&name), "missing header {}", name);
        }
        assert!(!headers.contains_key(reqwest::header::AUTHORIZATION));
    }

    #[test]
    fn test_parse_body_accepts_200_json() {
        let doc = parse_body(200, r#"{"codigo": 204}"#).expect("valid JSON should parse");
        assert_eq!(doc, json!({"codigo": 204}));
    }

    #[test]
    fn test_parse_body_404_keeps_status_and_short_snippet() {
        let body = "x".repeat(1000);
        match parse_body(404, &body) {
            Err(FetchError::Status { code, snippet }) => {
                assert_eq!(code, 404);
                assert_eq!(snippet.chars().count(), BODY_SNIPPET_CHARS);
            }
            other => panic!("expected Status error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_body_non_200_success_codes_are_errors() {
        let result = parse_body(204, "");
        assert!(matches!(result, Err(FetchError::Status { code: 204, .. })));
    }

    #[test]
    fn test_parse_body_malformed_json() {
        let result = parse_body(200, "<html>maintenance</html>");
        assert!(matches!(result, Err(FetchError::MalformedJson(_))));
    }

    #[test]
    fn test_tls_markers() {
        assert!(mentions_tls("invalid peer certificate: UnknownIssuer"));
        assert!(mentions_tls("TLS handshake eof"));
        assert!(!mentions_tls("connection refused"));
    }

    #[derive(Debug)]
    struct Layer {
        message: String,
        source: Option<Box<Layer>>,
    }

    impl std::fmt::Display for Layer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl Error for Layer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            self.source.as_deref().map(|s| s as &(dyn Error + 'static))
        }
    }

    fn layer(message: &str, source: Option<Layer>) -> Layer {
        Layer {
            message: message.to_string(),
            source: source.map(Box::new),
        }
    }

    #[test]
    fn test_error_chain_skips_causes_already_in_message() {
        let root = layer("invalid peer certificate: UnknownIssuer", None);
        let connect = layer(
            "error trying to connect: invalid peer certificate: UnknownIssuer",
            Some(root),
        );
        let top = layer("error sending request for url (https://x/204)", Some(connect));
        assert_eq!(
            error_chain(&top),
            "error sending request for url (https://x/204): \
             error trying to connect: invalid peer certificate: UnknownIssuer"
        );
    }

    #[test]
    fn test_error_chain_keeps_distinct_causes() {
        let top = layer("request failed", Some(layer("connection refused", None)));
        assert_eq!(error_chain(&top), "request failed: connection refused");
    }

    #[test]
    fn test_error_chain_joins_sources() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "inner cause");
        let outer = std::io::Error::new(std::io::ErrorKind::Other, inner);
        // io::Error with a custom payload displays the payload itself, so
        // the chain de-duplicates the repeated message.
        assert_eq!(error_chain(&outer), "inner cause");
    }
}

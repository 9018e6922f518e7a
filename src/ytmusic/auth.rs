use reqwest::header::{
    ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, ORIGIN, USER_AGENT,
};
use sha1::{Digest, Sha1};

use crate::{error::ApiError, types::Credential};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

/// Headers copied from the browser that must not be replayed.
///
/// `accept-encoding` would ask for compressed bodies the client does not
/// decode; the others are computed per request.
const SKIPPED_HEADERS: [&str; 6] = [
    "accept-encoding",
    "authorization",
    "content-length",
    "content-type",
    "host",
    "origin",
];

/// Cookie carrying the SAPISID, newest name first.
pub fn sapisid(credential: &Credential) -> Option<&str> {
    credential
        .cookie("__Secure-3PAPISID")
        .or_else(|| credential.cookie("SAPISID"))
}

/// Builds the `authorization` value YouTube expects from cookie sessions:
/// `SAPISIDHASH <ts>_<sha1("<ts> <sapisid> <origin>")>`.
pub fn sapisid_hash(sapisid: &str, origin: &str, timestamp: i64) -> String {
    let digest = Sha1::digest(format!("{} {} {}", timestamp, sapisid, origin).as_bytes());
    format!("SAPISIDHASH {}_{:x}", timestamp, digest)
}

/// Checks that a credential can authenticate requests at all.
///
/// This does not contact the service; see
/// [`MusicCatalog::validate_session`](super::MusicCatalog::validate_session)
/// for the probe.
pub fn check_credential(credential: &Credential) -> Result<(), String> {
    if credential.header("cookie").is_none() {
        return Err("missing 'cookie' header".to_string());
    }
    if sapisid(credential).is_none() {
        return Err("cookie header has no SAPISID or __Secure-3PAPISID cookie".to_string());
    }

    for (name, value) in &credential.headers {
        HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| format!("invalid header name '{}'", name))?;
        HeaderValue::from_str(value).map_err(|_| format!("invalid value for header '{}'", name))?;
    }

    Ok(())
}

/// Parses headers pasted from the browser's network inspector.
///
/// Accepts one `name: value` per line. Pseudo-headers (`:authority`), the
/// request line and blank lines are ignored; names are lower-cased.
pub fn parse_raw_headers(raw: &str) -> Result<Credential, String> {
    let mut credential = Credential::default();

    for line in raw.lines().map(str::trim) {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() || name.contains(char::is_whitespace) {
            continue;
        }
        credential.headers.insert(name, value.trim().to_string());
    }

    if credential.headers.is_empty() {
        return Err("no headers found in the pasted text".to_string());
    }

    check_credential(&credential)?;
    Ok(credential)
}

/// Static request headers for every call made with `credential`.
///
/// The per-request `authorization` header is added by the client.
pub fn build_header_map(credential: &Credential, origin: &str) -> Result<HeaderMap, ApiError> {
    check_credential(credential).map_err(ApiError::InvalidCredential)?;

    let mut headers = HeaderMap::new();
    for (name, value) in &credential.headers {
        if SKIPPED_HEADERS.contains(&name.as_str()) {
            continue;
        }
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::InvalidCredential(e.to_string()))?;
        let value =
            HeaderValue::from_str(value).map_err(|e| ApiError::InvalidCredential(e.to_string()))?;
        headers.insert(name, value);
    }

    let origin_value =
        HeaderValue::from_str(origin).map_err(|e| ApiError::InvalidCredential(e.to_string()))?;
    headers.insert(ORIGIN, origin_value.clone());
    headers.insert(HeaderName::from_static("x-origin"), origin_value);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
        .entry(ACCEPT)
        .or_insert(HeaderValue::from_static("*/*"));
    headers
        .entry(USER_AGENT)
        .or_insert(HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers
        .entry(HeaderName::from_static("x-goog-authuser"))
        .or_insert(HeaderValue::from_static("0"));

    Ok(headers)
}

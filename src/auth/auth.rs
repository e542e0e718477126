use axum::http::HeaderMap;
use tracing::warn;

/// Header carrying the pre-shared API key on every request and handshake.
pub const API_KEY_HEADER: &str = "x-tuneup-api-key";

/// Constant-time byte comparison. The early return on length mismatch is
/// fine: key length is not a secret, only its content is.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Verify the API key header against the configured secret.
///
/// Returns false for a missing header, a non-ASCII value, or a mismatch.
/// Failures are logged with only a 4-character prefix of the presented key.
pub fn verify_api_key(headers: &HeaderMap, expected: &str) -> bool {
    let presented = match headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        Some(value) => value,
        None => {
            warn!("Request without {} header", API_KEY_HEADER);
            return false;
        }
    };
    if !constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
        let prefix: String = presented.chars().take(4).collect();
        warn!("Invalid API key attempt: {}...", prefix);
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_key(key: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_str(key).unwrap());
        headers
    }

    #[test]
    fn matching_key_is_accepted() {
        assert!(verify_api_key(&headers_with_key("secret123"), "secret123"));
    }

    #[test]
    fn wrong_key_is_rejected() {
        assert!(!verify_api_key(&headers_with_key("secret124"), "secret123"));
        assert!(!verify_api_key(&headers_with_key("secret"), "secret123"));
    }

    #[test]
    fn missing_header_is_rejected() {
        assert!(!verify_api_key(&HeaderMap::new(), "secret123"));
    }

    #[test]
    fn constant_time_eq_handles_empty_inputs() {
        assert!(constant_time_eq(b"", b""));
        assert!(!constant_time_eq(b"", b"a"));
    }
}

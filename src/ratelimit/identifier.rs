//! Client identifier extraction.

use axum::http::HeaderMap;

/// Header carrying the client address chain set by the fronting proxy.
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Identifier shared by every request whose address cannot be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derive the rate limit identifier for a request.
///
/// This is the first entry of `x-forwarded-for`, which is the original client
/// as reported by the proxy. Requests without a usable header all land in the
/// [`UNKNOWN_CLIENT`] bucket. The value is not validated as an address.
pub fn client_identifier(headers: &HeaderMap) -> String {
    headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

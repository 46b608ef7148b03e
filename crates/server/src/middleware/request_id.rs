//! Request correlation IDs.
//!
//! Each request carries an `x-request-id`: the caller's own when it looks like
//! an identifier, a fresh UUID v4 otherwise. The ID lands on the request span,
//! the Sentry scope and the response.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request ID we accept before generating our own.
const MAX_REQUEST_ID_LEN: usize = 128;

/// A validated request ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// Reuse the caller's ID from `headers`, or generate one.
    ///
    /// Upstream IDs are only trusted when short and made of
    /// `[A-Za-z0-9._:-]`, so they can't forge log fields or bloat headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|id| is_acceptable(id))
            .map_or_else(Self::generate, |id| Self(id.to_owned()))
    }

    /// A new random ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_acceptable(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':'))
}

/// Assigns a [`RequestId`] to every request and echoes it on the response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = RequestId::from_headers(request.headers());

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", request_id.as_str());
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(id) {
            headers.insert(REQUEST_ID_HEADER, value);
        }
        headers
    }

    fn is_generated(id: &RequestId) -> bool {
        Uuid::parse_str(id.as_str()).is_ok()
    }

    #[test]
    fn test_upstream_id_is_reused() {
        let id = RequestId::from_headers(&headers_with("cf-8a1b:edge_2.lhr"));
        assert_eq!(id.as_str(), "cf-8a1b:edge_2.lhr");
    }

    #[test]
    fn test_missing_id_is_generated() {
        assert!(is_generated(&RequestId::from_headers(&HeaderMap::new())));
    }

    #[test]
    fn test_oversized_id_is_replaced() {
        let long = "a".repeat(MAX_REQUEST_ID_LEN + 1);
        assert!(is_generated(&RequestId::from_headers(&headers_with(&long))));

        let max = "a".repeat(MAX_REQUEST_ID_LEN);
        assert_eq!(RequestId::from_headers(&headers_with(&max)).as_str(), max);
    }

    #[test]
    fn test_id_with_unexpected_characters_is_replaced() {
        for id in ["", "req 1", "req=1\" user_id=x", "req/1"] {
            assert!(
                is_generated(&RequestId::from_headers(&headers_with(id))),
                "{id:?} should be replaced"
            );
        }
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }
}

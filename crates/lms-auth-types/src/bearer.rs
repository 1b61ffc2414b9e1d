//! `Authorization: Bearer <token>` header parsing.

use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use http::HeaderMap;

/// Return the raw bearer token, or `None` when the header is absent, uses
/// another scheme, or carries an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth = headers.typed_get::<Authorization<Bearer>>()?;
    let token = auth.token().trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_owned())
}

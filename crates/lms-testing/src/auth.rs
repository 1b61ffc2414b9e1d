//! Bearer-token helpers for HTTP tests.
//!
//! `MockAuth` signs a real token with the given secret so requests pass
//! through the same validation path as production traffic.

use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};

use lms_auth_types::token::issue_token;

/// Identity used to sign test requests.
pub struct MockAuth {
    pub user_id: String,
    pub email: String,
    pub secret: String,
    pub ttl_secs: u64,
}

impl MockAuth {
    pub fn new(user_id: &str, email: &str, secret: &str) -> Self {
        Self {
            user_id: user_id.to_owned(),
            email: email.to_owned(),
            secret: secret.to_owned(),
            ttl_secs: 3600,
        }
    }

    /// Raw signed token.
    pub fn token(&self) -> String {
        issue_token(&self.user_id, &self.email, &self.secret, self.ttl_secs)
            .map(|(token, _)| token)
            .unwrap()
    }

    /// `Authorization: Bearer <token>` header value.
    pub fn authorization(&self) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", self.token())).unwrap()
    }

    /// Headers carrying the bearer token.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, self.authorization());
        map
    }
}

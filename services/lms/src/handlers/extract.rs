//! Request extractors whose rejections render as `LmsError` envelopes.

use std::collections::HashMap;

use axum::extract::{FromRequest, FromRequestParts, Multipart};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use lms_auth_types::bearer::bearer_token;

use crate::domain::types::{Caller, Upload};
use crate::error::LmsError;
use crate::state::AppState;
use crate::usecase::auth::ResolveCallerUseCase;

/// Bearer-authenticated caller, resolved against the user store on every
/// request. Missing, invalid or expired tokens and non-active accounts
/// are rejected with 401.
impl FromRequestParts<AppState> for Caller {
    type Rejection = LmsError;

    // Extract synchronously, then return a `'static` future.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = bearer_token(&parts.headers);
        let usecase = ResolveCallerUseCase {
            users: state.user_repo(),
            jwt_secret: state.jwt_secret.clone(),
        };
        async move { usecase.execute(token.as_deref()).await }
    }
}

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(LmsError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(LmsError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(LmsError))]
pub struct AppQuery<T>(pub T);

/// Fields of a multipart form. Every part except `file` is read as text.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub file: Option<Upload>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, LmsError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();
            if name == "file" {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field.bytes().await?;
                // Browsers send an empty part when no file was picked.
                if !file_name.is_empty() && !bytes.is_empty() {
                    form.file = Some(Upload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            } else {
                let text = field.text().await?;
                form.fields.insert(name, text);
            }
        }
        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    /// Deserialize the JSON document carried in part `name`.
    pub fn json<T: DeserializeOwned>(&self, name: &str) -> Result<T, LmsError> {
        let raw = self
            .fields
            .get(name)
            .ok_or_else(|| LmsError::validation(format!("missing `{name}` part")))?;
        serde_json::from_str(raw)
            .map_err(|e| LmsError::validation(format!("invalid `{name}` part: {e}")))
    }
}

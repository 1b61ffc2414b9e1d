use std::path::{Component, Path, PathBuf};

use anyhow::Context as _;
use uuid::Uuid;

use lms_domain::file::FileCategory;

use crate::domain::repository::FileStore;
use crate::domain::types::{Attachment, StoredFile, Upload};
use crate::error::LmsError;

const URL_PREFIX: &str = "/uploads/";

/// Attachments on the local filesystem, one directory per category:
/// `{root}/{category}/{uuid}_{sanitized name}`.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    pub root: PathBuf,
}

impl FileStore for LocalFileStore {
    async fn save(&self, category: FileCategory, upload: &Upload) -> Result<Attachment, LmsError> {
        let dir = self.root.join(category.dir_name());
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create upload dir {}", dir.display()))?;

        let stored_name = format!("{}_{}", Uuid::new_v4(), sanitize_file_name(&upload.file_name));
        tokio::fs::write(dir.join(&stored_name), &upload.bytes)
            .await
            .context("write upload")?;

        tracing::debug!(%category, file = %stored_name, size = upload.bytes.len(), "stored upload");
        Ok(Attachment {
            name: upload.file_name.clone(),
            size: upload.bytes.len() as i64,
            content_type: upload.content_type.clone(),
            url: format!("{URL_PREFIX}{}/{stored_name}", category.dir_name()),
        })
    }

    async fn remove(&self, url: &str) {
        let Some((category, file_name)) = parse_url(url) else {
            tracing::warn!(url, "refusing to remove file outside upload root");
            return;
        };
        let path = self.root.join(category.dir_name()).join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(url, "removed upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(url, error = %e, "failed to remove upload"),
        }
    }

    async fn open(&self, category: FileCategory, file_name: &str) -> Result<StoredFile, LmsError> {
        let file_name = single_component(file_name)
            .ok_or_else(|| LmsError::validation("invalid file name"))?;
        let path = self.root.join(category.dir_name()).join(file_name);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LmsError::FileNotFound);
            }
            Err(e) => return Err(anyhow::Error::new(e).context("read upload").into()),
        };
        Ok(StoredFile {
            file_name: file_name.to_owned(),
            content_type: content_type_for(file_name).to_owned(),
            bytes: bytes.into(),
        })
    }
}

/// Accept only a single `Normal` path component: no separators, `..`, `.`,
/// or root.
fn single_component(name: &str) -> Option<&str> {
    if name.is_empty() || name.contains('\\') {
        return None;
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) => part.to_str(),
        _ => None,
    }
}

/// Split `/uploads/{category}/{file}` back into its parts.
fn parse_url(url: &str) -> Option<(FileCategory, &str)> {
    let rest = url.strip_prefix(URL_PREFIX)?;
    let (category, file_name) = rest.split_once('/')?;
    let category = category.parse().ok()?;
    Some((category, single_component(file_name)?))
}

/// Keep the base name and replace anything outside `[A-Za-z0-9._-]`.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_owned()
    } else {
        cleaned.to_owned()
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "txt" | "md" => "text/plain; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "zip" => "application/zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => "application/octet-stream",
    }
}

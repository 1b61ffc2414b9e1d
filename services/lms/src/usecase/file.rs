use lms_domain::file::FileCategory;

use crate::domain::repository::FileStore;
use crate::domain::types::StoredFile;
use crate::error::LmsError;

pub struct DownloadFileUseCase<F: FileStore> {
    pub files: F,
}

impl<F: FileStore> DownloadFileUseCase<F> {
    /// `category` is the path segment as received; unknown values are a
    /// validation error, as are file names that are not one plain component.
    pub async fn execute(&self, category: &str, file_name: &str) -> Result<StoredFile, LmsError> {
        let category: FileCategory = category.parse()?;
        self.files.open(category, file_name).await
    }
}

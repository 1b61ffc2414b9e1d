use lms_domain::file::FileCategory;
use lms_server::domain::repository::FileStore;
use lms_server::error::LmsError;
use lms_server::infra::storage::LocalFileStore;
use lms_server::usecase::file::DownloadFileUseCase;

use crate::helpers::upload;

fn temp_store() -> LocalFileStore {
    LocalFileStore {
        root: std::env::temp_dir().join(format!("lms-download-{}", uuid::Uuid::now_v7())),
    }
}

#[tokio::test]
async fn should_download_stored_file_by_category_and_name() {
    let store = temp_store();
    let attachment = store
        .save(FileCategory::Assignments, &upload("brief.pdf", b"%PDF-1.4"))
        .await
        .unwrap();
    let stored_name = attachment.url.rsplit('/').next().unwrap().to_owned();
    let usecase = DownloadFileUseCase {
        files: store.clone(),
    };

    let file = usecase.execute("assignments", &stored_name).await.unwrap();

    assert_eq!(&file.bytes[..], b"%PDF-1.4");
    assert_eq!(file.content_type, "application/pdf");
    let _ = tokio::fs::remove_dir_all(&store.root).await;
}

#[tokio::test]
async fn should_reject_traversal_and_unknown_category() {
    let usecase = DownloadFileUseCase {
        files: temp_store(),
    };

    let traversal = usecase
        .execute("notes", "../../etc/passwd")
        .await
        .unwrap_err();
    let category = usecase.execute("secrets", "a.txt").await.unwrap_err();

    assert!(matches!(traversal, LmsError::Validation(_)));
    assert!(matches!(category, LmsError::Validation(_)));
}

#[tokio::test]
async fn should_report_missing_file() {
    let usecase = DownloadFileUseCase {
        files: temp_store(),
    };
    let err = usecase
        .execute("submissions", "nothing-here.txt")
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::FileNotFound));
}

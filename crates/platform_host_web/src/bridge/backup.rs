use platform_host::{ExportFileReply, ExportFileRequest, ImportFileReply};

pub(crate) async fn export_file(
    filename: &str,
    content: &str,
) -> Result<ExportFileReply, String> {
    let request = ExportFileRequest {
        content: content.to_string(),
        filename: filename.to_string(),
    };
    super::interop::backup_export_file(&request).await
}

pub(crate) async fn import_file() -> Result<ImportFileReply, String> {
    super::interop::backup_import_file().await
}

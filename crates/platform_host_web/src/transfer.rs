//! Backup sinks and sources for the browser and the desktop host.

use platform_host::{BackupError, BackupFuture, BackupSink, BackupSource, SinkReceipt, SourceReceipt};

#[derive(Debug, Clone, Copy, Default)]
/// Sink that hands the backup to the browser as a file download.
pub struct WebDownloadSink;

impl WebDownloadSink {
    /// Triggers a download of `contents` named `file_name`.
    ///
    /// # Errors
    ///
    /// Returns an error when the document or object URL APIs are unavailable.
    pub fn download(self, file_name: &str, contents: &str) -> Result<(), BackupError> {
        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::{JsCast, JsValue};

            let fail = |what: &str, err: JsValue| BackupError::Sink(format!("{what}: {err:?}"));
            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or_else(|| BackupError::Unsupported("no browser document available".into()))?;

            let parts = js_sys::Array::of1(&JsValue::from_str(contents));
            let options = web_sys::BlobPropertyBag::new();
            options.set_type("application/json");
            let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)
                .map_err(|e| fail("failed to create backup blob", e))?;
            let url = web_sys::Url::create_object_url_with_blob(&blob)
                .map_err(|e| fail("failed to create download URL", e))?;

            let anchor = document
                .create_element("a")
                .map_err(|e| fail("failed to create download link", e))?
                .dyn_into::<web_sys::HtmlAnchorElement>()
                .map_err(|e| fail("download link has unexpected type", e.into()))?;
            anchor.set_href(&url);
            anchor.set_download(file_name);
            anchor.click();
            let _ = web_sys::Url::revoke_object_url(&url);
            Ok(())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (file_name, contents);
            Err(BackupError::Unsupported(
                "file downloads require a browser runtime".to_string(),
            ))
        }
    }
}

impl BackupSink for WebDownloadSink {
    fn save_backup<'a>(
        &'a self,
        file_name: &'a str,
        contents: &'a str,
    ) -> BackupFuture<'a, Result<SinkReceipt, BackupError>> {
        let sink = *self;
        Box::pin(async move {
            sink.download(file_name, contents)?;
            Ok(SinkReceipt::Saved { path: None })
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Browser import source; restoring requires the desktop host's file dialog.
pub struct WebBackupSource;

impl BackupSource for WebBackupSource {
    fn open_backup<'a>(&'a self) -> BackupFuture<'a, Result<SourceReceipt, BackupError>> {
        Box::pin(async {
            Err(BackupError::Unsupported(
                "Restoring a backup is only available in the desktop app".to_string(),
            ))
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Sink that asks the desktop host to show a save dialog and write the file.
pub struct TauriBackupSink;

impl BackupSink for TauriBackupSink {
    fn save_backup<'a>(
        &'a self,
        file_name: &'a str,
        contents: &'a str,
    ) -> BackupFuture<'a, Result<SinkReceipt, BackupError>> {
        Box::pin(async move {
            let reply = crate::bridge::export_file(file_name, contents)
                .await
                .map_err(BackupError::Sink)?;
            match (reply.success, reply.error) {
                (true, _) => Ok(SinkReceipt::Saved { path: reply.path }),
                (false, Some(error)) => Err(BackupError::Sink(error)),
                (false, None) => Ok(SinkReceipt::Cancelled),
            }
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Source that asks the desktop host to show an open dialog and read the file.
pub struct TauriBackupSource;

impl BackupSource for TauriBackupSource {
    fn open_backup<'a>(&'a self) -> BackupFuture<'a, Result<SourceReceipt, BackupError>> {
        Box::pin(async {
            let reply = crate::bridge::import_file()
                .await
                .map_err(BackupError::Source)?;
            match (reply.success, reply.content, reply.error) {
                (true, Some(content), _) => Ok(SourceReceipt::Opened(content)),
                (true, None, _) => Err(BackupError::Source(
                    "host returned no file contents".to_string(),
                )),
                (false, _, Some(error)) => Err(BackupError::Source(error)),
                (false, _, None) => Ok(SourceReceipt::Cancelled),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_transfers_report_missing_runtime() {
        assert!(matches!(
            block_on(WebDownloadSink.save_backup("b.json", "{}")).expect_err("no browser"),
            BackupError::Unsupported(_)
        ));
        assert!(matches!(
            block_on(WebBackupSource.open_backup()).expect_err("browser import"),
            BackupError::Unsupported(_)
        ));
        assert!(matches!(
            block_on(TauriBackupSink.save_backup("b.json", "{}")).expect_err("no bridge"),
            BackupError::Sink(_)
        ));
        assert!(matches!(
            block_on(TauriBackupSource.open_backup()).expect_err("no bridge"),
            BackupError::Source(_)
        ));
    }
}

//! Native save/open dialogs for backup export and import.

use desktop_store::{read_backup_file, write_backup_file};
use platform_host::{ExportFileReply, ImportFileReply};
use tauri_plugin_dialog::{DialogExt, FilePath};
use tracing::{info, warn};

const BACKUP_FILTER_NAME: &str = "EduGen Backup";
const BACKUP_EXTENSIONS: &[&str] = &["json"];

fn into_path(file: FilePath) -> Result<std::path::PathBuf, String> {
    file.into_path()
        .map_err(|err| format!("unsupported backup location: {err}"))
}

/// Shows a save dialog and writes `content` to the chosen file.
#[tauri::command]
pub async fn backup_export_file(
    app: tauri::AppHandle,
    content: String,
    filename: String,
) -> ExportFileReply {
    let Some(file) = app
        .dialog()
        .file()
        .set_file_name(&filename)
        .add_filter(BACKUP_FILTER_NAME, BACKUP_EXTENSIONS)
        .blocking_save_file()
    else {
        info!("backup export cancelled");
        return ExportFileReply {
            success: false,
            path: None,
            error: None,
        };
    };

    let written = into_path(file).and_then(|path| {
        write_backup_file(&path, &content)
            .map(|()| path)
            .map_err(|err| err.to_string())
    });
    match written {
        Ok(path) => ExportFileReply {
            success: true,
            path: Some(path.display().to_string()),
            error: None,
        },
        Err(error) => {
            warn!(error = %error, "backup export failed");
            ExportFileReply {
                success: false,
                path: None,
                error: Some(error),
            }
        }
    }
}

/// Shows an open dialog and returns the chosen file's text.
#[tauri::command]
pub async fn backup_import_file(app: tauri::AppHandle) -> ImportFileReply {
    let Some(file) = app
        .dialog()
        .file()
        .add_filter(BACKUP_FILTER_NAME, BACKUP_EXTENSIONS)
        .blocking_pick_file()
    else {
        info!("backup import cancelled");
        return ImportFileReply {
            success: false,
            content: None,
            error: None,
        };
    };

    let read = into_path(file)
        .and_then(|path| read_backup_file(&path).map_err(|err| err.to_string()));
    match read {
        Ok(content) => ImportFileReply {
            success: true,
            content: Some(content),
            error: None,
        },
        Err(error) => {
            warn!(error = %error, "backup import failed");
            ImportFileReply {
                success: false,
                content: None,
                error: Some(error),
            }
        }
    }
}

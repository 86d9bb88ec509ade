//! Link backup written before any download starts.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fs::naming::backup_file_name;

/// Write `links` to `output_dir/links-<unix time>-<count>_videos.txt`.
///
/// The directory is created if needed. An existing file with the same name is
/// never overwritten.
pub fn write_link_backup(links: &[String], output_dir: &Path) -> Result<PathBuf> {
    let timestamp = chrono::Utc::now().timestamp();
    write_link_backup_at(links, output_dir, timestamp)
}

/// Write the backup using an explicit timestamp.
pub fn write_link_backup_at(links: &[String], output_dir: &Path, timestamp: i64) -> Result<PathBuf> {
    let path = output_dir.join(backup_file_name(timestamp, links.len()));
    let backup_err = |source| Error::BackupIo {
        path: path.display().to_string(),
        source,
    };

    std::fs::create_dir_all(output_dir).map_err(backup_err)?;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(backup_err)?;
    file.write_all(links.join("\n").as_bytes())
        .map_err(backup_err)?;
    file.sync_all().map_err(backup_err)?;

    tracing::info!("Saved {} links to {}", links.len(), path.display());

    Ok(path)
}

//! Filename generation for downloaded media and link backups.

use std::path::Path;

/// Longest title kept in a filename, in bytes.
const MAX_TITLE_BYTES: usize = 120;

/// yt-dlp output template under `output_dir`.
///
/// Upload date and id keep two posts with the same title apart.
pub fn output_template(output_dir: &Path) -> String {
    output_dir
        .join(format!(
            "%(title).{}B [%(upload_date)s] [%(id)s].%(ext)s",
            MAX_TITLE_BYTES
        ))
        .to_string_lossy()
        .into_owned()
}

/// Name of the link backup file for a run.
pub fn backup_file_name(timestamp: i64, count: usize) -> String {
    format!("links-{}-{}_videos.txt", timestamp, count)
}

/// File name for a video resolved from an external-host page.
///
/// `<uploader> - <title>.mp4`, with path separators replaced and line breaks
/// removed so the name stays a single path component.
pub fn external_file_name(uploader: &str, title: &str) -> String {
    format!(
        "{} - {}.mp4",
        clean_component(uploader),
        clean_component(title)
    )
}

fn clean_component(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

use std::path::{Path, PathBuf};

use super::{models::PLAYLIST_HEADER, PlaylistEntry, PlaylistError};

const VALIDATED_SUFFIX: &str = "_validated";

pub fn render_playlist(entries: &[PlaylistEntry]) -> String {
    let mut output = String::with_capacity(entries.len() * 128 + PLAYLIST_HEADER.len() + 1);
    output.push_str(PLAYLIST_HEADER);
    output.push('\n');
    for entry in entries {
        output.push_str(&entry.extinf);
        output.push('\n');
        for tag in &entry.tags {
            output.push_str(tag);
            output.push('\n');
        }
        output.push_str(&entry.url);
        output.push('\n');
    }
    output
}

/// Replaces the file at `path` with the rendered playlist.
pub async fn write_playlist(path: &Path, entries: &[PlaylistEntry]) -> Result<(), PlaylistError> {
    tokio::fs::write(path, render_playlist(entries))
        .await
        .map_err(|source| PlaylistError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// `Romania.m3u` becomes `Romania_validated.m3u`, next to the input.
pub fn validated_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = input
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_else(|| "m3u".to_string());
    input.with_file_name(format!("{stem}{VALIDATED_SUFFIX}.{extension}"))
}

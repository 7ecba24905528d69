use std::path::Path;

use super::{models::PLAYLIST_HEADER, PlaylistEntry, PlaylistError};

const EXTINF_PREFIX: &str = "#EXTINF";

#[derive(Default)]
struct PendingEntry {
    extinf: Option<String>,
    tags: Vec<String>,
}

impl PendingEntry {
    fn finish(&mut self, url: &str) -> Option<PlaylistEntry> {
        let pending = std::mem::take(self);
        pending.extinf.map(|extinf| PlaylistEntry {
            extinf,
            tags: pending.tags,
            url: url.to_string(),
        })
    }
}

/// Splits M3U text into entries, in file order.
///
/// A URL line only produces an entry when an `#EXTINF` line was seen since the
/// previous URL line; either way the pending metadata is reset.
pub fn parse_playlist(content: &str) -> Vec<PlaylistEntry> {
    let mut entries = Vec::new();
    let mut pending = PendingEntry::default();

    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(PLAYLIST_HEADER) {
            continue;
        }
        if line.starts_with(EXTINF_PREFIX) {
            pending.extinf = Some(line.to_string());
        } else if line.starts_with('#') {
            pending.tags.push(line.to_string());
        } else if let Some(entry) = pending.finish(line) {
            entries.push(entry);
        }
    }

    entries
}

pub async fn read_playlist(path: &Path) -> Result<Vec<PlaylistEntry>, PlaylistError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PlaylistError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(parse_playlist(&content))
}

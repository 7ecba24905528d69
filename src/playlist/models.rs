use serde::Serialize;

pub const PLAYLIST_HEADER: &str = "#EXTM3U";

/// One playable item of an M3U playlist.
///
/// `extinf` holds the full `#EXTINF` line, `tags` every other directive seen
/// between it and the URL line, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistEntry {
    pub extinf: String,
    pub tags: Vec<String>,
    pub url: String,
}

impl PlaylistEntry {
    pub fn new(extinf: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            extinf: extinf.into(),
            tags: Vec::new(),
            url: url.into(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Display title, the text after the first unquoted comma of the EXTINF line.
    pub fn title(&self) -> &str {
        let mut in_quotes = false;
        for (idx, ch) in self.extinf.char_indices() {
            match ch {
                '"' => in_quotes = !in_quotes,
                ',' if !in_quotes => return self.extinf[idx + 1..].trim(),
                _ => {}
            }
        }
        ""
    }
}

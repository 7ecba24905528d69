use std::collections::HashSet;

use serde::Serialize;

use crate::playlist::{ExtinfBuilder, PlaylistEntry};

/// A station as gathered from a directory, ready to become one playlist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationRecord {
    pub title: String,
    #[serde(rename = "streamUrl")]
    pub stream_url: String,
    #[serde(rename = "logoUrl")]
    pub logo_url: String,
    pub group: String,
    /// Adds the `radio="true"` attribute some players use to pick an audio view.
    pub radio: bool,
}

impl StationRecord {
    pub fn to_entry(&self) -> PlaylistEntry {
        let mut extinf = ExtinfBuilder::new().attribute("group-title", &self.group);
        if self.radio {
            extinf = extinf.attribute("radio", "true");
        }
        let extinf = extinf
            .attribute("tvg-logo", &self.logo_url)
            .build(&self.title);
        PlaylistEntry::new(extinf, self.stream_url.clone())
    }
}

/// Keeps the first record for every `(title, stream_url)` pair, then sorts by title.
pub fn unique_sorted_by_title(records: Vec<StationRecord>) -> Vec<StationRecord> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut unique: Vec<StationRecord> = records
        .into_iter()
        .filter(|record| seen.insert((record.title.clone(), record.stream_url.clone())))
        .collect();
    unique.sort_by(|a, b| a.title.cmp(&b.title));
    unique
}

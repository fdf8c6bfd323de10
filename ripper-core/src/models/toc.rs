use serde::{Deserialize, Serialize};

/// One track as listed in the disc's table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEntry {
    pub id: u32,
    pub duration_secs: u32,
}

/// Table of contents read once per disc insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOfContents {
    pub duration_secs: u32,
    pub entries: Vec<TrackEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cddb_id: Option<String>,
}

impl TableOfContents {
    /// Builds a table of contents whose total duration is the sum of its tracks.
    pub fn from_entries(entries: Vec<TrackEntry>) -> Self {
        let duration_secs = entries.iter().map(|e| e.duration_secs).sum();
        Self {
            duration_secs,
            entries,
            cddb_id: None,
        }
    }

    pub fn track(&self, id: u32) -> Option<&TrackEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn track_count(&self) -> usize {
        self.entries.len()
    }
}

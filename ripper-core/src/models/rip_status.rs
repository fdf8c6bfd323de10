use serde::{Deserialize, Serialize};

use super::state::RipState;
use super::toc::TableOfContents;

/// Status projection published to observers.
///
/// Mutated only by the engine; observers receive clones. Serializable for
/// JSON export to the remote controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RipStatus {
    pub state: RipState,
    pub message: String,
    pub toc: Option<TableOfContents>,
    /// Track being extracted, or -1 when none.
    pub rip_track: i32,
    /// Extraction progress, 0–100.
    pub progress: u8,
    /// "mm:ss" since the start of the current disc cycle.
    pub time_elapsed: Option<String>,
}

impl RipStatus {
    pub const NO_TRACK: i32 = -1;

    /// Status for a freshly inserted disc.
    pub fn with_toc(toc: TableOfContents) -> Self {
        Self {
            toc: Some(toc),
            ..Self::default()
        }
    }

    /// Marks the start of a track's extraction: progress restarts at 0.
    pub fn begin_track(&mut self, track: u32) {
        self.rip_track = i32::try_from(track).unwrap_or(i32::MAX);
        self.progress = 0;
    }

    /// Records a progress report, keeping progress monotonic within a track.
    ///
    /// Returns `true` if the published value changed.
    pub fn record_progress(&mut self, percent: u8) -> bool {
        let percent = percent.min(100);
        if percent > self.progress {
            self.progress = percent;
            true
        } else {
            false
        }
    }

    /// Clears the track-scoped fields.
    pub fn clear_track(&mut self) {
        self.rip_track = Self::NO_TRACK;
        self.progress = 0;
    }

    /// Clears everything scoped to the disc cycle.
    pub fn clear_cycle(&mut self) {
        self.toc = None;
        self.time_elapsed = None;
        self.clear_track();
    }
}

impl Default for RipStatus {
    fn default() -> Self {
        Self {
            state: RipState::ReadDisc,
            message: RipState::ReadDisc.message().to_string(),
            toc: None,
            rip_track: Self::NO_TRACK,
            progress: 0,
            time_elapsed: None,
        }
    }
}

use serde::{Deserialize, Serialize};

/// Rip orchestration state machine.
///
/// State transitions:
/// ```text
/// ReadDisc → WaitForStart → RipTrack → RipTrackDone → Upload → Complete
///    ↑  ↑          ↑                                            │    │
///    │  │          └───────────────── next track ───────────────┘    │
///    │  └── Finalise ←───────────────────────────────────────────────┘
///    └───── Error ←── any mid-cycle failure
/// ```
///
/// Serialized with the wire labels the remote controller polls for
/// (`READ_DISC`, `WAIT_FOR_START`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RipState {
    ReadDisc,
    WaitForStart,
    RipTrack,
    RipTrackDone,
    Upload,
    Complete,
    Finalise,
    Error,
}

/// Outcome of a state action, fed through [`RipState::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RipEvent {
    /// Table of contents read from a freshly inserted disc.
    TocRead,
    /// A rip command is pending.
    TrackRequested,
    /// Extraction of the requested track finished.
    TrackRipped,
    /// An upload command is pending.
    UploadRequested,
    /// The staged track was accepted by the upload destination.
    Uploaded,
    /// A finalise command is pending.
    FinaliseRequested,
    /// The disc was ejected at the end of the cycle.
    Ejected,
    /// Error recovery finished (eject attempted, session reset).
    Recovered,
    /// Any mid-cycle failure: disc removed, extraction or upload failure,
    /// eject failure, cancellation.
    Failed,
}

impl RipState {
    /// All states, in cycle order.
    pub const ALL: [RipState; 8] = [
        RipState::ReadDisc,
        RipState::WaitForStart,
        RipState::RipTrack,
        RipState::RipTrackDone,
        RipState::Upload,
        RipState::Complete,
        RipState::Finalise,
        RipState::Error,
    ];

    /// The transition table. Returns `None` when `event` has no meaning in
    /// this state.
    pub fn next(self, event: RipEvent) -> Option<RipState> {
        use RipEvent as E;
        use RipState as S;

        match (self, event) {
            (S::ReadDisc, E::TocRead) => Some(S::WaitForStart),
            (S::WaitForStart, E::TrackRequested) => Some(S::RipTrack),
            (S::RipTrack, E::TrackRipped) => Some(S::RipTrackDone),
            (S::RipTrackDone, E::UploadRequested) => Some(S::Upload),
            (S::Upload, E::Uploaded) => Some(S::Complete),
            (S::Complete, E::TrackRequested) => Some(S::WaitForStart),
            (S::Complete, E::FinaliseRequested) => Some(S::Finalise),
            (S::Finalise, E::Ejected) => Some(S::ReadDisc),
            (S::Error, E::Recovered) => Some(S::ReadDisc),
            // A failed table-of-contents read is retried in place.
            (S::ReadDisc | S::Error, E::Failed) => None,
            (_, E::Failed) => Some(S::Error),
            _ => None,
        }
    }

    /// Human-readable name used as the status message.
    pub fn message(self) -> &'static str {
        match self {
            Self::ReadDisc => "Reading disc",
            Self::WaitForStart => "Wait for start",
            Self::RipTrack => "Ripping track",
            Self::RipTrackDone => "Rip done",
            Self::Upload => "Upload",
            Self::Complete => "Complete",
            Self::Finalise => "Finalise",
            Self::Error => "Error",
        }
    }

    /// Whether a rip command may be recorded in this state.
    pub fn accepts_rip(self) -> bool {
        matches!(self, Self::WaitForStart | Self::Complete)
    }

    pub fn accepts_upload(self) -> bool {
        matches!(self, Self::RipTrackDone)
    }

    pub fn accepts_finalise(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl std::fmt::Display for RipState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

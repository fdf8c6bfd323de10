use parking_lot::Mutex;
use ripper_core::{RipStatus, StatusSink};

/// Publishes status by logging it as JSON and keeping the latest snapshot.
///
/// State changes log at info; progress refreshes within a state at debug.
#[derive(Default)]
pub struct LogStatusSink {
    last: Mutex<Option<RipStatus>>,
}

impl LogStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently published status, if any.
    pub fn last(&self) -> Option<RipStatus> {
        self.last.lock().clone()
    }
}

impl StatusSink for LogStatusSink {
    fn publish(&self, status: &RipStatus) {
        let json = match serde_json::to_string(status) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize status: {}", e);
                return;
            }
        };

        let previous = self.last.lock().replace(status.clone());
        let state_changed = previous.map_or(true, |p| p.state != status.state);
        if state_changed {
            log::info!("Status: {}", json);
        } else {
            log::debug!("Status: {}", json);
        }
    }
}

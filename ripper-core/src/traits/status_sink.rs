use crate::models::rip_status::RipStatus;

/// Receiver of status pushes.
///
/// Called once per state transition and whenever the projection otherwise
/// changes (progress, one-time cleanup). Called from the heartbeat thread or
/// from an extraction worker, never while engine locks are held.
pub trait StatusSink: Send + Sync {
    fn publish(&self, status: &RipStatus);
}

impl<F> StatusSink for F
where
    F: Fn(&RipStatus) + Send + Sync,
{
    fn publish(&self, status: &RipStatus) {
        self(status)
    }
}

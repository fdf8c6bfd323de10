use crate::models::error::CommandError;
use crate::models::rip_status::RipStatus;

/// Command surface of a rip session, as seen by a remote controller.
///
/// Every command only records intent; the engine's tick carries it out.
/// Safe to call from any thread.
pub trait RipController: Send + Sync {
    /// Current status projection. No side effects.
    fn status(&self) -> RipStatus;

    /// Rip `track` into `<output_name>.wav`. Accepted in WaitForStart and Complete.
    fn request_rip(&self, track: u32, output_name: &str) -> Result<(), CommandError>;

    /// Upload the ripped track. Accepted in RipTrackDone.
    fn request_upload(&self) -> Result<(), CommandError>;

    /// Eject and start a new disc cycle. Accepted in Complete.
    fn request_finalise(&self) -> Result<(), CommandError>;

    /// Abandon the current cycle at the next safe checkpoint. Idempotent.
    fn cancel(&self);
}

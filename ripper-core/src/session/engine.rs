use std::io::{ErrorKind, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::models::error::{CommandError, RipError};
use crate::models::rip_status::RipStatus;
use crate::models::session::SessionContext;
use crate::models::staged_track::{StagedTrack, TrackIntent};
use crate::models::state::{RipEvent, RipState};
use crate::processing::elapsed::format_elapsed;
use crate::session::job::Job;
use crate::storage::staging::StagingDirectory;
use crate::storage::track_writer::TrackFileWriter;
use crate::traits::disc_device::{DiscDevice, ProgressCallback, RipProgress};
use crate::traits::rip_controller::RipController;
use crate::traits::status_sink::StatusSink;
use crate::traits::upload_transport::{UploadRequest, UploadTransport};

/// Bytes pulled from the drive between cancellation checkpoints (16 CD sectors).
const EXTRACTION_CHUNK_SIZE: usize = 2352 * 16;

/// Internal mutable engine state, protected by `parking_lot::Mutex`.
///
/// Commands write the request fields; only the tick reads them and moves
/// `state`.
struct EngineState {
    state: RipState,
    status: RipStatus,
    intent: Option<TrackIntent>,
    upload_requested: bool,
    finalise_requested: bool,
    /// One-time cleanup on arrival in Complete has run.
    settled: bool,
    /// An eject was already issued in this disc cycle.
    eject_issued: bool,
    staged: Option<StagedTrack>,
    cycle_start: Instant,
}

impl EngineState {
    fn new() -> Self {
        Self {
            state: RipState::ReadDisc,
            status: RipStatus::default(),
            intent: None,
            upload_requested: false,
            finalise_requested: false,
            settled: false,
            eject_issued: false,
            staged: None,
            cycle_start: Instant::now(),
        }
    }

    fn elapsed(&self) -> String {
        format_elapsed(self.cycle_start.elapsed())
    }
}

/// Rip orchestration engine.
///
/// Generic over the drive and the upload transport. An external heartbeat
/// calls [`tick`](Self::tick); commands from the [`RipController`] surface
/// only record intent and are acted upon by the next tick.
///
/// ```text
/// heartbeat ─tick()─→ [state action] ─event─→ RipState::next ─→ StatusSink
///                        │      ↑
///                  spawn │      │ poll
///                        ↓      │
///              [extraction / upload worker]
/// remote ─request_*()─→ intent fields (read by the next tick)
/// ```
///
/// Extraction and upload run on worker threads so a tick never blocks on
/// them; table-of-contents reads and ejects run inline.
pub struct RipEngine<D: DiscDevice + 'static, U: UploadTransport + 'static> {
    context: SessionContext,
    staging: StagingDirectory,
    device: Arc<Mutex<D>>,
    transport: Arc<U>,
    shared: Arc<Mutex<EngineState>>,
    sink: Option<Arc<dyn StatusSink>>,

    // Cooperative cancellation, observed by workers and idle states
    abort: Arc<AtomicBool>,

    // Background work, only touched under `tick_guard`
    extraction: Mutex<Option<Job<StagedTrack>>>,
    upload: Mutex<Option<Job<()>>>,

    tick_guard: Mutex<()>,
}

impl<D: DiscDevice + 'static, U: UploadTransport + 'static> RipEngine<D, U> {
    /// Create an engine in `ReadDisc`, creating and emptying the staging directory.
    pub fn new(context: SessionContext, device: D, transport: U) -> Result<Self, RipError> {
        context.validate().map_err(RipError::Configuration)?;

        let staging = StagingDirectory::create(&context.staging_dir)?;
        staging.clear()?;

        Ok(Self {
            context,
            staging,
            device: Arc::new(Mutex::new(device)),
            transport: Arc::new(transport),
            shared: Arc::new(Mutex::new(EngineState::new())),
            sink: None,
            abort: Arc::new(AtomicBool::new(false)),
            extraction: Mutex::new(None),
            upload: Mutex::new(None),
            tick_guard: Mutex::new(()),
        })
    }

    pub fn set_status_sink(&mut self, sink: Arc<dyn StatusSink>) {
        self.sink = Some(sink);
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn staging(&self) -> &StagingDirectory {
        &self.staging
    }

    pub fn state(&self) -> RipState {
        self.shared.lock().state
    }

    /// Whether an extraction or upload worker is in flight.
    pub fn is_busy(&self) -> bool {
        self.extraction.lock().is_some() || self.upload.lock().is_some()
    }

    /// Run the current state's action.
    ///
    /// Never fails: errors become transitions to `Error` and are visible
    /// through the status and the log. Overlapping calls are skipped.
    pub fn tick(&self) {
        let Some(_guard) = self.tick_guard.try_lock() else {
            log::warn!("Tick already in progress, skipping overlapping heartbeat");
            return;
        };

        let state = self.state();
        match state {
            RipState::ReadDisc => self.read_disc(),
            RipState::WaitForStart => self.wait_for_start(),
            RipState::RipTrack => self.rip_track(),
            RipState::RipTrackDone => self.rip_track_done(),
            RipState::Upload => self.upload(),
            RipState::Complete => self.complete(),
            RipState::Finalise => self.finalise(),
            RipState::Error => self.recover(),
        }
    }

    /// Cancel and wait for any in-flight worker. Used by hosts on shutdown,
    /// after their heartbeat has stopped.
    pub fn shutdown(&self) {
        let _guard = self.tick_guard.lock();
        self.cancel();

        if let Some(job) = self.extraction.lock().take() {
            if let Err(e) = job.wait() {
                log::debug!("Extraction ended on shutdown: {}", e);
            }
        }
        if let Some(job) = self.upload.lock().take() {
            if let Err(e) = job.wait() {
                log::debug!("Upload ended on shutdown: {}", e);
            }
        }
    }

    // --- State actions ---

    fn read_disc(&self) {
        // Nothing is in flight yet, so there is nothing to cancel.
        self.abort.store(false, Ordering::SeqCst);

        let toc = self.device.lock().table_of_contents();
        match toc {
            Ok(toc) => {
                log::info!(
                    "Read table of contents: {} tracks, {}s",
                    toc.track_count(),
                    toc.duration_secs
                );
                {
                    let mut s = self.shared.lock();
                    s.cycle_start = Instant::now();
                    s.eject_issued = false;
                    s.status = RipStatus::with_toc(toc);
                }
                self.transition(RipEvent::TocRead);
            }
            Err(e) => {
                log::debug!("No readable disc, retrying on next tick: {}", e);
                let mut s = self.shared.lock();
                s.cycle_start = Instant::now();
                s.status = RipStatus::default();
            }
        }
    }

    fn wait_for_start(&self) {
        if !self.check_idle() {
            return;
        }
        let requested = self.shared.lock().intent.is_some();
        if requested {
            self.transition(RipEvent::TrackRequested);
        }
    }

    fn rip_track(&self) {
        let mut slot = self.extraction.lock();
        if slot.is_none() {
            match self.start_extraction() {
                Ok(job) => *slot = Some(job),
                Err(e) => {
                    drop(slot);
                    self.fail(e);
                }
            }
            return;
        }

        let finished = slot.as_mut().and_then(Job::try_finish);
        let Some(result) = finished else {
            return;
        };
        *slot = None;
        drop(slot);

        match result {
            Ok(staged) => {
                log::info!(
                    "Ripped track [{}] to {} ({} bytes, sha256 {})",
                    staged.track,
                    staged.file_path.display(),
                    staged.size_bytes,
                    staged.checksum
                );
                self.transition_with(RipEvent::TrackRipped, None, |s| {
                    s.intent = None;
                    s.staged = Some(staged);
                });
            }
            Err(e) => self.fail(e),
        }
    }

    fn rip_track_done(&self) {
        if !self.check_idle() {
            return;
        }
        let requested = self.shared.lock().upload_requested;
        if requested {
            self.transition_with(RipEvent::UploadRequested, None, |s| s.upload_requested = false);
        }
    }

    fn upload(&self) {
        let mut slot = self.upload.lock();
        if slot.is_none() {
            match self.start_upload() {
                Ok(job) => *slot = Some(job),
                Err(e) => {
                    drop(slot);
                    self.fail(e);
                }
            }
            return;
        }

        let finished = slot.as_mut().and_then(Job::try_finish);
        let Some(result) = finished else {
            return;
        };
        *slot = None;
        drop(slot);

        match result {
            Ok(()) => {
                self.transition(RipEvent::Uploaded);
            }
            Err(e) => self.fail(e),
        }
    }

    fn complete(&self) {
        if !self.check_idle() {
            return;
        }

        let settled = {
            let mut s = self.shared.lock();
            if s.settled {
                None
            } else {
                s.settled = true;
                s.status.clear_track();
                Some(s.status.clone())
            }
        };
        if let Some(status) = settled {
            self.notify(&status);
            return;
        }

        let (rip, finalise) = {
            let s = self.shared.lock();
            (s.intent.is_some(), s.finalise_requested)
        };
        if finalise {
            self.transition_with(RipEvent::FinaliseRequested, None, |s| s.finalise_requested = false);
        } else if rip {
            self.transition(RipEvent::TrackRequested);
        }
    }

    fn finalise(&self) {
        match self.eject() {
            Ok(()) => {
                self.reset();
                self.transition(RipEvent::Ejected);
            }
            Err(e) => self.fail(e),
        }
    }

    fn recover(&self) {
        let eject_issued = self.shared.lock().eject_issued;
        if !eject_issued {
            if let Err(e) = self.eject() {
                log::warn!("Eject failed during error recovery: {}", e);
            }
        }
        self.reset();
        self.transition(RipEvent::Recovered);
    }

    // --- Workers ---

    fn start_extraction(&self) -> Result<Job<StagedTrack>, RipError> {
        let intent = self
            .shared
            .lock()
            .intent
            .clone()
            .ok_or_else(|| RipError::Extraction("no track requested".into()))?;

        // Only the in-flight track may occupy the staging directory.
        self.staging.clear()?;

        let status = {
            let mut s = self.shared.lock();
            s.staged = None;
            s.status.begin_track(intent.track);
            let elapsed = s.elapsed();
            s.status.time_elapsed = Some(elapsed);
            s.status.clone()
        };
        self.notify(&status);

        log::info!("Starting rip on track [{}]", intent.track);

        let target = self.staging.file_path(&intent.file_name());
        let device = Arc::clone(&self.device);
        let abort = Arc::clone(&self.abort);
        let fault = Arc::new(Mutex::new(None));
        let progress = self.progress_relay(Arc::clone(&fault));

        Job::spawn("rip-extraction", move || {
            let mut device = device.lock();
            let result = extract_track(&mut *device, &intent, target, &abort, &fault, progress);
            if result.is_err() {
                device.cancel();
            }
            result
        })
    }

    /// Progress events from the drive, relayed into the status projection.
    fn progress_relay(&self, fault: Arc<Mutex<Option<String>>>) -> ProgressCallback {
        let shared = Arc::clone(&self.shared);
        let sink = self.sink.clone();

        Arc::new(move |event: RipProgress| match event {
            RipProgress::Percent(percent) => {
                let status = {
                    let mut s = shared.lock();
                    if !s.status.record_progress(percent) {
                        return;
                    }
                    let elapsed = s.elapsed();
                    s.status.time_elapsed = Some(elapsed);
                    s.status.clone()
                };
                if let Some(ref sink) = sink {
                    sink.publish(&status);
                }
            }
            RipProgress::Error(message) => {
                log::error!("Drive reported an extraction error: {}", message);
                let mut fault = fault.lock();
                if fault.is_none() {
                    *fault = Some(message);
                }
            }
        })
    }

    fn start_upload(&self) -> Result<Job<()>, RipError> {
        if !self.disc_present() {
            return Err(RipError::DiscAbsent);
        }
        if self.abort.load(Ordering::SeqCst) {
            return Err(RipError::Aborted);
        }

        let staged = self
            .shared
            .lock()
            .staged
            .clone()
            .ok_or_else(|| RipError::Storage("no staged track to upload".into()))?;

        let request = UploadRequest {
            destination: self.context.upload_address.clone(),
            session_id: self.context.session_id.clone(),
            system_id: self.context.system_id.clone(),
            file_name: staged.file_name.clone(),
            file_size: staged.size_bytes,
            file_path: staged.file_path.clone(),
        };
        log::info!(
            "Uploading track [{}] as {} ({} bytes)",
            staged.track,
            request.file_name,
            request.file_size
        );

        let transport = Arc::clone(&self.transport);
        let abort = Arc::clone(&self.abort);

        Job::spawn("rip-upload", move || {
            transport.upload(&request)?;
            if abort.load(Ordering::SeqCst) {
                return Err(RipError::Aborted);
            }
            Ok(())
        })
    }

    // --- Internal helpers ---

    fn disc_present(&self) -> bool {
        self.device.lock().is_disc_present()
    }

    /// Disc-presence and cancellation checks shared by the idle states.
    /// Returns `false` after failing the cycle.
    fn check_idle(&self) -> bool {
        if !self.disc_present() {
            self.fail(RipError::DiscAbsent);
            return false;
        }
        if self.abort.load(Ordering::SeqCst) {
            self.fail(RipError::Aborted);
            return false;
        }
        true
    }

    fn eject(&self) -> Result<(), RipError> {
        self.shared.lock().eject_issued = true;
        log::info!("Ejecting disc");
        self.device.lock().eject()
    }

    /// Empty the staging directory and drop everything scoped to the disc cycle.
    fn reset(&self) {
        if let Err(e) = self.staging.clear() {
            log::warn!("Failed to empty staging directory: {}", e);
        }
        self.abort.store(false, Ordering::SeqCst);

        let mut s = self.shared.lock();
        s.intent = None;
        s.staged = None;
        s.upload_requested = false;
        s.finalise_requested = false;
        s.status.clear_cycle();
    }

    fn fail(&self, error: RipError) {
        log::error!("An error occurred in state [{}]: {}", self.state(), error);
        self.transition_with(RipEvent::Failed, Some(error.to_string()), |_| {});
    }

    fn transition(&self, event: RipEvent) -> bool {
        self.transition_with(event, None, |_| {})
    }

    /// Feed `event` through the transition table. On a valid transition,
    /// applies `update` under the same lock, refreshes the status and
    /// publishes it once.
    fn transition_with<F>(&self, event: RipEvent, detail: Option<String>, update: F) -> bool
    where
        F: FnOnce(&mut EngineState),
    {
        let status = {
            let mut s = self.shared.lock();
            let from = s.state;
            let Some(to) = from.next(event) else {
                log::debug!("Ignoring {:?} in state [{}]", event, from);
                return false;
            };

            update(&mut *s);

            log::info!("Changing state from [{}] to state [{}]", from, to);
            s.state = to;
            s.settled = false;

            // A fresh ReadDisc has no cycle to time until a disc is read.
            let elapsed = (to != RipState::ReadDisc).then(|| s.elapsed());
            s.status.time_elapsed = elapsed;
            s.status.state = to;
            s.status.message = match detail {
                Some(detail) => format!("{}: {}", to.message(), detail),
                None => to.message().to_string(),
            };
            s.status.clone()
        };

        self.notify(&status);
        true
    }

    fn notify(&self, status: &RipStatus) {
        if let Some(ref sink) = self.sink {
            sink.publish(status);
        }
    }
}

impl<D: DiscDevice + 'static, U: UploadTransport + 'static> RipController for RipEngine<D, U> {
    fn status(&self) -> RipStatus {
        self.shared.lock().status.clone()
    }

    fn request_rip(&self, track: u32, output_name: &str) -> Result<(), CommandError> {
        let intent = TrackIntent::new(track, output_name)?;

        let mut s = self.shared.lock();
        if !s.state.accepts_rip() || s.finalise_requested {
            log::debug!("Rip of track [{}] rejected in state [{}]", track, s.state);
            return Err(CommandError::Rejected {
                command: "rip",
                state: s.state,
            });
        }

        log::info!("Rip requested for track [{}] as {}", track, intent.file_name());
        s.intent = Some(intent);
        Ok(())
    }

    fn request_upload(&self) -> Result<(), CommandError> {
        let mut s = self.shared.lock();
        if !s.state.accepts_upload() {
            log::debug!("Upload rejected in state [{}]", s.state);
            return Err(CommandError::Rejected {
                command: "upload",
                state: s.state,
            });
        }

        log::info!("Upload requested");
        s.upload_requested = true;
        Ok(())
    }

    fn request_finalise(&self) -> Result<(), CommandError> {
        let mut s = self.shared.lock();
        if !s.state.accepts_finalise() || s.intent.is_some() {
            log::debug!("Finalise rejected in state [{}]", s.state);
            return Err(CommandError::Rejected {
                command: "finalise",
                state: s.state,
            });
        }

        log::info!("Finalise requested");
        s.finalise_requested = true;
        Ok(())
    }

    fn cancel(&self) {
        if !self.abort.swap(true, Ordering::SeqCst) {
            log::info!("Cancel requested");
        }
    }
}

/// Pull a track from the drive into a WAV file, checking for cancellation
/// and drive faults between chunks.
fn extract_track(
    device: &mut dyn DiscDevice,
    intent: &TrackIntent,
    target: PathBuf,
    abort: &AtomicBool,
    fault: &Mutex<Option<String>>,
    progress: ProgressCallback,
) -> Result<StagedTrack, RipError> {
    let mut stream = device.read_track(intent.track, progress)?;

    let mut writer = TrackFileWriter::new(target);
    writer.open(stream.format)?;

    let mut buf = vec![0u8; EXTRACTION_CHUNK_SIZE];
    loop {
        if abort.load(Ordering::SeqCst) {
            return Err(RipError::Aborted);
        }
        if let Some(message) = fault.lock().clone() {
            return Err(RipError::Extraction(message));
        }

        let n = match stream.reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(RipError::Extraction(format!("read failed: {}", e))),
        };
        writer.write(&buf[..n])?;
    }

    if let Some(message) = fault.lock().take() {
        return Err(RipError::Extraction(message));
    }

    let checksum = writer.close()?;
    Ok(StagedTrack {
        track: intent.track,
        file_name: intent.file_name(),
        file_path: writer.file_path().to_path_buf(),
        size_bytes: writer.file_size(),
        checksum,
    })
}

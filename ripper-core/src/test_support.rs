//! In-memory collaborators for engine tests.

use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::audio_format::PcmFormat;
use crate::models::error::RipError;
use crate::models::rip_status::RipStatus;
use crate::models::state::RipState;
use crate::models::toc::{TableOfContents, TrackEntry};
use crate::traits::disc_device::{DiscDevice, ProgressCallback, RipProgress, TrackStream};
use crate::traits::status_sink::StatusSink;
use crate::traits::upload_transport::{UploadRequest, UploadTransport};

/// What the fake drive produces for the next `read_track`.
#[derive(Debug, Clone)]
pub(crate) enum FakeTrack {
    /// `bytes` of PCM, after reporting each of `progress`.
    Data { bytes: usize, progress: Vec<u8> },
    /// Silence that never ends, trickled out slowly.
    Endless,
    /// `read_track` itself fails.
    ReadFails(String),
    /// The drive reports an error through the progress callback.
    DriveError(String),
}

#[derive(Debug)]
pub(crate) struct DiscControl {
    pub present: AtomicBool,
    pub readable: AtomicBool,
    pub eject_fails: AtomicBool,
    pub ejects: AtomicUsize,
    pub cancels: AtomicUsize,
    track: Mutex<FakeTrack>,
}

/// Scriptable drive. Clones share the same control block.
#[derive(Clone)]
pub(crate) struct FakeDisc {
    control: Arc<DiscControl>,
    toc: TableOfContents,
}

impl FakeDisc {
    pub fn with_tracks(count: u32) -> Self {
        let entries = (1..=count)
            .map(|id| TrackEntry {
                id,
                duration_secs: 180 + id,
            })
            .collect();
        Self {
            control: Arc::new(DiscControl {
                present: AtomicBool::new(true),
                readable: AtomicBool::new(true),
                eject_fails: AtomicBool::new(false),
                ejects: AtomicUsize::new(0),
                cancels: AtomicUsize::new(0),
                track: Mutex::new(FakeTrack::Data {
                    bytes: 8192,
                    progress: Vec::new(),
                }),
            }),
            toc: TableOfContents::from_entries(entries),
        }
    }

    pub fn control(&self) -> &DiscControl {
        &self.control
    }

    pub fn set_track(&self, track: FakeTrack) {
        *self.control.track.lock() = track;
    }

    pub fn insert(&self) {
        self.control.present.store(true, Ordering::SeqCst);
    }
}

impl DiscDevice for FakeDisc {
    fn table_of_contents(&mut self) -> Result<TableOfContents, RipError> {
        if !self.control.present.load(Ordering::SeqCst) {
            return Err(RipError::DiscAbsent);
        }
        if !self.control.readable.load(Ordering::SeqCst) {
            return Err(RipError::DiscRead("unreadable".into()));
        }
        Ok(self.toc.clone())
    }

    fn read_track(&mut self, _track: u32, progress: ProgressCallback) -> Result<TrackStream, RipError> {
        let script = self.control.track.lock().clone();
        match script {
            FakeTrack::Data { bytes, progress: steps } => {
                for step in steps {
                    progress(RipProgress::Percent(step));
                }
                Ok(TrackStream::new(PcmFormat::CD_AUDIO, Cursor::new(vec![0x11u8; bytes])))
            }
            FakeTrack::Endless => Ok(TrackStream::new(PcmFormat::CD_AUDIO, Trickle)),
            FakeTrack::ReadFails(message) => Err(RipError::Extraction(message)),
            FakeTrack::DriveError(message) => {
                progress(RipProgress::Error(message));
                Ok(TrackStream::new(PcmFormat::CD_AUDIO, Cursor::new(vec![0u8; 16])))
            }
        }
    }

    fn is_disc_present(&mut self) -> bool {
        self.control.present.load(Ordering::SeqCst)
    }

    fn eject(&mut self) -> Result<(), RipError> {
        self.control.ejects.fetch_add(1, Ordering::SeqCst);
        if self.control.eject_fails.load(Ordering::SeqCst) {
            return Err(RipError::Eject("tray jammed".into()));
        }
        self.control.present.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn cancel(&mut self) {
        self.control.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

/// Endless slow source of zeroes.
struct Trickle;

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        std::thread::sleep(Duration::from_millis(1));
        let n = buf.len().min(1024);
        buf[..n].fill(0);
        Ok(n)
    }
}

/// Transport that records every request and answers with a fixed status.
#[derive(Clone)]
pub(crate) struct FakeTransport {
    status: Arc<AtomicU16>,
    requests: Arc<Mutex<Vec<UploadRequest>>>,
    during_upload: Arc<Mutex<Option<Box<dyn Fn() + Send>>>>,
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self {
            status: Arc::new(AtomicU16::new(200)),
            requests: Arc::new(Mutex::new(Vec::new())),
            during_upload: Arc::new(Mutex::new(None)),
        }
    }
}

impl FakeTransport {
    pub fn respond_with(&self, status: u16) {
        self.status.store(status, Ordering::SeqCst);
    }

    /// Run `hook` while each transfer is in flight.
    pub fn during_upload(&self, hook: impl Fn() + Send + 'static) {
        *self.during_upload.lock() = Some(Box::new(hook));
    }

    pub fn requests(&self) -> Vec<UploadRequest> {
        self.requests.lock().clone()
    }
}

impl UploadTransport for FakeTransport {
    fn upload(&self, request: &UploadRequest) -> Result<(), RipError> {
        if !request.file_path.is_file() {
            return Err(RipError::Storage(format!("{} missing", request.file_path.display())));
        }
        self.requests.lock().push(request.clone());
        if let Some(hook) = self.during_upload.lock().as_ref() {
            hook();
        }
        match self.status.load(Ordering::SeqCst) {
            200 => Ok(()),
            status => Err(RipError::UploadStatus(status)),
        }
    }
}

/// Sink that keeps every published status.
#[derive(Default)]
pub(crate) struct RecordingSink {
    published: Mutex<Vec<RipStatus>>,
}

impl RecordingSink {
    pub fn snapshot(&self) -> Vec<RipStatus> {
        self.published.lock().clone()
    }

    pub fn states(&self) -> Vec<RipState> {
        self.published.lock().iter().map(|s| s.state).collect()
    }

    pub fn len(&self) -> usize {
        self.published.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.published.lock().is_empty()
    }

    pub fn clear(&self) {
        self.published.lock().clear();
    }
}

impl StatusSink for RecordingSink {
    fn publish(&self, status: &RipStatus) {
        self.published.lock().push(status.clone());
    }
}

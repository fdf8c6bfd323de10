//! Simulated drive for hosts without optical hardware.
//!
//! Serves a fixed disc of silent tracks. Ejecting opens the tray; the next
//! table-of-contents read finds it empty and closes it again, so a new
//! cycle starts one heartbeat later with the same disc.

use std::io::{self, Read};

use ripper_core::{
    DiscDevice, PcmFormat, ProgressCallback, RipError, RipProgress, TableOfContents, TrackEntry,
    TrackStream,
};

/// CD frames per second; table-of-contents offsets are counted in these.
const FRAMES_PER_SECOND: u32 = 75;
/// Lead-in before the first track, in frames.
const LEAD_IN_FRAMES: u32 = 150;

pub struct StubDisc {
    toc: TableOfContents,
    tray_open: bool,
    /// Bytes of PCM served per second of track duration.
    bytes_per_second: u64,
}

impl StubDisc {
    /// A disc of `track_count` silent tracks, each a few minutes long.
    pub fn new(track_count: u32) -> Self {
        let entries = (1..=track_count)
            .map(|id| TrackEntry {
                id,
                duration_secs: 150 + (id * 37) % 120,
            })
            .collect::<Vec<_>>();
        let mut toc = TableOfContents::from_entries(entries);
        toc.cddb_id = Some(cddb_disc_id(&toc.entries));

        Self {
            toc,
            tray_open: false,
            bytes_per_second: u64::from(PcmFormat::CD_AUDIO.byte_rate()),
        }
    }

    /// Serve shorter tracks: `bytes_per_second` bytes per second of duration.
    pub fn with_bytes_per_second(mut self, bytes_per_second: u64) -> Self {
        self.bytes_per_second = bytes_per_second;
        self
    }
}

impl DiscDevice for StubDisc {
    fn table_of_contents(&mut self) -> Result<TableOfContents, RipError> {
        if self.tray_open {
            log::debug!("Stub tray closing");
            self.tray_open = false;
            return Err(RipError::DiscAbsent);
        }
        Ok(self.toc.clone())
    }

    fn read_track(&mut self, track: u32, progress: ProgressCallback) -> Result<TrackStream, RipError> {
        if self.tray_open {
            return Err(RipError::DiscAbsent);
        }
        let entry = self
            .toc
            .track(track)
            .ok_or_else(|| RipError::Extraction(format!("track {} is not on the disc", track)))?;

        let total = u64::from(entry.duration_secs) * self.bytes_per_second;
        log::debug!("Stub extracting track {} ({} bytes)", track, total);

        Ok(TrackStream::new(
            PcmFormat::CD_AUDIO,
            SilenceReader {
                total,
                remaining: total,
                reported: 0,
                progress,
            },
        ))
    }

    fn is_disc_present(&mut self) -> bool {
        !self.tray_open
    }

    fn eject(&mut self) -> Result<(), RipError> {
        log::info!("Stub tray opening");
        self.tray_open = true;
        Ok(())
    }

    /// Silence needs no drive-side cleanup; an abandoned stream is simply dropped.
    fn cancel(&mut self) {
        log::debug!("Stub extraction cancelled");
    }
}

/// Zero-filled PCM that reports percentage progress as it is consumed.
struct SilenceReader {
    total: u64,
    remaining: u64,
    reported: u8,
    progress: ProgressCallback,
}

impl Read for SilenceReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Ok(0);
        }

        let n = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        buf[..n].fill(0);
        self.remaining -= n as u64;

        let done = self.total - self.remaining;
        let percent = u8::try_from(done * 100 / self.total.max(1)).unwrap_or(100);
        if percent > self.reported {
            self.reported = percent;
            (self.progress)(RipProgress::Percent(percent));
        }
        Ok(n)
    }
}

/// freedb disc id: digit-sum checksum of track start times, total playing
/// time and track count.
fn cddb_disc_id(entries: &[TrackEntry]) -> String {
    fn digit_sum(mut n: u32) -> u32 {
        let mut sum = 0;
        while n > 0 {
            sum += n % 10;
            n /= 10;
        }
        sum
    }

    let mut offset = LEAD_IN_FRAMES;
    let mut checksum = 0;
    for entry in entries {
        checksum += digit_sum(offset / FRAMES_PER_SECOND);
        offset += entry.duration_secs * FRAMES_PER_SECOND;
    }
    let first = LEAD_IN_FRAMES / FRAMES_PER_SECOND;
    let total_secs = offset / FRAMES_PER_SECOND - first;
    let count = u32::try_from(entries.len()).unwrap_or(u32::MAX);

    format!("{:08x}", ((checksum % 0xff) << 24) | (total_secs << 8) | count)
}

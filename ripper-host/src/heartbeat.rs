use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ripper_core::RipError;

/// Periodic caller driving the engine.
///
/// Runs `tick` on a dedicated thread every `interval`. A tick that overruns
/// the interval delays the next one rather than stacking up behind it.
pub struct Heartbeat {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Heartbeat {
    pub fn start<F>(interval: Duration, tick: F) -> Result<Self, RipError>
    where
        F: Fn() + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("heartbeat".into())
            .spawn(move || heartbeat_loop(thread_running, interval, tick))
            .map_err(|e| RipError::Worker(format!("failed to spawn heartbeat thread: {}", e)))?;

        log::info!("Heartbeat started every {:?}", interval);
        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop after the current tick and wait for the thread to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Heartbeat thread panicked");
            }
            log::info!("Heartbeat stopped");
        }
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.stop();
    }
}

fn heartbeat_loop<F: Fn()>(running: Arc<AtomicBool>, interval: Duration, tick: F) {
    // Sleep in short slices so stop() is not held up by a long interval.
    let slice = interval.min(Duration::from_millis(50));

    while running.load(Ordering::SeqCst) {
        let started = Instant::now();
        tick();

        while running.load(Ordering::SeqCst) && started.elapsed() < interval {
            thread::sleep(slice);
        }
    }
}

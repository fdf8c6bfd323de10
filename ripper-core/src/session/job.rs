use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::models::error::RipError;

/// A blocking operation running on its own worker thread.
///
/// The result is handed back over a channel and collected by whoever polls
/// `try_finish`, so the caller never blocks on the work itself.
pub(crate) struct Job<T> {
    name: String,
    rx: Receiver<Result<T, RipError>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl<T: Send + 'static> Job<T> {
    pub fn spawn<F>(name: &str, work: F) -> Result<Self, RipError>
    where
        F: FnOnce() -> Result<T, RipError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                // Receiver may be gone if the engine was dropped mid-job.
                let _ = tx.send(work());
            })
            .map_err(|e| RipError::Worker(format!("failed to spawn {} thread: {}", name, e)))?;

        Ok(Self {
            name: name.to_string(),
            rx,
            handle: Some(handle),
        })
    }

    /// Collect the result if the work has finished.
    pub fn try_finish(&mut self) -> Option<Result<T, RipError>> {
        match self.rx.try_recv() {
            Ok(result) => {
                self.join();
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.join();
                Some(Err(RipError::Worker(format!("{} thread exited without a result", self.name))))
            }
        }
    }

    /// Block until the work finishes.
    pub fn wait(mut self) -> Result<T, RipError> {
        let result = self
            .rx
            .recv()
            .unwrap_or_else(|_| Err(RipError::Worker(format!("{} thread exited without a result", self.name))));
        self.join();
        result
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("{} thread panicked", self.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};

    #[test]
    fn try_finish_is_empty_until_work_completes() {
        let gate = Arc::new(Barrier::new(2));
        let worker_gate = Arc::clone(&gate);
        let mut job = Job::spawn("test-job", move || {
            worker_gate.wait();
            Ok(7)
        })
        .unwrap();

        assert!(job.try_finish().is_none());
        gate.wait();
        assert_eq!(job.wait(), Ok(7));
    }

    #[test]
    fn panicking_worker_reports_error() {
        let job: Job<()> = Job::spawn("panicky", || panic!("boom")).unwrap();
        assert!(matches!(job.wait(), Err(RipError::Worker(_))));
    }
}

//! Debounced mirror of the project store to its durable slot.
//!
//! A dedicated writer thread receives the full serialized collection on every
//! store mutation. A payload arriving inside the quiet period replaces the
//! pending one and restarts the timer, so a burst of edits collapses into a
//! single whole-collection overwrite carrying the final state. `flush` forces
//! the pending write synchronously, which is also what tests use instead of
//! wall-clock waits. Dropping the handle flushes whatever is still pending.

use crate::project::WritingProject;
use crate::storage;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, warn};

enum Job {
    Save(String),
    Flush(Sender<()>),
    Shutdown,
}

pub struct Autosave {
    tx: Sender<Job>,
    handle: Option<JoinHandle<()>>,
    writes: Arc<AtomicU64>,
}

impl Autosave {
    /// Spawn the writer thread targeting the given slot path.
    pub fn new(path: PathBuf, quiet: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let writes = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&writes);
        let handle = std::thread::spawn(move || run_writer(rx, path, quiet, counter));
        Autosave {
            tx,
            handle: Some(handle),
            writes,
        }
    }

    /// Schedule a write of the entire collection, restarting the quiet timer.
    pub fn schedule(&self, projects: &[WritingProject]) {
        let payload = match serde_json::to_string(projects) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Failed to serialize project collection for autosave: {err}");
                return;
            }
        };
        if self.tx.send(Job::Save(payload)).is_err() {
            warn!("Autosave writer is gone; dropping scheduled save");
        }
    }

    /// Write any pending payload now and wait for the write to finish.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.tx.send(Job::Flush(ack_tx)).is_err() {
            warn!("Autosave writer is gone; nothing to flush");
            return;
        }
        let _ = ack_rx.recv();
    }

    /// Number of slot writes performed so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Acquire)
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        let _ = self.tx.send(Job::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_writer(rx: Receiver<Job>, path: PathBuf, quiet: Duration, writes: Arc<AtomicU64>) {
    let mut pending: Option<String> = None;
    loop {
        let job = if pending.is_some() {
            match rx.recv_timeout(quiet) {
                Ok(job) => job,
                Err(RecvTimeoutError::Timeout) => {
                    write_pending(&path, &mut pending, &writes);
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match rx.recv() {
                Ok(job) => job,
                Err(_) => break,
            }
        };

        match job {
            Job::Save(payload) => {
                debug!(bytes = payload.len(), "Autosave scheduled; quiet timer restarted");
                pending = Some(payload);
            }
            Job::Flush(ack) => {
                write_pending(&path, &mut pending, &writes);
                let _ = ack.send(());
            }
            Job::Shutdown => break,
        }
    }
    write_pending(&path, &mut pending, &writes);
}

fn write_pending(path: &PathBuf, pending: &mut Option<String>, writes: &AtomicU64) {
    if let Some(payload) = pending.take() {
        storage::write_payload(path, &payload);
        writes.fetch_add(1, Ordering::Release);
    }
}

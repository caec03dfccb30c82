//! # Single serialized dispatch thread.
//!
//! [`DispatchThread`] is the default production strategy: one named worker
//! thread drains a FIFO queue of dispatch tasks, so all handlers run off the
//! publisher's thread while cross-publish delivery order is preserved for
//! every category.
//!
//! ## Architecture
//! ```text
//! publish() ──► execute(task) ──► [unbounded FIFO queue] ──► worker thread
//!                                                              └─► task.run()
//! ```
//!
//! ## Rules
//! - `execute` never blocks: it enqueues and returns.
//! - The queue is unbounded; pacing a firehose of publishes is the
//!   embedder's responsibility.
//! - [`shutdown`](DispatchThread::shutdown) closes the queue, lets the worker
//!   drain what was already enqueued, and joins it. Tasks submitted after
//!   shutdown are dropped with a warning.
//! - Dropping the runner without `shutdown` closes the queue but does not
//!   wait for the worker.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};
use std::thread;

use tracing::warn;

use crate::bus::DispatchTask;
use crate::runners::TaskRunner;

/// Serialized single-thread task runner.
pub struct DispatchThread {
    sender: Mutex<Option<Sender<DispatchTask>>>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl DispatchThread {
    /// Spawns the worker thread and returns the runner.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let worker = thread::spawn(move || Self::drain(rx));
        Self {
            sender: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Like [`new`](Self::new), but names the worker thread for logs and
    /// debuggers. Fails only if the OS refuses to spawn a thread.
    pub fn named(name: &str) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || Self::drain(rx))?;
        Ok(Self {
            sender: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Closes the queue, drains already-enqueued tasks, and joins the worker.
    ///
    /// Idempotent; later calls are no-ops.
    pub fn shutdown(&self) {
        drop(lock(&self.sender).take());
        let worker = lock(&self.worker).take();
        if let Some(handle) = worker {
            let _ = handle.join();
        }
    }

    fn drain(rx: Receiver<DispatchTask>) {
        // recv keeps yielding buffered tasks after the last sender drops,
        // so shutdown never loses enqueued work.
        while let Ok(task) = rx.recv() {
            task.run();
        }
    }
}

impl Default for DispatchThread {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRunner for DispatchThread {
    fn execute(&self, task: DispatchTask) {
        match &*lock(&self.sender) {
            Some(tx) => {
                if tx.send(task).is_err() {
                    warn!("dispatch worker is gone; dropping task");
                }
            }
            None => warn!("dispatch thread already shut down; dropping task"),
        }
    }
}

impl std::fmt::Debug for DispatchThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchThread")
            .field("running", &lock(&self.sender).is_some())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

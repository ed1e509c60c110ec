//! Background writer that makes persistence non-blocking for the caller.
//!
//! # Responsibility
//! - Own the real backend on a dedicated worker thread.
//! - Accept writes without waiting for storage I/O.
//!
//! # Invariants
//! - Requests are served strictly in submission order, so a `get` or
//!   `flush` observes every `set` submitted before it.
//! - Worker-side write failures are logged and do not stop the worker.
//! - Dropping the handle drains pending writes before the thread exits.

use crate::repo::kv_store::{KeyValueStore, KvError, KvResult};
use log::{debug, error, warn};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

const WORKER_THREAD_NAME: &str = "habitlog-kv-writer";

enum Request {
    Get {
        key: String,
        reply: Sender<KvResult<Option<String>>>,
    },
    Set {
        key: String,
        value: String,
    },
    Flush {
        reply: Sender<()>,
    },
}

/// Fire-and-forget front for another `KeyValueStore`.
pub struct QueuedKvStore {
    sender: Option<Sender<Request>>,
    worker: Option<JoinHandle<()>>,
}

impl QueuedKvStore {
    /// Moves `inner` onto a new worker thread.
    ///
    /// # Errors
    /// - Returns `Unavailable` when the thread cannot be spawned.
    pub fn spawn<S>(inner: S) -> KvResult<Self>
    where
        S: KeyValueStore + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_worker(inner, receiver))
            .map_err(|err| KvError::Unavailable(format!("failed to spawn writer: {err}")))?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Blocks until every previously submitted write has been attempted.
    pub fn flush(&self) -> KvResult<()> {
        let (reply, done) = mpsc::channel();
        self.submit(Request::Flush { reply })?;
        done.recv().map_err(|_| stopped())
    }

    fn submit(&self, request: Request) -> KvResult<()> {
        self.sender
            .as_ref()
            .ok_or_else(stopped)?
            .send(request)
            .map_err(|_| stopped())
    }
}

impl KeyValueStore for QueuedKvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let (reply, response) = mpsc::channel();
        self.submit(Request::Get {
            key: key.to_string(),
            reply,
        })?;
        response.recv().map_err(|_| stopped())?
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        self.submit(Request::Set {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

impl Drop for QueuedKvStore {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop after the backlog.
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("event=kv_writer_join module=repo status=error reason=worker_panicked");
            }
        }
    }
}

fn run_worker<S: KeyValueStore>(inner: S, requests: Receiver<Request>) {
    debug!("event=kv_writer_start module=repo status=ok");
    for request in requests {
        match request {
            Request::Get { key, reply } => {
                let _ = reply.send(inner.get(&key));
            }
            Request::Set { key, value } => match inner.set(&key, &value) {
                Ok(()) => debug!(
                    "event=kv_set module=repo status=ok key={key} bytes={}",
                    value.len()
                ),
                Err(err) => error!(
                    "event=kv_set module=repo status=error key={key} bytes={} error={err}",
                    value.len()
                ),
            },
            Request::Flush { reply } => {
                let _ = reply.send(());
            }
        }
    }
    debug!("event=kv_writer_stop module=repo status=ok");
}

fn stopped() -> KvError {
    KvError::Unavailable("background writer stopped".to_string())
}

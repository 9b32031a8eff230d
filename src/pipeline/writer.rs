//! Background writer
//!
//! Owns the file handle and performs every positioned write.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use bytes::Bytes;
use crossbeam::channel::{bounded, unbounded, Sender};
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::allocator::Slot;
use crate::error::{FlatError, Result};

/// One record on its way to disk
#[derive(Debug)]
pub struct WriteJob {
    /// Key being written (or deleted)
    pub key: String,

    /// Sequence of the record, for logging
    pub sequence: u64,

    /// Freshly allocated slot receiving the record
    pub slot: Slot,

    /// Framed record bytes
    pub bytes: Bytes,

    /// Slot held by the key before this write; freed only on success
    pub superseded: Option<Slot>,

    /// Resolves the caller's ticket
    pub(crate) reply: Sender<Result<()>>,
}

/// Receives write outcomes on the writer thread, before the ticket is
/// resolved
pub trait CompletionSink: Send + Sync + 'static {
    fn complete(&self, job: &WriteJob, result: &io::Result<()>);
}

enum Message {
    Write(WriteJob),
    Shutdown(Sender<io::Result<()>>),
}

/// Handle to the writer thread
pub struct Writer {
    sender: Sender<Message>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Writer {
    /// Start the writer thread, taking ownership of `file`
    pub fn spawn(file: File, fsync: bool, sink: Arc<dyn CompletionSink>) -> Result<Self> {
        let (sender, receiver) = unbounded::<Message>();

        let handle = thread::Builder::new()
            .name("flatkv-writer".to_string())
            .spawn(move || {
                let mut file = file;
                for message in receiver {
                    match message {
                        Message::Write(job) => {
                            let result = write_slot(&mut file, &job, fsync);
                            finish(job, result, sink.as_ref());
                        }
                        Message::Shutdown(reply) => {
                            let _ = reply.send(file.sync_all());
                            break;
                        }
                    }
                }
                // File is closed when dropped here
            })
            .map_err(|e| FlatError::Pipeline(format!("failed to spawn writer thread: {}", e)))?;

        Ok(Self {
            sender,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Queue a job. Fails only if the writer thread is gone.
    pub fn submit(&self, job: WriteJob) -> Result<()> {
        self.sender
            .send(Message::Write(job))
            .map_err(|_| FlatError::Pipeline("writer thread has stopped".to_string()))
    }

    /// Finish queued jobs, sync and close the file, and join the thread
    pub fn shutdown(&self) -> Result<()> {
        let handle = match self.handle.lock().take() {
            Some(handle) => handle,
            None => return Ok(()),
        };

        let (tx, rx) = bounded(1);
        let synced = if self.sender.send(Message::Shutdown(tx)).is_ok() {
            rx.recv().unwrap_or(Ok(()))
        } else {
            Ok(())
        };

        handle
            .join()
            .map_err(|_| FlatError::Pipeline("writer thread panicked".to_string()))?;

        synced.map_err(FlatError::Io)
    }
}

/// Report a job's outcome to the sink, then resolve its ticket
fn finish(job: WriteJob, result: io::Result<()>, sink: &dyn CompletionSink) {
    if let Err(e) = &result {
        error!(key = %job.key, offset = job.slot.offset, "write failed: {}", e);
    } else {
        debug!(key = %job.key, seq = job.sequence, offset = job.slot.offset, "write complete");
    }
    sink.complete(&job, &result);
    let _ = job.reply.send(result.map_err(FlatError::Io));
}

fn write_slot(file: &mut File, job: &WriteJob, fsync: bool) -> io::Result<()> {
    file.seek(SeekFrom::Start(job.slot.offset))?;
    file.write_all(&job.bytes)?;
    if fsync {
        file.sync_data()?;
    }
    Ok(())
}

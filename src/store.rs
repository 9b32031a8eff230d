//! Store Module
//!
//! The store instance that coordinates all components.
//!
//! ## Responsibilities
//! - Open the backing file and replay it into index + allocator state
//! - Run put/delete through the write pipeline
//! - Serve get/has/keys from memory
//! - Track in-flight writes and announce when they drain
//!
//! ## Concurrency Model
//!
//! All mutable state lives in one `parking_lot::Mutex<State>`. Index and
//! allocator updates happen synchronously inside put/delete, so a `get`
//! issued after `put` returns sees the new value even if the record is not
//! on disk yet. The disk write happens on the writer thread.
//!
//! A key can have at most one write between allocation and confirmation.
//! A second write to that key waits on the `changed` condvar until the
//! first one completes; writes to other keys never wait on each other.
//! Because the old slot is freed only after the new record is written, a
//! crash loses at most the unconfirmed writes and never corrupts the file.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;
use std::thread;

use crossbeam::channel::{bounded, Receiver};
use parking_lot::{Condvar, Mutex};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::allocator::{size_class_for, BlockAllocator, Slot};
use crate::config::Config;
use crate::error::{FlatError, Result};
use crate::events::{EventBus, StoreEvent};
use crate::index::{Entry, KeyIndex};
use crate::pipeline::{CompletionSink, WriteJob, WriteTicket, Writer};
use crate::record::{encode_framed, JsonCodec, Record, RecordCodec};
use crate::recovery::{replay, RecoveryResult};

/// Mutable store state, guarded by `Shared::state`
struct State {
    open: bool,
    index: KeyIndex,
    allocator: BlockAllocator,

    /// Largest sequence observed or assigned
    tick: u64,

    /// Writes issued but not yet completed
    in_flight: usize,

    /// Keys with a write between allocation and confirmation
    writing: HashSet<String>,
}

/// State shared with the writer thread
struct Shared {
    state: Mutex<State>,

    /// Signalled whenever a write completes or the store closes
    changed: Condvar,

    events: Arc<EventBus>,
}

impl CompletionSink for Shared {
    fn complete(&self, job: &WriteJob, result: &io::Result<()>) {
        let drained = {
            let mut state = self.state.lock();
            if result.is_ok() {
                if let Some(old) = job.superseded {
                    state.allocator.free(old.offset, old.size_class);
                }
            }
            state.writing.remove(&job.key);
            state.in_flight -= 1;
            state.in_flight == 0
        };
        self.changed.notify_all();

        if let Err(e) = result {
            self.events.emit(StoreEvent::Error(format!(
                "write of key {:?} at offset {} failed: {}",
                job.key, job.slot.offset, e
            )));
        }
        if drained {
            self.events.emit(StoreEvent::Drained);
        }
    }
}

/// Point-in-time counters for a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Live keys in the index
    pub keys: usize,

    /// Allocator high-water mark
    pub head: u64,

    /// Free slots across all size classes
    pub free_slots: usize,

    /// Bytes sitting on free lists
    pub free_bytes: u64,

    /// Current logical clock
    pub tick: u64,

    /// Writes not yet completed
    pub in_flight: usize,
}

/// A single-file key-value store
pub struct Store {
    config: Config,
    codec: Arc<dyn RecordCodec>,
    shared: Arc<Shared>,
    writer: Writer,
    recovery: RecoveryResult,
}

/// An open running on a background thread
pub struct OpenHandle {
    events: Receiver<StoreEvent>,
    result: Receiver<Result<Store>>,
}

impl OpenHandle {
    /// Events of the store being opened, starting with `Opened` or `Error`
    pub fn events(&self) -> &Receiver<StoreEvent> {
        &self.events
    }

    /// Block until the open finishes
    pub fn wait(self) -> Result<Store> {
        self.result
            .recv()
            .unwrap_or_else(|_| Err(FlatError::Pipeline("open thread exited".to_string())))
    }
}

impl Store {
    /// Open or create a store with the given config, using `JsonCodec`
    ///
    /// On open:
    /// 1. Create the parent directory if missing
    /// 2. Open or create the backing file for read/write
    /// 3. Read the whole file and replay it
    /// 4. Start the writer thread
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with_codec(config, Arc::new(JsonCodec))
    }

    /// Open with default config at `path`
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(Config::for_path(path))
    }

    /// Open with a custom record codec
    pub fn open_with_codec(config: Config, codec: Arc<dyn RecordCodec>) -> Result<Self> {
        Self::open_with_events(config, codec, Arc::new(EventBus::new()))
    }

    /// Open on a background thread
    ///
    /// The handle's event receiver is subscribed before the open starts,
    /// so it observes `Opened` (or `Error`).
    pub fn open_in_background(config: Config) -> OpenHandle {
        let events = Arc::new(EventBus::new());
        let receiver = events.subscribe();
        let (tx, rx) = bounded(1);

        let spawned = thread::Builder::new()
            .name("flatkv-open".to_string())
            .spawn(move || {
                let _ = tx.send(Self::open_with_events(config, Arc::new(JsonCodec), events));
            });
        if let Err(e) = spawned {
            warn!("failed to spawn open thread: {}", e);
        }

        OpenHandle {
            events: receiver,
            result: rx,
        }
    }

    fn open_with_events(
        config: Config,
        codec: Arc<dyn RecordCodec>,
        events: Arc<EventBus>,
    ) -> Result<Self> {
        let result = Self::open_inner(config, codec, Arc::clone(&events));
        match &result {
            Ok(_) => events.emit(StoreEvent::Opened),
            Err(e) => events.emit(StoreEvent::Error(format!("open failed: {}", e))),
        }
        result
    }

    fn open_inner(
        config: Config,
        codec: Arc<dyn RecordCodec>,
        events: Arc<EventBus>,
    ) -> Result<Self> {
        config.validate()?;

        if config.create_dirs {
            if let Some(parent) = config.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&config.path)?;

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        let recovered = replay(&data, codec.as_ref());
        let recovery = recovered.result;

        info!(
            path = %config.path.display(),
            file_len = data.len(),
            recovered = recovery.records_recovered,
            corrupted = recovery.records_corrupted,
            live_keys = recovery.live_keys,
            tombstones = recovery.tombstones,
            last_sequence = recovery.last_sequence,
            leaked_bytes = recovery.leaked_bytes,
            "store opened"
        );

        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                open: true,
                index: recovered.index,
                allocator: recovered.allocator,
                tick: recovered.tick,
                in_flight: 0,
                writing: HashSet::new(),
            }),
            changed: Condvar::new(),
            events,
        });

        let sink: Arc<dyn CompletionSink> = shared.clone();
        let writer = Writer::spawn(file, config.fsync_on_write, sink)?;

        Ok(Self {
            config,
            codec,
            shared,
            writer,
            recovery,
        })
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Store `value` under `key`
    ///
    /// The index reflects the new value when this returns; the returned
    /// ticket resolves once the record is on disk.
    pub fn put(&self, key: &str, value: impl Into<Value>) -> Result<WriteTicket> {
        self.write(key, Some(value.into()))
    }

    /// Store any serializable value under `key`
    pub fn put_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<WriteTicket> {
        let value = serde_json::to_value(value)?;
        self.write(key, Some(value))
    }

    /// Remove `key`, writing a tombstone so the delete survives reopen
    ///
    /// A tombstone is written even when the key is not in the index, so a
    /// delete retried after a failed tombstone write still reaches disk.
    pub fn delete(&self, key: &str) -> Result<WriteTicket> {
        self.write(key, None)
    }

    fn write(&self, key: &str, value: Option<Value>) -> Result<WriteTicket> {
        let mut state = self.shared.state.lock();

        // One unconfirmed write per key
        loop {
            if !state.open {
                return Err(FlatError::NotOpen);
            }
            if !state.writing.contains(key) {
                break;
            }
            self.shared.changed.wait(&mut state);
        }

        let superseded = state.index.get(key).map(Entry::slot);

        let sequence = state.tick + 1;
        let record = Record {
            sequence,
            key: key.to_string(),
            value,
        };
        let bytes = encode_framed(self.codec.as_ref(), &record)?;
        state.tick = sequence;

        // Classes only grow for a key
        let current_class = superseded.map(|s| s.size_class).unwrap_or(0);
        let size_class = current_class.max(size_class_for(bytes.len()));
        let slot = Slot::new(state.allocator.allocate(size_class), size_class);

        if record.is_tombstone() {
            state.index.remove(key);
        } else if let Some(entry) = state.index.get_mut(key) {
            entry.offset = slot.offset;
            entry.size_class = slot.size_class;
            entry.record = record;
        } else {
            state
                .index
                .insert(Entry::new(slot.offset, slot.size_class, record));
        }

        let (reply, ticket) = WriteTicket::pending();
        let job = WriteJob {
            key: key.to_string(),
            sequence,
            slot,
            bytes,
            superseded,
            reply,
        };

        state.in_flight += 1;
        state.writing.insert(key.to_string());

        if let Err(e) = self.writer.submit(job) {
            state.in_flight -= 1;
            state.writing.remove(key);
            drop(state);
            self.shared.changed.notify_all();
            return Err(e);
        }

        Ok(ticket)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current value of `key`
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let state = self.open_state()?;
        Ok(state.index.get(key).and_then(Entry::value).cloned())
    }

    /// Current value of `key`, deserialized into `T`
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn has(&self, key: &str) -> Result<bool> {
        Ok(self.open_state()?.index.contains(key))
    }

    /// All live keys, unordered
    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.open_state()?.index.keys())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.open_state()?.index.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.open_state()?.index.is_empty())
    }

    /// The index entry for `key` (slot and record)
    pub fn entry(&self, key: &str) -> Result<Option<Entry>> {
        Ok(self.open_state()?.index.get(key).cloned())
    }

    fn open_state(&self) -> Result<parking_lot::MutexGuard<'_, State>> {
        let state = self.shared.state.lock();
        if !state.open {
            return Err(FlatError::NotOpen);
        }
        Ok(state)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Block until every issued write has completed
    pub fn wait_drained(&self) {
        let mut state = self.shared.state.lock();
        while state.in_flight > 0 {
            self.shared.changed.wait(&mut state);
        }
    }

    /// Number of writes not yet completed
    pub fn in_flight(&self) -> usize {
        self.shared.state.lock().in_flight
    }

    /// Close the store
    ///
    /// Waits for in-flight writes, syncs and closes the file. Any later
    /// operation fails with `NotOpen`.
    pub fn close(&self) -> Result<()> {
        {
            let mut state = self.shared.state.lock();
            if !state.open {
                return Err(FlatError::NotOpen);
            }
            state.open = false;
            // Writers parked on the per-key gate must see the close
            self.shared.changed.notify_all();

            while state.in_flight > 0 {
                self.shared.changed.wait(&mut state);
            }
        }

        let result = self.writer.shutdown();
        match &result {
            Ok(()) => {
                info!(path = %self.config.path.display(), "store closed");
                self.shared.events.emit(StoreEvent::Closed);
            }
            Err(e) => {
                self.shared
                    .events
                    .emit(StoreEvent::Error(format!("close failed: {}", e)));
            }
        }
        result
    }

    pub fn is_open(&self) -> bool {
        self.shared.state.lock().open
    }

    /// Subscribe to this store's events
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        self.shared.events.subscribe()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn stats(&self) -> StoreStats {
        let state = self.shared.state.lock();
        let alloc = state.allocator.stats();
        StoreStats {
            keys: state.index.len(),
            head: alloc.head,
            free_slots: alloc.free_slots.iter().sum(),
            free_bytes: alloc.free_bytes,
            tick: state.tick,
            in_flight: state.in_flight,
        }
    }

    /// Statistics from the replay performed at open
    pub fn recovery(&self) -> &RecoveryResult {
        &self.recovery
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if self.is_open() {
            if let Err(e) = self.close() {
                warn!("error closing store on drop: {}", e);
            }
        }
    }
}

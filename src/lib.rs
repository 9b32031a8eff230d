//! # FlatKV
//!
//! A single-file, append-oriented key-value store with:
//! - Power-of-two slot allocation with per-class free lists
//! - Log replay on open (no header, no index file)
//! - Last-write-wins resolution by logical clock
//! - Asynchronous durable writes that never overwrite the live record
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Store                               │
//! │        put / delete / get / has / keys / close              │
//! └──────────┬──────────────────┬───────────────────┬───────────┘
//!            │                  │                   │
//!            ▼                  ▼                   ▼
//!   ┌─────────────┐     ┌──────────────┐    ┌──────────────┐
//!   │  KeyIndex   │     │   Block      │    │   Write      │
//!   │ (in memory) │     │  Allocator   │    │  Pipeline    │
//!   └─────────────┘     └──────────────┘    └──────┬───────┘
//!            ▲                  ▲                  │
//!            │   on open        │                  ▼
//!   ┌────────┴──────────────────┴──┐        ┌──────────────┐
//!   │      Recovery / Replay       │◀───────│  data file   │
//!   └──────────────────────────────┘        └──────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use flatkv::{Config, Store};
//!
//! let store = Store::open(Config::builder().path("/tmp/example.db").build())?;
//! store.put("hello", "world")?.wait()?;
//! assert_eq!(store.get("hello")?, Some("world".into()));
//! store.close()?;
//! # Ok::<(), flatkv::FlatError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod allocator;
pub mod index;
pub mod recovery;
pub mod pipeline;
pub mod events;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FlatError, Result};
pub use config::Config;
pub use events::StoreEvent;
pub use record::{JsonCodec, Record, RecordCodec};
pub use store::{OpenHandle, Store, StoreStats};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of FlatKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

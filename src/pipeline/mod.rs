//! Write Pipeline Module
//!
//! Moves encoded records to disk off the caller's thread.
//!
//! ## Responsibilities
//! - Positioned write of each record into its freshly allocated slot
//! - Optional flush to durable storage after each write
//! - Report completion so the superseded slot can be freed
//! - Hand the outcome back to the caller through a `WriteTicket`
//!
//! ## Flow
//! ```text
//!  caller (Store::put)                 writer thread
//!  ───────────────────                 ─────────────
//!  tick += 1
//!  allocate new slot
//!  update index ──── WriteJob ────────▶ write_all at offset
//!  return ticket                       sync_data (fsync_on_write)
//!                                      sink.complete(job, result)
//!                                        └─ free superseded slot on success
//!  ticket.wait() ◀──── result ───────── reply
//! ```
//!
//! Jobs are performed strictly in submission order by a single thread.

mod ticket;
mod writer;

pub use ticket::WriteTicket;
pub use writer::{CompletionSink, WriteJob, Writer};

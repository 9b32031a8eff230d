//! Write tickets
//!
//! Completion handle returned by put/delete.

use crossbeam::channel::{bounded, Receiver, Sender};

use crate::error::{FlatError, Result};

/// Outcome of one durable write
///
/// Dropping a ticket does not cancel the write.
#[derive(Debug)]
pub struct WriteTicket {
    receiver: Receiver<Result<()>>,
}

impl WriteTicket {
    /// A ticket plus the sender that resolves it
    pub(crate) fn pending() -> (Sender<Result<()>>, Self) {
        let (tx, rx) = bounded(1);
        (tx, Self { receiver: rx })
    }

    /// Block until the write has completed
    pub fn wait(self) -> Result<()> {
        self.receiver.recv().unwrap_or(Err(FlatError::WriteAborted))
    }

    /// Outcome if the write has already completed
    pub fn try_wait(&self) -> Option<Result<()>> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_wait_before_and_after_resolve() {
        let (tx, ticket) = WriteTicket::pending();
        assert!(ticket.try_wait().is_none());

        tx.send(Ok(())).unwrap();
        assert!(matches!(ticket.try_wait(), Some(Ok(()))));
    }

    #[test]
    fn test_wait_on_dropped_sender_is_aborted() {
        let (tx, ticket) = WriteTicket::pending();
        drop(tx);
        assert!(matches!(ticket.wait(), Err(FlatError::WriteAborted)));
    }
}

//! Bounded outbound queue of one session.
//!
//! The room loop pushes without waiting; the session's outbound pump drains.
//! Closing is signalled through a token rather than by dropping the sender,
//! since the history replay task holds a sender of its own.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

use crate::domain::ChatMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PushError {
    #[error("outbound queue is full")]
    Full,
    #[error("outbound queue is closed")]
    Closed,
}

/// Create a connected outbox/inbox pair.
pub fn outbox(capacity: usize) -> (Outbox, Inbox) {
    let (tx, rx) = mpsc::channel(capacity);
    let closed = CancellationToken::new();
    (
        Outbox {
            tx,
            closed: closed.clone(),
        },
        Inbox { rx, closed },
    )
}

/// Writing side of a session queue.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::Sender<Arc<ChatMessage>>,
    closed: CancellationToken,
}

impl Outbox {
    /// Enqueue without waiting. Used by the room loop.
    pub fn try_push(&self, message: Arc<ChatMessage>) -> Result<(), PushError> {
        if self.closed.is_cancelled() {
            return Err(PushError::Closed);
        }
        self.tx.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => PushError::Full,
            TrySendError::Closed(_) => PushError::Closed,
        })
    }

    /// Enqueue, waiting for capacity. Gives up as soon as the queue closes.
    pub async fn push(&self, message: Arc<ChatMessage>) -> Result<(), PushError> {
        tokio::select! {
            biased;
            _ = self.closed.cancelled() => Err(PushError::Closed),
            result = self.tx.send(message) => result.map_err(|_| PushError::Closed),
        }
    }

    /// Close the queue. Messages already queued are still delivered.
    pub fn close(&self) {
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled() || self.tx.is_closed()
    }
}

/// Reading side of a session queue, owned by the outbound pump.
#[derive(Debug)]
pub struct Inbox {
    rx: mpsc::Receiver<Arc<ChatMessage>>,
    closed: CancellationToken,
}

impl Inbox {
    /// Next message in enqueue order, or `None` once the queue is closed and
    /// everything queued before the close has been handed out.
    pub async fn recv(&mut self) -> Option<Arc<ChatMessage>> {
        tokio::select! {
            biased;
            message = self.rx.recv() => message,
            _ = self.closed.cancelled() => {
                self.rx.close();
                self.rx.recv().await
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn try_recv(&mut self) -> Option<Arc<ChatMessage>> {
        self.rx.try_recv().ok()
    }
}

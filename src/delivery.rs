//! # Delivery Channel
//!
//! Completed fixes leave the session through a bounded [`tokio::sync::mpsc`]
//! channel. The session side is synchronous: depending on the
//! [`DeliveryPolicy`] it either waits for room in the queue or drops the fix.

#[cfg(feature = "serde")]
use serde::Deserialize;
use tokio::sync::mpsc;

pub use tokio::sync::mpsc::error::TryRecvError;

use crate::fix::Fix;

/// What the producer does when the delivery queue is full.
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPolicy {
    /// Wait until the consumer makes room.
    ///
    /// Waiting uses [`mpsc::Sender::blocking_send`], which panics on an async
    /// runtime thread. Async callers feed the session from
    /// `tokio::task::spawn_blocking` or pick [`DropNewest`](Self::DropNewest).
    #[default]
    Block,
    /// Discard the new fix and keep going.
    DropNewest,
}

/// Outcome of handing one fix to the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The queue was full and the policy is [`DeliveryPolicy::DropNewest`].
    Dropped,
    /// The receiver is gone, or the sender was shut down.
    Closed,
}

/// Producer half, owned by the session.
#[derive(Debug)]
pub struct FixSender {
    tx: Option<mpsc::Sender<Fix>>,
    policy: DeliveryPolicy,
    closed_reported: bool,
}

impl FixSender {
    pub fn policy(&self) -> DeliveryPolicy {
        self.policy
    }

    pub fn is_closed(&self) -> bool {
        self.tx.as_ref().is_none_or(|tx| tx.is_closed())
    }

    pub fn send(&mut self, fix: Fix) -> Delivery {
        let Some(tx) = &self.tx else {
            return self.closed();
        };

        let sent = match self.policy {
            DeliveryPolicy::Block => tx.blocking_send(fix).map_err(|_| Delivery::Closed),
            DeliveryPolicy::DropNewest => tx.try_send(fix).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => Delivery::Dropped,
                mpsc::error::TrySendError::Closed(_) => Delivery::Closed,
            }),
        };

        match sent {
            Ok(()) => Delivery::Delivered,
            Err(Delivery::Dropped) => {
                log::warn!("delivery queue full, dropping fix");
                Delivery::Dropped
            }
            Err(_) => self.closed(),
        }
    }

    /// Drops the underlying sender; the receiver sees the channel close once
    /// it has drained the queued fixes.
    pub fn close(&mut self) {
        self.tx = None;
    }

    fn closed(&mut self) -> Delivery {
        if !self.closed_reported {
            log::warn!("fix receiver closed, further fixes are discarded");
            self.closed_reported = true;
        }
        Delivery::Closed
    }
}

/// Consumer half, handed to the caller.
#[derive(Debug)]
pub struct FixReceiver {
    rx: mpsc::Receiver<Fix>,
}

impl FixReceiver {
    /// Waits for the next fix. Returns `None` once the session has shut down and
    /// every queued fix has been received.
    pub async fn recv(&mut self) -> Option<Fix> {
        self.rx.recv().await
    }

    /// Blocking variant of [`recv`](Self::recv), for use outside an async runtime.
    pub fn blocking_recv(&mut self) -> Option<Fix> {
        self.rx.blocking_recv()
    }

    pub fn try_recv(&mut self) -> Result<Fix, TryRecvError> {
        self.rx.try_recv()
    }

    /// Stops accepting fixes; queued ones can still be received.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

/// Creates a delivery channel holding at most `capacity` undelivered fixes.
///
/// A capacity of 0 is raised to 1.
pub fn channel(capacity: usize, policy: DeliveryPolicy) -> (FixSender, FixReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        FixSender {
            tx: Some(tx),
            policy,
            closed_reported: false,
        },
        FixReceiver { rx },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fix::Level;

    fn fix(level: Level) -> Fix {
        Fix {
            level,
            ..Default::default()
        }
    }

    #[test]
    fn test_block_delivers_in_order() {
        let (mut tx, mut rx) = channel(4, DeliveryPolicy::Block);
        assert_eq!(tx.send(fix(Level::Time)), Delivery::Delivered);
        assert_eq!(tx.send(fix(Level::Position)), Delivery::Delivered);

        assert_eq!(rx.blocking_recv().map(|f| f.level), Some(Level::Time));
        assert_eq!(rx.try_recv().map(|f| f.level), Ok(Level::Position));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_drop_newest_when_full() {
        let (mut tx, mut rx) = channel(1, DeliveryPolicy::DropNewest);
        assert_eq!(tx.send(fix(Level::Time)), Delivery::Delivered);
        assert_eq!(tx.send(fix(Level::Satellites)), Delivery::Dropped);

        assert_eq!(rx.try_recv().map(|f| f.level), Ok(Level::Time));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_close_drains_then_ends() {
        let (mut tx, mut rx) = channel(4, DeliveryPolicy::Block);
        tx.send(fix(Level::Dop));
        tx.close();
        assert!(tx.is_closed());
        assert_eq!(tx.send(fix(Level::Dop)), Delivery::Closed);

        assert_eq!(rx.blocking_recv().map(|f| f.level), Some(Level::Dop));
        assert_eq!(rx.blocking_recv(), None);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn test_receiver_dropped() {
        let (mut tx, rx) = channel(4, DeliveryPolicy::Block);
        drop(rx);
        assert!(tx.is_closed());
        assert_eq!(tx.send(fix(Level::Time)), Delivery::Closed);
        assert_eq!(tx.send(fix(Level::Time)), Delivery::Closed);
    }

    #[tokio::test]
    async fn test_async_recv() {
        let (mut tx, mut rx) = channel(2, DeliveryPolicy::DropNewest);
        tx.send(fix(Level::Altitude));
        tx.close();

        assert_eq!(rx.recv().await.map(|f| f.level), Some(Level::Altitude));
        assert_eq!(rx.recv().await, None);
    }
}

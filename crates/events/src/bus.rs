//! Event publishing/subscription abstraction (mechanics only).
//!
//! A lightweight pub/sub contract used as the notification transport: the
//! engine publishes lifecycle events, notification consumers subscribe.
//!
//! The bus makes minimal assumptions:
//!
//! - **Transport-agnostic**: in-memory channels here; a queue or push gateway
//!   would implement the same trait.
//! - **At-least-once**: events may be delivered more than once; consumers must
//!   be idempotent.
//! - **Not part of correctness**: the expense store is the source of truth.
//!   A lost or failed publication never invalidates a recorded operation.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to an event stream.
///
/// Each subscription receives a copy of every event published after it was
/// created (broadcast semantics). Designed for single-threaded consumption;
/// give each consumer thread its own subscription.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// `publish()` can fail (e.g. poisoned internal state); failures surface to
/// the caller, which for notifications logs and moves on. Implementations
/// must be `Send + Sync` — multiple threads publish concurrently.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}

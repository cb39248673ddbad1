//! `splitledger-events` — domain event contract and pub/sub transport.
//!
//! The lifecycle engine publishes expense events here; notification consumers
//! subscribe. Delivery is fire-and-forget and never part of correctness.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};

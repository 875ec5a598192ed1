//! `fueldepot-events` — event contract and pub/sub mechanics.
//!
//! Ledger mutations are broadcast to interested consumers (currently the
//! report cache). The bus is a distribution mechanism only; the operation
//! history remains the source of truth.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};

//! `fueldepot-observability` — tracing/logging initialization.

mod tracing_init;

pub use tracing_init::init;

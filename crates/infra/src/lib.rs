//! `fueldepot-infra` — stores and the operation engine.
//!
//! Store traits with in-memory implementations (tests/dev; a SQL backend
//! would implement the same traits), plus the [`engine::OperationEngine`]
//! that composes catalog, stock, and history into atomic operation applies.

pub mod catalog_store;
pub mod engine;
pub mod operation_store;
pub mod stock_store;

#[cfg(test)]
mod integration_tests;

pub use catalog_store::{CatalogStore, InMemoryCatalog};
pub use engine::OperationEngine;
pub use operation_store::{InMemoryOperationStore, OperationStore};
pub use stock_store::{InMemoryStockStore, StockDelta, StockStore};

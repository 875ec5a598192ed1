//! `fueldepot-catalog` — master reference data.
//!
//! Warehouses, items, and counterparties (suppliers, beneficiaries,
//! stations). Pure reference data: identifiers and active flags, no stock
//! state. The operation engine resolves every id it is handed against this
//! catalog before touching the ledger.

pub mod item;
pub mod party;
pub mod warehouse;

pub use item::Item;
pub use party::{Beneficiary, Station, Supplier};
pub use warehouse::{Warehouse, parent_chain_is_acyclic};

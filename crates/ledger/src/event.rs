use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fueldepot_core::{ItemId, Quantity, WarehouseId};
use fueldepot_events::Event;

/// Ledger-changed notifications published after successful mutations.
///
/// Consumers (the report cache) treat these as invalidation hints; the
/// operation history stays the source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockEvent {
    BalanceCreated {
        warehouse: WarehouseId,
        item: ItemId,
        opening_balance: Quantity,
        occurred_at: DateTime<Utc>,
    },
    StockLevelChanged {
        warehouse: WarehouseId,
        item: ItemId,
        delta: Decimal,
        quantity_after: Quantity,
        occurred_at: DateTime<Utc>,
    },
}

impl Event for StockEvent {
    fn event_type(&self) -> &'static str {
        match self {
            StockEvent::BalanceCreated { .. } => "ledger.balance.created",
            StockEvent::StockLevelChanged { .. } => "ledger.stock.changed",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            StockEvent::BalanceCreated { occurred_at, .. } => *occurred_at,
            StockEvent::StockLevelChanged { occurred_at, .. } => *occurred_at,
        }
    }
}

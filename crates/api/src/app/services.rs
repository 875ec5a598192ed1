//! Store/engine wiring and the cached warehouse-status report.

use std::sync::{Arc, Mutex};

use fueldepot_core::WarehouseId;
use fueldepot_events::{EventBus, InMemoryEventBus};
use fueldepot_infra::{
    InMemoryCatalog, InMemoryOperationStore, InMemoryStockStore, OperationEngine, StockStore,
};
use fueldepot_ledger::StockEvent;
use fueldepot_reports::{StatusRow, warehouse_status};

pub type Engine = OperationEngine<
    Arc<InMemoryCatalog>,
    Arc<InMemoryStockStore>,
    Arc<InMemoryOperationStore>,
    Arc<InMemoryEventBus<StockEvent>>,
>;

/// Cached result of the unfiltered warehouse-status report.
///
/// Invalidated by ledger-changed events; recomputed lazily on demand.
#[derive(Debug, Default)]
pub struct StatusCache {
    rows: Mutex<Option<Vec<StatusRow>>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&self) {
        if let Ok(mut rows) = self.rows.lock() {
            *rows = None;
        }
    }

    pub fn get_or_compute(&self, compute: impl FnOnce() -> Vec<StatusRow>) -> Vec<StatusRow> {
        let Ok(mut rows) = self.rows.lock() else {
            return compute();
        };
        rows.get_or_insert_with(compute).clone()
    }
}

/// Shared application services, injected into handlers via `Extension`.
pub struct AppServices {
    pub engine: Engine,
    pub catalog: Arc<InMemoryCatalog>,
    pub stock: Arc<InMemoryStockStore>,
    pub history: Arc<InMemoryOperationStore>,
    pub bus: Arc<InMemoryEventBus<StockEvent>>,
    status_cache: Arc<StatusCache>,
}

impl AppServices {
    /// Warehouse-status report; the unfiltered variant is served from the
    /// event-invalidated cache.
    pub fn warehouse_status(&self, warehouse: Option<WarehouseId>) -> Vec<StatusRow> {
        match warehouse {
            None => self
                .status_cache
                .get_or_compute(|| warehouse_status(&self.stock.list(), None)),
            Some(w) => warehouse_status(&self.stock.list(), Some(w)),
        }
    }
}

pub fn build_services() -> AppServices {
    // In-memory wiring (dev/test): stores + bus + engine.
    let catalog = Arc::new(InMemoryCatalog::new());
    let stock = Arc::new(InMemoryStockStore::new());
    let history = Arc::new(InMemoryOperationStore::new());
    let bus: Arc<InMemoryEventBus<StockEvent>> = Arc::new(InMemoryEventBus::new());
    let status_cache = Arc::new(StatusCache::new());

    // Background subscriber: ledger events -> report cache invalidation.
    {
        let sub = bus.subscribe();
        let status_cache = status_cache.clone();
        tokio::task::spawn_blocking(move || {
            loop {
                match sub.recv() {
                    Ok(event) => {
                        tracing::debug!("ledger changed: {event:?}");
                        status_cache.invalidate();
                    }
                    Err(_) => break,
                }
            }
        });
    }

    let engine = OperationEngine::new(
        catalog.clone(),
        stock.clone(),
        history.clone(),
        bus.clone(),
    );

    AppServices {
        engine,
        catalog,
        stock,
        history,
        bus,
        status_cache,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_serves_computed_rows_until_invalidated() {
        let cache = StatusCache::new();

        let first = cache.get_or_compute(Vec::new);
        assert!(first.is_empty());

        // Cached: the closure must not run again.
        let second = cache.get_or_compute(|| panic!("cache should be warm"));
        assert!(second.is_empty());

        cache.invalidate();
        let third = cache.get_or_compute(Vec::new);
        assert!(third.is_empty());
    }
}

//! Master-data store: warehouses, items, and parties.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use fueldepot_catalog::{Beneficiary, Item, Station, Supplier, Warehouse, parent_chain_is_acyclic};
use fueldepot_core::{
    BeneficiaryId, ItemId, LedgerError, LedgerResult, StationId, SupplierId, WarehouseId,
};

/// Reference-data store.
///
/// Creation rejects duplicate ids with `Conflict`; warehouse creation also
/// rejects parent links that would close a cycle. Entities are soft-
/// deactivated, never removed, so history keeps resolving.
pub trait CatalogStore: Send + Sync {
    fn insert_warehouse(&self, warehouse: Warehouse) -> LedgerResult<()>;
    fn warehouse(&self, id: WarehouseId) -> Option<Warehouse>;
    fn warehouses(&self) -> Vec<Warehouse>;
    fn set_warehouse_active(&self, id: WarehouseId, active: bool) -> LedgerResult<Warehouse>;

    fn insert_item(&self, item: Item) -> LedgerResult<()>;
    fn item(&self, id: ItemId) -> Option<Item>;
    fn items(&self) -> Vec<Item>;
    fn set_item_active(&self, id: ItemId, active: bool) -> LedgerResult<Item>;

    fn insert_supplier(&self, supplier: Supplier) -> LedgerResult<()>;
    fn supplier(&self, id: SupplierId) -> Option<Supplier>;
    fn suppliers(&self) -> Vec<Supplier>;
    fn set_supplier_active(&self, id: SupplierId, active: bool) -> LedgerResult<Supplier>;

    fn insert_beneficiary(&self, beneficiary: Beneficiary) -> LedgerResult<()>;
    fn beneficiary(&self, id: BeneficiaryId) -> Option<Beneficiary>;
    fn beneficiaries(&self) -> Vec<Beneficiary>;
    fn set_beneficiary_active(&self, id: BeneficiaryId, active: bool) -> LedgerResult<Beneficiary>;

    fn insert_station(&self, station: Station) -> LedgerResult<()>;
    fn station(&self, id: StationId) -> Option<Station>;
    fn stations(&self) -> Vec<Station>;
    fn set_station_active(&self, id: StationId, active: bool) -> LedgerResult<Station>;
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn insert_warehouse(&self, warehouse: Warehouse) -> LedgerResult<()> {
        (**self).insert_warehouse(warehouse)
    }
    fn warehouse(&self, id: WarehouseId) -> Option<Warehouse> {
        (**self).warehouse(id)
    }
    fn warehouses(&self) -> Vec<Warehouse> {
        (**self).warehouses()
    }
    fn set_warehouse_active(&self, id: WarehouseId, active: bool) -> LedgerResult<Warehouse> {
        (**self).set_warehouse_active(id, active)
    }

    fn insert_item(&self, item: Item) -> LedgerResult<()> {
        (**self).insert_item(item)
    }
    fn item(&self, id: ItemId) -> Option<Item> {
        (**self).item(id)
    }
    fn items(&self) -> Vec<Item> {
        (**self).items()
    }
    fn set_item_active(&self, id: ItemId, active: bool) -> LedgerResult<Item> {
        (**self).set_item_active(id, active)
    }

    fn insert_supplier(&self, supplier: Supplier) -> LedgerResult<()> {
        (**self).insert_supplier(supplier)
    }
    fn supplier(&self, id: SupplierId) -> Option<Supplier> {
        (**self).supplier(id)
    }
    fn suppliers(&self) -> Vec<Supplier> {
        (**self).suppliers()
    }
    fn set_supplier_active(&self, id: SupplierId, active: bool) -> LedgerResult<Supplier> {
        (**self).set_supplier_active(id, active)
    }

    fn insert_beneficiary(&self, beneficiary: Beneficiary) -> LedgerResult<()> {
        (**self).insert_beneficiary(beneficiary)
    }
    fn beneficiary(&self, id: BeneficiaryId) -> Option<Beneficiary> {
        (**self).beneficiary(id)
    }
    fn beneficiaries(&self) -> Vec<Beneficiary> {
        (**self).beneficiaries()
    }
    fn set_beneficiary_active(&self, id: BeneficiaryId, active: bool) -> LedgerResult<Beneficiary> {
        (**self).set_beneficiary_active(id, active)
    }

    fn insert_station(&self, station: Station) -> LedgerResult<()> {
        (**self).insert_station(station)
    }
    fn station(&self, id: StationId) -> Option<Station> {
        (**self).station(id)
    }
    fn stations(&self) -> Vec<Station> {
        (**self).stations()
    }
    fn set_station_active(&self, id: StationId, active: bool) -> LedgerResult<Station> {
        (**self).set_station_active(id, active)
    }
}

/// In-memory catalog for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    warehouses: RwLock<HashMap<WarehouseId, Warehouse>>,
    items: RwLock<HashMap<ItemId, Item>>,
    suppliers: RwLock<HashMap<SupplierId, Supplier>>,
    beneficiaries: RwLock<HashMap<BeneficiaryId, Beneficiary>>,
    stations: RwLock<HashMap<StationId, Station>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

fn insert_unique<K, V>(
    map: &RwLock<HashMap<K, V>>,
    key: K,
    value: V,
    what: &str,
) -> LedgerResult<()>
where
    K: std::hash::Hash + Eq + core::fmt::Display + Copy,
{
    let mut map = map
        .write()
        .map_err(|_| LedgerError::internal("catalog lock poisoned"))?;
    if map.contains_key(&key) {
        return Err(LedgerError::conflict(format!("{what} {key} already exists")));
    }
    map.insert(key, value);
    Ok(())
}

fn get_cloned<K, V>(map: &RwLock<HashMap<K, V>>, key: &K) -> Option<V>
where
    K: std::hash::Hash + Eq,
    V: Clone,
{
    map.read().ok()?.get(key).cloned()
}

fn list_cloned<K, V>(map: &RwLock<HashMap<K, V>>) -> Vec<V>
where
    V: Clone,
{
    map.read()
        .map(|m| m.values().cloned().collect())
        .unwrap_or_default()
}

fn set_active<K, V>(
    map: &RwLock<HashMap<K, V>>,
    key: K,
    what: &str,
    apply: impl FnOnce(&mut V),
) -> LedgerResult<V>
where
    K: std::hash::Hash + Eq + core::fmt::Display + Copy,
    V: Clone,
{
    let mut map = map
        .write()
        .map_err(|_| LedgerError::internal("catalog lock poisoned"))?;
    let entry = map
        .get_mut(&key)
        .ok_or_else(|| LedgerError::not_found(format!("{what} {key}")))?;
    apply(entry);
    Ok(entry.clone())
}

impl CatalogStore for InMemoryCatalog {
    fn insert_warehouse(&self, warehouse: Warehouse) -> LedgerResult<()> {
        if let Some(parent) = warehouse.parent {
            let warehouses = self
                .warehouses
                .read()
                .map_err(|_| LedgerError::internal("catalog lock poisoned"))?;
            if !warehouses.contains_key(&parent) {
                return Err(LedgerError::not_found(format!("warehouse {parent}")));
            }
            let acyclic = parent_chain_is_acyclic(warehouse.id, parent, |id| {
                warehouses.get(&id).and_then(|w| w.parent)
            });
            if !acyclic {
                return Err(LedgerError::validation(
                    "parent",
                    "link would create a cycle in the warehouse tree",
                ));
            }
        }
        insert_unique(&self.warehouses, warehouse.id, warehouse, "warehouse")
    }

    fn warehouse(&self, id: WarehouseId) -> Option<Warehouse> {
        get_cloned(&self.warehouses, &id)
    }

    fn warehouses(&self) -> Vec<Warehouse> {
        list_cloned(&self.warehouses)
    }

    fn set_warehouse_active(&self, id: WarehouseId, active: bool) -> LedgerResult<Warehouse> {
        set_active(&self.warehouses, id, "warehouse", |w| w.active = active)
    }

    fn insert_item(&self, item: Item) -> LedgerResult<()> {
        insert_unique(&self.items, item.id, item, "item")
    }

    fn item(&self, id: ItemId) -> Option<Item> {
        get_cloned(&self.items, &id)
    }

    fn items(&self) -> Vec<Item> {
        list_cloned(&self.items)
    }

    fn set_item_active(&self, id: ItemId, active: bool) -> LedgerResult<Item> {
        set_active(&self.items, id, "item", |i| i.active = active)
    }

    fn insert_supplier(&self, supplier: Supplier) -> LedgerResult<()> {
        insert_unique(&self.suppliers, supplier.id, supplier, "supplier")
    }

    fn supplier(&self, id: SupplierId) -> Option<Supplier> {
        get_cloned(&self.suppliers, &id)
    }

    fn suppliers(&self) -> Vec<Supplier> {
        list_cloned(&self.suppliers)
    }

    fn set_supplier_active(&self, id: SupplierId, active: bool) -> LedgerResult<Supplier> {
        set_active(&self.suppliers, id, "supplier", |s| s.active = active)
    }

    fn insert_beneficiary(&self, beneficiary: Beneficiary) -> LedgerResult<()> {
        insert_unique(&self.beneficiaries, beneficiary.id, beneficiary, "beneficiary")
    }

    fn beneficiary(&self, id: BeneficiaryId) -> Option<Beneficiary> {
        get_cloned(&self.beneficiaries, &id)
    }

    fn beneficiaries(&self) -> Vec<Beneficiary> {
        list_cloned(&self.beneficiaries)
    }

    fn set_beneficiary_active(&self, id: BeneficiaryId, active: bool) -> LedgerResult<Beneficiary> {
        set_active(&self.beneficiaries, id, "beneficiary", |b| b.active = active)
    }

    fn insert_station(&self, station: Station) -> LedgerResult<()> {
        insert_unique(&self.stations, station.id, station, "station")
    }

    fn station(&self, id: StationId) -> Option<Station> {
        get_cloned(&self.stations, &id)
    }

    fn stations(&self) -> Vec<Station> {
        list_cloned(&self.stations)
    }

    fn set_station_active(&self, id: StationId, active: bool) -> LedgerResult<Station> {
        set_active(&self.stations, id, "station", |s| s.active = active)
    }
}

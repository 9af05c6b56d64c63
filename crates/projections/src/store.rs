use std::collections::HashMap;
use std::sync::RwLock;

use tallybook_core::Entity;

/// Key/value store abstraction for disposable read models, keyed by entity id.
///
/// Explicit and injectable, not an ambient global cache. The values are
/// last-known copies of store state; they can be cleared and rebuilt from the
/// store at any time.
pub trait ProjectionStore<E: Entity>: Send + Sync {
    fn get(&self, id: &E::Id) -> Option<E>;
    fn upsert(&self, entity: E);
    fn remove(&self, id: &E::Id);
    fn list(&self) -> Vec<E>;
    /// Drop all records (rebuild support).
    fn clear(&self);
}

/// In-memory projection store.
#[derive(Debug)]
pub struct InMemoryProjection<E: Entity> {
    inner: RwLock<HashMap<E::Id, E>>,
}

impl<E: Entity> InMemoryProjection<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<E: Entity> Default for InMemoryProjection<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ProjectionStore<E> for InMemoryProjection<E>
where
    E: Entity + Clone + Send + Sync + 'static,
    E::Id: Send + Sync,
{
    fn get(&self, id: &E::Id) -> Option<E> {
        let map = self.inner.read().ok()?;
        map.get(id).cloned()
    }

    fn upsert(&self, entity: E) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(entity.id().clone(), entity);
        }
    }

    fn remove(&self, id: &E::Id) {
        if let Ok(mut map) = self.inner.write() {
            map.remove(id);
        }
    }

    fn list(&self) -> Vec<E> {
        match self.inner.read() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => vec![],
        }
    }

    fn clear(&self) {
        if let Ok(mut map) = self.inner.write() {
            map.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tallybook_core::{Money, RecordId};
    use tallybook_products::{ProductId, ProductRecord};

    fn product(name: &str, stock: u64) -> ProductRecord {
        ProductRecord {
            id: ProductId::new(RecordId::new()),
            name: name.to_string(),
            description: String::new(),
            category: "Kitchen".to_string(),
            price: Money::from_minor(1000),
            stock_quantity: stock,
        }
    }

    #[test]
    fn upsert_then_get_returns_latest_copy() {
        let projection = InMemoryProjection::new();
        let mut record = product("Steel Bottle", 10);
        projection.upsert(record.clone());

        record.stock_quantity = 6;
        projection.upsert(record.clone());

        assert_eq!(projection.get(&record.id), Some(record));
        assert_eq!(projection.list().len(), 1);
    }

    #[test]
    fn remove_drops_only_the_target() {
        let projection = InMemoryProjection::new();
        let first = product("Steel Bottle", 10);
        let second = product("Copper Mug", 4);
        projection.upsert(first.clone());
        projection.upsert(second.clone());

        projection.remove(&first.id);

        assert_eq!(projection.get(&first.id), None);
        assert_eq!(projection.get(&second.id), Some(second));
    }

    #[test]
    fn clear_empties_the_collection() {
        let projection = InMemoryProjection::new();
        projection.upsert(product("Steel Bottle", 10));
        projection.clear();
        assert!(projection.list().is_empty());
    }
}

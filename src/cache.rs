use std::{any::TypeId, sync::Arc};

use ahash::AHashMap;
use arc_swap::ArcSwap;

use crate::{errors::KvGraphError, registry::ResolvedSchema};

/// In-memory tier of the schema registry.
///
/// Readers load the current map without locking. Writers publish a new map with
/// a compare-and-swap loop, so the first registration of a type has exactly one
/// winner and every later caller adopts the winner's entry.
#[derive(Default)]
pub struct SchemaCache {
    entries: ArcSwap<AHashMap<TypeId, Arc<ResolvedSchema>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self {
            entries: ArcSwap::from_pointee(AHashMap::new()),
        }
    }

    pub fn get(&self, key: TypeId) -> Option<Arc<ResolvedSchema>> {
        self.entries.load().get(&key).cloned()
    }

    /// Installs `entry` unless `key` already has one, returning the installed entry.
    ///
    /// Fails when another type already owns `entry`'s type path.
    pub fn get_or_insert(
        &self,
        key: TypeId,
        entry: Arc<ResolvedSchema>,
    ) -> Result<Arc<ResolvedSchema>, KvGraphError> {
        if let Some(existing) = self.get(key) {
            return Ok(existing);
        }
        let mut outcome = Ok(Arc::clone(&entry));
        self.entries.rcu(|current| {
            if let Some(existing) = current.get(&key) {
                outcome = Ok(Arc::clone(existing));
                return Arc::clone(current);
            }
            if current
                .values()
                .any(|other| other.type_path() == entry.type_path())
            {
                outcome = Err(KvGraphError::schema(format!(
                    "type path {} is already registered by another type",
                    entry.type_path()
                )));
                return Arc::clone(current);
            }
            let mut next = AHashMap::clone(current);
            next.insert(key, Arc::clone(&entry));
            outcome = Ok(Arc::clone(&entry));
            Arc::new(next)
        });
        outcome
    }

    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

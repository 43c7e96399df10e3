//! Schema registry: maps a record type to its type path and attribute codes.
//!
//! Resolution is read-through over two tiers. The in-memory [`SchemaCache`]
//! answers repeated lookups; on a miss the persisted `schema:<type path>` entry
//! is read, reconciled with the declared attributes, written when needed and
//! installed in memory. The entry is a pure function of the type, so racing
//! first registrations all converge on the same value.

use std::{
    any::{TypeId, type_name},
    collections::BTreeMap,
    sync::Arc,
};

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::{
    backend::{KvBackend, KvRead},
    cache::SchemaCache,
    errors::KvGraphError,
    hash::{SCHEMA_PREFIX, schema_key},
    record::{Attribute, Record},
};

/// The persisted form of a schema entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSchema {
    pub path: String,
    pub attributes: BTreeMap<String, char>,
}

/// A type's schema as resolved for this process.
#[derive(Debug)]
pub struct ResolvedSchema {
    type_path: String,
    attributes: &'static [Attribute],
    by_code: AHashMap<char, usize>,
}

impl ResolvedSchema {
    /// Validates the attribute table `R` declares.
    pub fn declare<R: Record>() -> Result<Self, KvGraphError> {
        let type_path = type_name::<R>().to_string();
        let attributes = R::attributes();
        let mut names = AHashSet::new();
        let mut by_code = AHashMap::new();
        for (idx, attr) in attributes.iter().enumerate() {
            if attr.name.trim().is_empty() {
                return Err(KvGraphError::schema(format!(
                    "{type_path}: attribute names must be set"
                )));
            }
            if !names.insert(attr.name) {
                return Err(KvGraphError::schema(format!(
                    "{type_path}: attribute `{}` is declared twice",
                    attr.name
                )));
            }
            if let Some(prev) = by_code.insert(attr.code, idx) {
                return Err(KvGraphError::schema(format!(
                    "{type_path}: code '{}' is used by both `{}` and `{}`",
                    attr.code, attributes[prev].name, attr.name
                )));
            }
        }
        Ok(Self {
            type_path,
            attributes,
            by_code,
        })
    }

    pub fn type_path(&self) -> &str {
        &self.type_path
    }

    pub fn attributes(&self) -> &'static [Attribute] {
        self.attributes
    }

    pub fn by_code(&self, code: char) -> Option<&Attribute> {
        self.by_code.get(&code).map(|&idx| &self.attributes[idx])
    }

    pub fn by_name(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    pub fn persisted(&self) -> PersistedSchema {
        PersistedSchema {
            path: self.type_path.clone(),
            attributes: self
                .attributes
                .iter()
                .map(|attr| (attr.name.to_string(), attr.code))
                .collect(),
        }
    }
}

pub struct SchemaRegistry {
    backend: Arc<KvBackend>,
    cache: SchemaCache,
}

impl SchemaRegistry {
    pub fn new(backend: Arc<KvBackend>) -> Self {
        Self {
            backend,
            cache: SchemaCache::new(),
        }
    }

    pub fn backend(&self) -> &Arc<KvBackend> {
        &self.backend
    }

    pub fn resolve<R: Record>(&self) -> Result<Arc<ResolvedSchema>, KvGraphError> {
        let type_id = TypeId::of::<R>();
        if let Some(hit) = self.cache.get(type_id) {
            return Ok(hit);
        }
        let declared = ResolvedSchema::declare::<R>()?;
        let key = schema_key(declared.type_path());
        let wanted = declared.persisted();

        let stored = self
            .backend
            .view(|tx| read_persisted(tx, &key))
            .map_err(|e| in_schema_namespace(&key, e))?;
        let up_to_date = match &stored {
            Some(stored) => reconcile(stored, &wanted)?.is_none(),
            None => false,
        };
        if !up_to_date {
            self.backend
                .update(|tx| {
                    let next = match read_persisted(&*tx, &key)? {
                        None => Some(wanted.clone()),
                        Some(stored) => reconcile(&stored, &wanted)?,
                    };
                    if let Some(next) = next {
                        let bytes = serde_json::to_vec(&next)
                            .map_err(|e| KvGraphError::schema(e.to_string()))?;
                        tx.set(&key, &bytes)?;
                    }
                    Ok(())
                })
                .map_err(|e| in_schema_namespace(&key, e))?;
            tracing::debug!(type_path = %wanted.path, "registry.schema.persisted");
        }
        self.cache.get_or_insert(type_id, Arc::new(declared))
    }

    /// Every schema entry written to the backend, ordered by type path.
    pub fn persisted_types(&self) -> Result<Vec<PersistedSchema>, KvGraphError> {
        self.backend
            .view(|tx| {
                let mut entries = Vec::new();
                for (key, bytes) in tx.scan_prefix(SCHEMA_PREFIX)? {
                    entries.push(parse_persisted(&key, &bytes)?);
                }
                Ok(entries)
            })
            .map_err(|e| in_schema_namespace(SCHEMA_PREFIX, e))
    }

    /// Number of types resolved by this registry so far.
    pub fn cached_types(&self) -> usize {
        self.cache.len()
    }
}

fn read_persisted<T: KvRead>(tx: &T, key: &str) -> Result<Option<PersistedSchema>, KvGraphError> {
    tx.get(key)?
        .map(|bytes| parse_persisted(key, &bytes))
        .transpose()
}

fn parse_persisted(key: &str, bytes: &[u8]) -> Result<PersistedSchema, KvGraphError> {
    serde_json::from_slice(bytes)
        .map_err(|e| KvGraphError::schema(format!("corrupt schema entry {key}: {e}")))
}

fn in_schema_namespace(key: &str, err: KvGraphError) -> KvGraphError {
    match err {
        KvGraphError::SchemaResolution(_) => err,
        other => KvGraphError::schema(format!("{key}: {other}")),
    }
}

/// Checks that `wanted` keeps every code `stored` assigned. Returns the merged
/// entry when `wanted` declares attributes `stored` does not know yet.
fn reconcile(
    stored: &PersistedSchema,
    wanted: &PersistedSchema,
) -> Result<Option<PersistedSchema>, KvGraphError> {
    let stored_names: AHashMap<char, &str> = stored
        .attributes
        .iter()
        .map(|(name, code)| (*code, name.as_str()))
        .collect();
    let mut merged = stored.clone();
    let mut changed = false;
    for (name, code) in &wanted.attributes {
        match stored.attributes.get(name) {
            Some(old) if old != code => {
                return Err(KvGraphError::schema(format!(
                    "{}: attribute `{name}` is stored with code '{old}' but declared with '{code}'",
                    wanted.path
                )));
            }
            Some(_) => {}
            None => {
                if let Some(owner) = stored_names.get(code) {
                    return Err(KvGraphError::schema(format!(
                        "{}: code '{code}' of `{name}` already belongs to `{owner}`",
                        wanted.path
                    )));
                }
                merged.attributes.insert(name.clone(), *code);
                changed = true;
            }
        }
    }
    Ok(changed.then_some(merged))
}

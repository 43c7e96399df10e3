use crate::{
    backend::KvRead,
    codec::{self, Payload},
    errors::KvGraphError,
    record::Vertex,
    registry::ResolvedSchema,
    value::AttrValue,
};

use super::{GraphStore, keyspace};

impl<T: Vertex> GraphStore<T> {
    /// Stores a new vertex and returns its hash.
    pub fn add_vertex(&self, vertex: &T) -> Result<String, KvGraphError> {
        let schema = self.registry.resolve::<T>()?;
        let id = vertex.id();
        self.scheme.validate_identity(T::TYPE, &id)?;
        let hash = self.scheme.vertex_hash(T::TYPE, &id);
        let bytes = codec::encode(vertex, &schema)?;
        self.backend.update(|tx| {
            if tx.contains(&hash)? {
                return Err(KvGraphError::vertex_exists(hash.as_str()));
            }
            tx.set(&hash, &bytes)
        })?;
        Ok(hash)
    }

    pub fn vertex(&self, hash: &str) -> Result<T, KvGraphError> {
        let id = self.own_id(hash)?;
        let schema = self.registry.resolve::<T>()?;
        let bytes = self
            .backend
            .view(|tx| tx.get(hash))?
            .ok_or_else(|| KvGraphError::vertex_not_found(hash))?;
        let mut vertex = T::from_id(id);
        codec::decode(&bytes, &schema, &mut vertex)?;
        Ok(vertex)
    }

    /// False for anything that is not a vertex hash.
    pub fn contains_vertex(&self, hash: &str) -> Result<bool, KvGraphError> {
        if self.scheme.parse_vertex_hash(hash).is_none() {
            return Ok(false);
        }
        self.backend.view(|tx| tx.contains(hash))
    }

    /// Deletes a vertex, of any type, that no edge references.
    pub fn remove_vertex(&self, hash: &str) -> Result<(), KvGraphError> {
        if self.scheme.parse_vertex_hash(hash).is_none() {
            return Err(malformed_vertex_hash(hash));
        }
        self.backend.update(|tx| {
            if keyspace::has_incident_edges(&*tx, &self.scheme, hash)? {
                return Err(KvGraphError::vertex_has_edges(hash));
            }
            if !tx.delete(hash)? {
                return Err(KvGraphError::vertex_not_found(hash));
            }
            Ok(())
        })
    }

    /// Overwrites the attributes with the given codes and leaves the rest as
    /// stored.
    pub fn update_vertex<I>(&self, hash: &str, attributes: I) -> Result<(), KvGraphError>
    where
        I: IntoIterator<Item = (char, AttrValue)>,
    {
        let id = self.own_id(hash)?;
        let schema = self.registry.resolve::<T>()?;
        let changes = typed_changes(&schema, attributes)?;
        self.backend.update(|tx| {
            let bytes = tx
                .get(hash)?
                .ok_or_else(|| KvGraphError::vertex_not_found(hash))?;
            let mut payload = codec::parse_payload(&bytes)?;
            for (code, value) in &changes {
                payload.insert(code.to_string(), value.clone());
            }
            let mut merged = T::from_id(id);
            codec::apply_payload(&payload, &schema, &mut merged)?;
            if merged.id() != id {
                return Err(KvGraphError::invalid_input(format!(
                    "update of {hash} would change its identity to '{}'",
                    merged.id()
                )));
            }
            tx.set(hash, &codec::serialize_payload(&payload)?)
        })
    }

    /// Hashes of every stored vertex, of any type, in key order.
    pub fn vertices(&self) -> Result<Vec<String>, KvGraphError> {
        self.backend.view(|tx| keyspace::vertex_hashes(tx))
    }

    /// Every stored vertex of type `T`, decoded.
    pub fn vertices_of_type(&self) -> Result<Vec<T>, KvGraphError> {
        let schema = self.registry.resolve::<T>()?;
        let prefix = self.scheme.vertex_hash(T::TYPE, "");
        let entries = self.backend.view(|tx| tx.scan_prefix(&prefix))?;
        entries
            .iter()
            .map(|(hash, bytes)| {
                let mut vertex = T::from_id(&hash[prefix.len()..]);
                codec::decode(bytes, &schema, &mut vertex)?;
                Ok(vertex)
            })
            .collect()
    }

    /// Number of stored vertices, of any type.
    pub fn order(&self) -> Result<usize, KvGraphError> {
        self.backend.view(|tx| keyspace::vertex_count(tx))
    }

    fn own_id<'h>(&self, hash: &'h str) -> Result<&'h str, KvGraphError> {
        let (tag, id) = self
            .scheme
            .parse_vertex_hash(hash)
            .ok_or_else(|| malformed_vertex_hash(hash))?;
        if tag != T::TYPE {
            return Err(KvGraphError::TypeMismatch {
                hash: hash.to_string(),
                expected: T::TYPE,
                found: tag,
            });
        }
        Ok(id)
    }
}

fn malformed_vertex_hash(hash: &str) -> KvGraphError {
    KvGraphError::invalid_input(format!("malformed vertex hash '{hash}'"))
}

/// Checks update codes against the schema and converts the values to stored form.
fn typed_changes<I>(schema: &ResolvedSchema, attributes: I) -> Result<Payload, KvGraphError>
where
    I: IntoIterator<Item = (char, AttrValue)>,
{
    let mut changes = Payload::new();
    for (code, value) in attributes {
        let attr = schema.by_code(code).ok_or_else(|| {
            KvGraphError::invalid_input(format!(
                "{} has no attribute with code '{code}'",
                schema.type_path()
            ))
        })?;
        let value = value.coerce(attr.kind).map_err(|e| {
            KvGraphError::encoding(format!("{}.{}: {e}", schema.type_path(), attr.name))
        })?;
        changes.insert(code.to_string(), value.to_json()?);
    }
    Ok(changes)
}

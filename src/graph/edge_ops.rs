use crate::{
    backend::KvRead,
    bfs,
    codec,
    edge::Edge,
    errors::KvGraphError,
    record::Vertex,
    value::AttrValue,
};

use super::{GraphStore, keyspace};

impl<T: Vertex> GraphStore<T> {
    /// Stores `edge` between two existing vertices and returns its hash.
    ///
    /// With `prevent_cycles` set the edge is refused when it would close a
    /// cycle; the check reads the same transaction the insert writes to.
    pub fn add_edge(&self, edge: &Edge) -> Result<String, KvGraphError> {
        for endpoint in [&edge.source, &edge.target] {
            if self.scheme.parse_vertex_hash(endpoint).is_none() {
                return Err(KvGraphError::invalid_input(format!(
                    "edge endpoint '{endpoint}' is not a vertex hash"
                )));
            }
        }
        let mut record = edge.clone();
        record.bidirectional = !self.traits.is_directed();
        let payload = codec::serialize_payload(&record.to_payload()?)?;
        let hash = self.scheme.edge_hash(&edge.source, &edge.target);
        let index = self.scheme.index_key(&edge.source, &edge.target);
        self.backend.update(|tx| {
            for endpoint in [&edge.source, &edge.target] {
                if !tx.contains(endpoint)? {
                    return Err(KvGraphError::vertex_not_found(endpoint.as_str()));
                }
            }
            if tx.contains(&hash)? {
                return Err(KvGraphError::edge_exists(hash.as_str()));
            }
            if self.traits.prevents_cycles()
                && bfs::creates_cycle(
                    &*tx,
                    &self.scheme,
                    &edge.source,
                    &edge.target,
                    self.traits.is_directed(),
                )?
            {
                return Err(KvGraphError::edge_creates_cycle(hash.as_str()));
            }
            tx.set(&hash, &payload)?;
            tx.set(&index, &[])
        })?;
        Ok(hash)
    }

    /// Anything outside the edge namespace is `EdgeNotFound`.
    pub fn edge(&self, hash: &str) -> Result<Edge, KvGraphError> {
        self.require_edge_key(hash)?;
        let bytes = self
            .backend
            .view(|tx| tx.get(hash))?
            .ok_or_else(|| KvGraphError::edge_not_found(hash))?;
        Edge::from_payload(&codec::parse_payload(&bytes)?)
    }

    /// Looks an edge up by its endpoints. Undirected graphs accept either order.
    pub fn edge_between(&self, source: &str, target: &str) -> Result<Edge, KvGraphError> {
        self.edge(&self.scheme.edge_hash(source, target))
    }

    pub fn contains_edge(&self, hash: &str) -> Result<bool, KvGraphError> {
        if self.scheme.parse_edge_key(hash).is_none() {
            return Ok(false);
        }
        self.backend.view(|tx| tx.contains(hash))
    }

    /// Overwrites the given attribute codes. Endpoints, direction and weight
    /// are not attributes and cannot be changed here.
    pub fn update_edge<I>(&self, hash: &str, attributes: I) -> Result<(), KvGraphError>
    where
        I: IntoIterator<Item = (char, AttrValue)>,
    {
        self.require_edge_key(hash)?;
        let changes = attributes
            .into_iter()
            .map(|(code, value)| Ok((code.to_string(), value.to_json()?)))
            .collect::<Result<Vec<_>, KvGraphError>>()?;
        self.backend.update(|tx| {
            let bytes = tx
                .get(hash)?
                .ok_or_else(|| KvGraphError::edge_not_found(hash))?;
            let mut payload = codec::parse_payload(&bytes)?;
            for (code, value) in changes {
                payload.insert(code, value);
            }
            Edge::from_payload(&payload)?;
            tx.set(hash, &codec::serialize_payload(&payload)?)
        })
    }

    /// Deletes an edge together with its reverse index entry.
    pub fn remove_edge(&self, hash: &str) -> Result<(), KvGraphError> {
        let (first, second) = self
            .scheme
            .parse_edge_key(hash)
            .ok_or_else(|| KvGraphError::invalid_input(format!("malformed edge hash '{hash}'")))?;
        let index = self.scheme.index_key(first, second);
        self.backend.update(|tx| {
            if !tx.delete(hash)? {
                return Err(KvGraphError::edge_not_found(hash));
            }
            tx.delete(&index)?;
            Ok(())
        })
    }

    /// Every stored edge with its hash, in key order.
    pub fn edges(&self) -> Result<Vec<(String, Edge)>, KvGraphError> {
        self.backend.view(|tx| keyspace::edge_records(tx))
    }

    /// Number of stored edges.
    pub fn size(&self) -> Result<usize, KvGraphError> {
        self.backend.view(|tx| keyspace::edge_count(tx))
    }

    fn require_edge_key(&self, hash: &str) -> Result<(), KvGraphError> {
        match self.scheme.parse_edge_key(hash) {
            Some(_) => Ok(()),
            None => Err(KvGraphError::edge_not_found(hash)),
        }
    }
}

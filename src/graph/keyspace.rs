//! Untyped views of the vertex, edge and index namespaces.

use crate::{
    backend::KvRead,
    codec,
    edge::Edge,
    errors::KvGraphError,
    hash::{EDGE_PREFIX, HashScheme, INDEX_PREFIX, VERTEX_PREFIX},
};

fn prefix(c: char) -> String {
    c.to_string()
}

pub fn vertex_hashes<T: KvRead>(tx: &T) -> Result<Vec<String>, KvGraphError> {
    tx.keys_with_prefix(&prefix(VERTEX_PREFIX))
}

pub fn vertex_count<T: KvRead>(tx: &T) -> Result<usize, KvGraphError> {
    tx.count_prefix(&prefix(VERTEX_PREFIX))
}

pub fn edge_hashes<T: KvRead>(tx: &T) -> Result<Vec<String>, KvGraphError> {
    tx.keys_with_prefix(&prefix(EDGE_PREFIX))
}

pub fn edge_count<T: KvRead>(tx: &T) -> Result<usize, KvGraphError> {
    tx.count_prefix(&prefix(EDGE_PREFIX))
}

/// Every stored edge, decoded, with its hash.
pub fn edge_records<T: KvRead>(tx: &T) -> Result<Vec<(String, Edge)>, KvGraphError> {
    let mut edges = Vec::new();
    for (hash, bytes) in tx.scan_prefix(&prefix(EDGE_PREFIX))? {
        let edge = Edge::from_payload(&codec::parse_payload(&bytes)?)?;
        edges.push((hash, edge));
    }
    Ok(edges)
}

pub fn index_keys<T: KvRead>(tx: &T) -> Result<Vec<String>, KvGraphError> {
    tx.keys_with_prefix(&prefix(INDEX_PREFIX))
}

/// True when any edge names `vertex` as either endpoint.
pub fn has_incident_edges<T: KvRead>(
    tx: &T,
    scheme: &HashScheme,
    vertex: &str,
) -> Result<bool, KvGraphError> {
    Ok(tx.has_prefix(&scheme.outgoing_prefix(vertex))?
        || tx.has_prefix(&scheme.incoming_prefix(vertex))?)
}

/// Vertices reachable from `vertex` over one edge. Stored edges are followed
/// from their first endpoint to their second; `both_ways` also follows them back.
pub fn neighbors<T: KvRead>(
    tx: &T,
    scheme: &HashScheme,
    vertex: &str,
    both_ways: bool,
) -> Result<Vec<String>, KvGraphError> {
    let mut found = Vec::new();
    let outgoing = scheme.outgoing_prefix(vertex);
    for key in tx.keys_with_prefix(&outgoing)? {
        found.push(key[outgoing.len()..].to_string());
    }
    if both_ways {
        let incoming = scheme.incoming_prefix(vertex);
        for key in tx.keys_with_prefix(&incoming)? {
            found.push(key[incoming.len()..].to_string());
        }
    }
    Ok(found)
}

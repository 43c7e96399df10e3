use std::{fmt, result};

use serde::Serialize;

use crate::{
    KvGraphError,
    backend::{KvBackend, KvRead},
    codec,
    edge::Edge,
    graph::keyspace,
    hash::{EDGE_PREFIX, HashScheme, VERTEX_PREFIX},
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SafetyReport {
    pub total_vertices: usize,
    pub total_edges: usize,
    pub orphan_edges: usize,
    pub missing_index_entries: usize,
    pub stale_index_entries: usize,
    pub malformed_records: usize,
}

impl SafetyReport {
    pub fn merge(&mut self, other: &SafetyReport) {
        self.total_vertices = self.total_vertices.max(other.total_vertices);
        self.total_edges = self.total_edges.max(other.total_edges);
        self.orphan_edges += other.orphan_edges;
        self.missing_index_entries += other.missing_index_entries;
        self.stale_index_entries += other.stale_index_entries;
        self.malformed_records += other.malformed_records;
    }

    pub fn has_issues(&self) -> bool {
        self.orphan_edges > 0
            || self.missing_index_entries > 0
            || self.stale_index_entries > 0
            || self.malformed_records > 0
    }
}

#[derive(Debug)]
pub struct SafetyError {
    pub report: SafetyReport,
    pub source: Option<KvGraphError>,
}

impl fmt::Display for SafetyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(err) => write!(f, "safety checks could not run: {err}"),
            None => write!(f, "safety violations detected"),
        }
    }
}

impl std::error::Error for SafetyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|err| err as &dyn std::error::Error)
    }
}

/// Counts edges whose endpoints are not stored vertices.
pub fn validate_referential_integrity<T: KvRead>(
    tx: &T,
    scheme: &HashScheme,
) -> Result<SafetyReport, KvGraphError> {
    let mut report = base_report(tx)?;
    for hash in keyspace::edge_hashes(tx)? {
        let Some((first, second)) = scheme.parse_edge_hash(&hash) else {
            continue;
        };
        if !tx.contains(first)? || !tx.contains(second)? {
            report.orphan_edges += 1;
        }
    }
    Ok(report)
}

/// Checks that edge keys and reverse index keys pair up one to one.
pub fn validate_reverse_index<T: KvRead>(
    tx: &T,
    scheme: &HashScheme,
) -> Result<SafetyReport, KvGraphError> {
    let mut report = base_report(tx)?;
    for hash in keyspace::edge_hashes(tx)? {
        let Some((first, second)) = scheme.parse_edge_hash(&hash) else {
            continue;
        };
        if !tx.contains(&scheme.index_key(first, second))? {
            report.missing_index_entries += 1;
        }
    }
    for key in keyspace::index_keys(tx)? {
        let stale = match scheme.parse_edge_hash(&key) {
            Some((second, first)) => !tx.contains(&scheme.edge_hash(first, second))?,
            None => true,
        };
        if stale {
            report.stale_index_entries += 1;
        }
    }
    Ok(report)
}

/// Counts keys and payloads in the vertex and edge namespaces that cannot be read back.
pub fn validate_records<T: KvRead>(
    tx: &T,
    scheme: &HashScheme,
) -> Result<SafetyReport, KvGraphError> {
    let mut report = base_report(tx)?;
    for (hash, bytes) in tx.scan_prefix(&VERTEX_PREFIX.to_string())? {
        if scheme.parse_vertex_hash(&hash).is_none() || codec::parse_payload(&bytes).is_err() {
            report.malformed_records += 1;
        }
    }
    for (hash, bytes) in tx.scan_prefix(&EDGE_PREFIX.to_string())? {
        let readable = scheme.parse_edge_hash(&hash).is_some()
            && codec::parse_payload(&bytes)
                .and_then(|payload| Edge::from_payload(&payload))
                .is_ok_and(|edge| {
                    scheme.edge_hash(&edge.source, &edge.target) == hash
                        || (edge.bidirectional
                            && scheme.edge_hash(&edge.target, &edge.source) == hash)
                });
        if !readable {
            report.malformed_records += 1;
        }
    }
    Ok(report)
}

pub fn run_safety_checks(
    backend: &KvBackend,
    scheme: &HashScheme,
) -> Result<SafetyReport, KvGraphError> {
    backend.view(|tx| {
        let mut report = SafetyReport::default();
        report.merge(&validate_referential_integrity(tx, scheme)?);
        report.merge(&validate_reverse_index(tx, scheme)?);
        report.merge(&validate_records(tx, scheme)?);
        Ok(report)
    })
}

pub fn run_strict_safety_checks(
    backend: &KvBackend,
    scheme: &HashScheme,
) -> result::Result<(), SafetyError> {
    let report = run_safety_checks(backend, scheme).map_err(|err| SafetyError {
        report: SafetyReport::default(),
        source: Some(err),
    })?;
    if report.has_issues() {
        tracing::warn!(?report, "safety.violations");
        Err(SafetyError {
            report,
            source: None,
        })
    } else {
        Ok(())
    }
}

fn base_report<T: KvRead>(tx: &T) -> Result<SafetyReport, KvGraphError> {
    Ok(SafetyReport {
        total_vertices: keyspace::vertex_count(tx)?,
        total_edges: keyspace::edge_count(tx)?,
        ..SafetyReport::default()
    })
}

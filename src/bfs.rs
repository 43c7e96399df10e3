//! Reachability over the stored edge set, used to keep acyclic graphs acyclic.

use std::collections::VecDeque;

use ahash::AHashSet;

use crate::{backend::KvRead, errors::KvGraphError, graph::keyspace, hash::HashScheme};

/// Outcome of a bounded reachability search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reach {
    Found,
    NotFound,
    /// More vertices were visited than the bound allows.
    Exhausted,
}

/// Breadth-first search from `start` for `goal`, visiting at most `bound`
/// vertices. Undirected schemes follow every edge both ways.
pub fn path_exists<T: KvRead>(
    tx: &T,
    scheme: &HashScheme,
    start: &str,
    goal: &str,
    bound: usize,
    both_ways: bool,
) -> Result<Reach, KvGraphError> {
    if start == goal {
        return Ok(Reach::Found);
    }
    let mut seen = AHashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(start.to_string());
    queue.push_back(start.to_string());
    let mut visited = 0usize;
    while let Some(node) = queue.pop_front() {
        visited += 1;
        if visited > bound {
            return Ok(Reach::Exhausted);
        }
        for next in keyspace::neighbors(tx, scheme, &node, both_ways)? {
            if next == goal {
                return Ok(Reach::Found);
            }
            if seen.insert(next.clone()) {
                queue.push_back(next);
            }
        }
    }
    Ok(Reach::NotFound)
}

/// Whether adding `source -> target` would close a cycle.
///
/// An exhausted search counts as a cycle: it only happens when edges point at
/// vertices that are no longer stored.
pub fn creates_cycle<T: KvRead>(
    tx: &T,
    scheme: &HashScheme,
    source: &str,
    target: &str,
    directed: bool,
) -> Result<bool, KvGraphError> {
    if source == target {
        return Ok(true);
    }
    let bound = keyspace::vertex_count(tx)?;
    match path_exists(tx, scheme, target, source, bound, !directed)? {
        Reach::Found => Ok(true),
        Reach::NotFound => Ok(false),
        Reach::Exhausted => {
            tracing::warn!(source, target, bound, "bfs.cycle_check.bound_exceeded");
            Ok(true)
        }
    }
}

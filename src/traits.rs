//! Graph shape configuration.
//!
//! Traits are chosen once when a store is built and never change afterwards:
//!
//! ```rust
//! use kvgraph::Traits;
//!
//! let traits = Traits::new().directed().prevent_cycles();
//! assert!(traits.is_acyclic());
//! ```

use crate::{
    errors::KvGraphError,
    hash::{EDGE_PREFIX, INDEX_PREFIX, VERTEX_PREFIX},
};

pub const DEFAULT_EDGE_SEPARATOR: char = '-';
pub const DEFAULT_VERTEX_SEPARATOR: char = ':';

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Traits {
    is_directed: bool,
    is_acyclic: bool,
    is_weighted: bool,
    is_rooted: bool,
    prevent_cycles: bool,
    edge_separator: Option<char>,
    vertex_separator: Option<char>,
}

impl Traits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Edges have an orientation; `(a, b)` and `(b, a)` are distinct edges.
    pub fn directed(mut self) -> Self {
        self.is_directed = true;
        self
    }

    /// Marks the graph acyclic. Cycles are still accepted unless
    /// [`Traits::prevent_cycles`] is set as well.
    pub fn acyclic(mut self) -> Self {
        self.is_acyclic = true;
        self
    }

    pub fn weighted(mut self) -> Self {
        self.is_weighted = true;
        self
    }

    pub fn rooted(mut self) -> Self {
        self.is_rooted = true;
        self
    }

    /// Acyclic and rooted.
    pub fn tree(self) -> Self {
        self.acyclic().rooted()
    }

    /// Rejects any edge that would close a cycle. Implies [`Traits::acyclic`].
    pub fn prevent_cycles(mut self) -> Self {
        self.prevent_cycles = true;
        self.acyclic()
    }

    pub fn edge_separator(mut self, separator: char) -> Self {
        self.edge_separator = Some(separator);
        self
    }

    pub fn vertex_separator(mut self, separator: char) -> Self {
        self.vertex_separator = Some(separator);
        self
    }

    pub fn is_directed(&self) -> bool {
        self.is_directed
    }

    pub fn is_acyclic(&self) -> bool {
        self.is_acyclic
    }

    pub fn is_weighted(&self) -> bool {
        self.is_weighted
    }

    pub fn is_rooted(&self) -> bool {
        self.is_rooted
    }

    pub fn is_tree(&self) -> bool {
        self.is_acyclic && self.is_rooted
    }

    pub fn prevents_cycles(&self) -> bool {
        self.prevent_cycles
    }

    pub fn edge_sep(&self) -> char {
        self.edge_separator.unwrap_or(DEFAULT_EDGE_SEPARATOR)
    }

    pub fn vertex_sep(&self) -> char {
        self.vertex_separator.unwrap_or(DEFAULT_VERTEX_SEPARATOR)
    }

    /// Fills in default separators and checks that the key layout stays unambiguous.
    pub fn resolve(mut self) -> Result<Self, KvGraphError> {
        if self.edge_separator.is_none() {
            tracing::debug!(
                separator = %DEFAULT_EDGE_SEPARATOR,
                "traits.edge_separator.default"
            );
            self.edge_separator = Some(DEFAULT_EDGE_SEPARATOR);
        }
        if self.vertex_separator.is_none() {
            self.vertex_separator = Some(DEFAULT_VERTEX_SEPARATOR);
        }
        let (edge, vertex) = (self.edge_sep(), self.vertex_sep());
        if edge == vertex {
            return Err(KvGraphError::invalid_input(format!(
                "edge and vertex separators must differ, both are '{edge}'"
            )));
        }
        for sep in [edge, vertex] {
            if [VERTEX_PREFIX, EDGE_PREFIX, INDEX_PREFIX].contains(&sep) || sep.is_control() {
                return Err(KvGraphError::invalid_input(format!(
                    "'{}' cannot be used as a separator",
                    sep.escape_default()
                )));
            }
        }
        Ok(self)
    }
}

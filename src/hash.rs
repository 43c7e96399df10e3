//! Key derivation for every namespace the store writes.
//!
//! | namespace | key                                   | value           |
//! |-----------|---------------------------------------|-----------------|
//! | schema    | `schema:<type path>`                  | schema entry    |
//! | vertex    | `v<tag><vertex sep><id>`              | encoded record  |
//! | edge      | `e<first><edge sep><second>`          | encoded edge    |
//! | index     | `i<second><edge sep><first>`          | empty           |
//!
//! For undirected graphs `(first, second)` is the ordered endpoint pair, so both
//! orientations of an edge share one key.

use crate::{errors::KvGraphError, traits::Traits};

pub const VERTEX_PREFIX: char = 'v';
pub const EDGE_PREFIX: char = 'e';
pub const INDEX_PREFIX: char = 'i';
pub const SCHEMA_PREFIX: &str = "schema:";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashScheme {
    edge_separator: char,
    vertex_separator: char,
    directed: bool,
}

impl HashScheme {
    pub fn new(edge_separator: char, vertex_separator: char, directed: bool) -> Self {
        Self {
            edge_separator,
            vertex_separator,
            directed,
        }
    }

    pub fn from_traits(traits: &Traits) -> Self {
        Self::new(traits.edge_sep(), traits.vertex_sep(), traits.is_directed())
    }

    pub fn edge_separator(&self) -> char {
        self.edge_separator
    }

    pub fn vertex_hash(&self, tag: char, id: &str) -> String {
        let mut hash = String::with_capacity(id.len() + 3);
        hash.push(VERTEX_PREFIX);
        hash.push(tag);
        hash.push(self.vertex_separator);
        hash.push_str(id);
        hash
    }

    /// Checks that `(tag, id)` produce a hash the edge layout can split again.
    pub fn validate_identity(&self, tag: char, id: &str) -> Result<(), KvGraphError> {
        if id.is_empty() {
            return Err(KvGraphError::invalid_input("vertex id must be set"));
        }
        if tag == self.edge_separator || id.contains(self.edge_separator) {
            return Err(KvGraphError::invalid_input(format!(
                "vertex identity '{tag}{id}' contains the edge separator '{}'",
                self.edge_separator
            )));
        }
        Ok(())
    }

    /// Splits a vertex hash into its type tag and id.
    pub fn parse_vertex_hash<'a>(&self, hash: &'a str) -> Option<(char, &'a str)> {
        let rest = hash.strip_prefix(VERTEX_PREFIX)?;
        let mut chars = rest.chars();
        let tag = chars.next()?;
        let rest = chars.as_str().strip_prefix(self.vertex_separator)?;
        if rest.is_empty() || rest.contains(self.edge_separator) {
            return None;
        }
        Some((tag, rest))
    }

    pub fn edge_hash(&self, source: &str, target: &str) -> String {
        let (first, second) = self.ordered(source, target);
        self.join(EDGE_PREFIX, first, second)
    }

    /// Reverse index key of the edge between `source` and `target`.
    pub fn index_key(&self, source: &str, target: &str) -> String {
        let (first, second) = self.ordered(source, target);
        self.join(INDEX_PREFIX, second, first)
    }

    /// Splits an edge hash (or index key) into the two stored endpoints.
    pub fn parse_edge_hash<'a>(&self, hash: &'a str) -> Option<(&'a str, &'a str)> {
        let rest = hash
            .strip_prefix(EDGE_PREFIX)
            .or_else(|| hash.strip_prefix(INDEX_PREFIX))?;
        let (first, second) = rest.split_once(self.edge_separator)?;
        if first.is_empty() || second.is_empty() || second.contains(self.edge_separator) {
            return None;
        }
        Some((first, second))
    }

    /// Like [`parse_edge_hash`](Self::parse_edge_hash), but only for keys in the
    /// edge namespace.
    pub fn parse_edge_key<'a>(&self, hash: &'a str) -> Option<(&'a str, &'a str)> {
        if !hash.starts_with(EDGE_PREFIX) {
            return None;
        }
        self.parse_edge_hash(hash)
    }

    /// Prefix of every edge key whose first endpoint is `vertex`.
    pub fn outgoing_prefix(&self, vertex: &str) -> String {
        self.join(EDGE_PREFIX, vertex, "")
    }

    /// Prefix of every index key whose second endpoint is `vertex`.
    pub fn incoming_prefix(&self, vertex: &str) -> String {
        self.join(INDEX_PREFIX, vertex, "")
    }

    fn ordered<'a>(&self, source: &'a str, target: &'a str) -> (&'a str, &'a str) {
        if self.directed || source <= target {
            (source, target)
        } else {
            (target, source)
        }
    }

    fn join(&self, prefix: char, first: &str, second: &str) -> String {
        let mut key = String::with_capacity(first.len() + second.len() + 2);
        key.push(prefix);
        key.push_str(first);
        key.push(self.edge_separator);
        key.push_str(second);
        key
    }
}

pub fn schema_key(type_path: &str) -> String {
    format!("{SCHEMA_PREFIX}{type_path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directed() -> HashScheme {
        HashScheme::new('-', ':', true)
    }

    fn undirected() -> HashScheme {
        HashScheme::new('-', ':', false)
    }

    #[test]
    fn vertex_hash_layout() {
        assert_eq!(directed().vertex_hash('u', "alice"), "vu:alice");
    }

    #[test]
    fn vertex_hash_is_deterministic_and_distinct() {
        let scheme = directed();
        assert_eq!(scheme.vertex_hash('u', "1"), scheme.vertex_hash('u', "1"));
        assert_ne!(scheme.vertex_hash('u', "1"), scheme.vertex_hash('p', "1"));
        assert_ne!(scheme.vertex_hash('u', "1"), scheme.vertex_hash('u', "11"));
    }

    #[test]
    fn parse_vertex_hash_roundtrip() {
        let scheme = directed();
        let hash = scheme.vertex_hash('u', "a:b");
        assert_eq!(scheme.parse_vertex_hash(&hash), Some(('u', "a:b")));
        assert_eq!(scheme.parse_vertex_hash("xu:a"), None);
        assert_eq!(scheme.parse_vertex_hash("vu:"), None);
    }

    #[test]
    fn identity_with_edge_separator_is_rejected() {
        let err = directed().validate_identity('u', "a-b").unwrap_err();
        assert!(matches!(err, KvGraphError::InvalidInput(_)));
        assert!(directed().validate_identity('-', "ab").is_err());
        assert!(directed().validate_identity('u', "").is_err());
    }

    #[test]
    fn directed_edge_hash_keeps_orientation() {
        let scheme = directed();
        assert_eq!(scheme.edge_hash("vu:a", "vu:b"), "evu:a-vu:b");
        assert_ne!(
            scheme.edge_hash("vu:a", "vu:b"),
            scheme.edge_hash("vu:b", "vu:a")
        );
    }

    #[test]
    fn undirected_edge_hash_is_symmetric() {
        let scheme = undirected();
        assert_eq!(
            scheme.edge_hash("vu:b", "vu:a"),
            scheme.edge_hash("vu:a", "vu:b")
        );
        assert_eq!(
            scheme.index_key("vu:b", "vu:a"),
            scheme.index_key("vu:a", "vu:b")
        );
    }

    #[test]
    fn parse_edge_hash_splits_endpoints() {
        let scheme = directed();
        let hash = scheme.edge_hash("vu:a", "vp:b");
        assert_eq!(scheme.parse_edge_hash(&hash), Some(("vu:a", "vp:b")));
        let index = scheme.index_key("vu:a", "vp:b");
        assert_eq!(scheme.parse_edge_hash(&index), Some(("vp:b", "vu:a")));
        assert_eq!(scheme.parse_edge_hash("evu:a"), None);
        assert_eq!(scheme.parse_edge_key(&index), None);
        assert_eq!(scheme.parse_edge_key(&hash), Some(("vu:a", "vp:b")));
        assert_eq!(scheme.parse_edge_key("vu:a"), None);
    }

    #[test]
    fn prefixes_match_their_keys() {
        let scheme = directed();
        assert!(
            scheme
                .edge_hash("vu:a", "vu:b")
                .starts_with(&scheme.outgoing_prefix("vu:a"))
        );
        assert!(
            scheme
                .index_key("vu:a", "vu:b")
                .starts_with(&scheme.incoming_prefix("vu:b"))
        );
        assert!(
            !scheme
                .edge_hash("vu:ab", "vu:c")
                .starts_with(&scheme.outgoing_prefix("vu:a"))
        );
    }
}

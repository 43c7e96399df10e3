//! Embedded graph store: typed vertices and edges, attribute names compressed
//! to single-character codes through a per-type schema, persisted in a
//! transactional key-value table.
//! Run Criterion benchmarks with `cargo bench` to inspect reports under `target/criterion`.

pub mod backend;
pub mod bench_utils;
pub mod bfs;
pub mod cache;
pub mod client;
pub mod codec;
pub mod config;
pub mod edge;
pub mod errors;
pub mod graph;
pub mod hash;
pub mod record;
pub mod registry;
pub mod safety;
pub mod schema;
pub mod traits;
pub mod value;

pub use crate::backend::{KvBackend, KvRead};
pub use crate::config::BackendConfig;
pub use crate::edge::Edge;
pub use crate::errors::KvGraphError;
pub use crate::graph::GraphStore;
pub use crate::hash::HashScheme;
pub use crate::record::{Attribute, Record, Vertex};
pub use crate::registry::{PersistedSchema, ResolvedSchema, SchemaRegistry};
pub use crate::safety::{SafetyError, SafetyReport};
pub use crate::traits::Traits;
pub use crate::value::{AttrKind, AttrValue};

mod edge_ops;
pub mod keyspace;
mod store;
mod vertex_ops;

pub use store::GraphStore;

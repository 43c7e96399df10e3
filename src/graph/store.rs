use std::{marker::PhantomData, sync::Arc};

use crate::{
    backend::KvBackend,
    errors::KvGraphError,
    hash::HashScheme,
    record::Vertex,
    registry::SchemaRegistry,
    safety::{SafetyReport, run_safety_checks},
    traits::Traits,
};

/// Graph of vertices of type `T` stored in a [`KvBackend`].
///
/// Several stores, for different vertex types, may share one backend and one
/// registry; edges may then join vertices of different types.
pub struct GraphStore<T: Vertex> {
    pub(super) backend: Arc<KvBackend>,
    pub(super) registry: Arc<SchemaRegistry>,
    pub(super) traits: Traits,
    pub(super) scheme: HashScheme,
    _vertex: PhantomData<fn() -> T>,
}

impl<T: Vertex> Clone for GraphStore<T> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            registry: Arc::clone(&self.registry),
            traits: self.traits,
            scheme: self.scheme,
            _vertex: PhantomData,
        }
    }
}

impl<T: Vertex> GraphStore<T> {
    pub fn new(backend: Arc<KvBackend>, traits: Traits) -> Result<Self, KvGraphError> {
        let registry = Arc::new(SchemaRegistry::new(backend));
        Self::with_registry(registry, traits)
    }

    pub fn with_registry(
        registry: Arc<SchemaRegistry>,
        traits: Traits,
    ) -> Result<Self, KvGraphError> {
        let traits = traits.resolve()?;
        Ok(Self {
            backend: Arc::clone(registry.backend()),
            registry,
            scheme: HashScheme::from_traits(&traits),
            traits,
            _vertex: PhantomData,
        })
    }

    pub fn traits(&self) -> &Traits {
        &self.traits
    }

    pub fn edge_separator(&self) -> char {
        self.traits.edge_sep()
    }

    pub fn hash_scheme(&self) -> &HashScheme {
        &self.scheme
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn backend(&self) -> &Arc<KvBackend> {
        &self.backend
    }

    pub fn vertex_hash(&self, vertex: &T) -> String {
        self.scheme.vertex_hash(T::TYPE, &vertex.id())
    }

    pub fn edge_hash(&self, source: &str, target: &str) -> String {
        self.scheme.edge_hash(source, target)
    }

    /// Read-only integrity report over the whole key space.
    pub fn check_integrity(&self) -> Result<SafetyReport, KvGraphError> {
        run_safety_checks(&self.backend, &self.scheme)
    }
}

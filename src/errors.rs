use thiserror::Error;

#[derive(Debug, Error)]
pub enum KvGraphError {
    #[error("vertex not found: {0}")]
    VertexNotFound(String),
    #[error("vertex already exists: {0}")]
    VertexAlreadyExists(String),
    #[error("edge not found: {0}")]
    EdgeNotFound(String),
    #[error("edge already exists: {0}")]
    EdgeAlreadyExists(String),
    #[error("edge would create a cycle: {0}")]
    EdgeCreatesCycle(String),
    #[error("vertex has edges: {0}")]
    VertexHasEdges(String),
    #[error("vertex {hash} has type '{found}', expected '{expected}'")]
    TypeMismatch {
        hash: String,
        expected: char,
        found: char,
    },
    #[error("schema resolution error: {0}")]
    SchemaResolution(String),
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error("decoding error: {0}")]
    Decoding(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("backend error during {op} on `{key}`: {message}")]
    Backend {
        op: &'static str,
        key: String,
        message: String,
    },
}

impl KvGraphError {
    pub fn vertex_not_found<T: Into<String>>(hash: T) -> Self {
        KvGraphError::VertexNotFound(hash.into())
    }

    pub fn vertex_exists<T: Into<String>>(hash: T) -> Self {
        KvGraphError::VertexAlreadyExists(hash.into())
    }

    pub fn vertex_has_edges<T: Into<String>>(hash: T) -> Self {
        KvGraphError::VertexHasEdges(hash.into())
    }

    pub fn edge_not_found<T: Into<String>>(hash: T) -> Self {
        KvGraphError::EdgeNotFound(hash.into())
    }

    pub fn edge_exists<T: Into<String>>(hash: T) -> Self {
        KvGraphError::EdgeAlreadyExists(hash.into())
    }

    pub fn edge_creates_cycle<T: Into<String>>(hash: T) -> Self {
        KvGraphError::EdgeCreatesCycle(hash.into())
    }

    pub fn schema<T: Into<String>>(msg: T) -> Self {
        KvGraphError::SchemaResolution(msg.into())
    }

    pub fn encoding<T: Into<String>>(msg: T) -> Self {
        KvGraphError::Encoding(msg.into())
    }

    pub fn decoding<T: Into<String>>(msg: T) -> Self {
        KvGraphError::Decoding(msg.into())
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        KvGraphError::InvalidInput(msg.into())
    }

    pub fn connection<T: Into<String>>(msg: T) -> Self {
        KvGraphError::Connection(msg.into())
    }

    pub fn backend<K: Into<String>, E: ToString>(op: &'static str, key: K, err: E) -> Self {
        KvGraphError::Backend {
            op,
            key: key.into(),
            message: err.to_string(),
        }
    }

    /// True for the expected, caller-recoverable graph conditions.
    pub fn is_graph_condition(&self) -> bool {
        matches!(
            self,
            KvGraphError::VertexNotFound(_)
                | KvGraphError::VertexAlreadyExists(_)
                | KvGraphError::EdgeNotFound(_)
                | KvGraphError::EdgeAlreadyExists(_)
                | KvGraphError::EdgeCreatesCycle(_)
                | KvGraphError::VertexHasEdges(_)
        )
    }
}

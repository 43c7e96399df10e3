use std::sync::Arc;

use crate::{
    KvGraphError,
    backend::KvBackend,
    config::BackendConfig,
    edge::Edge,
    graph::keyspace,
    hash::HashScheme,
    registry::{PersistedSchema, SchemaRegistry},
    safety::{SafetyReport, run_safety_checks},
    traits::{DEFAULT_EDGE_SEPARATOR, DEFAULT_VERTEX_SEPARATOR, Traits},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLineConfig {
    /// `memory`, a file path, or `None` to read `KVGRAPH_DB`.
    pub database: Option<String>,
    pub edge_separator: char,
    pub vertex_separator: char,
    pub command: String,
}

impl CommandLineConfig {
    pub fn from_args(args: &[&str]) -> Result<Self, String> {
        let mut database = None;
        let mut edge_separator = DEFAULT_EDGE_SEPARATOR;
        let mut vertex_separator = DEFAULT_VERTEX_SEPARATOR;
        let mut command = String::from("status");
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match *arg {
                "--db" | "--database" => {
                    database = Some(
                        iter.next()
                            .ok_or_else(|| "--db requires a value".to_string())?
                            .to_string(),
                    );
                }
                "--edge-separator" => {
                    edge_separator = separator_value(arg, iter.next())?;
                }
                "--vertex-separator" => {
                    vertex_separator = separator_value(arg, iter.next())?;
                }
                "--command" => {
                    command = iter
                        .next()
                        .ok_or_else(|| "--command requires a value".to_string())?
                        .to_string();
                }
                other if other.starts_with('-') => {
                    return Err(format!("unknown flag {other}"));
                }
                _ => {
                    command = arg.to_string();
                }
            }
        }
        Ok(Self {
            database,
            edge_separator,
            vertex_separator,
            command,
        })
    }

    pub fn backend_config(&self) -> BackendConfig {
        match self.database.as_deref() {
            None => BackendConfig::from_env(),
            Some("memory") => BackendConfig::in_memory(),
            Some(path) => BackendConfig::at(path),
        }
    }

    pub fn help() -> &'static str {
        "Usage: kvgraph [--db memory|PATH] [--edge-separator C] [--vertex-separator C] [--command] <status|vertices|edges|schemas|check>\n"
    }
}

/// Read-only access to a store without knowing its vertex types.
pub struct InspectorClient {
    registry: SchemaRegistry,
    scheme: HashScheme,
}

impl InspectorClient {
    /// The separators must match the ones the store was written with.
    pub fn new(backend: Arc<KvBackend>, edge_separator: char, vertex_separator: char) -> Self {
        Self {
            registry: SchemaRegistry::new(backend),
            // Stored keys already carry their orientation.
            scheme: HashScheme::new(edge_separator, vertex_separator, true),
        }
    }

    pub fn open(config: &CommandLineConfig) -> Result<Self, KvGraphError> {
        let traits = Traits::new()
            .edge_separator(config.edge_separator)
            .vertex_separator(config.vertex_separator)
            .resolve()?;
        let backend = KvBackend::open_with(&config.backend_config())?;
        Ok(Self::new(
            Arc::new(backend),
            traits.edge_sep(),
            traits.vertex_sep(),
        ))
    }

    pub fn backend(&self) -> &Arc<KvBackend> {
        self.registry.backend()
    }

    /// `(order, size)` of the stored graph.
    pub fn status(&self) -> Result<(usize, usize), KvGraphError> {
        self.backend()
            .view(|tx| Ok((keyspace::vertex_count(tx)?, keyspace::edge_count(tx)?)))
    }

    pub fn vertices(&self) -> Result<Vec<String>, KvGraphError> {
        self.backend().view(|tx| keyspace::vertex_hashes(tx))
    }

    pub fn edges(&self) -> Result<Vec<(String, Edge)>, KvGraphError> {
        self.backend().view(|tx| keyspace::edge_records(tx))
    }

    pub fn schemas(&self) -> Result<Vec<PersistedSchema>, KvGraphError> {
        self.registry.persisted_types()
    }

    pub fn check(&self) -> Result<SafetyReport, KvGraphError> {
        run_safety_checks(self.backend(), &self.scheme)
    }
}

fn separator_value(flag: &str, value: Option<&&str>) -> Result<char, String> {
    let value = value.ok_or_else(|| format!("{flag} requires a value"))?;
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(format!("{flag} takes one character, got {value}")),
    }
}

//! Seeded graph generators for benchmarks and load tests.
//!
//! Every generated edge points from a lower to a higher node index, so each
//! dataset is a DAG and can be loaded into a cycle-preventing store unchanged.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    KvGraphError,
    record::{Attribute, Record, Vertex},
    value::{AttrKind, AttrValue},
};

/// Vertex type used by generated datasets. Identified by `label`; `idx` is
/// an ordinary attribute.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BenchNode {
    pub idx: u64,
    pub label: String,
    pub weight: f64,
}

impl Record for BenchNode {
    fn attributes() -> &'static [Attribute] {
        const ATTRS: &[Attribute] = &[
            Attribute::new("idx", 'i', AttrKind::Uint),
            Attribute::new("label", 'l', AttrKind::Str),
            Attribute::new("weight", 'w', AttrKind::Float),
        ];
        ATTRS
    }

    fn attribute(&self, name: &str) -> Option<AttrValue> {
        match name {
            "idx" => Some(self.idx.into()),
            "label" => Some(self.label.clone().into()),
            "weight" => Some(self.weight.into()),
            _ => None,
        }
    }

    fn set_attribute(&mut self, name: &str, value: AttrValue) -> Result<(), KvGraphError> {
        match name {
            "idx" => self.idx = value.try_into()?,
            "label" => self.label = value.try_into()?,
            "weight" => self.weight = value.try_into()?,
            _ => {}
        }
        Ok(())
    }
}

impl Vertex for BenchNode {
    const TYPE: char = 'b';

    fn id(&self) -> String {
        self.label.clone()
    }

    fn from_id(id: &str) -> Self {
        BenchNode {
            label: id.to_string(),
            ..BenchNode::default()
        }
    }
}

#[derive(Clone, Debug)]
pub struct GraphDataset {
    pub nodes: Vec<BenchNode>,
    /// `(from, to)` node indices, `from < to`.
    pub edges: Vec<(usize, usize)>,
}

impl GraphDataset {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[derive(Clone, Debug)]
pub enum GraphShape {
    Line,
    Star,
    RandomDag { edges: usize },
    ScaleFree { m: usize },
}

pub fn generate_graph(shape: GraphShape, node_count: usize, seed: u64) -> GraphDataset {
    assert!(node_count > 1, "node_count must exceed 1");
    let nodes = build_nodes(node_count, seed);
    let mut edges = match shape {
        GraphShape::Line => (0..node_count - 1).map(|idx| (idx, idx + 1)).collect(),
        GraphShape::Star => (1..node_count).map(|leaf| (0, leaf)).collect(),
        GraphShape::RandomDag { edges } => generate_random_edges(node_count, edges, seed),
        GraphShape::ScaleFree { m } => generate_scale_free_edges(node_count, m, seed),
    };
    edges.sort_unstable();
    edges.dedup();
    GraphDataset { nodes, edges }
}

fn build_nodes(count: usize, seed: u64) -> Vec<BenchNode> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|idx| BenchNode {
            idx: idx as u64,
            label: format!("node{idx}"),
            weight: rng.r#gen::<f64>(),
        })
        .collect()
}

fn generate_random_edges(node_count: usize, edge_count: usize, seed: u64) -> Vec<(usize, usize)> {
    let total_pairs = pair_count(node_count);
    assert!(
        edge_count as u128 <= total_pairs,
        "edge_count exceeds possible pairs"
    );
    let mut rng = StdRng::seed_from_u64(seed);
    let mut edges = Vec::with_capacity(edge_count);
    let mut idx = 0u64;
    let mut remaining = edge_count as u64;
    while remaining > 0 && idx < total_pairs as u64 {
        let p = remaining as f64 / (total_pairs as u64 - idx) as f64;
        idx += sample_geometric(&mut rng, p);
        if idx >= total_pairs as u64 {
            break;
        }
        let (from, to) = pair_from_index(idx, node_count as u64);
        edges.push((from as usize, to as usize));
        idx += 1;
        remaining -= 1;
    }
    edges
}

fn generate_scale_free_edges(node_count: usize, m: usize, seed: u64) -> Vec<(usize, usize)> {
    assert!(m > 0, "m must be positive");
    assert!(node_count > m + 1, "node_count must exceed m + 1");
    let mut rng = StdRng::seed_from_u64(seed);
    let mut degrees = vec![0usize; node_count];
    let mut edges = Vec::new();
    for u in 0..=m {
        for v in (u + 1)..=m {
            edges.push((u, v));
            degrees[u] += 1;
            degrees[v] += 1;
        }
    }
    let mut total_degree: usize = degrees.iter().sum();
    for new_node in (m + 1)..node_count {
        let mut targets: Vec<usize> = Vec::with_capacity(m);
        while targets.len() < m {
            let pick = rng.gen_range(0..total_degree);
            let mut cumulative = 0usize;
            for (candidate, degree) in degrees.iter().enumerate().take(new_node) {
                cumulative += degree;
                if pick < cumulative {
                    if !targets.contains(&candidate) {
                        targets.push(candidate);
                    }
                    break;
                }
            }
        }
        for target in targets {
            edges.push((target, new_node));
            degrees[target] += 1;
            degrees[new_node] += 1;
            total_degree += 2;
        }
    }
    edges
}

fn pair_count(nodes: usize) -> u128 {
    let n = nodes as u128;
    n * (n - 1) / 2
}

fn sample_geometric(rng: &mut StdRng, p: f64) -> u64 {
    let u = rng.r#gen::<f64>().max(f64::MIN_POSITIVE);
    ((u.ln() / (1.0 - p).ln()).floor().max(0.0)) as u64
}

fn pair_from_index(idx: u64, nodes: u64) -> (u64, u64) {
    let mut left = 0;
    let mut start = 0u64;
    while left < nodes - 1 {
        let remaining = nodes - left - 1;
        if idx < start + remaining {
            return (left, left + 1 + (idx - start));
        }
        start += remaining;
        left += 1;
    }
    (nodes - 2, nodes - 1)
}

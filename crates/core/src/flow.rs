//! Navigation-path aggregation for the user-flow (Sankey) chart.
//!
//! The analytics backend reports the most common page sequences as
//! `{ "path": "/ → /shop → /cart", "count": 42 }`. A Sankey diagram needs a
//! node list and a weighted link list instead, and cannot draw cycles, so
//! [`build_flow_graph`] filters and folds the paths in a single pass.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Step separator used by the analytics backend.
pub const STEP_SEPARATOR: char = '→';

/// One reported navigation path and how many sessions followed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowPath {
    pub path: String,
    #[serde(default)]
    pub count: u64,
}

impl FlowPath {
    /// Convenience constructor.
    #[must_use]
    pub fn new(path: impl Into<String>, count: u64) -> Self {
        Self {
            path: path.into(),
            count,
        }
    }

    /// The trimmed, non-empty steps of the path.
    pub fn steps(&self) -> impl Iterator<Item = &str> {
        self.path
            .split(STEP_SEPARATOR)
            .map(str::trim)
            .filter(|step| !step.is_empty())
    }
}

/// Filtering knobs for [`build_flow_graph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowOptions {
    /// Paths containing any of these substrings are dropped.
    pub excluded_markers: Vec<String>,
    /// Paths with fewer steps are dropped.
    pub min_steps: usize,
    /// Upper bound on distinct nodes in the graph.
    pub max_nodes: usize,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            excluded_markers: vec!["/admin".to_string()],
            min_steps: 2,
            max_nodes: 30,
        }
    }
}

/// A page in the diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowNode {
    pub name: String,
}

/// Aggregated traffic between two nodes, by node index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowLink {
    pub source: usize,
    pub target: usize,
    pub value: u64,
}

/// Nodes in first-seen order and links by descending weight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
}

impl FlowGraph {
    /// Whether there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Look up a link weight by node names.
    #[must_use]
    pub fn weight(&self, source: &str, target: &str) -> Option<u64> {
        let index_of = |name: &str| self.nodes.iter().position(|n| n.name == name);
        let (s, t) = (index_of(source)?, index_of(target)?);
        self.links
            .iter()
            .find(|l| l.source == s && l.target == t)
            .map(|l| l.value)
    }

    /// Sum of all link weights.
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        self.links
            .iter()
            .fold(0u64, |total, l| total.saturating_add(l.value))
    }
}

/// Build deduplicated Sankey nodes and links from reported paths.
///
/// A path is skipped when it has a zero count, contains an excluded marker,
/// has fewer than `min_steps` steps, visits a page twice, or would push the
/// node count past `max_nodes`. Paths are considered in input order. Counts
/// of identical `(source, target)` pairs are summed across paths.
#[must_use]
pub fn build_flow_graph(paths: &[FlowPath], options: &FlowOptions) -> FlowGraph {
    let mut nodes: Vec<FlowNode> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut weights: HashMap<(usize, usize), u64> = HashMap::new();

    for entry in paths {
        if entry.count == 0 {
            continue;
        }
        if options
            .excluded_markers
            .iter()
            .any(|marker| entry.path.contains(marker.as_str()))
        {
            continue;
        }

        let steps: Vec<&str> = entry.steps().collect();
        if steps.len() < options.min_steps.max(2) {
            continue;
        }

        let mut seen = HashSet::with_capacity(steps.len());
        if !steps.iter().all(|step| seen.insert(*step)) {
            continue;
        }

        let new_nodes = steps.iter().filter(|s| !index.contains_key(**s)).count();
        if index.len() + new_nodes > options.max_nodes {
            continue;
        }

        let ids: Vec<usize> = steps
            .iter()
            .map(|step| {
                *index.entry((*step).to_string()).or_insert_with(|| {
                    nodes.push(FlowNode {
                        name: (*step).to_string(),
                    });
                    nodes.len() - 1
                })
            })
            .collect();

        for pair in ids.windows(2) {
            if let [source, target] = pair {
                let weight = weights.entry((*source, *target)).or_insert(0);
                *weight = weight.saturating_add(entry.count);
            }
        }
    }

    let mut links: Vec<FlowLink> = weights
        .into_iter()
        .map(|((source, target), value)| FlowLink {
            source,
            target,
            value,
        })
        .collect();
    links.sort_by(|a, b| {
        b.value
            .cmp(&a.value)
            .then(a.source.cmp(&b.source))
            .then(a.target.cmp(&b.target))
    });

    FlowGraph { nodes, links }
}

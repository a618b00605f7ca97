//! User-flow graph preview from an exported report.

use std::path::Path;

use jc_closet_core::{FlowGraph, FlowOptions, FlowPath, build_flow_graph};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Not a user-flow report: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Either the backend's report object or the bare path list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Report {
    Wrapped { paths: Vec<FlowPath> },
    Bare(Vec<FlowPath>),
}

fn parse_paths(json: &str) -> Result<Vec<FlowPath>, FlowError> {
    Ok(match serde_json::from_str::<Report>(json)? {
        Report::Wrapped { paths } | Report::Bare(paths) => paths,
    })
}

fn options(min_steps: Option<usize>, max_nodes: Option<usize>) -> FlowOptions {
    let defaults = FlowOptions::default();
    FlowOptions {
        min_steps: min_steps.unwrap_or(defaults.min_steps),
        max_nodes: max_nodes.unwrap_or(defaults.max_nodes),
        ..defaults
    }
}

fn summarise(graph: &FlowGraph) {
    info!(
        "{} pages, {} links, {} transitions",
        graph.nodes.len(),
        graph.links.len(),
        graph.total_weight()
    );
    for link in &graph.links {
        let name = |i: usize| graph.nodes.get(i).map_or("?", |n| n.name.as_str());
        info!("  {:>6}  {} → {}", link.value, name(link.source), name(link.target));
    }
}

/// Build and print the Sankey graph for a report file.
///
/// # Errors
///
/// Returns an error if the file can't be read or isn't a flow report.
pub fn preview(
    file: &Path,
    min_steps: Option<usize>,
    max_nodes: Option<usize>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(file).map_err(|source| FlowError::Read {
        path: file.display().to_string(),
        source,
    })?;
    let paths = parse_paths(&raw)?;
    info!(paths = paths.len(), "Loaded user-flow report");

    let graph = build_flow_graph(&paths, &options(min_steps, max_nodes));

    if json {
        #[allow(clippy::print_stdout)]
        {
            println!("{}", serde_json::to_string_pretty(&graph)?);
        }
    } else if graph.is_empty() {
        info!("No paths survived filtering");
    } else {
        summarise(&graph);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_both_report_shapes() {
        let wrapped = parse_paths(r#"{"paths": [{"path": "/ → /shop", "count": 4}]}"#).unwrap();
        let bare = parse_paths(r#"[{"path": "/ → /shop", "count": 4}]"#).unwrap();
        assert_eq!(wrapped, bare);
        assert!(parse_paths(r#"{"nodes": []}"#).is_err());
    }

    #[test]
    fn test_options_keep_admin_exclusion() {
        let opts = options(Some(3), None);
        assert_eq!(opts.min_steps, 3);
        assert_eq!(opts.max_nodes, FlowOptions::default().max_nodes);
        assert!(opts.excluded_markers.iter().any(|m| m == "/admin"));
    }

    #[test]
    fn test_preview_graph_merges_duplicates() {
        let paths = parse_paths(
            r#"[{"path": "/ → /shop → /cart", "count": 5}, {"path": "/ → /shop → /cart", "count": 3}]"#,
        )
        .unwrap();
        let graph = build_flow_graph(&paths, &options(None, None));
        assert_eq!(graph.weight("/", "/shop"), Some(8));
    }
}

//! Reduction of a dataset to its top-N most central nodes.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use super::types::{GraphData, GraphNode, Key};
use crate::error::FilterError;

/// Parameters of one filtering pass.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterParams {
	/// Groups to keep. Empty keeps every group.
	pub groups: Vec<Key>,
	/// Minimum degree a node needs. Zero or less disables the degree stage.
	pub centrality_limit: i64,
	/// Maximum number of nodes kept after ranking.
	pub top_n: i64,
}

impl Default for FilterParams {
	fn default() -> Self {
		Self {
			groups: Vec::new(),
			centrality_limit: 0,
			top_n: 20,
		}
	}
}

impl FilterParams {
	/// Runs [`filter_nodes`] with these parameters.
	pub fn apply(&self, graph: &GraphData) -> Result<GraphData, FilterError> {
		filter_nodes(graph, &self.groups, self.centrality_limit, self.top_n)
	}
}

/// Counts link endpoints per id over every link, regardless of whether the id is a node.
fn degree_counts(graph: &GraphData) -> HashMap<&Key, usize> {
	let mut counts = HashMap::new();
	for link in &graph.links {
		*counts.entry(&link.source).or_insert(0) += 1;
		*counts.entry(&link.target).or_insert(0) += 1;
	}
	counts
}

/// Keeps the `top_n` highest-degree nodes among those in `groups`, plus the links
/// whose endpoints were both kept.
///
/// Degrees are counted over the full link list, and only when `centrality_limit > 0`.
/// Otherwise every node ranks at zero and the result is the first `top_n` nodes in
/// input order. Ties keep input order.
pub fn filter_nodes(
	graph: &GraphData,
	groups: &[Key],
	centrality_limit: i64,
	top_n: i64,
) -> Result<GraphData, FilterError> {
	if top_n < 0 {
		return Err(FilterError::invalid(format!(
			"top_n must be non-negative, got {top_n}"
		)));
	}
	let top_n = usize::try_from(top_n).unwrap_or(usize::MAX);

	let mut nodes: Vec<&GraphNode> = if groups.is_empty() {
		graph.nodes.iter().collect()
	} else {
		graph.nodes.iter().filter(|n| groups.contains(&n.group)).collect()
	};
	let after_groups = nodes.len();

	let centrality = if centrality_limit > 0 {
		let counts = degree_counts(graph);
		nodes.retain(|n| {
			let count = counts.get(&n.id).copied().unwrap_or(0);
			i64::try_from(count).unwrap_or(i64::MAX) >= centrality_limit
		});
		Some(counts)
	} else {
		None
	};
	let after_centrality = nodes.len();
	let degree = |node: &GraphNode| {
		centrality
			.as_ref()
			.and_then(|c| c.get(&node.id).copied())
			.unwrap_or(0)
	};

	nodes.sort_by(|a, b| degree(*b).cmp(&degree(*a)));
	nodes.truncate(top_n);

	let kept: HashSet<&Key> = nodes.iter().map(|n| &n.id).collect();
	let links = graph
		.links
		.iter()
		.filter(|l| kept.contains(&l.source) && kept.contains(&l.target))
		.cloned()
		.collect::<Vec<_>>();

	debug!(
		"filter: {} nodes, {} after groups, {} after centrality >= {}, {} kept with {} links",
		graph.nodes.len(),
		after_groups,
		after_centrality,
		centrality_limit,
		nodes.len(),
		links.len()
	);
	if nodes.is_empty() {
		warn!("filter left no nodes (groups={groups:?}, centrality_limit={centrality_limit})");
	}

	Ok(GraphData {
		nodes: nodes.into_iter().cloned().collect(),
		links,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::types::GraphLink;

	fn sample() -> GraphData {
		GraphData {
			nodes: vec![
				GraphNode::new(1, "x"),
				GraphNode::new(2, "y"),
				GraphNode::new(3, "x"),
			],
			links: vec![GraphLink::new(1, 2, 1.0), GraphLink::new(2, 3, 2.0)],
		}
	}

	fn ids(graph: &GraphData) -> Vec<Key> {
		graph.nodes.iter().map(|n| n.id.clone()).collect()
	}

	fn pairs(graph: &GraphData) -> Vec<(Key, Key)> {
		graph
			.links
			.iter()
			.map(|l| (l.source.clone(), l.target.clone()))
			.collect()
	}

	#[test]
	fn no_filters_truncates_in_input_order() {
		let out = filter_nodes(&sample(), &[], 0, 2).unwrap();
		assert_eq!(ids(&out), vec![Key::Number(1), Key::Number(2)]);
		assert_eq!(pairs(&out), vec![(Key::Number(1), Key::Number(2))]);
	}

	#[test]
	fn group_filter_drops_links_to_other_groups() {
		let out = filter_nodes(&sample(), &[Key::from("x")], 0, 5).unwrap();
		assert_eq!(ids(&out), vec![Key::Number(1), Key::Number(3)]);
		assert!(out.links.is_empty());
	}

	#[test]
	fn centrality_limit_keeps_only_hubs() {
		let out = filter_nodes(&sample(), &[], 2, 5).unwrap();
		assert_eq!(ids(&out), vec![Key::Number(2)]);
		assert!(out.links.is_empty());
	}

	#[test]
	fn ranks_by_degree_with_stable_ties() {
		let graph = GraphData {
			nodes: vec![
				GraphNode::new("a", 1),
				GraphNode::new("b", 1),
				GraphNode::new("c", 1),
				GraphNode::new("d", 1),
			],
			links: vec![
				GraphLink::new("c", "a", 1.0),
				GraphLink::new("c", "b", 1.0),
				GraphLink::new("c", "d", 1.0),
				GraphLink::new("b", "d", 1.0),
			],
		};
		let out = filter_nodes(&graph, &[], 1, 10).unwrap();
		// c=3, b=2, d=2, a=1; b precedes d in input.
		assert_eq!(
			ids(&out),
			vec![Key::from("c"), Key::from("b"), Key::from("d"), Key::from("a")]
		);
		assert_eq!(out.links, graph.links);
	}

	#[test]
	fn degree_counts_cover_the_full_link_set() {
		// Node 2's degree comes from links to nodes outside the kept group.
		let out = filter_nodes(&sample(), &[Key::from("y")], 2, 5).unwrap();
		assert_eq!(ids(&out), vec![Key::Number(2)]);
	}

	#[test]
	fn self_loop_counts_twice() {
		let graph = GraphData {
			nodes: vec![GraphNode::new(1, 0), GraphNode::new(2, 0)],
			links: vec![GraphLink::new(1, 1, 1.0)],
		};
		let out = filter_nodes(&graph, &[], 2, 5).unwrap();
		assert_eq!(ids(&out), vec![Key::Number(1)]);
		assert_eq!(out.links.len(), 1);
	}

	#[test]
	fn dangling_links_count_but_never_survive() {
		let graph = GraphData {
			nodes: vec![GraphNode::new(1, 0), GraphNode::new(2, 0)],
			links: vec![
				GraphLink::new(1, 99, 1.0),
				GraphLink::new(2, 99, 1.0),
				GraphLink::new(1, 2, 1.0),
			],
		};
		let out = filter_nodes(&graph, &[], 2, 5).unwrap();
		assert_eq!(ids(&out), vec![Key::Number(1), Key::Number(2)]);
		assert_eq!(pairs(&out), vec![(Key::Number(1), Key::Number(2))]);
	}

	#[test]
	fn negative_top_n_is_rejected() {
		let err = filter_nodes(&sample(), &[], 0, -1).unwrap_err();
		assert!(matches!(err, FilterError::InvalidInput(_)));
	}

	#[test]
	fn huge_limits_are_not_truncated() {
		let out = filter_nodes(&sample(), &[], 0, i64::MAX).unwrap();
		assert_eq!(ids(&out), ids(&sample()));
		let out = filter_nodes(&sample(), &[], i64::MAX, i64::MAX).unwrap();
		assert!(out.is_empty());
		// 2^32 + 1 must not behave like a limit of 1.
		let out = filter_nodes(&sample(), &[], 4_294_967_297, 5_000_000_000).unwrap();
		assert!(out.is_empty());
	}

	#[test]
	fn negative_limit_disables_the_degree_stage() {
		let out = filter_nodes(&sample(), &[], -3, 3).unwrap();
		assert_eq!(ids(&out), ids(&sample()));
	}

	#[test]
	fn empty_result_is_not_an_error() {
		let out = filter_nodes(&sample(), &[Key::from("z")], 0, 5).unwrap();
		assert!(out.is_empty());
		assert!(out.links.is_empty());
		let out = filter_nodes(&sample(), &[], 0, 0).unwrap();
		assert!(out.is_empty());
	}

	#[test]
	fn output_is_a_bounded_subset_and_input_is_untouched() {
		let graph = sample();
		let before = graph.clone();
		for top_n in 0..5 {
			for limit in 0..4 {
				let out = filter_nodes(&graph, &[], limit, top_n).unwrap();
				assert!(out.nodes.len() <= top_n as usize);
				assert!(out.nodes.len() <= graph.nodes.len());
				assert!(out.nodes.iter().all(|n| graph.nodes.contains(n)));
				assert!(out.links.iter().all(|l| graph.links.contains(l)));
				let kept = ids(&out);
				assert!(
					out.links
						.iter()
						.all(|l| kept.contains(&l.source) && kept.contains(&l.target))
				);
			}
		}
		assert_eq!(graph, before);
	}

	#[test]
	fn refiltering_is_idempotent() {
		let params = FilterParams {
			groups: vec![Key::from("x"), Key::from("y")],
			centrality_limit: 1,
			top_n: 2,
		};
		let once = params.apply(&sample()).unwrap();
		let twice = FilterParams {
			top_n: 10,
			..params.clone()
		}
		.apply(&once)
		.unwrap();
		assert_eq!(once, twice);
	}
}

//! Derives the visible subgraph from the full graph plus UI query state.
//!
//! The pipeline is copy-based: the authoritative [`GraphData`] is shared with
//! the rest of the application and is never mutated here, so progress-mode
//! relevance recomputation operates on cloned nodes only.

use std::collections::HashSet;

use log::warn;

use super::types::{FilterQuery, GraphData, GraphNode, ViewMode};

const DAY_MS: f64 = 86_400_000.0;

/// Compute the visible `{nodes, links}` pair for a query.
///
/// `now_ms` feeds the progress-mode recency boost and comes from the host
/// clock (or a fixed value in tests).
pub fn filter(full: &GraphData, query: &FilterQuery, now_ms: f64) -> GraphData {
	// Focus mode restricts to a one-hop neighborhood taken from the
	// *unfiltered* adjacency, so focus always shows true neighbors even when
	// search or kind filters would exclude them.
	if query.view_mode == ViewMode::Focus {
		if let Some(focus_id) = query.focus_node_id.as_deref() {
			if full.nodes.iter().any(|n| n.id == focus_id) {
				return focus_subgraph(full, focus_id);
			}
			warn!("neural-graph: focus node {focus_id:?} not in graph, falling back to filters");
		}
	}

	let mut nodes: Vec<GraphNode> = full
		.nodes
		.iter()
		.filter(|n| matches(n, query))
		.cloned()
		.collect();

	if query.view_mode == ViewMode::Progress {
		for node in &mut nodes {
			node.relevance = progress_relevance(node.relevance, node.last_access_at, now_ms);
		}
	}

	// The graph always shows a center: outside focus mode a filtered-out hub
	// is force-included. Links for it are not resurrected; it only keeps the
	// links that pass the endpoint rule below.
	if !nodes.iter().any(|n| n.is_hub()) {
		if let Some(i) = full.hub_index() {
			nodes.insert(0, full.nodes[i].clone());
		}
	}

	retain_links(full, nodes)
}

/// A link survives only if both endpoints are in the visible node set.
fn retain_links(full: &GraphData, nodes: Vec<GraphNode>) -> GraphData {
	let visible: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
	let links = full
		.links
		.iter()
		.filter(|l| visible.contains(l.source.as_str()) && visible.contains(l.target.as_str()))
		.cloned()
		.collect();
	GraphData { nodes, links }
}

fn focus_subgraph(full: &GraphData, focus_id: &str) -> GraphData {
	let mut keep: HashSet<&str> = HashSet::new();
	keep.insert(focus_id);
	for link in &full.links {
		if let Some(other) = link.other(focus_id) {
			keep.insert(other);
		}
	}

	let nodes = full
		.nodes
		.iter()
		.filter(|n| keep.contains(n.id.as_str()))
		.cloned()
		.collect();
	retain_links(full, nodes)
}

fn matches(node: &GraphNode, query: &FilterQuery) -> bool {
	if let Some(kind) = query.kind {
		if node.kind != kind {
			return false;
		}
	}
	if let Some(area) = query.area.as_deref() {
		if node.area.as_deref() != Some(area) {
			return false;
		}
	}

	let needle = query.search.trim().to_lowercase();
	if needle.is_empty() {
		return true;
	}
	node.label.to_lowercase().contains(&needle)
		|| node.kind.name().contains(&needle)
		|| node
			.tags
			.iter()
			.any(|tag| tag.to_lowercase().contains(&needle))
}

/// Presentational relevance under progress view: recently touched nodes get
/// a boost, stale ones recede. Always stays inside [1, 10].
fn progress_relevance(relevance: u8, last_access_ms: f64, now_ms: f64) -> u8 {
	let age = now_ms - last_access_ms;
	let boost: i16 = if age <= DAY_MS {
		2
	} else if age <= 7.0 * DAY_MS {
		1
	} else if age > 30.0 * DAY_MS {
		-1
	} else {
		0
	};
	(relevance as i16 + boost).clamp(1, 10) as u8
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::neural_graph::types::{GraphLink, NodeKind};

	fn node(id: &str, kind: NodeKind) -> GraphNode {
		GraphNode {
			id: id.to_string(),
			label: id.to_uppercase(),
			kind,
			relevance: 5,
			area: None,
			tags: Vec::new(),
			created_at: 0.0,
			last_access_at: 0.0,
			connections: Vec::new(),
		}
	}

	fn link(source: &str, target: &str) -> GraphLink {
		GraphLink {
			source: source.to_string(),
			target: target.to_string(),
		}
	}

	/// Hub `h` with three clusters linked to it, plus one unlinked thought.
	fn star_graph() -> GraphData {
		GraphData {
			nodes: vec![
				node("h", NodeKind::Hub),
				node("c1", NodeKind::Cluster),
				node("c2", NodeKind::Cluster),
				node("c3", NodeKind::Cluster),
				node("t1", NodeKind::Thought),
			],
			links: vec![link("h", "c1"), link("h", "c2"), link("h", "c3")],
		}
	}

	fn ids(data: &GraphData) -> Vec<&str> {
		let mut out: Vec<&str> = data.nodes.iter().map(|n| n.id.as_str()).collect();
		out.sort();
		out
	}

	#[test]
	fn kind_filter_force_includes_hub_and_keeps_its_links() {
		let full = star_graph();
		let query = FilterQuery {
			kind: Some(NodeKind::Cluster),
			..Default::default()
		};
		let visible = filter(&full, &query, 0.0);
		assert_eq!(ids(&visible), vec!["c1", "c2", "c3", "h"]);
		assert_eq!(visible.links.len(), 3);
	}

	#[test]
	fn search_narrows_on_top_of_kind_filter() {
		let full = star_graph();
		let query = FilterQuery {
			kind: Some(NodeKind::Cluster),
			search: "C2".to_string(),
			..Default::default()
		};
		let visible = filter(&full, &query, 0.0);
		assert_eq!(ids(&visible), vec!["c2", "h"]);
		assert_eq!(visible.links.len(), 1);
		assert!(visible.links[0].touches("c2"));
	}

	#[test]
	fn search_matches_tags_and_kind_name() {
		let mut full = star_graph();
		full.nodes[4].tags = vec!["Deep Work".to_string()];
		let by_tag = filter(
			&full,
			&FilterQuery {
				search: "deep wo".to_string(),
				..Default::default()
			},
			0.0,
		);
		assert_eq!(ids(&by_tag), vec!["h", "t1"]);

		let by_kind_name = filter(
			&full,
			&FilterQuery {
				search: "thought".to_string(),
				..Default::default()
			},
			0.0,
		);
		assert_eq!(ids(&by_kind_name), vec!["h", "t1"]);
	}

	#[test]
	fn area_filter_is_exact() {
		let mut full = star_graph();
		full.nodes[1].area = Some("health".to_string());
		full.nodes[2].area = Some("healthcare".to_string());
		let visible = filter(
			&full,
			&FilterQuery {
				area: Some("health".to_string()),
				..Default::default()
			},
			0.0,
		);
		assert_eq!(ids(&visible), vec!["c1", "h"]);
	}

	#[test]
	fn filter_is_deterministic_for_identical_queries() {
		let full = star_graph();
		let query = FilterQuery {
			search: "c".to_string(),
			..Default::default()
		};
		let a = filter(&full, &query, 0.0);
		let b = filter(&full, &query, 0.0);
		assert_eq!(ids(&a), ids(&b));
		assert_eq!(a.links.len(), b.links.len());
	}

	#[test]
	fn focus_yields_exact_one_hop_neighborhood() {
		let full = GraphData {
			nodes: vec![
				node("h", NodeKind::Hub),
				node("a", NodeKind::Project),
				node("b", NodeKind::Habit),
				node("c", NodeKind::Favorite),
				node("d", NodeKind::Thought),
			],
			links: vec![link("a", "b"), link("c", "a"), link("h", "d")],
		};
		// Concurrent search/kind filters must not narrow the neighborhood.
		let query = FilterQuery {
			view_mode: ViewMode::Focus,
			focus_node_id: Some("a".to_string()),
			search: "zzz".to_string(),
			kind: Some(NodeKind::Thought),
			..Default::default()
		};
		let visible = filter(&full, &query, 0.0);
		assert_eq!(ids(&visible), vec!["a", "b", "c"]);
		// Hub is not force-included in focus mode.
		assert!(!visible.nodes.iter().any(|n| n.is_hub()));
	}

	#[test]
	fn focus_on_missing_node_falls_back_to_filters() {
		let full = star_graph();
		let query = FilterQuery {
			view_mode: ViewMode::Focus,
			focus_node_id: Some("ghost".to_string()),
			kind: Some(NodeKind::Cluster),
			..Default::default()
		};
		let visible = filter(&full, &query, 0.0);
		assert_eq!(ids(&visible), vec!["c1", "c2", "c3", "h"]);
	}

	#[test]
	fn links_always_have_visible_endpoints() {
		let full = star_graph();
		for query in [
			FilterQuery::default(),
			FilterQuery {
				search: "c1".to_string(),
				..Default::default()
			},
			FilterQuery {
				kind: Some(NodeKind::Thought),
				..Default::default()
			},
		] {
			let visible = filter(&full, &query, 0.0);
			for l in &visible.links {
				assert!(visible.nodes.iter().any(|n| n.id == l.source));
				assert!(visible.nodes.iter().any(|n| n.id == l.target));
			}
		}
	}

	#[test]
	fn filtering_everything_out_leaves_a_valid_hub_only_graph() {
		let full = star_graph();
		let visible = filter(
			&full,
			&FilterQuery {
				search: "no such node".to_string(),
				..Default::default()
			},
			0.0,
		);
		assert_eq!(ids(&visible), vec!["h"]);
		assert!(visible.links.is_empty());
	}

	#[test]
	fn at_most_one_hub_after_any_query() {
		let full = star_graph();
		for query in [
			FilterQuery::default(),
			FilterQuery {
				kind: Some(NodeKind::Hub),
				..Default::default()
			},
			FilterQuery {
				search: "h".to_string(),
				..Default::default()
			},
		] {
			let visible = filter(&full, &query, 0.0);
			assert!(visible.nodes.iter().filter(|n| n.is_hub()).count() <= 1);
		}
	}

	#[test]
	fn progress_relevance_stays_in_bounds() {
		let now = 1_000.0 * DAY_MS;
		// Very stale node at minimum relevance must not underflow.
		assert_eq!(progress_relevance(1, 0.0, now), 1);
		// Fresh node at maximum relevance must not overflow.
		assert_eq!(progress_relevance(10, now, now), 10);
		// Boost tiers.
		assert_eq!(progress_relevance(5, now - DAY_MS * 0.5, now), 7);
		assert_eq!(progress_relevance(5, now - DAY_MS * 3.0, now), 6);
		assert_eq!(progress_relevance(5, now - DAY_MS * 20.0, now), 5);
		assert_eq!(progress_relevance(5, now - DAY_MS * 40.0, now), 4);
	}

	#[test]
	fn progress_mode_does_not_touch_the_full_graph() {
		let mut full = star_graph();
		full.nodes[1].last_access_at = 900.0 * DAY_MS;
		let now = 900.5 * DAY_MS;
		let visible = filter(
			&full,
			&FilterQuery {
				view_mode: ViewMode::Progress,
				..Default::default()
			},
			now,
		);
		let boosted = visible.nodes.iter().find(|n| n.id == "c1").unwrap();
		assert_eq!(boosted.relevance, 7);
		// Authoritative store untouched.
		assert_eq!(full.nodes[1].relevance, 5);
	}
}

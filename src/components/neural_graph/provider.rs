//! Graph sources: where the full node/link graph comes from.
//!
//! The engine never assumes a particular provider. Anything that can produce
//! a `{nodes, links}` pair with one hub and valid link endpoints can drive
//! the visualization; the real system wires this to live query results over
//! projects, habits and saved items. [`SampleGraphSource`] generates a
//! stand-in second-brain graph for development and the demo shell.

use super::types::{GraphData, GraphLink, GraphNode, NodeKind};

/// A producer of the full graph. Re-invoked whenever upstream domain data
/// changes; the output is sanitized before it reaches layout or animation.
pub trait GraphSource {
	fn load(&self) -> GraphData;
}

/// Generated sample data standing in for real entity feeds.
pub struct SampleGraphSource {
	now_ms: f64,
}

const HOUR_MS: f64 = 3_600_000.0;
const DAY_MS: f64 = 24.0 * HOUR_MS;

impl SampleGraphSource {
	/// `now_ms` anchors the sample timestamps so recency-driven views have
	/// something to chew on.
	pub fn new(now_ms: f64) -> Self {
		Self { now_ms }
	}

	fn node(
		&self,
		id: &str,
		label: &str,
		kind: NodeKind,
		relevance: u8,
		area: Option<&str>,
		tags: &[&str],
		created_days_ago: f64,
		accessed_hours_ago: f64,
	) -> GraphNode {
		GraphNode {
			id: id.to_string(),
			label: label.to_string(),
			kind,
			relevance,
			area: area.map(str::to_string),
			tags: tags.iter().map(|t| t.to_string()).collect(),
			created_at: self.now_ms - created_days_ago * DAY_MS,
			last_access_at: self.now_ms - accessed_hours_ago * HOUR_MS,
			connections: Vec::new(),
		}
	}
}

fn link(source: &str, target: &str) -> GraphLink {
	GraphLink {
		source: source.to_string(),
		target: target.to_string(),
	}
}

impl GraphSource for SampleGraphSource {
	fn load(&self) -> GraphData {
		let nodes = vec![
			self.node("athena", "Athena", NodeKind::Hub, 10, None, &[], 400.0, 0.1),
			// Sub-brains
			self.node(
				"sb-mind",
				"Mind Lab",
				NodeKind::Cluster,
				9,
				Some("learning"),
				&["zettelkasten", "notes"],
				320.0,
				3.0,
			),
			self.node(
				"sb-studio",
				"Studio",
				NodeKind::Cluster,
				7,
				Some("work"),
				&["design", "craft"],
				280.0,
				30.0,
			),
			self.node(
				"sb-wellness",
				"Wellness",
				NodeKind::Cluster,
				8,
				Some("health"),
				&["body", "routines"],
				300.0,
				12.0,
			),
			// Projects
			self.node(
				"prj-brain",
				"Second Brain App",
				NodeKind::Project,
				9,
				Some("work"),
				&["rust", "wasm"],
				90.0,
				1.0,
			),
			self.node(
				"prj-garden",
				"Garden Redesign",
				NodeKind::Project,
				5,
				Some("home"),
				&["outdoors"],
				60.0,
				200.0,
			),
			self.node(
				"prj-course",
				"Systems Course",
				NodeKind::Project,
				6,
				Some("learning"),
				&["study"],
				45.0,
				50.0,
			),
			// Habits
			self.node(
				"hab-pages",
				"Morning Pages",
				NodeKind::Habit,
				8,
				Some("learning"),
				&["writing", "daily"],
				200.0,
				8.0,
			),
			self.node(
				"hab-walk",
				"Daily Walk",
				NodeKind::Habit,
				7,
				Some("health"),
				&["daily", "outdoors"],
				150.0,
				20.0,
			),
			self.node(
				"hab-read",
				"Read 20 Pages",
				NodeKind::Habit,
				6,
				Some("learning"),
				&["books", "daily"],
				120.0,
				26.0,
			),
			// Saved items
			self.node(
				"fav-systems",
				"Thinking in Systems",
				NodeKind::Favorite,
				7,
				Some("learning"),
				&["books"],
				100.0,
				300.0,
			),
			self.node(
				"fav-notes",
				"How to Take Smart Notes",
				NodeKind::Favorite,
				6,
				Some("learning"),
				&["books", "notes"],
				240.0,
				800.0,
			),
			self.node(
				"fav-talk",
				"The Art of Doing Less",
				NodeKind::Favorite,
				4,
				Some("work"),
				&["video"],
				30.0,
				400.0,
			),
			// Loose thoughts
			self.node(
				"th-sleep",
				"Sleep before midnight",
				NodeKind::Thought,
				5,
				Some("health"),
				&["idea"],
				10.0,
				100.0,
			),
			self.node(
				"th-links",
				"Link habits to projects",
				NodeKind::Thought,
				6,
				Some("learning"),
				&["idea", "meta"],
				5.0,
				4.0,
			),
			self.node(
				"th-slow",
				"Slow mornings work better",
				NodeKind::Thought,
				3,
				None,
				&["journal"],
				2.0,
				40.0,
			),
		];

		let links = vec![
			link("athena", "sb-mind"),
			link("athena", "sb-studio"),
			link("athena", "sb-wellness"),
			link("sb-mind", "prj-course"),
			link("sb-mind", "hab-pages"),
			link("sb-mind", "hab-read"),
			link("sb-mind", "fav-systems"),
			link("sb-mind", "fav-notes"),
			link("sb-studio", "prj-brain"),
			link("sb-studio", "prj-garden"),
			link("sb-studio", "fav-talk"),
			link("sb-wellness", "hab-walk"),
			link("sb-wellness", "th-sleep"),
			link("prj-brain", "fav-notes"),
			link("prj-course", "fav-systems"),
			link("hab-pages", "th-slow"),
			link("th-links", "sb-mind"),
			link("th-links", "hab-pages"),
		];

		let mut data = GraphData { nodes, links };
		data.sanitize();
		data.derive_connections();
		data
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	#[test]
	fn sample_graph_satisfies_the_provider_contract() {
		let data = SampleGraphSource::new(1_700_000_000_000.0).load();

		// Exactly one hub.
		assert_eq!(data.nodes.iter().filter(|n| n.is_hub()).count(), 1);

		// Every link references two existing node ids.
		let ids: HashSet<&str> = data.nodes.iter().map(|n| n.id.as_str()).collect();
		for l in &data.links {
			assert!(ids.contains(l.source.as_str()), "missing {}", l.source);
			assert!(ids.contains(l.target.as_str()), "missing {}", l.target);
		}

		// Every non-hub node belongs to exactly one category.
		for n in &data.nodes {
			if !n.is_hub() {
				assert_ne!(n.kind, NodeKind::Unknown);
			}
		}
	}

	#[test]
	fn sample_graph_arrives_with_connections_derived() {
		let data = SampleGraphSource::new(0.0).load();
		let hub = data.nodes.iter().find(|n| n.is_hub()).unwrap();
		assert_eq!(hub.connections.len(), 3);
		assert!(
			hub.connections
				.iter()
				.all(|c| c.kind == NodeKind::Cluster)
		);
	}

	#[test]
	fn sample_timestamps_are_in_the_past() {
		let now = 1_700_000_000_000.0;
		let data = SampleGraphSource::new(now).load();
		for n in &data.nodes {
			assert!(n.created_at < now);
			assert!(n.last_access_at <= now);
			assert!(n.created_at <= n.last_access_at);
		}
	}
}

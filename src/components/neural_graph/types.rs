//! Graph data structures for input to the neural graph component.
//!
//! The types here are the domain-facing half of the node model: identity,
//! labels, relevance, tags. Render state (positions, orbit parameters, pulse
//! phases) is owned by the view state and the orbital engine and joined to
//! these records by node id.

use log::warn;
use serde::Deserialize;

/// Category of a node. Determines color and default orbital ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum NodeKind {
	/// The single always-central aggregator node.
	Hub,
	/// A sub-brain: a thematic cluster of the user's knowledge.
	Cluster,
	/// An ongoing project.
	Project,
	/// A tracked habit.
	Habit,
	/// A saved item.
	Favorite,
	/// A journal entry or loose note.
	Thought,
	/// Anything the backend sends that this build does not know about.
	Unknown,
}

impl NodeKind {
	/// Lowercase display name, also the string matched by text search.
	pub fn name(self) -> &'static str {
		match self {
			NodeKind::Hub => "hub",
			NodeKind::Cluster => "cluster",
			NodeKind::Project => "project",
			NodeKind::Habit => "habit",
			NodeKind::Favorite => "favorite",
			NodeKind::Thought => "thought",
			NodeKind::Unknown => "unknown",
		}
	}
}

impl From<String> for NodeKind {
	/// Inbound kind strings are untrusted; anything unrecognized maps to
	/// [`NodeKind::Unknown`] instead of failing the whole graph parse.
	fn from(value: String) -> Self {
		match value.as_str() {
			"hub" => Self::Hub,
			"cluster" => Self::Cluster,
			"project" => Self::Project,
			"habit" => Self::Habit,
			"favorite" => Self::Favorite,
			"thought" => Self::Thought,
			_ => Self::Unknown,
		}
	}
}

/// The other endpoint of a link touching a node, for display purposes.
///
/// Derived from the link set and never authoritative: topology questions go
/// to `GraphData::links`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
	pub id: String,
	pub label: String,
	pub kind: NodeKind,
}

fn default_relevance() -> u8 {
	5
}

/// A node in the graph.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in links.
	pub id: String,
	/// Display name.
	pub label: String,
	/// Node category.
	#[serde(rename = "type")]
	pub kind: NodeKind,
	/// Importance score 1-10. Drives size, brightness and motion amplitude.
	#[serde(default = "default_relevance")]
	pub relevance: u8,
	/// Free-text category tag, used only for filtering.
	#[serde(default)]
	pub area: Option<String>,
	/// Free-text tags for search matching. Order carries no meaning.
	#[serde(default)]
	pub tags: Vec<String>,
	/// Creation timestamp, milliseconds since the epoch.
	#[serde(default)]
	pub created_at: f64,
	/// Last access timestamp, milliseconds since the epoch.
	#[serde(default)]
	pub last_access_at: f64,
	/// Derived list of linked nodes. Recomputed whenever the link set
	/// changes; never deserialized.
	#[serde(skip)]
	pub connections: Vec<Connection>,
}

impl GraphNode {
	pub fn is_hub(&self) -> bool {
		self.kind == NodeKind::Hub
	}
}

/// An edge between two nodes, referenced by id.
///
/// Links are undirected for connection lists and filtering: a link touching
/// a node counts regardless of which side it sits on.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphLink {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
}

impl GraphLink {
	/// The endpoint opposite to `id`, if this link touches `id`.
	pub fn other(&self, id: &str) -> Option<&str> {
		if self.source == id {
			Some(&self.target)
		} else if self.target == id {
			Some(&self.source)
		} else {
			None
		}
	}

	pub fn touches(&self, id: &str) -> bool {
		self.source == id || self.target == id
	}
}

/// Complete graph data: nodes and links.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl GraphData {
	/// Clean up untrusted input so layout and animation never see a
	/// malformed graph.
	///
	/// Drops links whose endpoints are missing, clamps relevance into 1..=10
	/// and keeps at most one hub node (first wins). A visual engine that
	/// crashes the page is worse than an incomplete graph, so everything
	/// here degrades instead of failing.
	pub fn sanitize(&mut self) {
		let mut hub_seen = false;
		self.nodes.retain(|node| {
			if node.is_hub() {
				if hub_seen {
					warn!("neural-graph: dropping extra hub node {:?}", node.id);
					return false;
				}
				hub_seen = true;
			}
			true
		});

		for node in &mut self.nodes {
			node.relevance = node.relevance.clamp(1, 10);
		}

		let ids: std::collections::HashSet<&str> =
			self.nodes.iter().map(|n| n.id.as_str()).collect();
		let before = self.links.len();
		self.links
			.retain(|link| ids.contains(link.source.as_str()) && ids.contains(link.target.as_str()));
		if self.links.len() < before {
			warn!(
				"neural-graph: dropped {} link(s) with missing endpoints",
				before - self.links.len()
			);
		}
	}

	/// Recompute every node's connection list from the link set.
	///
	/// A link whose other endpoint no longer exists is silently skipped.
	pub fn derive_connections(&mut self) {
		let refs: Vec<(String, String, NodeKind)> = self
			.nodes
			.iter()
			.map(|n| (n.id.clone(), n.label.clone(), n.kind))
			.collect();

		for node in &mut self.nodes {
			node.connections = self
				.links
				.iter()
				.filter_map(|link| link.other(&node.id))
				.filter_map(|other_id| {
					refs.iter().find(|(id, _, _)| id == other_id).map(
						|(id, label, kind)| Connection {
							id: id.clone(),
							label: label.clone(),
							kind: *kind,
						},
					)
				})
				.collect();
		}
	}

	/// Index of the hub node, if present.
	pub fn hub_index(&self) -> Option<usize> {
		self.nodes.iter().position(|n| n.is_hub())
	}
}

/// How the visible subgraph is derived from the full graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
	/// Plain search/kind/area narrowing.
	#[default]
	Default,
	/// Like `Default`, with relevance recomputed from access recency.
	Progress,
	/// One node and its direct neighbors only.
	Focus,
}

/// Ephemeral, UI-owned query state. Never mutates the authoritative graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterQuery {
	/// Case-insensitive substring matched against label, tags and kind name.
	pub search: String,
	/// Exact kind filter. `None` passes everything through.
	pub kind: Option<NodeKind>,
	/// Exact area filter. `None` passes everything through.
	pub area: Option<String>,
	pub view_mode: ViewMode,
	/// The node at the center of focus mode.
	pub focus_node_id: Option<String>,
}

impl FilterQuery {
	/// Enter focus mode on a node.
	pub fn focus_on(&mut self, id: &str) {
		self.view_mode = ViewMode::Focus;
		self.focus_node_id = Some(id.to_string());
	}

	/// Leave focus mode, keeping the other filters.
	pub fn clear_focus(&mut self) {
		if self.view_mode == ViewMode::Focus {
			self.view_mode = ViewMode::Default;
		}
		self.focus_node_id = None;
	}
}

/// Human-readable recency, for the hover tooltip.
pub fn time_ago(now_ms: f64, then_ms: f64) -> String {
	let seconds = ((now_ms - then_ms) / 1000.0).max(0.0);
	let minutes = seconds / 60.0;
	let hours = minutes / 60.0;
	let days = hours / 24.0;

	if seconds < 60.0 {
		"just now".to_string()
	} else if minutes < 60.0 {
		format!("{}m ago", minutes as u64)
	} else if hours < 24.0 {
		format!("{}h ago", hours as u64)
	} else if days < 30.0 {
		format!("{}d ago", days as u64)
	} else if days < 365.0 {
		format!("{}mo ago", (days / 30.0) as u64)
	} else {
		format!("{}y ago", (days / 365.0) as u64)
	}
}

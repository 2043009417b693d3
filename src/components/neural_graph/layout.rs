//! Constellation layout: assigns each non-hub node to an orbital ring.
//!
//! Runs once whenever the visible node set is (re)established, never per
//! frame. Nodes are grouped by kind; each kind has a fixed ring, outer rings
//! moving slower than inner ones. Within a group the base angles are evenly
//! spaced, and every node gets a small hash-derived jitter in angle, radius
//! and speed so same-kind nodes don't move in lockstep.

use std::f64::consts::TAU;

use super::orbit::OrbitParams;
use super::types::{GraphNode, NodeKind};

/// Ring definition for one node kind.
#[derive(Clone, Copy, Debug)]
pub struct RingSpec {
	/// Ring radius before jitter.
	pub base_radius: f64,
	/// Angular speed before jitter, radians per second.
	pub base_speed: f64,
	/// Maximum radius offset in either direction.
	pub radius_jitter: f64,
}

/// Speed jitter bound, radians per second in either direction.
pub const SPEED_JITTER: f64 = 0.05;

/// Ring for a node kind. Unrecognized kinds share the outermost ring; the
/// hub never orbits and is not looked up here.
pub fn ring_for(kind: NodeKind) -> RingSpec {
	match kind {
		NodeKind::Cluster => RingSpec {
			base_radius: 200.0,
			base_speed: 0.12,
			radius_jitter: 25.0,
		},
		NodeKind::Project => RingSpec {
			base_radius: 300.0,
			base_speed: 0.095,
			radius_jitter: 30.0,
		},
		NodeKind::Habit => RingSpec {
			base_radius: 380.0,
			base_speed: 0.075,
			radius_jitter: 30.0,
		},
		NodeKind::Favorite => RingSpec {
			base_radius: 450.0,
			base_speed: 0.06,
			radius_jitter: 35.0,
		},
		NodeKind::Hub | NodeKind::Thought | NodeKind::Unknown => RingSpec {
			base_radius: 520.0,
			base_speed: 0.05,
			radius_jitter: 40.0,
		},
	}
}

/// Assign orbit parameters to `nodes`, returning one entry per input node in
/// order. The hub gets `None`; it is pinned at the origin by the engine.
pub fn assign_orbits(nodes: &[GraphNode]) -> Vec<Option<OrbitParams>> {
	let mut group_sizes: std::collections::HashMap<NodeKind, usize> =
		std::collections::HashMap::new();
	for node in nodes.iter().filter(|n| !n.is_hub()) {
		*group_sizes.entry(node.kind).or_insert(0) += 1;
	}

	let mut group_cursor: std::collections::HashMap<NodeKind, usize> =
		std::collections::HashMap::new();

	nodes
		.iter()
		.map(|node| {
			if node.is_hub() {
				return None;
			}
			let ring = ring_for(node.kind);
			let n = group_sizes.get(&node.kind).copied().unwrap_or(1).max(1);
			let i = {
				let cursor = group_cursor.entry(node.kind).or_insert(0);
				let i = *cursor;
				*cursor += 1;
				i
			};

			let seed = id_seed(&node.id);
			let slot_angle = TAU * i as f64 / n as f64;
			Some(OrbitParams {
				radius: ring.base_radius
					+ (pseudo_random(seed * 1.7) - 0.5) * 2.0 * ring.radius_jitter,
				base_angle: slot_angle + (pseudo_random(seed * 2.9) - 0.5) * 0.5,
				angular_speed: ring.base_speed
					+ (pseudo_random(seed * 4.3) - 0.5) * 2.0 * SPEED_JITTER,
				pulse_phase: pseudo_random(seed * 6.1) * TAU,
			})
		})
		.collect()
}

/// Simple deterministic pseudo-random function in [0, 1).
///
/// Determinism is a convenience, not a contract: nothing downstream depends
/// on exact values, only on the ranges.
fn pseudo_random(seed: f64) -> f64 {
	let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
	x - x.floor()
}

/// Fold a node id into a jitter seed.
fn id_seed(id: &str) -> f64 {
	id.bytes()
		.enumerate()
		.fold(0.73, |acc, (i, b)| acc + b as f64 * (i as f64 + 1.13) * 0.017)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::f64::consts::TAU;

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

	#[test]
	fn hub_gets_no_orbit() {
		let nodes = vec![node("h", NodeKind::Hub), node("a", NodeKind::Cluster)];
		let orbits = assign_orbits(&nodes);
		assert!(orbits[0].is_none());
		assert!(orbits[1].is_some());
	}

	#[test]
	fn rings_are_ordered_and_outer_rings_are_slower() {
		let kinds = [
			NodeKind::Cluster,
			NodeKind::Project,
			NodeKind::Habit,
			NodeKind::Favorite,
			NodeKind::Thought,
		];
		for pair in kinds.windows(2) {
			let inner = ring_for(pair[0]);
			let outer = ring_for(pair[1]);
			assert!(inner.base_radius < outer.base_radius);
			assert!(inner.base_speed > outer.base_speed);
		}
	}

	#[test]
	fn jitter_stays_inside_the_ring_bounds() {
		let nodes: Vec<GraphNode> = (0..40)
			.map(|i| node(&format!("p{i}"), NodeKind::Project))
			.collect();
		let ring = ring_for(NodeKind::Project);
		for orbit in assign_orbits(&nodes).into_iter().flatten() {
			assert!((orbit.radius - ring.base_radius).abs() <= ring.radius_jitter + 1e-9);
			assert!((orbit.angular_speed - ring.base_speed).abs() <= SPEED_JITTER + 1e-9);
			assert!(orbit.angular_speed > 0.0);
			assert!((0.0..TAU).contains(&orbit.pulse_phase));
		}
	}

	#[test]
	fn same_kind_nodes_are_spread_around_the_ring() {
		let nodes: Vec<GraphNode> = (0..4)
			.map(|i| node(&format!("c{i}"), NodeKind::Cluster))
			.collect();
		let mut angles: Vec<f64> = assign_orbits(&nodes)
			.into_iter()
			.flatten()
			.map(|o| o.base_angle.rem_euclid(TAU))
			.collect();
		angles.sort_by(|a, b| a.partial_cmp(b).unwrap());

		// Even spacing is 2π/4; the per-node jitter is bounded by ±0.25.
		for pair in angles.windows(2) {
			let gap = pair[1] - pair[0];
			assert!(
				(gap - TAU / 4.0).abs() <= 0.51,
				"uneven gap {gap} in {angles:?}"
			);
		}
	}

	#[test]
	fn unknown_kind_shares_the_outermost_ring() {
		assert_eq!(
			ring_for(NodeKind::Unknown).base_radius,
			ring_for(NodeKind::Thought).base_radius
		);
	}

	#[test]
	fn mixed_kinds_count_groups_independently() {
		let nodes = vec![
			node("h", NodeKind::Hub),
			node("c1", NodeKind::Cluster),
			node("c2", NodeKind::Cluster),
			node("p1", NodeKind::Project),
		];
		let orbits = assign_orbits(&nodes);
		// Two clusters split the circle; one project owns its whole slot.
		let c1 = orbits[1].unwrap();
		let c2 = orbits[2].unwrap();
		let gap = (c1.base_angle - c2.base_angle).abs();
		assert!((gap - TAU / 2.0).abs() <= 0.51, "cluster gap {gap}");
	}
}

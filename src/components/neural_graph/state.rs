//! View state for the neural graph: node/link store, camera, interaction.
//!
//! Wraps the `force_graph` store with the orbital engine, impulse system,
//! pan/zoom transforms and hover/drag/focus tracking. The store's own
//! physics is parked — every node is anchored and the orbital engine is the
//! only writer of positions outside an active drag.

use std::collections::HashMap;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::warn;

use super::impulse::ImpulseSystem;
use super::layout::assign_orbits;
use super::orbit::{OrbitEngine, OrbitParams, orbit_position};
use super::scale::{ScaleConfig, ScaledValues, relevance_size};
use super::types::{GraphData, GraphNode};

/// Top band of the viewport reserved for the header overlay; tooltips stay
/// out of it.
pub const HEADER_EXCLUSION_PX: f64 = 64.0;

/// Approximate tooltip box used for viewport clamping.
const TOOLTIP_SIZE: (f64, f64) = (240.0, 110.0);
const TOOLTIP_OFFSET: f64 = 14.0;
const TOOLTIP_MARGIN: f64 = 8.0;

/// How far a pressed pointer may travel before the gesture counts as a drag
/// instead of a click, in screen pixels.
pub const DRAG_THRESHOLD_PX: f64 = 4.0;

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Copy, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
	/// Set once the pointer leaves the click threshold.
	pub moved: bool,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Hover tracking with a smoothed ring intensity for the hovered node.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	/// 0.0 = no ring, 1.0 = fully visible; eased every tick.
	pub ring: f64,
}

/// Core view state combining the node store with interaction tracking.
///
/// Created once when the component mounts and rebuilt whenever the visible
/// subgraph changes; mutated each frame by [`NeuralGraphState::tick`].
pub struct NeuralGraphState {
	pub graph: ForceGraph<GraphNode, ()>,
	pub engine: OrbitEngine,
	pub impulses: ImpulseSystem,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub focused: Option<DefaultNodeIdx>,
	pub width: f64,
	pub height: f64,
	/// Seconds of animation time, drives pulsing in the painter.
	pub flow_time: f64,
	camera_target: ViewTransform,
	links: Vec<(DefaultNodeIdx, DefaultNodeIdx)>,
	last_tick_ms: Option<f64>,
}

impl NeuralGraphState {
	/// Build view state for an already-filtered, sanitized subgraph.
	///
	/// Layout runs here, before any frame can read orbit parameters, so a
	/// node entering visibility always has a valid ring before its first
	/// position computation.
	pub fn new(visible: &GraphData, width: f64, height: f64, now_ms: f64) -> Self {
		let mut state = Self {
			graph: empty_store(),
			engine: OrbitEngine::new(),
			impulses: ImpulseSystem::new(0),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			focused: None,
			width,
			height,
			flow_time: 0.0,
			camera_target: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			links: Vec::new(),
			last_tick_ms: None,
		};
		state.rebuild(visible, now_ms);
		state
	}

	/// Adopt a new visible subgraph, keeping the camera where it is.
	///
	/// The engine restarts with fresh timing state and the impulse system is
	/// reset so nothing animates against stale link indices.
	pub fn rebuild(&mut self, visible: &GraphData, now_ms: f64) {
		let mut graph = empty_store();
		let orbits = assign_orbits(&visible.nodes);
		let mut id_to_idx: HashMap<&str, DefaultNodeIdx> = HashMap::new();
		let mut hub = None;
		let mut params: HashMap<DefaultNodeIdx, OrbitParams> = HashMap::new();

		for (node, orbit) in visible.nodes.iter().zip(&orbits) {
			let (x, y) = match orbit {
				Some(p) => orbit_position(p, 0.0, node.relevance),
				None => (0.0, 0.0),
			};
			let idx = graph.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: 10.0,
				is_anchor: true,
				user_data: node.clone(),
			});
			if node.is_hub() {
				hub = Some(idx);
			}
			if let Some(p) = orbit {
				params.insert(idx, *p);
			}
			id_to_idx.insert(node.id.as_str(), idx);
		}

		let mut links = Vec::new();
		for link in &visible.links {
			match (
				id_to_idx.get(link.source.as_str()),
				id_to_idx.get(link.target.as_str()),
			) {
				(Some(&src), Some(&tgt)) => {
					graph.add_edge(src, tgt, EdgeData::default());
					links.push((src, tgt));
				}
				_ => {
					// Sanitization upstream should have caught this; keep
					// the view alive regardless.
					warn!(
						"neural-graph: link {} -> {} references a missing node",
						link.source, link.target
					);
				}
			}
		}

		self.graph = graph;
		self.impulses.reset(links.len());
		self.links = links;
		self.engine.install(hub, params);
		// Keep the viewport wherever it is; a stale camera target would ease
		// the view away from it on the next tick.
		self.camera_target = self.transform;
		if visible.nodes.is_empty() {
			// Nothing to animate; the loop stays parked until data returns.
			self.engine.stop();
		} else {
			self.engine.start(now_ms);
		}
		self.drag = DragState::default();
		self.hover = HoverState::default();
		self.focused = None;
		self.last_tick_ms = None;
	}

	/// Stable link list; the index of each pair is the link's identity for
	/// impulses.
	pub fn links(&self) -> &[(DefaultNodeIdx, DefaultNodeIdx)] {
		&self.links
	}

	/// Advance animation state for this frame. Returns whether anything
	/// changed that warrants a redraw.
	pub fn tick(&mut self, now_ms: f64) -> bool {
		let dt = match self.last_tick_ms {
			Some(last) => ((now_ms - last) / 1000.0).clamp(0.0, 0.1),
			None => 0.0,
		};
		self.last_tick_ms = Some(now_ms);
		self.flow_time += dt;

		let moved = self.engine.tick(now_ms, &mut self.graph);

		self.impulses.update(dt);

		// Ease the hover ring towards its target.
		let ring_target = if self.hover.node.is_some() { 1.0 } else { 0.0 };
		let ring_before = self.hover.ring;
		if dt > 0.0 {
			let ease = 1.0 - (-8.0 * dt).exp();
			self.hover.ring += (ring_target - self.hover.ring) * ease;
		}
		let ring_animating = (self.hover.ring - ring_before).abs() > 1e-4;

		// The camera must keep approaching its target even while nodes move.
		let camera_moving = self.approach_camera(dt);

		moved || self.impulses.is_active() || ring_animating || camera_moving
	}

	/// Exponentially approach the camera target; returns whether the camera
	/// is still moving.
	fn approach_camera(&mut self, dt: f64) -> bool {
		let t = &mut self.transform;
		let target = self.camera_target;
		let (dx, dy, dk) = (target.x - t.x, target.y - t.y, target.k - t.k);
		if dx.abs() < 0.5 && dy.abs() < 0.5 && dk.abs() < 0.002 {
			return false;
		}
		if dt > 0.0 {
			let ease = 1.0 - (-5.0 * dt).exp();
			t.x += dx * ease;
			t.y += dy * ease;
			t.k += dk * ease;
		}
		true
	}

	/// Start a canvas pan gesture at a screen position.
	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	/// Follow the pointer during an active pan. The camera target moves with
	/// the transform so the smoothing never fights the gesture.
	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if !self.pan.active {
			return;
		}
		self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
		self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		self.camera_target = self.transform;
	}

	/// Zoom by `factor` about a screen point, keeping that point stationary
	/// under the pointer.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
		self.camera_target = self.transform;
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Hit-test a screen position against node bodies.
	pub fn node_at_position(
		&self,
		sx: f64,
		sy: f64,
		config: &ScaleConfig,
	) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let scale = ScaledValues::new(config, self.transform.k);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			let hit = scale.hit_radius * relevance_size(node.data.user_data.relevance);
			if (dx * dx + dy * dy).sqrt() < hit {
				found = Some(node.index());
			}
		});
		found
	}

	/// Last-writer-wins hover update; the ring eases towards the new target
	/// on subsequent ticks.
	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		self.hover.node = node;
	}

	/// Domain record of the currently hovered node, for the tooltip.
	pub fn hovered_node(&self) -> Option<GraphNode> {
		self.node_record(self.hover.node?)
	}

	pub fn node_record(&self, idx: DefaultNodeIdx) -> Option<GraphNode> {
		let mut out = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				out = Some(node.data.user_data.clone());
			}
		});
		out
	}

	fn node_position(&self, idx: DefaultNodeIdx) -> Option<(f64, f64)> {
		let mut out = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				out = Some((node.x() as f64, node.y() as f64));
			}
		});
		out
	}

	/// Tooltip anchor for a pointer position, clamped so the tooltip never
	/// renders off-screen or inside the header band.
	pub fn tooltip_anchor(&self, sx: f64, sy: f64) -> (f64, f64) {
		let (w, h) = TOOLTIP_SIZE;
		let x = (sx + TOOLTIP_OFFSET).clamp(TOOLTIP_MARGIN, (self.width - w - TOOLTIP_MARGIN).max(TOOLTIP_MARGIN));
		let y = (sy + TOOLTIP_OFFSET).clamp(
			HEADER_EXCLUSION_PX,
			(self.height - h - TOOLTIP_MARGIN).max(HEADER_EXCLUSION_PX),
		);
		(x, y)
	}

	/// Re-center and zoom the camera onto a node.
	pub fn focus_on(&mut self, idx: DefaultNodeIdx) {
		let Some((x, y)) = self.node_position(idx) else {
			return;
		};
		self.focused = Some(idx);
		let k = 1.8;
		self.camera_target = ViewTransform {
			x: self.width / 2.0 - x * k,
			y: self.height / 2.0 - y * k,
			k,
		};
	}

	/// Zoom back out to fit every visible node and clear focus state.
	pub fn reset_focus(&mut self) {
		self.focused = None;
		let mut min = (f64::INFINITY, f64::INFINITY);
		let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		let mut any = false;
		self.graph.visit_nodes(|node| {
			any = true;
			min.0 = min.0.min(node.x() as f64);
			min.1 = min.1.min(node.y() as f64);
			max.0 = max.0.max(node.x() as f64);
			max.1 = max.1.max(node.y() as f64);
		});
		if !any {
			self.camera_target = ViewTransform {
				x: self.width / 2.0,
				y: self.height / 2.0,
				k: 1.0,
			};
			return;
		}

		let pad = 120.0;
		let (bw, bh) = (max.0 - min.0 + pad, max.1 - min.1 + pad);
		let k = (self.width / bw).min(self.height / bh).clamp(0.2, 1.0);
		let (cx, cy) = ((min.0 + max.0) / 2.0, (min.1 + max.1) / 2.0);
		self.camera_target = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	/// Begin dragging a node. The hub is never draggable; starting a drag
	/// on it is refused so the caller falls back to panning.
	pub fn begin_drag(&mut self, idx: DefaultNodeIdx, sx: f64, sy: f64) -> bool {
		let is_hub = self
			.node_record(idx)
			.map(|n| n.is_hub())
			.unwrap_or(false);
		if is_hub {
			return false;
		}

		self.drag = DragState {
			active: true,
			node_idx: Some(idx),
			start_x: sx,
			start_y: sy,
			node_start_x: 0.0,
			node_start_y: 0.0,
			moved: false,
		};
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				self.drag.node_start_x = node.x();
				self.drag.node_start_y = node.y();
			}
		});
		self.engine.grab(idx);
		true
	}

	/// Move the dragged node to follow the pointer.
	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		if !self.drag.active {
			return;
		}
		let Some(idx) = self.drag.node_idx else {
			return;
		};
		let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
		if dx.hypot(dy) > DRAG_THRESHOLD_PX {
			self.drag.moved = true;
		}
		let (nx, ny) = (
			self.drag.node_start_x + (dx / self.transform.k) as f32,
			self.drag.node_start_y + (dy / self.transform.k) as f32,
		);
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = nx;
				node.data.y = ny;
			}
		});
	}

	/// Finish a drag gesture. Returns the node and whether it actually
	/// moved (`false` means the gesture was a click). On a real drag the
	/// node's orbit is re-derived from the drop position.
	pub fn end_drag(&mut self, now_ms: f64) -> Option<(DefaultNodeIdx, bool)> {
		if !self.drag.active {
			return None;
		}
		let idx = self.drag.node_idx?;
		let moved = self.drag.moved;
		self.drag = DragState::default();

		if moved {
			if let Some((x, y)) = self.node_position(idx) {
				self.engine.release_at(idx, x, y, now_ms);
			}
		} else {
			self.engine.release(idx);
		}
		Some((idx, moved))
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

fn empty_store() -> ForceGraph<GraphNode, ()> {
	// Parameters are irrelevant while every node is anchored and update()
	// is never called; these are the store's construction defaults.
	ForceGraph::new(SimulationParameters {
		force_charge: 150.0,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	})
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

	fn star() -> GraphData {
		GraphData {
			nodes: vec![
				node("h", NodeKind::Hub),
				node("c1", NodeKind::Cluster),
				node("c2", NodeKind::Cluster),
			],
			links: vec![
				GraphLink {
					source: "h".to_string(),
					target: "c1".to_string(),
				},
				GraphLink {
					source: "h".to_string(),
					target: "c2".to_string(),
				},
			],
		}
	}

	#[test]
	fn hub_sits_at_screen_center_initially() {
		let state = NeuralGraphState::new(&star(), 800.0, 600.0, 0.0);
		let config = ScaleConfig::default();
		let hit = state.node_at_position(400.0, 300.0, &config);
		let record = hit.and_then(|idx| state.node_record(idx)).unwrap();
		assert!(record.is_hub());
	}

	#[test]
	fn empty_space_hits_nothing() {
		let state = NeuralGraphState::new(&star(), 800.0, 600.0, 0.0);
		let config = ScaleConfig::default();
		// Far corner, outside every ring at k=1.
		assert!(state.node_at_position(5.0, 5.0, &config).is_none());
	}

	#[test]
	fn hub_refuses_to_be_dragged() {
		let mut state = NeuralGraphState::new(&star(), 800.0, 600.0, 0.0);
		let config = ScaleConfig::default();
		let hub = state.node_at_position(400.0, 300.0, &config).unwrap();
		assert!(!state.begin_drag(hub, 400.0, 300.0));
		assert!(!state.drag.active);
	}

	#[test]
	fn short_press_counts_as_click_not_drag() {
		let mut state = NeuralGraphState::new(&star(), 800.0, 600.0, 0.0);
		let config = ScaleConfig::default();
		let mut cluster = None;
		state.graph.visit_nodes(|n| {
			if !n.data.user_data.is_hub() {
				cluster = Some((n.index(), n.x() as f64, n.y() as f64));
			}
		});
		let (idx, gx, gy) = cluster.unwrap();
		let (sx, sy) = (gx + state.transform.x, gy + state.transform.y);

		assert!(state.node_at_position(sx, sy, &config).is_some());
		assert!(state.begin_drag(idx, sx, sy));
		state.drag_to(sx + 1.0, sy + 1.0);
		let (ended, moved) = state.end_drag(50.0).unwrap();
		assert_eq!(ended, idx);
		assert!(!moved);
	}

	#[test]
	fn drag_end_rederives_orbit_from_drop_position() {
		let mut state = NeuralGraphState::new(&star(), 800.0, 600.0, 0.0);
		let mut cluster = None;
		state.graph.visit_nodes(|n| {
			if !n.data.user_data.is_hub() {
				cluster = Some((n.index(), n.x() as f64, n.y() as f64));
			}
		});
		let (idx, gx, gy) = cluster.unwrap();
		let (sx, sy) = (gx + state.transform.x, gy + state.transform.y);

		assert!(state.begin_drag(idx, sx, sy));
		// Drop the node at graph position (150, -50).
		let (tx, ty) = (150.0 + state.transform.x, -50.0 + state.transform.y);
		state.drag_to(tx, ty);
		let (_, moved) = state.end_drag(100.0).unwrap();
		assert!(moved);

		let p = state.engine.params(idx).unwrap();
		assert!((p.radius - 158.11).abs() < 0.1, "radius {}", p.radius);
		let angle = state.engine.angle_at(idx, 100.0).unwrap();
		assert!(((-50.0f64).atan2(150.0) - angle).abs() < 1e-6);
	}

	#[test]
	fn rebuild_preserves_the_camera() {
		let mut state = NeuralGraphState::new(&star(), 800.0, 600.0, 0.0);
		state.transform.k = 2.5;
		state.transform.x = 123.0;
		state.rebuild(&star(), 1000.0);
		assert_eq!(state.transform.k, 2.5);
		assert_eq!(state.transform.x, 123.0);
	}

	#[test]
	fn manual_pan_and_zoom_survive_camera_smoothing() {
		let mut state = NeuralGraphState::new(&star(), 800.0, 600.0, 0.0);
		state.tick(20.0);

		state.zoom_at(400.0, 300.0, 1.5);
		state.begin_pan(100.0, 100.0);
		state.pan_to(160.0, 80.0);
		let after_gesture = state.transform;

		// Later ticks must not ease the viewport back to where it was.
		for i in 1..100 {
			state.tick(20.0 + i as f64 * 16.0);
		}
		assert_eq!(state.transform.k, after_gesture.k);
		assert_eq!(state.transform.x, after_gesture.x);
		assert_eq!(state.transform.y, after_gesture.y);
	}

	#[test]
	fn zoom_keeps_the_anchor_point_fixed() {
		let mut state = NeuralGraphState::new(&star(), 800.0, 600.0, 0.0);
		let before = state.screen_to_graph(250.0, 420.0);
		state.zoom_at(250.0, 420.0, 1.4);
		let after = state.screen_to_graph(250.0, 420.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
	}

	#[test]
	fn tooltip_anchor_stays_inside_the_viewport() {
		let state = NeuralGraphState::new(&star(), 800.0, 600.0, 0.0);

		// Deep in the viewport: follows the pointer with an offset.
		assert_eq!(state.tooltip_anchor(100.0, 200.0), (114.0, 214.0));

		// Near the right/bottom edges: clamped fully on-screen.
		let (x, y) = state.tooltip_anchor(795.0, 595.0);
		assert!(x + 240.0 <= 800.0);
		assert!(y + 110.0 <= 600.0);

		// Header band at the top is reserved.
		let (_, y) = state.tooltip_anchor(400.0, 0.0);
		assert!(y >= HEADER_EXCLUSION_PX);
	}

	#[test]
	fn focus_targets_the_node_and_reset_fits_all() {
		let mut state = NeuralGraphState::new(&star(), 800.0, 600.0, 0.0);
		let mut cluster = None;
		state.graph.visit_nodes(|n| {
			if !n.data.user_data.is_hub() {
				cluster = Some(n.index());
			}
		});
		state.focus_on(cluster.unwrap());
		assert_eq!(state.focused, cluster);
		assert!(state.camera_target.k > 1.0);

		state.reset_focus();
		assert!(state.focused.is_none());
		assert!(state.camera_target.k <= 1.0);
	}

	#[test]
	fn tick_reports_motion_and_stop_silences_it() {
		let mut state = NeuralGraphState::new(&star(), 800.0, 600.0, 0.0);
		assert!(state.tick(20.0));

		state.engine.stop();
		// Drain impulses, the hover ring and the camera so only orbital
		// motion could report.
		state.impulses.reset(0);
		for i in 0..200 {
			state.tick(40.0 + i as f64 * 20.0);
		}
		assert!(!state.tick(4100.0));
	}
}

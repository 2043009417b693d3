//! Time-driven orbital position engine.
//!
//! Once started, the engine is ticked by the host's frame scheduler and
//! rewrites every orbiting node's position from elapsed time and its orbit
//! parameters. The underlying force-graph store never runs its own
//! simulation here: all nodes are anchored and this engine is the only
//! writer of positions outside of an active drag.

use std::collections::HashMap;

use force_graph::{DefaultNodeIdx, ForceGraph};
use log::warn;

use super::types::GraphNode;

/// Target update budget. Frames arriving faster than this are skipped
/// without recomputation to bound CPU use.
pub const FRAME_BUDGET_MS: f64 = 16.0;

/// Hub drift beyond this is snapped back to the origin.
const SNAP_EPSILON: f32 = 1e-3;

/// Per-node orbital motion parameters, assigned by the constellation layout
/// and re-derived when a node is dropped after a drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitParams {
	/// Distance from the origin.
	pub radius: f64,
	/// Angle at `elapsed == 0`, radians.
	pub base_angle: f64,
	/// Radians per second.
	pub angular_speed: f64,
	/// Phase offset for independent pulsing, radians.
	pub pulse_phase: f64,
}

/// Continuous orbital position updater.
///
/// The engine never reads a clock: `now_ms` always flows in from the host,
/// which keeps every timing path exercisable from plain unit tests.
pub struct OrbitEngine {
	params: HashMap<DefaultNodeIdx, OrbitParams>,
	hub: Option<DefaultNodeIdx>,
	held: Option<DefaultNodeIdx>,
	start_ms: f64,
	last_update_ms: f64,
	running: bool,
}

impl OrbitEngine {
	pub fn new() -> Self {
		Self {
			params: HashMap::new(),
			hub: None,
			held: None,
			start_ms: 0.0,
			last_update_ms: f64::NEG_INFINITY,
			running: false,
		}
	}

	/// Install the orbit parameter set produced by the layout initializer.
	/// Must complete before the next tick reads parameters for newly visible
	/// nodes.
	pub fn install(
		&mut self,
		hub: Option<DefaultNodeIdx>,
		params: HashMap<DefaultNodeIdx, OrbitParams>,
	) {
		self.hub = hub;
		self.params = params;
		self.held = None;
	}

	/// Begin the loop. Re-entrant restarts fully reset timing state rather
	/// than resuming from stale `start`/`last update` values.
	pub fn start(&mut self, now_ms: f64) {
		self.start_ms = now_ms;
		self.last_update_ms = f64::NEG_INFINITY;
		self.running = true;
	}

	/// Stop synchronously. No position mutation happens after this returns
	/// until `start` is called again.
	pub fn stop(&mut self) {
		self.running = false;
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn params(&self, idx: DefaultNodeIdx) -> Option<&OrbitParams> {
		self.params.get(&idx)
	}

	/// Pulse phase for a node; the hub pulses from phase zero.
	pub fn pulse_phase(&self, idx: DefaultNodeIdx) -> f64 {
		self.params.get(&idx).map(|p| p.pulse_phase).unwrap_or(0.0)
	}

	fn elapsed_s(&self, now_ms: f64) -> f64 {
		(now_ms - self.start_ms) / 1000.0
	}

	/// Current orbital angle of a node, radians.
	pub fn angle_at(&self, idx: DefaultNodeIdx, now_ms: f64) -> Option<f64> {
		let p = self.params.get(&idx)?;
		Some(p.base_angle + self.elapsed_s(now_ms) * p.angular_speed)
	}

	/// Suspend position updates for a node while the user drags it.
	pub fn grab(&mut self, idx: DefaultNodeIdx) {
		if Some(idx) != self.hub {
			self.held = Some(idx);
		}
	}

	/// Let go of a held node without touching its orbit, so it resumes its
	/// previous ring. Used when a press turns out to be a click.
	pub fn release(&mut self, idx: DefaultNodeIdx) {
		if self.held == Some(idx) {
			self.held = None;
		}
	}

	/// Drop a dragged node at world position `(x, y)`: its orbit radius and
	/// angle are re-derived from the drop point so it resumes orbiting from
	/// there instead of snapping back to its previous ring.
	pub fn release_at(&mut self, idx: DefaultNodeIdx, x: f64, y: f64, now_ms: f64) {
		if self.held == Some(idx) {
			self.held = None;
		}
		let elapsed = self.elapsed_s(now_ms);
		if let Some(p) = self.params.get_mut(&idx) {
			p.radius = x.hypot(y);
			p.base_angle = y.atan2(x) - elapsed * p.angular_speed;
		}
	}

	/// Advance every orbiting node to its position for `now_ms`.
	///
	/// Returns whether any position changed, so the caller can skip a redraw
	/// when the scene is static. Frames inside the budget window are skipped
	/// entirely.
	pub fn tick(&mut self, now_ms: f64, graph: &mut ForceGraph<GraphNode, ()>) -> bool {
		if !self.running {
			return false;
		}
		if now_ms - self.last_update_ms < FRAME_BUDGET_MS {
			return false;
		}
		self.last_update_ms = now_ms;

		let elapsed = self.elapsed_s(now_ms);
		let mut moved = false;

		graph.visit_nodes_mut(|node| {
			let idx = node.index();

			if Some(idx) == self.hub {
				// The hub is pinned at the origin for its whole lifetime.
				if node.data.x.abs() > SNAP_EPSILON || node.data.y.abs() > SNAP_EPSILON {
					node.data.x = 0.0;
					node.data.y = 0.0;
					moved = true;
				}
				return;
			}
			if Some(idx) == self.held {
				return;
			}

			let Some(p) = self.params.get(&idx) else {
				// One bad node must not freeze the whole visualization.
				warn!("neural-graph: node {idx:?} has no orbit parameters, skipping");
				return;
			};

			let (x, y) = orbit_position(p, elapsed, node.data.user_data.relevance);
			if (x - node.data.x as f64).abs() > 1e-9 || (y - node.data.y as f64).abs() > 1e-9 {
				node.data.x = x as f32;
				node.data.y = y as f32;
				moved = true;
			}
		});

		moved
	}
}

impl Default for OrbitEngine {
	fn default() -> Self {
		Self::new()
	}
}

/// Position of an orbiting node at `elapsed` seconds.
///
/// Two independent sinusoids perturb the circular path; their frequency and
/// amplitude grow with relevance so important nodes read as more alive. The
/// result is a continuous function of elapsed time for fixed parameters.
pub fn orbit_position(p: &OrbitParams, elapsed: f64, relevance: u8) -> (f64, f64) {
	let angle = p.base_angle + elapsed * p.angular_speed;
	let r = relevance.clamp(1, 10) as f64;
	let amp = 2.0 + r * 0.8;
	let freq = 0.5 + r * 0.12;
	let wobble_x = amp * (elapsed * freq + p.pulse_phase).sin();
	let wobble_y = amp * (elapsed * freq * 1.31 + p.pulse_phase * 0.7).cos();
	(
		angle.cos() * p.radius + wobble_x,
		angle.sin() * p.radius + wobble_y,
	)
}

//! Zoom-dependent scaling configuration for graph visuals.
//!
//! Centralizes how visual parameters respond to the current zoom level `k`.
//!
//! - **World-space** values scale with zoom (appear larger when zoomed in).
//! - **Screen-space** values stay a constant pixel size; they divide by `k`
//!   to counteract the canvas transform.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// Compute the world-space value for a given base value and zoom level.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => {
				// screen_size = world_size * k, so bounds divide by k
				let min_world = min_screen / k;
				let max_world = max_screen / k;
				base.clamp(min_world, max_world)
			}
		}
	}
}

/// Configuration for node visual scaling.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// Base node radius in world units, before the relevance size factor.
	pub radius: f64,
	/// How the node radius scales with zoom.
	pub radius_behavior: ScaleBehavior,
	/// Hit detection radius in world units.
	pub hit_radius: f64,
	/// How hit radius scales with zoom.
	pub hit_behavior: ScaleBehavior,
	/// Label font size in screen pixels.
	pub label_size: f64,
	/// Minimum zoom level for label font scaling.
	pub label_min_k: f64,
	/// Zoom level above which non-hub labels become legible and are drawn.
	pub label_show_k: f64,
}

/// Configuration for edge visual scaling.
#[derive(Clone, Debug)]
pub struct EdgeScaleConfig {
	/// Base line width in screen pixels.
	pub line_width: f64,
	/// Impulse dot radius in screen pixels.
	pub impulse_radius: f64,
}

/// Configuration for focus/hover ring effects.
#[derive(Clone, Debug)]
pub struct RingScaleConfig {
	/// Stroke width for rings in screen pixels.
	pub width: f64,
	/// Ring offset from node edge in screen pixels.
	pub offset: f64,
}

/// Complete scale configuration for all graph elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub node: NodeScaleConfig,
	pub edge: EdgeScaleConfig,
	pub ring: RingScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				radius: 9.0,
				radius_behavior: ScaleBehavior::Clamped {
					min_screen: 4.0,
					max_screen: f64::INFINITY,
				},
				hit_radius: 14.0,
				hit_behavior: ScaleBehavior::Clamped {
					min_screen: 6.0,
					max_screen: f64::INFINITY,
				},
				label_size: 11.0,
				label_min_k: 0.5,
				label_show_k: 0.8,
			},
			edge: EdgeScaleConfig {
				line_width: 1.2,
				impulse_radius: 2.2,
			},
			ring: RingScaleConfig {
				width: 1.5,
				offset: 3.0,
			},
		}
	}
}

/// Size multiplier for a node's relevance score.
///
/// Relevance 1 is noticeably smaller than relevance 10 but never vanishes.
pub fn relevance_size(relevance: u8) -> f64 {
	0.55 + 0.09 * relevance.clamp(1, 10) as f64
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create this once per frame and pass it to rendering functions. All sizes
/// are in world-space, ready to use after the canvas transform.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Current zoom level.
	pub k: f64,
	/// Base node radius in world-space (multiply by [`relevance_size`]).
	pub node_radius: f64,
	/// Hit detection radius in world-space.
	pub hit_radius: f64,
	/// Label font string (e.g., "11px sans-serif").
	pub label_font: String,
	/// Whether non-hub, non-focused labels are legible at this zoom.
	pub show_labels: bool,
	/// Edge line width in world-space.
	pub edge_line_width: f64,
	/// Impulse dot radius in world-space.
	pub impulse_radius: f64,
	/// Ring width in world-space.
	pub ring_width: f64,
	/// Ring offset in world-space.
	pub ring_offset: f64,
}

impl ScaledValues {
	/// Compute scaled values from configuration and current zoom level.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let label_font_size = config.node.label_size / k.max(config.node.label_min_k);
		Self {
			k,
			node_radius: config.node.radius_behavior.apply(config.node.radius, k),
			hit_radius: config.node.hit_behavior.apply(config.node.hit_radius, k),
			label_font: format!("{label_font_size}px sans-serif"),
			show_labels: k >= config.node.label_show_k,
			edge_line_width: config.edge.line_width / k,
			impulse_radius: config.edge.impulse_radius / k,
			ring_width: config.ring.width / k,
			ring_offset: config.ring.offset / k,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn screen_behavior_counteracts_zoom() {
		let b = ScaleBehavior::Screen;
		assert!((b.apply(10.0, 2.0) - 5.0).abs() < 1e-9);
		assert!((b.apply(10.0, 0.5) - 20.0).abs() < 1e-9);
	}

	#[test]
	fn clamped_behavior_bounds_screen_size() {
		let b = ScaleBehavior::Clamped {
			min_screen: 4.0,
			max_screen: 16.0,
		};
		// Zoomed way out, 8 world units would be 0.8px on screen; clamp up.
		assert!((b.apply(8.0, 0.1) - 40.0).abs() < 1e-9);
		// Zoomed way in, clamp down to 16px on screen.
		assert!((b.apply(8.0, 4.0) - 4.0).abs() < 1e-9);
	}

	#[test]
	fn relevance_size_is_monotonic_and_bounded() {
		let mut prev = 0.0;
		for r in 1..=10u8 {
			let s = relevance_size(r);
			assert!(s > prev);
			prev = s;
		}
		assert!(relevance_size(1) > 0.5);
		assert!(relevance_size(10) < 1.6);
		// Out-of-range input clamps rather than exploding.
		assert_eq!(relevance_size(200), relevance_size(10));
	}

	#[test]
	fn labels_gate_on_zoom_threshold() {
		let config = ScaleConfig::default();
		assert!(!ScaledValues::new(&config, 0.4).show_labels);
		assert!(ScaledValues::new(&config, 1.2).show_labels);
	}
}

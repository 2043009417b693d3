//! Visual theming for the neural graph.
//!
//! Node color is semantic: every [`NodeKind`] maps to a fixed color, with a
//! neutral gray for anything unrecognized. The rest of the theme covers
//! background, edge and node styling knobs consumed by the painter.

use super::types::NodeKind;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	/// Linear interpolation between two colors
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * (1.0 - t) + other.r as f64 * t) as u8,
			g: (self.g as f64 * (1.0 - t) + other.g as f64 * t) as u8,
			b: (self.b as f64 * (1.0 - t) + other.b as f64 * t) as u8,
			a: self.a * (1.0 - t) + other.a * t,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Fixed display color for a node kind.
///
/// Total over all inputs: unrecognized kinds get a neutral gray rather than
/// failing.
pub fn kind_color(kind: NodeKind) -> Color {
	match kind {
		NodeKind::Hub => Color::rgb(235, 195, 90),      // gold
		NodeKind::Cluster => Color::rgb(160, 110, 225), // violet
		NodeKind::Project => Color::rgb(85, 145, 230),  // blue
		NodeKind::Habit => Color::rgb(95, 190, 125),    // green
		NodeKind::Favorite => Color::rgb(240, 170, 70), // amber
		NodeKind::Thought => Color::rgb(225, 125, 170), // pink
		NodeKind::Unknown => Color::rgb(150, 150, 158), // neutral gray
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Secondary color for gradients
	pub color_secondary: Color,
	/// Whether to use radial gradient
	pub use_gradient: bool,
	/// Vignette intensity (0.0 = none, 1.0 = strong)
	pub vignette: f64,
}

/// Edge visual style.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Base opacity of link strokes.
	pub alpha: f64,
	/// Impulse dot color.
	pub impulse_color: Color,
	/// Number of trailing fade dots behind each impulse.
	pub impulse_trail: usize,
}

/// Node visual style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Base pulse amplitude at relevance 1; scales up with relevance.
	pub pulse_intensity: f64,
	/// Pulse frequency in radians per second at relevance 1.
	pub pulse_speed: f64,
	/// Extra pulse amplitude for the hub's solar pulse.
	pub hub_pulse_intensity: f64,
	/// Opacity floor for the least relevant nodes.
	pub min_alpha: f64,
	/// Glow strength multiplier for the two halo layers.
	pub glow_intensity: f64,
	/// Corona ring radius, as a multiple of the hub's body radius.
	pub hub_corona: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: BackgroundStyle,
	pub edge: EdgeStyle,
	pub node: NodeStyle,
}

impl Theme {
	/// Deep night-sky theme (default).
	pub fn night() -> Self {
		Self {
			name: "night",
			background: BackgroundStyle {
				color: Color::rgb(16, 18, 30),
				color_secondary: Color::rgb(26, 28, 44),
				use_gradient: true,
				vignette: 0.2,
			},
			edge: EdgeStyle {
				alpha: 0.28,
				impulse_color: Color::rgb(200, 215, 255),
				impulse_trail: 3,
			},
			node: NodeStyle {
				pulse_intensity: 0.05,
				pulse_speed: 1.6,
				hub_pulse_intensity: 0.12,
				min_alpha: 0.4,
				glow_intensity: 0.5,
				hub_corona: 1.55,
			},
		}
	}

	/// Flatter variant with muted glow.
	pub fn midnight() -> Self {
		Self {
			name: "midnight",
			background: BackgroundStyle {
				color: Color::rgb(18, 20, 28),
				color_secondary: Color::rgb(18, 20, 28),
				use_gradient: false,
				vignette: 0.0,
			},
			edge: EdgeStyle {
				alpha: 0.22,
				impulse_color: Color::rgb(180, 195, 235),
				impulse_trail: 2,
			},
			node: NodeStyle {
				pulse_intensity: 0.035,
				pulse_speed: 1.3,
				hub_pulse_intensity: 0.08,
				min_alpha: 0.45,
				glow_intensity: 0.3,
				hub_corona: 1.4,
			},
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::night()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn kind_color_is_total() {
		// Every kind, including the fallback, yields an opaque color.
		for kind in [
			NodeKind::Hub,
			NodeKind::Cluster,
			NodeKind::Project,
			NodeKind::Habit,
			NodeKind::Favorite,
			NodeKind::Thought,
			NodeKind::Unknown,
		] {
			let c = kind_color(kind);
			assert!((c.a - 1.0).abs() < f64::EPSILON, "{kind:?} not opaque");
		}
		assert_ne!(kind_color(NodeKind::Hub), kind_color(NodeKind::Unknown));
	}

	#[test]
	fn css_emit() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(Color::rgba(1, 2, 3, 0.5).to_css(), "rgba(1, 2, 3, 0.5)");
	}

	#[test]
	fn lerp_endpoints() {
		let a = Color::rgb(0, 0, 0);
		let b = Color::rgb(200, 100, 50);
		assert_eq!(a.lerp(b, 0.0), a);
		assert_eq!(a.lerp(b, 1.0), b);
		let mid = a.lerp(b, 0.5);
		assert_eq!(mid.r, 100);
	}
}

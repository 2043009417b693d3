//! Canvas rendering for the neural graph.
//!
//! Rendering uses multiple passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Link lines, then traveling impulses (world space)
//! 3. Node glows, node bodies with labels, hub corona on top
//!
//! The painter is read-only with respect to graph topology and layout state;
//! everything time-dependent is derived from `state.flow_time` and the
//! impulse phases advanced by the state's own tick.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use web_sys::CanvasRenderingContext2d;

use super::scale::{ScaleConfig, ScaledValues, relevance_size};
use super::state::NeuralGraphState;
use super::theme::{Color, Theme, kind_color};
use super::types::{GraphNode, NodeKind};

/// Renders the complete graph to the canvas.
pub fn render(
	state: &NeuralGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	let positions = node_positions(state);
	draw_links(state, ctx, &scale, theme, &positions);
	draw_impulses(state, ctx, &scale, theme, &positions);
	draw_nodes(state, ctx, &scale, theme);

	ctx.restore();

	if theme.background.vignette > 0.0 {
		draw_vignette(state, ctx, theme);
	}
}

/// Position and kind of every node, for link endpoint resolution.
///
/// Links stay id/index-based in the store; resolving them to coordinates is
/// purely a rendering-time convenience.
fn node_positions(state: &NeuralGraphState) -> HashMap<DefaultNodeIdx, (f64, f64, NodeKind)> {
	let mut out = HashMap::new();
	state.graph.visit_nodes(|node| {
		out.insert(
			node.index(),
			(node.x() as f64, node.y() as f64, node.data.user_data.kind),
		);
	});
	out
}

fn draw_background(state: &NeuralGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	if theme.background.use_gradient {
		let gradient = ctx
			.create_radial_gradient(
				state.width / 2.0,
				state.height / 2.0,
				0.0,
				state.width / 2.0,
				state.height / 2.0,
				(state.width.max(state.height)) * 0.8,
			)
			.unwrap();

		gradient
			.add_color_stop(0.0, &theme.background.color_secondary.to_css())
			.unwrap();
		gradient
			.add_color_stop(1.0, &theme.background.color.to_css())
			.unwrap();

		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
	} else {
		ctx.set_fill_style_str(&theme.background.color.to_css());
	}

	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_vignette(state: &NeuralGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let gradient = ctx
		.create_radial_gradient(
			state.width / 2.0,
			state.height / 2.0,
			state.width.min(state.height) * 0.3,
			state.width / 2.0,
			state.height / 2.0,
			state.width.max(state.height) * 0.7,
		)
		.unwrap();

	gradient.add_color_stop(0.0, "rgba(0, 0, 0, 0)").unwrap();
	gradient
		.add_color_stop(
			1.0,
			&format!("rgba(0, 0, 0, {})", theme.background.vignette),
		)
		.unwrap();

	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_links(
	state: &NeuralGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	positions: &HashMap<DefaultNodeIdx, (f64, f64, NodeKind)>,
) {
	ctx.set_line_width(scale.edge_line_width);

	for &(src, tgt) in state.links() {
		let (Some(&(x1, y1, k1)), Some(&(x2, y2, k2))) = (positions.get(&src), positions.get(&tgt))
		else {
			continue;
		};
		let dist = (x2 - x1).hypot(y2 - y1);
		if dist < 0.001 {
			continue;
		}

		// Faint line whose color slides from the source kind to the target
		// kind along its length.
		let gradient = ctx.create_linear_gradient(x1, y1, x2, y2);
		let c1 = kind_color(k1).with_alpha(theme.edge.alpha);
		let c2 = kind_color(k2).with_alpha(theme.edge.alpha);
		gradient.add_color_stop(0.0, &c1.to_css()).unwrap();
		gradient.add_color_stop(1.0, &c2.to_css()).unwrap();

		#[allow(deprecated)]
		ctx.set_stroke_style(&gradient);
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
	}
}

fn draw_impulses(
	state: &NeuralGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	positions: &HashMap<DefaultNodeIdx, (f64, f64, NodeKind)>,
) {
	let color = theme.edge.impulse_color;
	let links = state.links();

	for impulse in state.impulses.impulses() {
		let Some(&(src, tgt)) = links.get(impulse.link) else {
			continue;
		};
		let (Some(&(x1, y1, _)), Some(&(x2, y2, _))) = (positions.get(&src), positions.get(&tgt))
		else {
			continue;
		};

		// Head dot plus a short trail fading behind it.
		for step in 0..=theme.edge.impulse_trail {
			let progress = impulse.progress - step as f64 * 0.045;
			if progress < 0.0 {
				break;
			}
			let (x, y) = (x1 + (x2 - x1) * progress, y1 + (y2 - y1) * progress);
			let fade = 1.0 - step as f64 / (theme.edge.impulse_trail + 1) as f64;
			let radius = scale.impulse_radius * (1.0 - 0.2 * step as f64);

			ctx.set_fill_style_str(&color.with_alpha(0.85 * fade).to_css());
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius.max(0.1), 0.0, PI * 2.0);
			ctx.fill();
		}
	}
}

/// Current pulse scale for a node. The hub gets the slower, wider "solar"
/// pulse; everything else pulses faster and larger the more relevant it is.
fn pulse_factor(node: &GraphNode, flow_time: f64, phase: f64, theme: &Theme) -> f64 {
	let r = node.relevance.clamp(1, 10) as f64;
	let (amp, freq) = if node.is_hub() {
		(theme.node.hub_pulse_intensity, theme.node.pulse_speed * 0.7)
	} else {
		(
			theme.node.pulse_intensity * (0.5 + r * 0.15),
			theme.node.pulse_speed * (0.6 + r * 0.08),
		)
	};
	1.0 + amp * (flow_time * freq + phase).sin()
}

/// Opacity for a node body. Low-relevance nodes visibly recede but never
/// disappear; the hub is always fully opaque.
fn node_alpha(node: &GraphNode, theme: &Theme) -> f64 {
	if node.is_hub() {
		1.0
	} else {
		let r = node.relevance.clamp(1, 10) as f64;
		theme.node.min_alpha + (1.0 - theme.node.min_alpha) * (r - 1.0) / 9.0
	}
}

fn draw_nodes(
	state: &NeuralGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	// Pass 1: glow halos under every body.
	if theme.node.glow_intensity > 0.0 {
		state.graph.visit_nodes(|node| {
			let data = &node.data.user_data;
			let phase = state.engine.pulse_phase(node.index());
			let radius = scale.node_radius
				* relevance_size(data.relevance)
				* pulse_factor(data, state.flow_time, phase, theme);
			draw_node_glow(
				ctx,
				node.x() as f64,
				node.y() as f64,
				radius,
				kind_color(data.kind),
				theme.node.glow_intensity * node_alpha(data, theme),
				data.is_hub(),
			);
		});
	}

	// Pass 2: bodies, rings and labels.
	state.graph.visit_nodes(|node| {
		let idx = node.index();
		let data = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let phase = state.engine.pulse_phase(idx);
		let radius = scale.node_radius
			* relevance_size(data.relevance)
			* pulse_factor(data, state.flow_time, phase, theme);
		let alpha = node_alpha(data, theme);
		let color = kind_color(data.kind);

		draw_node_body(ctx, x, y, radius, color, alpha, data.is_hub());

		if data.is_hub() {
			draw_hub_corona(ctx, x, y, radius, color, theme);
		}

		if state.hover.node == Some(idx) && state.hover.ring > 0.01 {
			let ring_alpha = 0.8 * state.hover.ring;
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + scale.ring_offset, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {ring_alpha})"));
			ctx.set_line_width(scale.ring_width);
			ctx.stroke();
		}

		// Labels only where they stay legible: the hub always, others when
		// zoomed in enough or explicitly focused.
		let labeled = data.is_hub() || scale.show_labels || state.focused == Some(idx);
		if labeled {
			ctx.set_global_alpha(alpha);
			ctx.set_fill_style_str("rgba(255, 255, 255, 0.9)");
			ctx.set_font(&scale.label_font);
			let _ = ctx.fill_text(&data.label, x + radius + 5.0, y + 3.0);
			ctx.set_global_alpha(1.0);
		}
	});
}

fn draw_node_glow(
	ctx: &CanvasRenderingContext2d,
	x: f64,
	y: f64,
	radius: f64,
	color: Color,
	intensity: f64,
	is_hub: bool,
) {
	if intensity < 0.01 {
		return;
	}

	// Two concentric halo layers: a wide faint one and a tighter brighter
	// one, so the falloff reads as light rather than a disc.
	let layers = if is_hub {
		[(3.6, 0.45), (2.0, 0.8)]
	} else {
		[(3.0, 0.3), (1.7, 0.55)]
	};

	for (reach, strength) in layers {
		let glow_radius = radius * reach;
		let alpha = intensity * strength * 0.4;
		let gradient = ctx
			.create_radial_gradient(x, y, radius * 0.4, x, y, glow_radius)
			.unwrap();
		gradient
			.add_color_stop(0.0, &color.with_alpha(alpha).to_css())
			.unwrap();
		gradient
			.add_color_stop(0.5, &color.with_alpha(alpha * 0.45).to_css())
			.unwrap();
		gradient.add_color_stop(1.0, "rgba(0, 0, 0, 0)").unwrap();

		ctx.begin_path();
		let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
		ctx.fill();
	}
}

fn draw_node_body(
	ctx: &CanvasRenderingContext2d,
	x: f64,
	y: f64,
	radius: f64,
	color: Color,
	alpha: f64,
	is_hub: bool,
) {
	ctx.set_global_alpha(alpha);

	let gradient = ctx
		.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius)
		.unwrap();

	let core = if is_hub {
		color.lighten(0.7)
	} else {
		color.lighten(0.4)
	};
	gradient.add_color_stop(0.0, &core.to_css()).unwrap();
	gradient.add_color_stop(0.7, &color.to_css()).unwrap();
	gradient
		.add_color_stop(1.0, &color.darken(0.25).to_css())
		.unwrap();

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();

	ctx.set_global_alpha(1.0);
}

fn draw_hub_corona(
	ctx: &CanvasRenderingContext2d,
	x: f64,
	y: f64,
	radius: f64,
	color: Color,
	theme: &Theme,
) {
	let corona = radius * theme.node.hub_corona;

	ctx.begin_path();
	let _ = ctx.arc(x, y, corona, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str(&color.with_alpha(0.35).to_css());
	ctx.set_line_width((corona - radius) * 0.18);
	ctx.stroke();

	ctx.begin_path();
	let _ = ctx.arc(x, y, corona * 1.18, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str(&color.with_alpha(0.12).to_css());
	ctx.set_line_width((corona - radius) * 0.1);
	ctx.stroke();
}

//! Leptos component wrapping the neural graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel
//! event handlers for hovering, node dragging, panning, zooming and focus.
//! An animation loop runs via `requestAnimationFrame` on `performance.now()`
//! timestamps, ticking the orbital engine and repainting only when something
//! actually moved. Refiltering is reactive: whenever the data signal or any
//! query field changes, the visible subgraph is recomputed and the view
//! state rebuilt.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::filter::filter;
use super::render;
use super::scale::ScaleConfig;
use super::state::{DRAG_THRESHOLD_PX, NeuralGraphState};
use super::theme::Theme;
use super::types::{FilterQuery, GraphData, GraphNode, ViewMode, time_ago};

/// Opaque async insight call: given the focused node, produce display text.
/// The graph neither knows nor cares how the text is made.
pub type InsightFuture = Pin<Box<dyn Future<Output = Result<String, String>>>>;
/// Factory for insight requests, injected by the surrounding application.
pub type InsightSource = Rc<dyn Fn(GraphNode) -> InsightFuture>;

/// Bundles view state with visual configuration and per-gesture bookkeeping.
struct GraphContext {
	state: NeuralGraphState,
	scale: ScaleConfig,
	theme: Theme,
	/// Pressed-but-undraggable hub, pending click resolution on mouseup.
	hub_press: Option<force_graph::DefaultNodeIdx>,
	/// Whether the previous query was in focus mode, to reset the camera
	/// exactly once on leaving it.
	was_focus: bool,
	/// Force one paint even if nothing moved (fresh build, resize).
	needs_paint: bool,
}

/// Hover tooltip contents and viewport-clamped anchor.
#[derive(Clone, Debug, PartialEq)]
struct TooltipInfo {
	label: String,
	kind: &'static str,
	meta: String,
	x: f64,
	y: f64,
}

/// Insight overlay lifecycle.
#[derive(Clone, Debug, PartialEq)]
enum InsightOverlay {
	Hidden,
	Pending,
	Ready(String),
	Failed(String),
}

fn now_ms() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map(|p| p.now())
		.unwrap_or(0.0)
}

/// Renders the interactive orbital graph on a canvas element.
///
/// Pass the full graph via the reactive `data` signal and UI query state via
/// `query`; the component derives the visible subgraph itself. The component
/// sizes itself to its parent container by default; set `fullscreen = true`
/// to fill the viewport and resize with the window.
#[component]
pub fn NeuralGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	/// Writable: clicking a node enters focus mode through this signal.
	query: RwSignal<FilterQuery>,
	/// Invoked with the clicked node; detail views are the caller's job.
	#[prop(optional, into)]
	on_node_click: Option<Callback<GraphNode>>,
	/// Optional insight generator for the focused node.
	#[prop(optional, into)]
	insight: Option<InsightSource>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let loop_alive: Rc<Cell<bool>> = Rc::new(Cell::new(true));
	let raf_handle: Rc<Cell<i32>> = Rc::new(Cell::new(0));

	let tooltip: RwSignal<Option<TooltipInfo>> = RwSignal::new(None);
	let overlay: RwSignal<InsightOverlay> = RwSignal::new(InsightOverlay::Hidden);

	let (context_init, animate_init, resize_cb_init, loop_alive_init, raf_init) = (
		context.clone(),
		animate.clone(),
		resize_cb.clone(),
		loop_alive.clone(),
		raf_handle.clone(),
	);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();

		let (w, h) = if fullscreen {
			(
				window.inner_width().unwrap().as_f64().unwrap(),
				window.inner_height().unwrap().as_f64().unwrap(),
			)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		let visible = filter(
			&data.get_untracked(),
			&query.get_untracked(),
			js_sys::Date::now(),
		);
		*context_init.borrow_mut() = Some(GraphContext {
			state: NeuralGraphState::new(&visible, w, h, now_ms()),
			scale: ScaleConfig::default(),
			theme: Theme::default(),
			hub_press: None,
			was_focus: query.get_untracked().view_mode == ViewMode::Focus,
			needs_paint: true,
		});

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let win: Window = web_sys::window().unwrap();
				let (nw, nh) = (
					win.inner_width().unwrap().as_f64().unwrap(),
					win.inner_height().unwrap().as_f64().unwrap(),
				);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.state.resize(nw, nh);
					c.needs_paint = true;
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner, loop_alive_anim, raf_anim) = (
			context_init.clone(),
			animate_init.clone(),
			loop_alive_init.clone(),
			raf_init.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !loop_alive_anim.get() {
				// Torn down: do not reschedule, do not touch state.
				return;
			}
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				let dirty = c.state.tick(now_ms());
				if dirty || c.needs_paint {
					render::render(&c.state, &ctx, &c.scale, &c.theme);
					c.needs_paint = false;
				}
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Ok(handle) = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref())
				{
					raf_anim.set(handle);
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			if let Ok(handle) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				raf_init.set(handle);
			}
		}
	});

	// Reactive refiltering: any data or query change recomputes the visible
	// subgraph and rebuilds view state. The initial state is built by the
	// mount effect above, so the first run only registers dependencies.
	let context_filter = context.clone();
	Effect::new(move |prev: Option<()>| {
		let full = data.get();
		let q = query.get();
		if prev.is_none() {
			return;
		}
		let Some(ref mut c) = *context_filter.borrow_mut() else {
			return;
		};

		let visible = filter(&full, &q, js_sys::Date::now());
		c.state.rebuild(&visible, now_ms());
		c.needs_paint = true;

		let focused_now = q.view_mode == ViewMode::Focus;
		if focused_now {
			if let Some(id) = q.focus_node_id.as_deref() {
				let mut target = None;
				c.state.graph.visit_nodes(|node| {
					if node.data.user_data.id == id {
						target = Some(node.index());
					}
				});
				if let Some(idx) = target {
					c.state.focus_on(idx);
				}
			}
		} else if c.was_focus {
			c.state.reset_focus();
		}
		c.was_focus = focused_now;
	});

	// Teardown: cancel the pending frame, stop the engine, drop listeners.
	let cleanup_state = send_wrapper::SendWrapper::new((
		context.clone(),
		animate.clone(),
		resize_cb.clone(),
		loop_alive.clone(),
		raf_handle.clone(),
	));
	on_cleanup(move || {
		let (context_cleanup, animate_cleanup, resize_cleanup, loop_alive_cleanup, raf_cleanup) =
			cleanup_state.take();
		loop_alive_cleanup.set(false);
		if let Some(win) = web_sys::window() {
			let _ = win.cancel_animation_frame(raf_cleanup.get());
		}
		if let Some(ref mut c) = *context_cleanup.borrow_mut() {
			c.state.engine.stop();
		}
		if let Some(cb) = resize_cleanup.borrow_mut().take() {
			if let Some(win) = web_sys::window() {
				let _ = win
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		animate_cleanup.borrow_mut().take();
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		tooltip.set(None);
		if let Some(ref mut c) = *context_md.borrow_mut() {
			if let Some(idx) = c.state.node_at_position(x, y, &c.scale) {
				if !c.state.begin_drag(idx, x, y) {
					// The hub never drags; remember the press so mouseup can
					// still resolve it as a click.
					c.hub_press = Some(idx);
					c.state.begin_pan(x, y);
				}
			} else {
				c.state.begin_pan(x, y);
			}
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut c) = *context_mm.borrow_mut() {
			if c.state.drag.active {
				c.state.drag_to(x, y);
				c.needs_paint = true;
				return;
			}
			if c.state.pan.active {
				c.state.pan_to(x, y);
				c.needs_paint = true;
				return;
			}

			let hovered = c.state.node_at_position(x, y, &c.scale);
			c.state.set_hover(hovered);
			let info = c.state.hovered_node().map(|node| {
				let (tx, ty) = c.state.tooltip_anchor(x, y);
				TooltipInfo {
					label: node.label.clone(),
					kind: node.kind.name(),
					meta: format!(
						"relevance {} · {} connection{} · seen {}",
						node.relevance,
						node.connections.len(),
						if node.connections.len() == 1 { "" } else { "s" },
						time_ago(js_sys::Date::now(), node.last_access_at),
					),
					x: tx,
					y: ty,
				}
			});
			tooltip.set(info);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		let mut clicked: Option<GraphNode> = None;
		let mut background_click = false;

		if let Some(ref mut c) = *context_mu.borrow_mut() {
			if let Some((idx, moved)) = c.state.end_drag(now_ms()) {
				if !moved {
					clicked = c.state.node_record(idx);
				}
			} else if c.state.pan.active {
				c.state.pan.active = false;
				let travel = (x - c.state.pan.start_x).hypot(y - c.state.pan.start_y);
				if travel <= DRAG_THRESHOLD_PX {
					match c.hub_press.take() {
						Some(idx) => clicked = c.state.node_record(idx),
						None => background_click = true,
					}
				}
			}
			c.hub_press = None;
		}

		if let Some(node) = clicked {
			query.update(|q| q.focus_on(&node.id));
			overlay.set(InsightOverlay::Hidden);
			if let Some(cb) = on_node_click {
				cb.run(node);
			}
		} else if background_click {
			let q = query.get_untracked();
			if q.view_mode == ViewMode::Focus || q.focus_node_id.is_some() {
				query.update(|q| q.clear_focus());
				overlay.set(InsightOverlay::Hidden);
			}
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.end_drag(now_ms());
			c.state.pan.active = false;
			c.hub_press = None;
			c.state.set_hover(None);
		}
		tooltip.set(None);
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			c.state.zoom_at(x, y, factor);
			c.needs_paint = true;
		}
	};

	let insight_available = insight.is_some();
	let run_insight = send_wrapper::SendWrapper::new(move |_: MouseEvent| {
		let Some(ref source) = insight else {
			return;
		};
		let q = query.get_untracked();
		let Some(id) = q.focus_node_id else {
			return;
		};
		let Some(node) = data
			.get_untracked()
			.nodes
			.iter()
			.find(|n| n.id == id)
			.cloned()
		else {
			return;
		};

		overlay.set(InsightOverlay::Pending);
		let fut = source(node);
		spawn_local(async move {
			match fut.await {
				Ok(text) => overlay.set(InsightOverlay::Ready(text)),
				Err(message) => overlay.set(InsightOverlay::Failed(message)),
			}
		});
	});

	let show_analyze = move || {
		insight_available
			&& query.get().view_mode == ViewMode::Focus
			&& query.get().focus_node_id.is_some()
	};

	view! {
		<div class="neural-graph" style="position: relative;">
			<canvas
				node_ref=canvas_ref
				class="neural-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			{move || {
				tooltip
					.get()
					.map(|t| {
						view! {
							<div
								class="neural-graph-tooltip"
								style=format!(
									"position: absolute; left: {}px; top: {}px; pointer-events: none;",
									t.x,
									t.y,
								)
							>
								<strong>{t.label}</strong>
								<span class="tooltip-kind">{t.kind}</span>
								<p class="tooltip-meta">{t.meta}</p>
							</div>
						}
					})
			}}
			{move || {
				show_analyze()
					.then(|| {
						let run_insight = (*run_insight).clone();
						view! {
							<button class="neural-graph-analyze" on:click=run_insight>
								"Analyze"
							</button>
						}
					})
			}}
			{move || {
				match overlay.get() {
					InsightOverlay::Hidden => None,
					InsightOverlay::Pending => {
						Some(
							view! {
								<div class="neural-graph-insight">
									<p>"Thinking..."</p>
								</div>
							}
								.into_any(),
						)
					}
					InsightOverlay::Ready(text) => {
						Some(
							view! {
								<div
									class="neural-graph-insight"
									on:click=move |_| overlay.set(InsightOverlay::Hidden)
								>
									<p>{text}</p>
								</div>
							}
								.into_any(),
						)
					}
					InsightOverlay::Failed(message) => {
						Some(
							view! {
								<div
									class="neural-graph-insight insight-error"
									on:click=move |_| overlay.set(InsightOverlay::Hidden)
								>
									<p>{format!("Insight unavailable: {message}")}</p>
								</div>
							}
								.into_any(),
						)
					}
				}
			}}
		</div>
	}
}

//! neural-graph: orbital knowledge-graph visualization for a second brain.
//!
//! This crate provides a WASM-based canvas component that renders a personal
//! knowledge graph as a living constellation: projects, habits, saved items
//! and thoughts orbit a central hub on kind-based rings, with search, focus
//! and drag interactions layered on top.

use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod realtime;

pub use components::neural_graph::{
	FilterQuery, GraphData, GraphLink, GraphNode, GraphSource, InsightFuture, InsightSource,
	NeuralGraphCanvas, NodeKind, SampleGraphSource, ViewMode,
};
pub use realtime::{ChannelKey, RealtimeHub, Subscription};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("neural-graph: logging initialized");
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], links: [...] }
fn load_graph_data() -> Option<GraphData> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<GraphData>(&json_text) {
		Ok(mut data) => {
			data.sanitize();
			data.derive_connections();
			info!(
				"neural-graph: loaded {} nodes, {} links",
				data.nodes.len(),
				data.links.len()
			);
			Some(data)
		}
		Err(e) => {
			warn!("neural-graph: failed to parse graph data: {}", e);
			None
		}
	}
}

/// Main application component.
///
/// Loads graph data from the DOM (falling back to generated sample data),
/// wires graph reloads through the realtime hub and renders the orbital
/// visualization fullscreen.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let source = Rc::new(SampleGraphSource::new(js_sys::Date::now()));
	let initial = load_graph_data().unwrap_or_else(|| source.load());
	let data = RwSignal::new(initial);
	let query = RwSignal::new(FilterQuery::default());

	// Upstream change notifications re-pull the full graph; the component
	// refilters and relayouts on its own when the signal changes.
	let hub = RealtimeHub::new();
	hub.start();
	let reload = {
		let source = source.clone();
		Rc::new(move || data.set(source.load())) as Rc<dyn Fn()>
	};
	let subscription = hub.subscribe(ChannelKey::new("graph", "*"), reload);
	let cleanup_state = send_wrapper::SendWrapper::new((hub, subscription));
	on_cleanup(move || {
		let (hub, subscription) = cleanup_state.take();
		hub.stop();
		drop(subscription);
	});

	// Demo insight source; the real application calls its assistant here.
	let insight: InsightSource = Rc::new(|node: GraphNode| {
		Box::pin(async move {
			let linked = node
				.connections
				.iter()
				.map(|c| c.label.as_str())
				.collect::<Vec<_>>()
				.join(", ");
			if linked.is_empty() {
				Ok(format!("{} stands alone for now.", node.label))
			} else {
				Ok(format!("{} is woven into: {linked}.", node.label))
			}
		}) as InsightFuture
	});

	let on_node_click = Callback::new(|node: GraphNode| {
		info!("neural-graph: open detail view for {}", node.id);
	});

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Neural Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<NeuralGraphCanvas
				data=data
				query=query
				on_node_click=on_node_click
				insight=insight
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Neural Graph"</h1>
				<p class="subtitle">
					"Click a node to focus its neighborhood. Drag to re-orbit. Scroll to zoom."
				</p>
			</div>
		</div>
	}
}

//! Orbital "neural graph" visualization component.
//!
//! Renders a second-brain knowledge graph on an HTML canvas with:
//! - A constellation layout: nodes orbit a central hub on kind-based rings
//! - A time-driven animation loop with relevance-scaled wobble and pulsing
//! - A filtering pipeline deriving the visible subgraph from UI query state
//! - Hover tooltips, click-to-focus, node dragging, pan and zoom
//! - Traveling impulses along links to suggest signal flow
//!
//! # Example
//!
//! ```ignore
//! use neural_graph::{FilterQuery, NeuralGraphCanvas, SampleGraphSource, GraphSource};
//!
//! let data = RwSignal::new(SampleGraphSource::new(js_sys::Date::now()).load());
//! let query = RwSignal::new(FilterQuery::default());
//!
//! view! { <NeuralGraphCanvas data=data query=query fullscreen=true /> }
//! ```

mod component;
mod filter;
mod impulse;
mod layout;
mod orbit;
mod provider;
mod render;
pub mod scale;
mod state;
pub mod theme;
mod types;

pub use component::{InsightFuture, InsightSource, NeuralGraphCanvas};
pub use filter::filter;
pub use provider::{GraphSource, SampleGraphSource};
pub use state::NeuralGraphState;
pub use types::{Connection, FilterQuery, GraphData, GraphLink, GraphNode, NodeKind, ViewMode};

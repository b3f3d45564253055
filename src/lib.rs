//! net-topology: Interactive network-group topology visualization.
//!
//! This crate provides a WASM-based canvas component that renders a network
//! group with its members and peers as a star graph, with pan/zoom, node
//! dragging and selection.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

#[cfg(target_arch = "wasm32")]
use getrandom as _;

pub mod components;

pub use components::topology_graph::{
	DataIntegrityError, TopologyConfig, TopologyGraphCanvas, TopologySnapshot, TopologyState,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("topology: logging initialized");
}

/// Parses the JSON text of the `<script>` element with the given id.
fn load_script_json<T: DeserializeOwned>(id: &str) -> Option<T> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	serde_json::from_str::<T>(&json_text)
		.map_err(|e| warn!("topology: failed to parse #{id}: {e}"))
		.ok()
}

/// Load the snapshot from a script element with id="topology-data".
fn load_snapshot() -> Option<TopologySnapshot> {
	let snapshot = load_script_json::<TopologySnapshot>("topology-data")?;
	info!(
		"topology: loaded group `{}` with {} members, {} peers",
		snapshot.group.id,
		snapshot.members.len(),
		snapshot.peers.len()
	);
	Some(snapshot)
}

/// Load engine overrides from a script element with id="topology-config".
fn load_config() -> TopologyConfig {
	load_script_json("topology-config").unwrap_or_default()
}

/// Human-readable summary of a node for the detail overlay.
fn describe(snapshot: &TopologySnapshot, id: &str) -> String {
	if snapshot.group.id == id {
		return format!("{} (network group, {})", snapshot.group.name, snapshot.group.status);
	}
	if let Some(m) = snapshot.members.iter().find(|m| m.id == id) {
		let ip = m.ip.as_deref().unwrap_or("no ip");
		return format!("{} ({:?}, {}, {})", m.name, m.kind, ip, m.status);
	}
	if let Some(p) = snapshot.peers.iter().find(|p| p.id == id) {
		let side = if p.external { "external peer" } else { "internal peer" };
		let endpoint = p.endpoint.as_deref().unwrap_or("no endpoint");
		return format!("{} ({side}, {endpoint}, {})", p.name, p.status);
	}
	id.to_string()
}

/// Main application component.
/// Loads the topology from the DOM and renders it with a detail overlay.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let snapshot = load_snapshot();
	let config = load_config();
	let has_data = snapshot.is_some();
	let detail_source = snapshot.clone().unwrap_or_default();
	let snapshot_signal = Signal::derive(move || snapshot.clone());

	let (selected, set_selected) = signal(None::<String>);
	let (error, set_error) = signal(None::<String>);
	let detail = move || {
		selected
			.get()
			.map(|id| describe(&detail_source, &id))
			.unwrap_or_else(|| "Nothing selected".to_string())
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Network Topology" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<TopologyGraphCanvas
				snapshot=snapshot_signal
				config=config
				on_select={move |id: Option<String>| set_selected.set(id)}
				on_error={move |msg: String| set_error.set(Some(msg))}
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Network Topology"</h1>
				<p class="subtitle">
					"Tap a node to inspect it. Drag to move nodes or pan. Scroll or pinch to zoom. Double-click to fit."
				</p>
				<Show when=move || !has_data>
					<p class="empty">"No topology data on this page."</p>
				</Show>
				<p class="detail">{detail}</p>
				{move || error.get().map(|msg| view! { <p class="error">{msg}</p> })}
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> TopologySnapshot {
		serde_json::from_str(
			r#"{
				"group": {"id": "G", "name": "prod", "status": "active"},
				"members": [{"id": "A", "name": "api", "kind": "addon", "status": "running"}],
				"peers": [{"id": "C", "name": "office", "external": true, "endpoint": "1.2.3.4:51820", "status": "up"}]
			}"#,
		)
		.unwrap()
	}

	#[test]
	fn describes_each_entity() {
		let snap = sample();
		assert_eq!(describe(&snap, "G"), "prod (network group, active)");
		assert_eq!(describe(&snap, "A"), "api (Addon, no ip, running)");
		assert_eq!(describe(&snap, "C"), "office (external peer, 1.2.3.4:51820, up)");
		assert_eq!(describe(&snap, "zzz"), "zzz");
	}
}

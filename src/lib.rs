//! constellation-net: particle constellation overlays for a marketing page.
//!
//! This crate provides a WASM component that attaches a pointer-reactive,
//! theme-aware point-and-edge animation to the page header and hero regions.

use leptos::prelude::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlScriptElement, Window};

pub mod components;

pub use components::constellation::{
	Constellation, ConstellationCanvas, ConstellationConfig, LoopPhase, PageOverrides, Rgb,
	ThemeSource, motion_allowed,
};

/// Id of the optional `<script type="application/json">` holding overrides.
pub const CONFIG_ELEMENT_ID: &str = "constellation-config";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("constellation-net: logging initialized");
}

/// Load per-instance overrides from a script element with id="constellation-config".
/// Expected format: JSON with optional `header` and `hero` objects.
fn load_page_overrides(document: &Document) -> Option<PageOverrides> {
	let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<PageOverrides>(&json_text) {
		Ok(overrides) => {
			info!("constellation-net: loaded page overrides");
			Some(overrides)
		}
		Err(e) => {
			warn!("constellation-net: failed to parse page overrides: {}", e);
			None
		}
	}
}

fn find_container(document: &Document, selector: &str) -> Option<HtmlElement> {
	document
		.query_selector(selector)
		.ok()
		.flatten()?
		.dyn_into()
		.ok()
}

/// Mounts a constellation into every configured region present on the page.
///
/// Reads the reduced-motion preference once and turns it into the page's
/// [`LoopPhase`]; every instance receives that phase, so a declined page
/// creates no canvas, state or frame loop. Returns the number of instances
/// mounted.
pub fn mount_page() -> usize {
	let phase = LoopPhase::Uninitialized.on_mount(motion_allowed());
	if !phase.schedules_frames() {
		info!("constellation-net: reduced motion requested, not animating");
		return 0;
	}
	let Some(document) = web_sys::window().and_then(|w: Window| w.document()) else {
		return 0;
	};

	let overrides = load_page_overrides(&document).unwrap_or_default();
	let theme = ThemeSource::observe_document();
	let mut mounted = 0;

	for config in overrides.mount_plan(phase) {
		let Some(container) = find_container(&document, &config.container_selector) else {
			continue;
		};
		let theme = theme.clone();
		leptos::mount::mount_to(container, move || {
			view! { <ConstellationCanvas config=config theme=theme phase=phase /> }
		})
		.forget();
		mounted += 1;
	}
	mounted
}

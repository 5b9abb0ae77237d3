//! DOM binding and Leptos component for the constellation overlay.
//!
//! [`Constellation`] owns everything one running instance registers with the
//! page: window resize/orientation listeners, container pointer listeners, a
//! theme subscription and the frame loop. Dropping it (or calling
//! [`Constellation::dispose`]) unregisters all of them.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Reflect};
use leptos::prelude::*;
use log::info;
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, HtmlElement, MouseEvent, Window,
};

use super::config::ConstellationConfig;
use super::render;
use super::scheduler::{FrameLoop, LoopPhase};
use super::state::ConstellationState;
use super::theme::{SubscriptionId, ThemeSource};

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

const CANVAS_STYLE: &str = "position: absolute; inset: 0; pointer-events: none;";

/// Whether the platform permits decorative motion.
///
/// Probes `matchMedia` reflectively; any missing piece counts as allowed.
pub fn motion_allowed() -> bool {
	let Some(window) = web_sys::window() else {
		return true;
	};
	let Ok(match_media) = Reflect::get(&window, &"matchMedia".into()) else {
		return true;
	};
	let Ok(match_media) = match_media.dyn_into::<Function>() else {
		return true;
	};
	let Ok(query) = match_media.call1(&window, &REDUCED_MOTION_QUERY.into()) else {
		return true;
	};
	let reduce = Reflect::get(&query, &"matches".into())
		.ok()
		.and_then(|value| value.as_bool())
		.unwrap_or(false);
	!reduce
}

/// An event listener removed again on drop.
struct Listener {
	target: EventTarget,
	event: &'static str,
	callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
	fn attach(
		target: &EventTarget,
		event: &'static str,
		handler: impl FnMut(Event) + 'static,
	) -> Option<Self> {
		let callback = Closure::<dyn FnMut(Event)>::new(handler);
		target
			.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
			.ok()?;
		Some(Self {
			target: target.clone(),
			event,
			callback,
		})
	}
}

impl Drop for Listener {
	fn drop(&mut self) {
		let _ = self
			.target
			.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
	}
}

/// A running constellation bound to one container and its overlay canvas.
pub struct Constellation {
	state: Rc<RefCell<ConstellationState>>,
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	theme: ThemeSource,
	subscription: Option<SubscriptionId>,
	listeners: Vec<Listener>,
	frame_loop: Option<FrameLoop>,
}

impl Constellation {
	/// Sizes `canvas` to `container`, seeds the field and starts animating.
	///
	/// Returns `None` without side effects when `phase` does not schedule
	/// frames, when there is no window, or when the canvas has no 2D context.
	pub fn attach(
		container: HtmlElement,
		canvas: HtmlCanvasElement,
		config: ConstellationConfig,
		theme: &ThemeSource,
		phase: LoopPhase,
	) -> Option<Self> {
		if !phase.schedules_frames() {
			return None;
		}
		let window: Window = web_sys::window()?;
		let ctx: CanvasRenderingContext2d = canvas.get_context("2d").ok()??.dyn_into().ok()?;

		let state = Rc::new(RefCell::new(ConstellationState::new(config, theme.current())));
		fit(&state, &container, &canvas, &ctx, &window);

		let mut listeners = Vec::with_capacity(4);
		for event in ["resize", "orientationchange"] {
			let (state, container, canvas, ctx) =
				(state.clone(), container.clone(), canvas.clone(), ctx.clone());
			listeners.extend(Listener::attach(&window, event, move |_| {
				if let Some(window) = web_sys::window() {
					fit(&state, &container, &canvas, &ctx, &window);
				}
			}));
		}

		let (state_mm, container_mm) = (state.clone(), container.clone());
		listeners.extend(Listener::attach(&container, "mousemove", move |ev: Event| {
			let Some(ev) = ev.dyn_ref::<MouseEvent>() else {
				return;
			};
			let rect = container_mm.get_bounding_client_rect();
			state_mm.borrow_mut().pointer.move_to(
				ev.client_x() as f64 - rect.left(),
				ev.client_y() as f64 - rect.top(),
			);
		}));

		let state_ml = state.clone();
		listeners.extend(Listener::attach(&container, "mouseleave", move |_| {
			state_ml.borrow_mut().pointer.leave();
		}));

		let state_theme = state.clone();
		let subscription = theme.subscribe(move |color| state_theme.borrow_mut().set_color(color));

		let (state_frame, mut ctx_frame) = (state.clone(), ctx.clone());
		let frame_loop = FrameLoop::start(phase, move || {
			let mut s = state_frame.borrow_mut();
			s.tick();
			render::render(&s, &mut ctx_frame);
		})?;

		{
			let s = state.borrow();
			info!(
				"constellation[{}]: running with {} particles",
				s.config.name,
				s.field.len()
			);
		}

		Some(Self {
			state,
			canvas,
			ctx,
			theme: theme.clone(),
			subscription: Some(subscription),
			listeners,
			frame_loop: Some(frame_loop),
		})
	}

	/// Whether the frame loop is still scheduling frames.
	pub fn is_running(&self) -> bool {
		self.frame_loop.as_ref().is_some_and(FrameLoop::is_running)
	}

	/// Current population size.
	pub fn particle_count(&self) -> usize {
		self.state.borrow().field.len()
	}

	/// Stops the loop, detaches every listener and clears the canvas.
	/// The canvas element itself stays with whoever created it.
	pub fn dispose(&mut self) {
		let Some(frame_loop) = self.frame_loop.take() else {
			return;
		};
		frame_loop.stop();
		self.listeners.clear();
		if let Some(id) = self.subscription.take() {
			self.theme.unsubscribe(id);
		}
		self.ctx.clear_rect(
			0.0,
			0.0,
			self.canvas.width() as f64,
			self.canvas.height() as f64,
		);
		info!("constellation[{}]: disposed", self.state.borrow().config.name);
	}
}

impl Drop for Constellation {
	fn drop(&mut self) {
		self.dispose();
	}
}

/// Measures the container, reseeds and resizes the canvas backing store.
fn fit(
	state: &RefCell<ConstellationState>,
	container: &HtmlElement,
	canvas: &HtmlCanvasElement,
	ctx: &CanvasRenderingContext2d,
	window: &Window,
) {
	let rect = container.get_bounding_client_rect();
	let viewport = state
		.borrow_mut()
		.resize(rect.width(), rect.height(), window.device_pixel_ratio());

	canvas.set_width(viewport.backing_width);
	canvas.set_height(viewport.backing_height);
	// Leptos' `ElementExt::style` shadows the web-sys getter.
	let style = HtmlElement::style(canvas);
	let _ = style.set_property("width", &format!("{}px", viewport.width));
	let _ = style.set_property("height", &format!("{}px", viewport.height));
	// Resizing the backing store resets the transform.
	let _ = ctx.set_transform(viewport.pixel_ratio, 0.0, 0.0, viewport.pixel_ratio, 0.0, 0.0);
}

/// Overlay canvas that animates a constellation over its parent element.
///
/// Renders nothing at all unless `phase` schedules frames; callers decide it
/// once per page with [`LoopPhase::on_mount`] and [`motion_allowed`]. The
/// parent should establish a positioning context; the canvas is absolutely
/// positioned to cover it and ignores pointer input, which is read from the
/// parent instead.
#[component]
pub fn ConstellationCanvas(
	/// Instance parameters.
	config: ConstellationConfig,
	/// Color source shared by every instance on the page.
	theme: ThemeSource,
	/// Mount decision taken from the reduced-motion preference.
	phase: LoopPhase,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let engine: Rc<RefCell<Option<Constellation>>> = Rc::new(RefCell::new(None));
	let engine_init = engine.clone();
	let class = config.canvas_class.clone();

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(container) = canvas
			.parent_element()
			.and_then(|parent| parent.dyn_into::<HtmlElement>().ok())
		else {
			return;
		};
		*engine_init.borrow_mut() =
			Constellation::attach(container, canvas, config.clone(), &theme, phase);
	});

	let engine = SendWrapper::new(engine);
	on_cleanup(move || {
		let engine = engine.take();
		let running = engine.borrow_mut().take();
		if let Some(mut running) = running {
			running.dispose();
		}
	});

	phase.schedules_frames().then(move || {
		view! {
			<canvas
				node_ref=canvas_ref
				class=class
				aria-hidden="true"
				style=CANVAS_STYLE
			/>
		}
	})
}

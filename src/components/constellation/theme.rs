//! Theme color source for the constellation.
//!
//! The stroke/fill color follows a CSS custom property on the document root.
//! [`ThemeSubject`] is the host-independent notification hub; [`ThemeSource`]
//! binds it to the DOM by observing the root's `data-theme` attribute and
//! re-reading the property whenever it changes.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::debug;
use wasm_bindgen::prelude::*;
use web_sys::{MutationObserver, MutationObserverInit};

/// Custom property holding the page's text color.
pub const THEME_VARIABLE: &str = "--text";

/// Root attribute toggled by the page's theme switch.
pub const THEME_ATTRIBUTE: &str = "data-theme";

/// An opaque RGB color. Alpha varies per drawn element, so it is not stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
}

impl Rgb {
	/// Used whenever the theme variable is empty or unparseable.
	pub const FALLBACK: Rgb = Rgb::new(11, 31, 42);

	/// Color from its three channels.
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	/// Parses `#rgb`, `#rrggbb`, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
	///
	/// Functional components above 255 saturate. Alpha, if present, is ignored.
	pub fn parse(value: &str) -> Option<Self> {
		let value = value.trim();
		if let Some(hex) = value.strip_prefix('#') {
			return Self::parse_hex(hex);
		}
		let lower = value.to_ascii_lowercase();
		let args = lower
			.strip_prefix("rgba(")
			.or_else(|| lower.strip_prefix("rgb("))?;
		let mut parts = args.split([',', ')']).map(str::trim);
		let mut channel = || -> Option<u8> {
			let digits = parts.next()?;
			if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
				return None;
			}
			Some(digits.parse::<u32>().map_or(u8::MAX, |v| v.min(255) as u8))
		};
		Some(Self::new(channel()?, channel()?, channel()?))
	}

	/// Like [`Rgb::parse`], but never absent.
	pub fn parse_or_fallback(value: &str) -> Self {
		Self::parse(value).unwrap_or(Self::FALLBACK)
	}

	fn parse_hex(hex: &str) -> Option<Self> {
		if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
			return None;
		}
		let expanded: String = match hex.len() {
			3 => hex.chars().flat_map(|c| [c, c]).collect(),
			6 => hex.to_string(),
			_ => return None,
		};
		let num = u32::from_str_radix(&expanded, 16).ok()?;
		Some(Self::new(
			(num >> 16) as u8,
			(num >> 8) as u8,
			num as u8,
		))
	}

	/// CSS `rgba()` string with the given alpha.
	pub fn rgba(self, alpha: f64) -> String {
		format!("rgba({},{},{},{})", self.r, self.g, self.b, alpha)
	}
}

impl Default for Rgb {
	fn default() -> Self {
		Self::FALLBACK
	}
}

/// Handle returned by [`ThemeSubject::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Rc<RefCell<dyn FnMut(Rgb)>>;

/// Fan-out of theme color changes to any number of listeners.
///
/// Callbacks may subscribe or unsubscribe (themselves included) while a
/// publish is in flight. Removals take effect immediately; additions
/// receive the next publish.
#[derive(Default)]
pub struct ThemeSubject {
	next_id: Cell<u64>,
	subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
}

impl ThemeSubject {
	/// An empty subject.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `callback` for every later publish.
	pub fn subscribe(&self, callback: impl FnMut(Rgb) + 'static) -> SubscriptionId {
		let id = SubscriptionId(self.next_id.get());
		self.next_id.set(id.0 + 1);
		let callback: Subscriber = Rc::new(RefCell::new(callback));
		self.subscribers.borrow_mut().push((id, callback));
		id
	}

	/// Returns `false` if `id` was not (or no longer) subscribed.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut subscribers = self.subscribers.borrow_mut();
		let before = subscribers.len();
		subscribers.retain(|(sub, _)| *sub != id);
		subscribers.len() != before
	}

	/// Delivers `color` to every subscriber in subscription order.
	///
	/// A callback already running further up the stack is skipped rather
	/// than re-entered.
	pub fn publish(&self, color: Rgb) {
		let snapshot = self.subscribers.borrow().clone();
		for (id, callback) in snapshot {
			if !self.is_subscribed(id) {
				continue;
			}
			if let Ok(mut callback) = callback.try_borrow_mut() {
				(&mut *callback)(color);
			}
		}
	}

	fn is_subscribed(&self, id: SubscriptionId) -> bool {
		self.subscribers.borrow().iter().any(|(sub, _)| *sub == id)
	}

	/// Number of live subscriptions.
	pub fn len(&self) -> usize {
		self.subscribers.borrow().len()
	}

	/// Whether nothing is subscribed.
	pub fn is_empty(&self) -> bool {
		self.subscribers.borrow().is_empty()
	}
}

struct ThemeObserver {
	observer: MutationObserver,
	_callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
}

impl Drop for ThemeObserver {
	fn drop(&mut self) {
		self.observer.disconnect();
	}
}

struct ThemeInner {
	subject: ThemeSubject,
	fallback: Cell<Rgb>,
	observer: RefCell<Option<ThemeObserver>>,
}

/// Shared, cloneable theme color source.
///
/// All clones publish through the same subject, so one document observer
/// serves every constellation on the page.
#[derive(Clone)]
pub struct ThemeSource {
	inner: Rc<ThemeInner>,
}

impl ThemeSource {
	/// A source with no DOM binding; [`current`](Self::current) returns the
	/// last published color.
	pub fn detached(color: Rgb) -> Self {
		Self {
			inner: Rc::new(ThemeInner {
				subject: ThemeSubject::new(),
				fallback: Cell::new(color),
				observer: RefCell::new(None),
			}),
		}
	}

	/// Binds to the document root. Falls back to a detached source when the
	/// document or `MutationObserver` is unavailable.
	pub fn observe_document() -> Self {
		let source = Self::detached(read_theme_variable().unwrap_or_default());
		let weak = Rc::downgrade(&source.inner);
		if let Some(observer) = observe_theme_attribute(weak) {
			*source.inner.observer.borrow_mut() = Some(observer);
		}
		source
	}

	/// The color the theme variable currently resolves to.
	pub fn current(&self) -> Rgb {
		if self.inner.observer.borrow().is_some() {
			if let Some(color) = read_theme_variable() {
				return color;
			}
		}
		self.inner.fallback.get()
	}

	/// Registers `callback` for theme color changes.
	pub fn subscribe(&self, callback: impl FnMut(Rgb) + 'static) -> SubscriptionId {
		self.inner.subject.subscribe(callback)
	}

	/// Removes a subscription; `false` if it was already gone.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.inner.subject.unsubscribe(id)
	}

	/// Records `color` and notifies subscribers.
	pub fn publish(&self, color: Rgb) {
		self.inner.fallback.set(color);
		self.inner.subject.publish(color);
	}
}

/// Reads [`THEME_VARIABLE`] from the root's computed style.
///
/// `None` only when there is no document to read from; an empty or malformed
/// value resolves to [`Rgb::FALLBACK`].
fn read_theme_variable() -> Option<Rgb> {
	let window = web_sys::window()?;
	let root = window.document()?.document_element()?;
	let style = window.get_computed_style(&root).ok()??;
	let value = style.get_property_value(THEME_VARIABLE).unwrap_or_default();
	Some(Rgb::parse_or_fallback(&value))
}

fn observe_theme_attribute(source: Weak<ThemeInner>) -> Option<ThemeObserver> {
	let root = web_sys::window()?.document()?.document_element()?;
	let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
		move |_records: js_sys::Array, _observer: MutationObserver| {
			let Some(inner) = source.upgrade() else {
				return;
			};
			let color = read_theme_variable().unwrap_or_default();
			debug!("constellation: theme color changed to {:?}", color);
			ThemeSource { inner }.publish(color);
		},
	);
	let observer = MutationObserver::new(callback.as_ref().unchecked_ref()).ok()?;
	let init = MutationObserverInit::new();
	init.set_attributes(true);
	init.set_attribute_filter(&js_sys::Array::of1(&JsValue::from_str(THEME_ATTRIBUTE)));
	observer.observe_with_options(&root, &init).ok()?;
	Some(ThemeObserver {
		observer,
		_callback: callback,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn parses_six_digit_hex() {
		assert_eq!(Rgb::parse("#0b1f2a"), Some(Rgb::new(11, 31, 42)));
		assert_eq!(Rgb::parse("  #FFA500 "), Some(Rgb::new(255, 165, 0)));
	}

	#[test]
	fn parses_three_digit_hex() {
		assert_eq!(Rgb::parse("#fff"), Some(Rgb::new(255, 255, 255)));
		assert_eq!(Rgb::parse("#1a2"), Some(Rgb::new(0x11, 0xaa, 0x22)));
	}

	#[test]
	fn parses_functional_forms() {
		assert_eq!(Rgb::parse("rgb(12, 34, 56)"), Some(Rgb::new(12, 34, 56)));
		assert_eq!(
			Rgb::parse("RGBA(200,100,50,0.5)"),
			Some(Rgb::new(200, 100, 50))
		);
	}

	#[test]
	fn functional_components_saturate() {
		assert_eq!(Rgb::parse("rgb(300, 0, 999999999999)"), Some(Rgb::new(255, 0, 255)));
	}

	#[test]
	fn empty_and_malformed_values_fall_back() {
		for value in [
			"",
			"   ",
			"#12",
			"#12345",
			"#ggg",
			"rgb(1, 2)",
			"rgb(-1, 2, 3)",
			"rgb(10% 20% 30%)",
			"hsl(10, 20%, 30%)",
			"teal",
		] {
			assert_eq!(Rgb::parse_or_fallback(value), Rgb::new(11, 31, 42), "{value:?}");
		}
	}

	#[test]
	fn rgba_formats_alpha() {
		assert_eq!(Rgb::new(1, 2, 3).rgba(0.38), "rgba(1,2,3,0.38)");
	}

	#[test]
	fn subject_delivers_to_every_subscriber() {
		let subject = ThemeSubject::new();
		let seen_a = Rc::new(Cell::new(Rgb::FALLBACK));
		let seen_b = Rc::new(Cell::new(Rgb::FALLBACK));
		let (a, b) = (seen_a.clone(), seen_b.clone());
		subject.subscribe(move |c| a.set(c));
		subject.subscribe(move |c| b.set(c));

		subject.publish(Rgb::new(1, 2, 3));

		assert_eq!(seen_a.get(), Rgb::new(1, 2, 3));
		assert_eq!(seen_b.get(), Rgb::new(1, 2, 3));
	}

	#[test]
	fn unsubscribed_callbacks_stop_receiving() {
		let subject = ThemeSubject::new();
		let hits = Rc::new(Cell::new(0));
		let counter = hits.clone();
		let id = subject.subscribe(move |_| counter.set(counter.get() + 1));

		subject.publish(Rgb::FALLBACK);
		assert!(subject.unsubscribe(id));
		assert!(!subject.unsubscribe(id));
		subject.publish(Rgb::FALLBACK);

		assert_eq!(hits.get(), 1);
		assert!(subject.is_empty());
	}

	#[test]
	fn callback_can_unsubscribe_itself_during_publish() {
		let subject = Rc::new(ThemeSubject::new());
		let own_id = Rc::new(Cell::new(None));
		let hits = Rc::new(Cell::new(0));
		let (weak, id_slot, counter) = (Rc::downgrade(&subject), own_id.clone(), hits.clone());
		let id = subject.subscribe(move |_| {
			counter.set(counter.get() + 1);
			if let (Some(subject), Some(id)) = (weak.upgrade(), id_slot.get()) {
				assert!(subject.unsubscribe(id));
			}
		});
		own_id.set(Some(id));

		subject.publish(Rgb::FALLBACK);
		subject.publish(Rgb::FALLBACK);

		assert_eq!(hits.get(), 1);
		assert!(subject.is_empty());
	}

	#[test]
	fn removal_during_publish_skips_later_subscriber() {
		let subject = Rc::new(ThemeSubject::new());
		let later_id = Rc::new(Cell::new(None));
		let later_hits = Rc::new(Cell::new(0));
		let (weak, id_slot) = (Rc::downgrade(&subject), later_id.clone());
		subject.subscribe(move |_| {
			if let (Some(subject), Some(id)) = (weak.upgrade(), id_slot.get()) {
				subject.unsubscribe(id);
			}
		});
		let counter = later_hits.clone();
		later_id.set(Some(subject.subscribe(move |_| counter.set(counter.get() + 1))));

		subject.publish(Rgb::FALLBACK);

		assert_eq!(later_hits.get(), 0);
		assert_eq!(subject.len(), 1);
	}

	#[test]
	fn subscribing_during_publish_takes_effect_next_time() {
		let subject = Rc::new(ThemeSubject::new());
		let seen = Rc::new(Cell::new(0));
		let (weak, sink) = (Rc::downgrade(&subject), seen.clone());
		let added = Rc::new(Cell::new(false));
		subject.subscribe(move |_| {
			if added.replace(true) {
				return;
			}
			if let Some(subject) = weak.upgrade() {
				let sink = sink.clone();
				subject.subscribe(move |_| sink.set(sink.get() + 1));
			}
		});

		subject.publish(Rgb::FALLBACK);
		assert_eq!(seen.get(), 0);
		assert_eq!(subject.len(), 2);

		subject.publish(Rgb::FALLBACK);
		assert_eq!(seen.get(), 1);
	}

	#[test]
	fn detached_source_tracks_last_published_color() {
		let source = ThemeSource::detached(Rgb::new(9, 9, 9));
		assert_eq!(source.current(), Rgb::new(9, 9, 9));

		let clone = source.clone();
		let seen = Rc::new(Cell::new(None));
		let sink = seen.clone();
		clone.subscribe(move |c| sink.set(Some(c)));
		source.publish(Rgb::new(200, 200, 200));

		assert_eq!(seen.get(), Some(Rgb::new(200, 200, 200)));
		assert_eq!(clone.current(), Rgb::new(200, 200, 200));
	}
}

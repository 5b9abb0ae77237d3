//! Simulation state for one constellation instance.
//!
//! Bundles the particle field with the pointer, the current theme color and
//! the last measured viewport. The DOM layer mutates it from event handlers
//! and the frame loop; everything here is plain data and runs natively.

use log::debug;

use super::config::ConstellationConfig;
use super::particles::ParticleField;
use super::theme::Rgb;
use super::viewport::Viewport;

/// Last known pointer position in container-local coordinates.
///
/// Coordinates survive [`leave`](Self::leave); consumers must go through
/// [`active_position`](Self::active_position).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
	/// Last known logical x.
	pub x: f64,
	/// Last known logical y.
	pub y: f64,
	/// Whether the pointer is currently over the container.
	pub active: bool,
}

impl PointerState {
	/// Records a position inside the container and marks the pointer active.
	pub fn move_to(&mut self, x: f64, y: f64) {
		self.x = x;
		self.y = y;
		self.active = true;
	}

	/// Marks the pointer inactive, keeping its last coordinates.
	pub fn leave(&mut self) {
		self.active = false;
	}

	/// Position while the pointer is over the container.
	pub fn active_position(&self) -> Option<(f64, f64)> {
		self.active.then_some((self.x, self.y))
	}
}

/// Everything one running constellation needs between frames.
pub struct ConstellationState {
	/// Validated instance configuration.
	pub config: ConstellationConfig,
	/// Particles and their bounds.
	pub field: ParticleField,
	/// Pointer as last reported by the container.
	pub pointer: PointerState,
	/// Current theme color for every draw.
	pub color: Rgb,
	/// Geometry from the last [`resize`](Self::resize).
	pub viewport: Viewport,
	rng: fastrand::Rng,
}

impl ConstellationState {
	/// Seeds from OS randomness; layout differs on every mount.
	pub fn new(config: ConstellationConfig, color: Rgb) -> Self {
		Self::with_rng(config, color, fastrand::Rng::new())
	}

	/// Seeds from `rng`, for reproducible layouts.
	pub fn with_rng(config: ConstellationConfig, color: Rgb, rng: fastrand::Rng) -> Self {
		let viewport = Viewport::measure(0.0, 0.0, 1.0, config.bounds);
		Self {
			config,
			field: ParticleField::default(),
			pointer: PointerState::default(),
			color,
			viewport,
			rng,
		}
	}

	/// Re-measures and replaces the whole population.
	///
	/// Every call reseeds, with no debouncing, so a burst of resize events
	/// costs one full reseed each.
	pub fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) -> Viewport {
		let viewport = Viewport::measure(width, height, device_pixel_ratio, self.config.bounds);
		let count = viewport.particle_count(&self.config.density);
		self.field = ParticleField::seed(
			count,
			viewport.width,
			viewport.height,
			self.config.motion.speed,
			&mut self.rng,
		);
		self.viewport = viewport;
		debug!(
			"constellation[{}]: {}x{} @{}x, {} particles",
			self.config.name, viewport.width, viewport.height, viewport.pixel_ratio, count
		);
		viewport
	}

	/// Advances the field one frame toward the current pointer.
	pub fn tick(&mut self) {
		self.field.tick(&self.pointer, &self.config.motion);
	}

	/// Replaces the draw color.
	pub fn set_color(&mut self, color: Rgb) {
		self.color = color;
	}
}

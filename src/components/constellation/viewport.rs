//! Container measurement, backing-store sizing and population size.
//!
//! # Coordinate Spaces
//!
//! - **Logical**: CSS pixels relative to the container's top-left corner.
//!   Particles, the pointer and all drawing calls use these units.
//! - **Backing**: physical canvas pixels. The canvas is sized to
//!   `logical × pixel_ratio` and a uniform scale transform maps logical
//!   drawing onto it, keeping lines crisp on high-density displays.

use super::config::{BoundsRounding, DensityConfig, MAX_PARTICLES};

/// Pixel ratios above this are treated as this; denser backing stores cost
/// fill rate without a visible gain for hairlines.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Measured geometry of one container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	/// Logical width.
	pub width: f64,
	/// Logical height.
	pub height: f64,
	/// Device pixel ratio, capped at [`MAX_PIXEL_RATIO`].
	pub pixel_ratio: f64,
	/// Canvas backing-store width in physical pixels.
	pub backing_width: u32,
	/// Canvas backing-store height in physical pixels.
	pub backing_height: u32,
}

impl Viewport {
	/// Derives a viewport from the container's rendered size.
	///
	/// A missing or nonsensical device pixel ratio counts as 1.
	pub fn measure(width: f64, height: f64, device_pixel_ratio: f64, rounding: BoundsRounding) -> Self {
		let (width, height) = match rounding {
			BoundsRounding::Fractional => (width.max(0.0), height.max(0.0)),
			BoundsRounding::Whole => (width.floor().max(1.0), height.floor().max(1.0)),
		};
		let pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
			device_pixel_ratio.min(MAX_PIXEL_RATIO)
		} else {
			1.0
		};
		Self {
			width,
			height,
			pixel_ratio,
			backing_width: backing_size(width, pixel_ratio),
			backing_height: backing_size(height, pixel_ratio),
		}
	}

	/// Logical area in px².
	pub fn area(&self) -> f64 {
		self.width * self.height
	}

	/// Target population for this viewport.
	pub fn particle_count(&self, density: &DensityConfig) -> usize {
		particle_count(self.area(), density)
	}
}

fn backing_size(logical: f64, pixel_ratio: f64) -> u32 {
	(logical * pixel_ratio).floor().clamp(1.0, u32::MAX as f64) as u32
}

/// `clamp(floor(area / divisor), min, max)`, with `max` optional.
///
/// The result never exceeds [`MAX_PARTICLES`], so an enormous container
/// cannot demand an unbounded allocation.
pub fn particle_count(area: f64, density: &DensityConfig) -> usize {
	let raw = (area / density.divisor).floor();
	let raw = if raw.is_finite() && raw > 0.0 {
		raw.min(usize::MAX as f64) as usize
	} else {
		0
	};
	let count = raw.max(density.min);
	match density.max {
		Some(max) => count.min(max),
		None => count,
	}
	.min(MAX_PARTICLES)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::constellation::config::ConstellationConfig;
	use proptest::prelude::*;

	#[test]
	fn header_small_area_hits_floor() {
		let density = ConstellationConfig::header().density;
		assert_eq!(particle_count(26_000.0, &density), 20);
	}

	#[test]
	fn hero_mid_area_is_unclamped() {
		let density = ConstellationConfig::hero().density;
		assert_eq!(particle_count(700_000.0, &density), 100);
	}

	#[test]
	fn hero_large_area_hits_ceiling() {
		let density = ConstellationConfig::hero().density;
		assert_eq!(particle_count(1920.0 * 1080.0, &density), 120);
	}

	#[test]
	fn header_has_no_ceiling() {
		let density = ConstellationConfig::header().density;
		assert_eq!(particle_count(2600.0 * 1000.0, &density), 1000);
	}

	#[test]
	fn enormous_area_stops_at_particle_limit() {
		let density = ConstellationConfig::header().density;
		assert_eq!(particle_count(1e12, &density), MAX_PARTICLES);
		assert_eq!(particle_count(f64::MAX, &density), MAX_PARTICLES);
	}

	#[test]
	fn pixel_ratio_is_capped() {
		let vp = Viewport::measure(300.0, 100.0, 3.0, BoundsRounding::Fractional);
		assert_eq!(vp.pixel_ratio, 2.0);
		assert_eq!((vp.backing_width, vp.backing_height), (600, 200));
	}

	#[test]
	fn invalid_pixel_ratio_counts_as_one() {
		for dpr in [0.0, -1.0, f64::NAN, f64::INFINITY] {
			let vp = Viewport::measure(10.0, 10.0, dpr, BoundsRounding::Fractional);
			assert_eq!(vp.pixel_ratio, 1.0);
		}
	}

	#[test]
	fn whole_rounding_floors_and_keeps_one_pixel() {
		let vp = Viewport::measure(640.7, 0.4, 1.5, BoundsRounding::Whole);
		assert_eq!((vp.width, vp.height), (640.0, 1.0));
		assert_eq!((vp.backing_width, vp.backing_height), (960, 1));
	}

	#[test]
	fn fractional_rounding_keeps_size_but_backing_is_at_least_one() {
		let vp = Viewport::measure(100.5, 0.0, 1.0, BoundsRounding::Fractional);
		assert_eq!(vp.width, 100.5);
		assert_eq!(vp.height, 0.0);
		assert_eq!((vp.backing_width, vp.backing_height), (100, 1));
	}

	proptest! {
		#[test]
		fn count_matches_clamped_formula(
			width in 0.0f64..4000.0,
			height in 0.0f64..3000.0,
			hero in any::<bool>(),
		) {
			let config = if hero { ConstellationConfig::hero() } else { ConstellationConfig::header() };
			let vp = Viewport::measure(width, height, 1.0, config.bounds);
			let d = &config.density;
			let expected = ((vp.area() / d.divisor).floor() as usize)
				.max(d.min)
				.min(d.max.unwrap_or(usize::MAX));
			prop_assert_eq!(vp.particle_count(d), expected);
			prop_assert!(vp.particle_count(d) >= d.min);
		}
	}
}

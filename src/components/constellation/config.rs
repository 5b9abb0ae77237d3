//! Per-instance configuration for the constellation engine.
//!
//! Both page instances run the same simulation and renderer; everything that
//! differs between them lives here. Presets mirror the page's header and hero
//! regions, and either can be adjusted with a JSON object merged over the
//! preset before validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Smallest accepted `density.divisor`: one particle per square pixel.
pub const MIN_DIVISOR: f64 = 1.0;

/// Hard ceiling on any instance's population, whatever its density.
pub const MAX_PARTICLES: usize = 10_000;

/// How the measured container size is turned into field bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsRounding {
	/// Use the fractional size reported by layout.
	Fractional,
	/// Floor to whole pixels, never below 1.
	Whole,
}

/// Particle population derived from container area.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DensityConfig {
	/// Area (px²) per particle.
	pub divisor: f64,
	/// Lower bound on the particle count.
	pub min: usize,
	/// Upper bound on the particle count; `None` leaves only [`MAX_PARTICLES`].
	pub max: Option<usize>,
}

/// Particle motion and pointer attraction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
	/// Half-width of the uniform initial velocity range per axis (units/frame).
	pub speed: f64,
	/// Distance within which the pointer nudges particle velocity.
	pub attraction_radius: f64,
	/// Fraction of the pointer offset added to velocity each frame.
	pub attraction_coefficient: f64,
}

/// Lines between neighbouring particles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
	/// Particles at or beyond this distance are not joined.
	pub max_distance: f64,
	/// Alpha of an edge between coincident particles; fades linearly to 0.
	pub alpha: f64,
	/// Stroke width shared by every line the renderer draws.
	pub line_width: f64,
}

/// Lines from the pointer to nearby particles, plus the pointer marker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerStyle {
	/// Particles closer than this to the pointer get a link.
	pub link_radius: f64,
	/// Alpha of a link at zero distance.
	pub link_alpha: f64,
	/// Radius of the dot drawn at the pointer.
	pub marker_radius: f64,
	/// Alpha of the pointer dot.
	pub marker_alpha: f64,
}

/// Particle dots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DotStyle {
	/// Dot radius.
	pub radius: f64,
	/// Dot alpha.
	pub alpha: f64,
}

/// Complete configuration for one constellation instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstellationConfig {
	/// Name used in log lines.
	pub name: String,
	/// CSS selector of the host container.
	pub container_selector: String,
	/// Class applied to the overlay canvas.
	pub canvas_class: String,
	/// Rounding applied to the measured container size.
	pub bounds: BoundsRounding,
	/// Population sizing.
	pub density: DensityConfig,
	/// Particle motion.
	pub motion: MotionConfig,
	/// Particle-to-particle edges.
	pub edges: EdgeStyle,
	/// Pointer links and marker.
	pub pointer: PointerStyle,
	/// Particle dots.
	pub dots: DotStyle,
}

/// Rejected configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// The merged JSON no longer deserializes into a configuration.
	#[error("override does not match the configuration shape: {0}")]
	Override(#[from] serde_json::Error),
	#[error("{field} must be finite and greater than zero, got {value}")]
	#[allow(missing_docs)]
	NotPositive { field: &'static str, value: f64 },
	/// Would seed more than one particle per square pixel.
	#[error("density.divisor must be at least {min}, got {value}")]
	#[allow(missing_docs)]
	DivisorTooSmall { value: f64, min: f64 },
	#[error("{field} must be finite and not negative, got {value}")]
	#[allow(missing_docs)]
	Negative { field: &'static str, value: f64 },
	#[error("particle count bounds are inverted: min {min} > max {max}")]
	#[allow(missing_docs)]
	InvertedCountBounds { min: usize, max: usize },
	/// A count bound above [`MAX_PARTICLES`].
	#[error("{field} exceeds the particle limit of {limit}, got {value}")]
	#[allow(missing_docs)]
	TooManyParticles {
		field: &'static str,
		value: usize,
		limit: usize,
	},
}

impl ConstellationConfig {
	/// Dense, unbounded field for the page header.
	pub fn header() -> Self {
		Self {
			name: "header".into(),
			container_selector: ".site-header".into(),
			canvas_class: "header-net".into(),
			bounds: BoundsRounding::Fractional,
			density: DensityConfig {
				divisor: 2600.0,
				min: 20,
				max: None,
			},
			motion: MotionConfig {
				speed: 0.225,
				attraction_radius: 140.0,
				attraction_coefficient: 0.0005,
			},
			edges: EdgeStyle {
				max_distance: 120.0,
				alpha: 0.25,
				line_width: 1.0,
			},
			pointer: PointerStyle {
				link_radius: 140.0,
				link_alpha: 0.35,
				marker_radius: 2.4,
				marker_alpha: 0.55,
			},
			dots: DotStyle {
				radius: 1.6,
				alpha: 0.38,
			},
		}
	}

	/// Sparser, clamped field for the hero banner.
	pub fn hero() -> Self {
		Self {
			name: "hero".into(),
			container_selector: ".hero".into(),
			canvas_class: "hero-net".into(),
			bounds: BoundsRounding::Whole,
			density: DensityConfig {
				divisor: 7000.0,
				min: 40,
				max: Some(120),
			},
			motion: MotionConfig {
				speed: 0.225,
				attraction_radius: 150.0,
				attraction_coefficient: 0.0005,
			},
			edges: EdgeStyle {
				max_distance: 130.0,
				alpha: 0.22,
				line_width: 1.0,
			},
			pointer: PointerStyle {
				link_radius: 150.0,
				link_alpha: 0.32,
				marker_radius: 2.6,
				marker_alpha: 0.5,
			},
			dots: DotStyle {
				radius: 1.7,
				alpha: 0.38,
			},
		}
	}

	/// Deep-merges `overrides` over this configuration and validates the result.
	///
	/// Keys absent from `overrides` keep their current value, so a page only
	/// needs to name what it changes, e.g. `{"edges": {"alpha": 0.3}}`.
	pub fn with_overrides(&self, overrides: &Map<String, Value>) -> Result<Self, ConfigError> {
		if overrides.is_empty() {
			return Ok(self.clone());
		}
		let mut merged = serde_json::to_value(self)?;
		merge(&mut merged, &Value::Object(overrides.clone()));
		let config: Self = serde_json::from_value(merged)?;
		config.validate()?;
		Ok(config)
	}

	/// Checks that every numeric parameter can drive the simulation.
	pub fn validate(&self) -> Result<(), ConfigError> {
		positive("density.divisor", self.density.divisor)?;
		if self.density.divisor < MIN_DIVISOR {
			return Err(ConfigError::DivisorTooSmall {
				value: self.density.divisor,
				min: MIN_DIVISOR,
			});
		}
		for (field, value) in [
			("density.min", Some(self.density.min)),
			("density.max", self.density.max),
		] {
			if let Some(value) = value.filter(|&v| v > MAX_PARTICLES) {
				return Err(ConfigError::TooManyParticles {
					field,
					value,
					limit: MAX_PARTICLES,
				});
			}
		}
		if let Some(max) = self.density.max {
			if self.density.min > max {
				return Err(ConfigError::InvertedCountBounds {
					min: self.density.min,
					max,
				});
			}
		}
		for (field, value) in [
			("motion.speed", self.motion.speed),
			("motion.attraction_radius", self.motion.attraction_radius),
			(
				"motion.attraction_coefficient",
				self.motion.attraction_coefficient,
			),
			("edges.max_distance", self.edges.max_distance),
			("edges.alpha", self.edges.alpha),
			("edges.line_width", self.edges.line_width),
			("pointer.link_radius", self.pointer.link_radius),
			("pointer.link_alpha", self.pointer.link_alpha),
			("pointer.marker_radius", self.pointer.marker_radius),
			("pointer.marker_alpha", self.pointer.marker_alpha),
			("dots.radius", self.dots.radius),
			("dots.alpha", self.dots.alpha),
		] {
			non_negative(field, value)?;
		}
		Ok(())
	}
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
	if value.is_finite() && value > 0.0 {
		Ok(())
	} else {
		Err(ConfigError::NotPositive { field, value })
	}
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
	if value.is_finite() && value >= 0.0 {
		Ok(())
	} else {
		Err(ConfigError::Negative { field, value })
	}
}

fn merge(base: &mut Value, overlay: &Value) {
	match (base, overlay) {
		(Value::Object(base), Value::Object(overlay)) => {
			for (key, value) in overlay {
				merge(base.entry(key.clone()).or_insert(Value::Null), value);
			}
		}
		(slot, value) => *slot = value.clone(),
	}
}

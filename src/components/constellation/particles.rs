//! Particle population and per-frame physics.

use super::config::MotionConfig;
use super::state::PointerState;

/// A single drifting point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
	/// Logical x position.
	pub x: f64,
	/// Logical y position.
	pub y: f64,
	/// Horizontal velocity, units per frame.
	pub vx: f64,
	/// Vertical velocity, units per frame.
	pub vy: f64,
}

/// All particles of one constellation plus the bounds they bounce within.
#[derive(Clone, Debug, Default)]
pub struct ParticleField {
	/// The particles, in seeding order.
	pub particles: Vec<Particle>,
	width: f64,
	height: f64,
}

impl ParticleField {
	/// Scatters `count` particles uniformly over `width × height` with
	/// per-axis velocities uniform in `±speed`.
	pub fn seed(count: usize, width: f64, height: f64, speed: f64, rng: &mut fastrand::Rng) -> Self {
		let particles = (0..count)
			.map(|_| Particle {
				x: rng.f64() * width,
				y: rng.f64() * height,
				vx: (rng.f64() - 0.5) * 2.0 * speed,
				vy: (rng.f64() - 0.5) * 2.0 * speed,
			})
			.collect();
		Self {
			particles,
			width,
			height,
		}
	}

	/// Builds a field from explicit particles.
	pub fn from_particles(particles: Vec<Particle>, width: f64, height: f64) -> Self {
		Self {
			particles,
			width,
			height,
		}
	}

	/// Right edge of the field.
	pub fn width(&self) -> f64 {
		self.width
	}

	/// Bottom edge of the field.
	pub fn height(&self) -> f64 {
		self.height
	}

	/// Number of particles.
	pub fn len(&self) -> usize {
		self.particles.len()
	}

	/// Whether the field has no particles.
	pub fn is_empty(&self) -> bool {
		self.particles.is_empty()
	}

	/// Advances one frame.
	///
	/// Frames are assumed evenly spaced; velocities are in units per frame.
	/// A particle past an edge has that axis' velocity reversed but keeps its
	/// position, so it drifts back over the following frames. Pointer pull
	/// accumulates without any speed limit.
	pub fn tick(&mut self, pointer: &PointerState, motion: &MotionConfig) {
		let attractor = pointer.active_position();
		let radius_sq = motion.attraction_radius * motion.attraction_radius;

		for p in &mut self.particles {
			p.x += p.vx;
			p.y += p.vy;

			if p.x < 0.0 || p.x > self.width {
				p.vx = -p.vx;
			}
			if p.y < 0.0 || p.y > self.height {
				p.vy = -p.vy;
			}

			if let Some((px, py)) = attractor {
				let (dx, dy) = (px - p.x, py - p.y);
				if dx * dx + dy * dy < radius_sq {
					p.vx += dx * motion.attraction_coefficient;
					p.vy += dy * motion.attraction_coefficient;
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::constellation::config::ConstellationConfig;
	use proptest::prelude::*;

	fn motion() -> MotionConfig {
		ConstellationConfig::header().motion
	}

	fn single(x: f64, y: f64, vx: f64, vy: f64) -> ParticleField {
		ParticleField::from_particles(vec![Particle { x, y, vx, vy }], 100.0, 100.0)
	}

	#[test]
	fn seed_respects_count_bounds_and_speed() {
		let mut rng = fastrand::Rng::with_seed(7);
		let field = ParticleField::seed(500, 320.0, 80.0, 0.225, &mut rng);
		assert_eq!(field.len(), 500);
		for p in &field.particles {
			assert!((0.0..=320.0).contains(&p.x));
			assert!((0.0..=80.0).contains(&p.y));
			assert!(p.vx.abs() <= 0.225);
			assert!(p.vy.abs() <= 0.225);
		}
	}

	#[test]
	fn reseeding_replaces_particles() {
		let mut rng = fastrand::Rng::with_seed(1);
		let first = ParticleField::seed(30, 200.0, 200.0, 0.225, &mut rng);
		let second = ParticleField::seed(30, 200.0, 200.0, 0.225, &mut rng);
		assert_ne!(first.particles, second.particles);
	}

	#[test]
	fn overshoot_flips_velocity_without_clamping() {
		let mut field = single(99.9, 50.0, 0.2, 0.0);
		field.tick(&PointerState::default(), &motion());
		let p = field.particles[0];
		assert!(p.x > 100.0);
		assert_eq!(p.vx, -0.2);

		field.tick(&PointerState::default(), &motion());
		let p = field.particles[0];
		assert!((p.x - 99.9).abs() < 1e-9);
		assert_eq!(p.vx, -0.2);
	}

	#[test]
	fn attraction_nudges_toward_active_pointer() {
		let mut field = single(50.0, 50.0, 0.0, 0.0);
		let mut pointer = PointerState::default();
		pointer.move_to(60.0, 40.0);
		field.tick(&pointer, &motion());
		let p = field.particles[0];
		assert!((p.vx - 10.0 * 0.0005).abs() < 1e-12);
		assert!((p.vy + 10.0 * 0.0005).abs() < 1e-12);
	}

	#[test]
	fn no_attraction_beyond_radius() {
		let mut field = ParticleField::from_particles(
			vec![Particle {
				x: 0.0,
				y: 0.0,
				vx: 0.0,
				vy: 0.0,
			}],
			1000.0,
			1000.0,
		);
		let mut pointer = PointerState::default();
		pointer.move_to(140.0, 0.0);
		field.tick(&pointer, &motion());
		assert_eq!(field.particles[0].vx, 0.0);
	}

	#[test]
	fn stale_pointer_does_not_attract() {
		let mut field = single(50.0, 50.0, 0.0, 0.0);
		let mut pointer = PointerState::default();
		pointer.move_to(55.0, 55.0);
		pointer.leave();
		assert_eq!((pointer.x, pointer.y), (55.0, 55.0));

		field.tick(&pointer, &motion());
		assert_eq!(field.particles[0].vx, 0.0);
		assert_eq!(field.particles[0].vy, 0.0);
	}

	#[test]
	fn sustained_attraction_grows_speed_unbounded() {
		let mut field = ParticleField::from_particles(
			vec![Particle {
				x: 50.0,
				y: 50.0,
				vx: 0.0,
				vy: 0.0,
			}],
			1.0e6,
			1.0e6,
		);
		let mut pointer = PointerState::default();
		for _ in 0..200 {
			let p = field.particles[0];
			// Keep the pointer 100 units ahead of where the particle lands.
			pointer.move_to(p.x + p.vx + 100.0, p.y);
			field.tick(&pointer, &motion());
		}
		let vx = field.particles[0].vx;
		assert!((vx - 200.0 * 100.0 * 0.0005).abs() < 1e-6, "vx = {vx}");
	}

	proptest! {
		#[test]
		fn tick_integrates_pre_tick_velocity(
			x in -50.0f64..150.0,
			y in -50.0f64..150.0,
			vx in -5.0f64..5.0,
			vy in -5.0f64..5.0,
		) {
			let mut field = single(x, y, vx, vy);
			field.tick(&PointerState::default(), &motion());
			let p = field.particles[0];
			prop_assert_eq!(p.x, x + vx);
			prop_assert_eq!(p.y, y + vy);
		}

		#[test]
		fn out_of_bounds_flips_sign_for_any_overshoot(
			x in -1.0e6f64..1.0e6,
			vx in -10.0f64..10.0,
		) {
			let mut field = single(x, 50.0, vx, 0.0);
			field.tick(&PointerState::default(), &motion());
			let p = field.particles[0];
			if p.x < 0.0 || p.x > 100.0 {
				prop_assert_eq!(p.vx, -vx);
			} else {
				prop_assert_eq!(p.vx, vx);
			}
		}
	}
}

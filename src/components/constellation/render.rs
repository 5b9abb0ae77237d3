//! Canvas rendering for the constellation.
//!
//! One frame is drawn in passes, back to front:
//! 1. Clear
//! 2. Edges between particles closer than the edge distance
//! 3. Pointer links and the pointer marker (only while the pointer is active)
//! 4. Particle dots
//!
//! Every element uses the theme color; only alpha varies.

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::ConstellationState;
use super::theme::Rgb;

/// The drawing operations the renderer needs, in logical coordinates.
pub trait Surface {
	/// Erases the `width × height` region at the origin.
	fn clear(&mut self, width: f64, height: f64);
	/// Sets the stroke width for subsequent lines.
	fn set_line_width(&mut self, width: f64);
	/// Strokes one straight line.
	fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgb, alpha: f64);
	/// Fills one full circle.
	fn fill_circle(&mut self, center: (f64, f64), radius: f64, color: Rgb, alpha: f64);
}

impl Surface for CanvasRenderingContext2d {
	fn clear(&mut self, width: f64, height: f64) {
		self.clear_rect(0.0, 0.0, width, height);
	}

	fn set_line_width(&mut self, width: f64) {
		CanvasRenderingContext2d::set_line_width(self, width);
	}

	fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgb, alpha: f64) {
		self.set_stroke_style_str(&color.rgba(alpha));
		self.begin_path();
		self.move_to(from.0, from.1);
		self.line_to(to.0, to.1);
		self.stroke();
	}

	fn fill_circle(&mut self, center: (f64, f64), radius: f64, color: Rgb, alpha: f64) {
		self.set_fill_style_str(&color.rgba(alpha));
		self.begin_path();
		let _ = self.arc(center.0, center.1, radius, 0.0, PI * 2.0);
		self.fill();
	}
}

/// Linear fade from `base` at distance 0 to 0 at `max`.
pub fn fade_alpha(base: f64, distance: f64, max: f64) -> f64 {
	base * (1.0 - distance / max)
}

/// Renders the complete frame.
pub fn render(state: &ConstellationState, surface: &mut impl Surface) {
	surface.clear(state.viewport.width, state.viewport.height);
	draw_edges(state, surface);
	if let Some(pointer) = state.pointer.active_position() {
		draw_pointer_links(state, pointer, surface);
	}
	draw_dots(state, surface);
}

fn draw_edges(state: &ConstellationState, surface: &mut impl Surface) {
	let style = &state.config.edges;
	let max_sq = style.max_distance * style.max_distance;
	let particles = &state.field.particles;
	surface.set_line_width(style.line_width);

	for (i, a) in particles.iter().enumerate() {
		for b in &particles[i + 1..] {
			let (dx, dy) = (a.x - b.x, a.y - b.y);
			let d2 = dx * dx + dy * dy;
			if d2 < max_sq {
				let alpha = fade_alpha(style.alpha, d2.sqrt(), style.max_distance);
				surface.stroke_line((a.x, a.y), (b.x, b.y), state.color, alpha);
			}
		}
	}
}

fn draw_pointer_links(state: &ConstellationState, (mx, my): (f64, f64), surface: &mut impl Surface) {
	let style = &state.config.pointer;
	for p in &state.field.particles {
		let (dx, dy) = (mx - p.x, my - p.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < style.link_radius {
			let alpha = fade_alpha(style.link_alpha, dist, style.link_radius);
			surface.stroke_line((mx, my), (p.x, p.y), state.color, alpha);
		}
	}
	surface.fill_circle((mx, my), style.marker_radius, state.color, style.marker_alpha);
}

fn draw_dots(state: &ConstellationState, surface: &mut impl Surface) {
	let style = &state.config.dots;
	for p in &state.field.particles {
		surface.fill_circle((p.x, p.y), style.radius, state.color, style.alpha);
	}
}

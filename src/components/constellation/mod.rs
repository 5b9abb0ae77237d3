//! Particle constellation overlay.
//!
//! Animates drifting points joined by distance-faded lines over a page
//! region, pulling points toward the pointer and following the page theme:
//! - Population sized from container area, reseeded on every resize
//! - Backing store scaled for the display's pixel density (capped at 2×)
//! - Stroke and fill color read from the theme and updated on theme change
//! - A cancellable frame loop, and no canvas at all under reduced motion
//!
//! The header and hero regions run the same engine with different
//! [`ConstellationConfig`] presets.
//!
//! # Example
//!
//! ```ignore
//! use constellation_net::{
//! 	ConstellationCanvas, ConstellationConfig, LoopPhase, ThemeSource, motion_allowed,
//! };
//!
//! let phase = LoopPhase::Uninitialized.on_mount(motion_allowed());
//! let theme = ThemeSource::observe_document();
//! view! { <ConstellationCanvas config=ConstellationConfig::hero() theme=theme phase=phase /> }
//! ```

mod component;
pub mod config;
mod particles;
mod render;
mod scheduler;
mod state;
pub mod theme;
mod types;
pub mod viewport;

pub use component::{Constellation, ConstellationCanvas, motion_allowed};
pub use config::{ConfigError, ConstellationConfig};
pub use particles::{Particle, ParticleField};
pub use render::Surface;
pub use scheduler::{FrameLoop, LoopPhase};
pub use state::{ConstellationState, PointerState};
pub use theme::{Rgb, ThemeSource, ThemeSubject};
pub use types::PageOverrides;

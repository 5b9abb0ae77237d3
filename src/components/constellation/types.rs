//! Page-supplied configuration input.

use log::{info, warn};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::config::ConstellationConfig;
use super::scheduler::LoopPhase;

/// Optional JSON overrides for each page instance, keyed by region.
///
/// ```json
/// { "hero": { "density": { "max": 90 } } }
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PageOverrides {
	/// Merged over [`ConstellationConfig::header`].
	#[serde(default)]
	pub header: Map<String, Value>,
	/// Merged over [`ConstellationConfig::hero`].
	#[serde(default)]
	pub hero: Map<String, Value>,
}

impl PageOverrides {
	/// The instances to mount for a page whose mount decision is `phase`.
	///
	/// Empty unless `phase` schedules frames, so a declined page resolves no
	/// configuration and builds no state.
	pub fn mount_plan(&self, phase: LoopPhase) -> Vec<ConstellationConfig> {
		if !phase.schedules_frames() {
			info!("constellation: {:?}, mounting nothing", phase);
			return Vec::new();
		}
		self.instances()
	}

	/// Resolves the header and hero configurations, in that order.
	///
	/// A rejected override is logged and its preset used unchanged.
	pub fn instances(&self) -> Vec<ConstellationConfig> {
		[
			(ConstellationConfig::header(), &self.header),
			(ConstellationConfig::hero(), &self.hero),
		]
		.into_iter()
		.map(|(preset, overrides)| match preset.with_overrides(overrides) {
			Ok(config) => config,
			Err(e) => {
				warn!(
					"constellation: ignoring {} overrides: {}",
					preset.name, e
				);
				preset
			}
		})
		.collect()
	}
}

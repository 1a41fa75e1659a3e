// Copyright 2026 bcnode contributors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The configuration surface spec.md §6 names ("CLI / env / config, out of
//! scope, except that the core reads the following configuration values"),
//! plus the ambient operational knobs SPEC_FULL.md §4.11 carries forward
//! from the original source's `node::settings`.

use std::fs;
use std::path::Path;

use bcn_types::CheckpointTable;
use bcn_util::LoggingConfig;

use crate::error::ConfigError;

/// Full node configuration. Every field here is one spec.md §6 names as
/// in scope, plus the handful of supplemental ambient fields SPEC_FULL.md
/// §4.11 documents (`thread_priority` through `defer_confirmation` below).
#[derive(Debug, Clone, serde_derive::Serialize, serde_derive::Deserialize)]
#[serde(default)]
pub struct Settings {
	pub logging: LoggingConfig,

	/// Standard deviations below the mean download speed a channel may fall
	/// before `ChaserCheck` evicts it.
	pub allowed_deviation: f32,
	/// Prefer header-first sync over blocks-first when the peer supports it.
	pub headers_first: bool,
	/// Delay accepting inbound connections until initial sync completes.
	pub delay_inbound: bool,
	/// Maximum number of in-flight download batches.
	pub maximum_concurrency: u32,
	/// Maximum heights `ChaserValidate`/`ChaserConfirm` will race ahead of
	/// the last processed height.
	pub maximum_backlog: u32,
	/// Performance-timer sampling period for channel speed measurement.
	pub sample_period_seconds: u16,
	/// Window, in minutes, a header's timestamp may diverge from local time
	/// and still be accepted (structural check only; no script evaluation).
	pub currency_window_minutes: u32,
	/// Capacity of the announcement-suppression ("no echo") cache.
	pub announcement_cache: u16,
	/// Serve BIP157 compact filters if configured and the peer advertises
	/// the service bit.
	pub witness_node: bool,
	/// Install tx-in/tx-out protocols when the peer's version permits.
	pub enable_relay: bool,
	/// Upper bound advertised for the node's own service bits.
	pub services_maximum: u64,
	/// Checkpoint/milestone table consulted by the organize engine.
	pub checkpoints: CheckpointTable,

	/// Scheduling priority hint for the node's worker threads (supplemental,
	/// `node::settings::thread_priority` in the original).
	pub thread_priority: i8,
	/// Scheduling priority hint affecting page/working-set eviction under
	/// memory pressure (supplemental, `node::settings::memory_priority`).
	pub memory_priority: i8,
	/// Minimum free-space ratio `ChaserStorage` requires before resuming.
	pub minimum_free_rate: f32,
	/// Minimum fraction of a download batch that must complete before
	/// `ChaserCheck` treats a bump as progress rather than starvation.
	pub minimum_bump_rate: f32,
	/// Defer `ChaserValidate` until explicitly bumped rather than racing
	/// ahead automatically on every `checked` event.
	pub defer_validation: bool,
	/// Defer `ChaserConfirm` until explicitly bumped rather than racing
	/// ahead automatically on every `valid` event.
	pub defer_confirmation: bool,
}

impl Default for Settings {
	fn default() -> Settings {
		Settings {
			logging: LoggingConfig::default(),
			allowed_deviation: 3.0,
			headers_first: true,
			delay_inbound: false,
			maximum_concurrency: 8,
			maximum_backlog: 1024,
			sample_period_seconds: 10,
			currency_window_minutes: 120,
			announcement_cache: 1000,
			witness_node: false,
			enable_relay: true,
			services_maximum: 0,
			checkpoints: CheckpointTable::default(),
			thread_priority: 0,
			memory_priority: 0,
			minimum_free_rate: 0.1,
			minimum_bump_rate: 0.0,
			defer_validation: false,
			defer_confirmation: false,
		}
	}
}

impl Settings {
	/// Load settings from a TOML file, falling back to `Settings::default`
	/// for any field the file omits (`#[serde(default)]` above).
	pub fn from_file(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
		let path = path.as_ref();
		let contents = fs::read_to_string(path).map_err(|e| ConfigError::FileIo(path.display().to_string(), e.to_string()))?;
		toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.display().to_string(), e.to_string()))
	}
}

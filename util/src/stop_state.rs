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

//! Process-wide suspend/fault flags (spec.md §5 "Suspension points", §7
//! "Store faults"). Network connectors/acceptors and chasers consult this
//! before accepting new work; `StorageChaser` flips `suspended` while disk
//! space is insufficient, any chaser flips `faulted` on a fatal store error.

use parking_lot::RwLock;

/// Shared suspend/fault state. Cheap to clone (wraps `Arc`-free `RwLock`
/// behind a reference the caller already holds via `Arc<StopState>`).
pub struct StopState {
	suspended: RwLock<bool>,
	faulted: RwLock<bool>,
}

impl StopState {
	/// A fresh, unsuspended, unfaulted state.
	pub fn new() -> StopState {
		StopState {
			suspended: RwLock::new(false),
			faulted: RwLock::new(false),
		}
	}

	/// True while network connectors/acceptors should refuse new peers.
	pub fn is_suspended(&self) -> bool {
		*self.suspended.read()
	}

	/// Suspend all existing and future network connections.
	pub fn suspend(&self) {
		*self.suspended.write() = true;
	}

	/// Resume network connections following a prior suspend.
	pub fn resume(&self) {
		*self.suspended.write() = false;
	}

	/// True once a chaser has reported a fatal store fault; the process is
	/// expected to restart after operator intervention (spec.md §7).
	pub fn is_faulted(&self) -> bool {
		*self.faulted.read()
	}

	/// Record a fatal fault. Also suspends the node: faults always imply
	/// suspension, though not every suspension implies a fault.
	pub fn fault(&self) {
		*self.faulted.write() = true;
		self.suspend();
	}
}

impl Default for StopState {
	fn default() -> Self {
		StopState::new()
	}
}

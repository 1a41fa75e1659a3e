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

//! Checkpoint and milestone boundaries (spec.md §6: "`checkpoints`
//! (list<hash, height>), `milestone` (hash, height)"; spec.md §5.2: "Under
//! a configured milestone height or an explicit checkpoint, only identity
//! checks are required; above, full acceptance").

use crate::hash::HeaderHash;
use crate::ids::Height;

/// A hash pinned at a specific height. A header matching neither hash nor
/// height is rejected outright; one matching both skips full validation
/// and is accepted on identity alone.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct Checkpoint {
	pub hash: HeaderHash,
	pub height: Height,
}

/// The single highest checkpoint below which even unlisted headers are
/// fast-pathed: "below milestone/checkpoint the chaser simply advances its
/// position" (spec.md §5.2).
pub type Milestone = Checkpoint;

/// The configured set of checkpoints plus the milestone boundary, queried
/// by `ChaserValidate` on every header below which full validation may be
/// skipped.
#[derive(Debug, Clone, Default, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct CheckpointTable {
	pub checkpoints: Vec<Checkpoint>,
	pub milestone: Option<Milestone>,
}

impl CheckpointTable {
	/// True if `height` is at or below the configured milestone.
	pub fn below_milestone(&self, height: Height) -> bool {
		self.milestone.map(|m| height <= m.height).unwrap_or(false)
	}

	/// The checkpoint pinned at `height`, if any.
	pub fn checkpoint_at(&self, height: Height) -> Option<&Checkpoint> {
		self.checkpoints.iter().find(|c| c.height == height)
	}
}

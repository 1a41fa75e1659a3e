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

//! Per-header coordination state (spec.md §3: "`unassociated →
//! associated(body present) → checked → valid → confirmable → confirmed`
//! and the terminal `unconfirmable`. Transitions are monotonic with the
//! one exception of `confirmed → reorganized`, which only the
//! `ConfirmChaser` may perform").

/// The state a `HeaderLink` occupies in its lifecycle. Ordered so that
/// `as u8` reflects forward-progress order, which `is_forward_of` relies on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde_derive::Serialize, serde_derive::Deserialize)]
pub enum HeaderState {
	/// Archived by header-first sync; no block body yet.
	Unassociated,
	/// Block body has been downloaded and archived.
	Associated,
	/// Context checks (structural, no script evaluation) passed.
	Checked,
	/// Full validation (consensus rules) passed.
	Valid,
	/// Eligible to extend the confirmed chain once its ancestors confirm.
	Confirmable,
	/// Part of the confirmed chain.
	Confirmed,
	/// Failed validation or was displaced by a stronger branch; terminal.
	Unconfirmable,
	/// Was confirmed, then popped by a reorganization. Only `ConfirmChaser`
	/// may produce this transition, and only from `Confirmed`.
	Reorganized,
}

impl HeaderState {
	fn rank(self) -> u8 {
		match self {
			HeaderState::Unassociated => 0,
			HeaderState::Associated => 1,
			HeaderState::Checked => 2,
			HeaderState::Valid => 3,
			HeaderState::Confirmable => 4,
			HeaderState::Confirmed => 5,
			HeaderState::Unconfirmable => 6,
			HeaderState::Reorganized => 6,
		}
	}

	/// True if `self -> next` is a transition the state graph allows.
	/// `Confirmed -> Reorganized` is the sole exception to strict forward
	/// progress, and is gated separately by `can_reorganize`, not here.
	pub fn can_advance_to(self, next: HeaderState) -> bool {
		if next == HeaderState::Unconfirmable {
			return !matches!(self, HeaderState::Confirmed | HeaderState::Unconfirmable | HeaderState::Reorganized);
		}
		next.rank() == self.rank() + 1
	}

	/// True only for the reserved `Confirmed -> Reorganized` exception
	/// (spec.md §3 "Key invariants"): every other regression is disallowed.
	pub fn can_reorganize(self, next: HeaderState) -> bool {
		self == HeaderState::Confirmed && next == HeaderState::Reorganized
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn forward_chain_is_allowed_step_by_step() {
		let chain = [
			HeaderState::Unassociated,
			HeaderState::Associated,
			HeaderState::Checked,
			HeaderState::Valid,
			HeaderState::Confirmable,
			HeaderState::Confirmed,
		];
		for pair in chain.windows(2) {
			assert!(pair[0].can_advance_to(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
		}
	}

	#[test]
	fn skipping_a_stage_is_rejected() {
		assert!(!HeaderState::Unassociated.can_advance_to(HeaderState::Checked));
	}

	#[test]
	fn unconfirmable_reachable_from_any_non_terminal_state() {
		assert!(HeaderState::Unassociated.can_advance_to(HeaderState::Unconfirmable));
		assert!(HeaderState::Checked.can_advance_to(HeaderState::Unconfirmable));
		assert!(!HeaderState::Confirmed.can_advance_to(HeaderState::Unconfirmable));
	}

	#[test]
	fn only_confirm_chaser_path_permits_reorganized() {
		assert!(HeaderState::Confirmed.can_reorganize(HeaderState::Reorganized));
		assert!(!HeaderState::Valid.can_reorganize(HeaderState::Reorganized));
		assert!(!HeaderState::Confirmed.can_advance_to(HeaderState::Reorganized));
	}
}

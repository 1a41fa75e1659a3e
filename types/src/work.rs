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

//! Accumulated chain work, summed as a 256-bit integer (spec.md §4.2:
//! "Numeric work is summed as 256-bit integers; overflow is impossible
//! within reachable chain bounds").

use std::fmt;
use std::ops::Add;

/// A 256-bit unsigned accumulator of proof-of-work "bits" converted to
/// work units, stored as four big-endian `u64` limbs (most-significant
/// first).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct Work([u64; 4]);

impl Work {
	/// The zero-work value, the work of an empty branch.
	pub fn zero() -> Work {
		Work([0; 4])
	}

	/// Build from a single `u64` (the common case: per-header work derived
	/// from `bits`).
	pub fn from_u64(value: u64) -> Work {
		Work([0, 0, 0, value])
	}

	/// Checked addition. `spec.md` documents overflow as unreachable within
	/// real chain bounds; rather than silently wrap we panic, consistent
	/// with "panics reserved for invariants the code believes impossible"
	/// (spec.md §9).
	pub fn checked_add(self, other: Work) -> Work {
		let mut result = [0u64; 4];
		let mut carry: u128 = 0;
		for i in (0..4).rev() {
			let sum = self.0[i] as u128 + other.0[i] as u128 + carry;
			result[i] = sum as u64;
			carry = sum >> 64;
		}
		assert_eq!(carry, 0, "256-bit work accumulator overflowed");
		Work(result)
	}
}

impl Add for Work {
	type Output = Work;
	fn add(self, other: Work) -> Work {
		self.checked_add(other)
	}
}

impl fmt::Display for Work {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(
			f,
			"{:016x}{:016x}{:016x}{:016x}",
			self.0[0], self.0[1], self.0[2], self.0[3]
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn add_carries_across_limbs() {
		let a = Work([0, 0, 0, u64::MAX]);
		let b = Work::from_u64(1);
		let sum = a + b;
		assert_eq!(sum, Work([0, 0, 1, 0]));
	}

	#[test]
	fn ordering_compares_most_significant_first() {
		let small = Work::from_u64(5);
		let big = Work([0, 0, 1, 0]);
		assert!(small < big);
	}

	#[test]
	#[should_panic(expected = "overflowed")]
	fn overflow_panics() {
		let max = Work([u64::MAX; 4]);
		let _ = max + Work::from_u64(1);
	}
}

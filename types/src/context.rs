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

//! Derived per-header context (spec.md §3: "Stored with a derived
//! context: `{flags, median_time_past, height, min_block_version,
//! work_required}`").

use crate::ids::Height;

bitflags::bitflags! {
	/// Soft-fork / validation flags active for a header's height, carried
	/// alongside the header rather than recomputed on every touch.
	#[derive(Default)]
	pub struct ContextFlags: u32 {
		/// BIP16 P2SH evaluation is active.
		const BIP16 = 0b0000_0001;
		/// BIP34 (height in coinbase) is active.
		const BIP34 = 0b0000_0010;
		/// BIP65 (CHECKLOCKTIMEVERIFY) is active.
		const BIP65 = 0b0000_0100;
		/// BIP66 (strict DER) is active.
		const BIP66 = 0b0000_1000;
		/// BIP68/112/113 (relative locktime) is active.
		const BIP68 = 0b0001_0000;
		/// Segregated witness is active.
		const BIP141 = 0b0010_0000;
	}
}

impl serde::Serialize for ContextFlags {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_u32(self.bits())
	}
}

impl<'de> serde::Deserialize<'de> for ContextFlags {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let bits = u32::deserialize(deserializer)?;
		Ok(ContextFlags::from_bits_truncate(bits))
	}
}

/// Context derived for a header at organize time; required to validate its
/// block body later without recomputing ancestor-dependent values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct ChainContext {
	/// Soft-fork flags active at this height.
	pub flags: ContextFlags,
	/// Median of the preceding eleven headers' timestamps.
	pub median_time_past: u32,
	/// Height of the header this context belongs to.
	pub height: Height,
	/// Minimum header version acceptable at this height (BIP9-style).
	pub min_block_version: u32,
	/// Target difficulty bits required of this header.
	pub work_required: u32,
}

impl ChainContext {
	/// Context for the genesis header: no ancestors, no flags yet active.
	pub fn genesis(work_required: u32) -> ChainContext {
		ChainContext {
			flags: ContextFlags::empty(),
			median_time_past: 0,
			height: 0,
			min_block_version: 1,
			work_required,
		}
	}
}

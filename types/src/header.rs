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

//! Block header (spec.md §3: "Carries previous hash, bits, timestamp,
//! version, Merkle root, nonce").

use crate::hash::HeaderHash;

/// A block header as received over the wire and archived by hash.
///
/// Headers are immutable once constructed; the mutable state attached to a
/// header (status, context, work) lives alongside it in the store, not on
/// this type, so the same `Header` value can be shared between the
/// candidate and confirmed views without cloning.
#[derive(Debug, Clone, PartialEq, Eq, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct Header {
	/// Protocol version this header was produced under.
	pub version: u32,
	/// Hash of the immediate parent header.
	pub previous_hash: HeaderHash,
	/// Root of the Merkle tree over the block's transactions.
	pub merkle_root: HeaderHash,
	/// Seconds since the Unix epoch, as claimed by the miner.
	pub timestamp: u32,
	/// Compact target encoding ("nBits").
	pub bits: u32,
	/// Proof-of-work nonce.
	pub nonce: u32,
}

impl Header {
	/// Hash this header. Double-hash is assumed throughout the workspace;
	/// the actual digest function lives outside this crate's scope (the
	/// byte layout is fixed, the hashing primitive is supplied by a
	/// caller that owns the cryptography dependency).
	pub fn id<F>(&self, hash_fn: F) -> HeaderHash
	where
		F: FnOnce(&Header) -> HeaderHash,
	{
		hash_fn(self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::hash::ZERO_HASH;

	#[test]
	fn id_delegates_to_supplied_hasher() {
		let header = Header {
			version: 1,
			previous_hash: ZERO_HASH,
			merkle_root: ZERO_HASH,
			timestamp: 0,
			bits: 0x1d00ffff,
			nonce: 0,
		};
		let id = header.id(|_| HeaderHash::from_slice(&[7u8; 32]));
		assert_eq!(id, HeaderHash::from_slice(&[7u8; 32]));
	}
}

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

//! Fixed-size hash used to key headers, blocks and transactions
//! (spec.md §3 "Header").

use std::fmt;

/// A 32-byte double-hash digest identifying a header, block or transaction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct HeaderHash(pub [u8; 32]);

/// All-zero hash, used as the previous-hash of genesis.
pub const ZERO_HASH: HeaderHash = HeaderHash([0u8; 32]);

impl HeaderHash {
	/// Build a hash from a byte slice. Panics if `bytes` is not 32 long —
	/// callers pass wire-validated data, this is an internal invariant.
	pub fn from_slice(bytes: &[u8]) -> HeaderHash {
		let mut out = [0u8; 32];
		out.copy_from_slice(bytes);
		HeaderHash(out)
	}

	/// Borrow the underlying bytes.
	pub fn as_bytes(&self) -> &[u8; 32] {
		&self.0
	}
}

impl fmt::Display for HeaderHash {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for byte in self.0.iter() {
			write!(f, "{:02x}", byte)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_is_lowercase_hex() {
		let mut bytes = [0u8; 32];
		bytes[0] = 0xab;
		bytes[31] = 0x01;
		let hash = HeaderHash(bytes);
		let text = format!("{}", hash);
		assert_eq!(text.len(), 64);
		assert!(text.starts_with("ab"));
		assert!(text.ends_with("01"));
	}

	#[test]
	fn from_slice_round_trips() {
		let bytes: Vec<u8> = (0..32).collect();
		let hash = HeaderHash::from_slice(&bytes);
		assert_eq!(hash.as_bytes().to_vec(), bytes);
	}
}

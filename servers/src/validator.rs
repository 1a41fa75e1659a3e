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

//! Structural-only `Validator` implementation: the header/script/consensus
//! rules themselves are out of scope (spec.md §1 Non-goals), so this only
//! supplies what the organize engine cannot do without: a timestamp bound
//! and a content hash. Real consensus validation is a caller concern one
//! layer above this crate.

use chrono::Utc;
use sha2::{Digest, Sha256};

use bcn_chain::Validator;
use bcn_types::{Block, ChainContext, Header, HeaderHash, Height};

/// Shared by both the header and block organize engines; stateless aside
/// from the configured timestamp tolerance, so it is cheap to instantiate
/// twice (once per engine).
#[derive(Clone)]
pub struct StructuralValidator {
	currency_window_seconds: i64,
}

impl StructuralValidator {
	pub fn new(currency_window_minutes: u32) -> StructuralValidator {
		StructuralValidator { currency_window_seconds: i64::from(currency_window_minutes) * 60 }
	}

	fn validate_header(&self, header: &Header, below_milestone: bool) -> Result<(), String> {
		if below_milestone {
			return Ok(());
		}
		let now = Utc::now().timestamp();
		let claimed = i64::from(header.timestamp);
		if claimed > now + self.currency_window_seconds {
			return Err(format!("timestamp {} too far in the future", header.timestamp));
		}
		Ok(())
	}
}

impl Validator<Header> for StructuralValidator {
	fn validate(&self, entity: &Header, _context: &ChainContext, below_milestone: bool) -> Result<(), String> {
		self.validate_header(entity, below_milestone)
	}

	fn derive_context(&self, header: &Header, height: Height, parent: &ChainContext) -> ChainContext {
		ChainContext { height, ..parent.clone() }
	}

	fn identity(&self, header: &Header) -> HeaderHash {
		identity(header)
	}
}

impl Validator<Block> for StructuralValidator {
	fn validate(&self, entity: &Block, _context: &ChainContext, below_milestone: bool) -> Result<(), String> {
		self.validate_header(&entity.header, below_milestone)?;
		if entity.transactions.is_empty() {
			return Err("block carries no transactions".to_owned());
		}
		if !entity.transactions[0].is_coinbase() {
			return Err("first transaction is not a coinbase".to_owned());
		}
		Ok(())
	}

	fn derive_context(&self, header: &Header, height: Height, parent: &ChainContext) -> ChainContext {
		ChainContext { height, ..parent.clone() }
	}

	fn identity(&self, header: &Header) -> HeaderHash {
		identity(header)
	}
}

/// Free-standing double-SHA256 identity function, usable anywhere a plain
/// `Fn(&Header) -> HeaderHash` is needed (peer session installation) rather
/// than a full `StructuralValidator`.
pub fn identity(header: &Header) -> HeaderHash {
	let mut bytes = Vec::with_capacity(80);
	bytes.extend_from_slice(&header.version.to_le_bytes());
	bytes.extend_from_slice(header.previous_hash.as_bytes());
	bytes.extend_from_slice(header.merkle_root.as_bytes());
	bytes.extend_from_slice(&header.timestamp.to_le_bytes());
	bytes.extend_from_slice(&header.bits.to_le_bytes());
	bytes.extend_from_slice(&header.nonce.to_le_bytes());

	let first = Sha256::digest(&bytes);
	let second = Sha256::digest(first);
	HeaderHash::from_slice(&second)
}

#[cfg(test)]
mod tests {
	use super::*;
	use bcn_types::ZERO_HASH;

	fn header(nonce: u32) -> Header {
		Header { version: 1, previous_hash: ZERO_HASH, merkle_root: ZERO_HASH, timestamp: 0, bits: 0x1d00_ffff, nonce }
	}

	#[test]
	fn identical_headers_hash_identically() {
		let validator = StructuralValidator::new(120);
		assert_eq!(validator.identity(&header(1)), validator.identity(&header(1)));
	}

	#[test]
	fn different_nonces_hash_differently() {
		let validator = StructuralValidator::new(120);
		assert_ne!(validator.identity(&header(1)), validator.identity(&header(2)));
	}

	#[test]
	fn below_milestone_skips_timestamp_check() {
		let validator = StructuralValidator::new(0);
		let far_future = Header { timestamp: u32::MAX, ..header(1) };
		assert!(validator.validate_header(&far_future, true).is_ok());
	}

	#[test]
	fn above_milestone_rejects_far_future_timestamp() {
		let validator = StructuralValidator::new(1);
		let far_future = Header { timestamp: u32::MAX, ..header(1) };
		assert!(validator.validate_header(&far_future, false).is_err());
	}
}

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

//! Block body (spec.md §3: "a header plus a sequence of transactions;
//! zero-copy: the whole object graph for one block is allocated in a
//! single linked-chunk arena owned by the receiving channel").

use std::sync::Arc;

use crate::hash::HeaderHash;
use crate::header::Header;

/// An outpoint: the transaction and output index a transaction input spends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct OutPoint {
	pub tx_hash: HeaderHash,
	pub index: u32,
}

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct Input {
	pub previous_output: OutPoint,
	pub script_sig: Vec<u8>,
	pub sequence: u32,
}

/// A transaction output.
#[derive(Debug, Clone, PartialEq, Eq, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct Output {
	pub value: u64,
	pub script_pubkey: Vec<u8>,
}

/// A transaction, structural fields only. Script evaluation is out of
/// scope (spec.md §1 Non-goals); only the fields needed for structural
/// and double-spend checks are carried.
#[derive(Debug, Clone, PartialEq, Eq, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct Transaction {
	pub hash: HeaderHash,
	pub version: u32,
	pub inputs: Vec<Input>,
	pub outputs: Vec<Output>,
	pub lock_time: u32,
}

impl Transaction {
	/// Coinbase transactions spend no real prior output: the convention is a
	/// single input whose `previous_output` is the all-zero hash.
	pub fn is_coinbase(&self) -> bool {
		self.inputs.len() == 1 && self.inputs[0].previous_output.tx_hash == crate::hash::ZERO_HASH
	}
}

/// An opaque reference to the arena slab chain backing a block's
/// transaction vector. Cloning an `ArenaHandle` is cheap (it is a
/// reference count, not a copy of the arena); the arena stays alive for
/// as long as any clone is retained (spec.md §3 "Arena safety").
#[derive(Clone)]
pub struct ArenaHandle(pub Arc<dyn std::any::Any + Send + Sync>);

impl std::fmt::Debug for ArenaHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "ArenaHandle(..)")
	}
}

/// A full block: header plus body, with the arena that owns the body's
/// backing storage kept alive alongside it.
#[derive(Debug, Clone)]
pub struct Block {
	pub header: Header,
	pub transactions: Vec<Transaction>,
	/// Keeps the owning arena's slabs alive; dropped once the last `Block`
	/// (or clone sharing the same arena) referencing it is dropped.
	pub arena: ArenaHandle,
}

impl Block {
	/// Total serialized size is out of scope here; this counts transactions,
	/// the figure `ChaserCheck`/`ChaserValidate` use for backlog accounting.
	pub fn transaction_count(&self) -> usize {
		self.transactions.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn coinbase_has_all_zero_previous_output() {
		let coinbase = Transaction {
			hash: HeaderHash::from_slice(&[1u8; 32]),
			version: 1,
			inputs: vec![Input {
				previous_output: OutPoint { tx_hash: crate::hash::ZERO_HASH, index: 0xffff_ffff },
				script_sig: vec![],
				sequence: 0,
			}],
			outputs: vec![],
			lock_time: 0,
		};
		assert!(coinbase.is_coinbase());
	}

	#[test]
	fn non_coinbase_is_not_flagged() {
		let spend = Transaction {
			hash: HeaderHash::from_slice(&[2u8; 32]),
			version: 1,
			inputs: vec![Input {
				previous_output: OutPoint { tx_hash: HeaderHash::from_slice(&[3u8; 32]), index: 0 },
				script_sig: vec![],
				sequence: 0,
			}],
			outputs: vec![],
			lock_time: 0,
		};
		assert!(!spend.is_coinbase());
	}
}

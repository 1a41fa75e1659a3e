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

//! Admits standalone transactions into a capacity-bounded pool, keyed by a
//! dense `TxLink`, and announces acceptance on the bus (spec.md §4.9
//! "TransactionChaser"). Driven directly by the block-in protocol's
//! transaction handler rather than by subscribing to events.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use bcn_bus::{Chase, EventBus};
use bcn_types::{HeaderHash, OutPoint, Transaction, TxLink};

use crate::error::{Error, ErrorKind};

/// The confirmed-chain view a transaction's inputs are checked against.
/// Stands in for the original's blockchain UTXO lookup; script evaluation
/// and coin values are out of scope, so this answers only "spendable".
pub trait UtxoView: Send + Sync {
	/// True if `outpoint` is unspent on the confirmed chain.
	fn is_unspent(&self, outpoint: &OutPoint) -> bool;
}

struct PoolEntry {
	link: TxLink,
	transaction: Transaction,
	fee_rate: f64,
	received_at: DateTime<Utc>,
}

/// The pool's internal bookkeeping. Chained mempool spends (a transaction
/// spending another unconfirmed pool transaction's output) are not
/// supported: every input must resolve against the confirmed UTXO view.
struct Pool {
	capacity: usize,
	next_link: u64,
	entries: HashMap<TxLink, PoolEntry>,
	by_hash: HashMap<HeaderHash, TxLink>,
	spent: HashMap<OutPoint, TxLink>,
}

impl Pool {
	fn new(capacity: usize) -> Pool {
		Pool { capacity: capacity.max(1), next_link: 0, entries: HashMap::new(), by_hash: HashMap::new(), spent: HashMap::new() }
	}

	fn len(&self) -> usize {
		self.entries.len()
	}

	fn insert(&mut self, transaction: Transaction, fee_rate: f64) -> TxLink {
		let link = TxLink(self.next_link);
		self.next_link += 1;
		self.by_hash.insert(transaction.hash, link);
		for input in &transaction.inputs {
			self.spent.insert(input.previous_output, link);
		}
		self.entries.insert(link, PoolEntry { link, transaction, fee_rate, received_at: Utc::now() });
		link
	}

	/// Drop the lowest fee-rate entries until the pool is back at capacity,
	/// returning the links evicted.
	fn evict_to_capacity(&mut self) -> Vec<TxLink> {
		let mut evicted = Vec::new();
		while self.entries.len() > self.capacity {
			let lowest = self.entries.values().min_by(|a, b| a.fee_rate.partial_cmp(&b.fee_rate).unwrap_or(std::cmp::Ordering::Equal)).map(|e| e.link);
			let link = match lowest {
				Some(link) => link,
				None => break,
			};
			self.remove(link);
			evicted.push(link);
		}
		evicted
	}

	fn remove(&mut self, link: TxLink) {
		if let Some(entry) = self.entries.remove(&link) {
			self.by_hash.remove(&entry.transaction.hash);
			for input in &entry.transaction.inputs {
				self.spent.remove(&input.previous_output);
			}
		}
	}
}

pub struct TransactionChaser {
	bus: Arc<EventBus>,
	pool: RwLock<Pool>,
}

impl TransactionChaser {
	pub fn new(bus: Arc<EventBus>, capacity: usize) -> Arc<TransactionChaser> {
		Arc::new(TransactionChaser { bus, pool: RwLock::new(Pool::new(capacity)) })
	}

	pub fn len(&self) -> usize {
		self.pool.read().len()
	}

	pub fn contains(&self, hash: &HeaderHash) -> bool {
		self.pool.read().by_hash.contains_key(hash)
	}

	/// Structural and double-spend admission (spec.md §4.9); script and
	/// consensus validation are out of scope. `fee_rate` is supplied by the
	/// caller, which already computed it while checking the transaction.
	/// On success returns the dense link assigned and publishes
	/// `Chase::Transaction`; any evicted-for-capacity links are silent, as
	/// the original makes no announcement for pool departures.
	pub fn accept(&self, transaction: Transaction, fee_rate: f64, utxo: &dyn UtxoView) -> Result<TxLink, Error> {
		if transaction.inputs.is_empty() || transaction.outputs.is_empty() {
			return Err(ErrorKind::Empty.into());
		}

		let mut seen = std::collections::HashSet::new();
		for input in &transaction.inputs {
			if !seen.insert(input.previous_output) {
				return Err(ErrorKind::DuplicateInput.into());
			}
		}

		{
			let pool = self.pool.read();
			if pool.by_hash.contains_key(&transaction.hash) {
				return Err(ErrorKind::AlreadyInPool.into());
			}
			for input in &transaction.inputs {
				if pool.spent.contains_key(&input.previous_output) {
					return Err(ErrorKind::DoubleSpend.into());
				}
			}
		}

		for input in &transaction.inputs {
			if !transaction.is_coinbase() && !utxo.is_unspent(&input.previous_output) {
				return Err(ErrorKind::MissingOutput.into());
			}
		}

		let link = {
			let mut pool = self.pool.write();
			let link = pool.insert(transaction, fee_rate);
			pool.evict_to_capacity();
			link
		};
		self.bus.publish(Chase::Transaction(link));
		Ok(link)
	}
}

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

//! Chases down valid candidate heights and extends the confirmed chain
//! with them, or rolls the confirmed chain back when a shallower branch
//! point arrives first (spec.md §4.5 "ChaserConfirm"). Every mutation of
//! the confirmed chain happens under the store's reorganization lock, so
//! `ChaserSnapshot` never observes it mid-update.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use bcn_bus::{subscribe_events, Chase, EventBus, Flow, ObjectKey};
use bcn_store::Query;
use bcn_types::{Height, HeaderLink, Work};

use crate::confirmed::ConfirmedChain;
use crate::work::header_work;

/// Decides whether a candidate height may extend the confirmed chain,
/// returning the fees collected; generalizes the original's coinbase
/// maturity and connect checks, which are out of scope here.
pub type Confirm = Box<dyn Fn(&dyn Query, HeaderLink) -> Result<u64, String> + Send + Sync>;

pub struct ChaserConfirm {
	query: Arc<dyn Query>,
	bus: Arc<EventBus>,
	confirm: Confirm,
	/// Heights between snapshots; 0 disables the periodic `Chase::Snap`.
	snapshot_interval: Height,
	confirmed: RwLock<ConfirmedChain>,
	target: AtomicU64,
	/// Set by `do_regressed` to the branch point and the work of the
	/// confirmed suffix it just popped. `advance` must see the candidate
	/// chain's replacement suffix beat that work before it re-extends past
	/// the same point, so a stale `valid` event can't re-confirm a branch
	/// no stronger than the one just rolled back (spec.md §4.5 steps 1-2).
	rolled_back: RwLock<Option<(Height, Work)>>,
}

impl ChaserConfirm {
	/// Seeds its local index by walking whatever the store already has
	/// confirmed, so a chaser built against a populated store (restart,
	/// or a test fixture) doesn't try to re-confirm height 0 again.
	pub fn new(query: Arc<dyn Query>, bus: Arc<EventBus>, snapshot_interval: Height, confirm: Confirm) -> Arc<ChaserConfirm> {
		let mut confirmed = ConfirmedChain::new();
		let mut height = 0;
		while let Some(link) = query.to_confirmed(height) {
			confirmed.push(link);
			height += 1;
		}
		Arc::new(ChaserConfirm {
			query,
			bus,
			confirm,
			snapshot_interval,
			confirmed: RwLock::new(confirmed),
			target: AtomicU64::new(0),
			rolled_back: RwLock::new(None),
		})
	}

	pub fn confirmed_top(&self) -> Height {
		self.confirmed.read().top()
	}

	fn work_of(&self, link: HeaderLink) -> Work {
		self.query.get_header(link).map(|header| header_work(header.bits)).unwrap_or_else(Work::zero)
	}

	/// Pop confirmed links above `branch_point`, reorganizing each one, then
	/// clamp the advancement target so `advance` doesn't immediately race
	/// back past the same point. Records the popped suffix's accumulated
	/// work so `advance` can demand its replacement actually beats it.
	fn do_regressed(&self, branch_point: Height) {
		let mut popped_work = Work::zero();
		{
			let _lock = self.query.get_reorganization_lock();
			let mut confirmed = self.confirmed.write();
			while confirmed.len() as u64 > branch_point + 1 {
				let link = match confirmed.pop() {
					Some(link) => link,
					None => break,
				};
				popped_work = popped_work + self.work_of(link);
				if self.query.set_block_reorganized(link).is_ok() {
					self.bus.publish(Chase::Reorganized(link));
				}
			}
		}
		if popped_work > Work::zero() {
			*self.rolled_back.write() = Some((branch_point, popped_work));
		}
		self.target.fetch_min(branch_point, Ordering::SeqCst);
	}

	fn do_valid(&self, height: Height) {
		self.target.fetch_max(height, Ordering::SeqCst);
		self.advance();
	}

	/// Confirm candidate heights in order up to the current target,
	/// stopping at the first height that isn't confirmable yet.
	///
	/// Before rolling forward, checks that the candidate suffix from the
	/// confirmed top up to `target` actually carries more work than
	/// whatever suffix was rolled back from the same branch point
	/// (spec.md §4.5 "no action" gate); this is a no-op once nothing has
	/// been rolled back from here, which is the common case.
	fn advance(&self) {
		let target = self.target.load(Ordering::SeqCst);
		let _lock = self.query.get_reorganization_lock();
		let confirmed_top = self.confirmed.read().top();
		if let Some((branch_point, popped_work)) = *self.rolled_back.read() {
			if branch_point == confirmed_top {
				let mut candidate_work = Work::zero();
				let mut height = branch_point + 1;
				while height <= target {
					match self.query.to_candidate(height) {
						Some(link) => candidate_work = candidate_work + self.work_of(link),
						None => break,
					}
					height += 1;
				}
				if candidate_work <= popped_work {
					return;
				}
			}
		}
		*self.rolled_back.write() = None;
		loop {
			let next = self.confirmed.read().len() as u64;
			if next > target {
				break;
			}
			let link = match self.query.to_candidate(next) {
				Some(link) => link,
				None => break,
			};
			match (self.confirm)(&*self.query, link) {
				Ok(fees) => {
					if self.query.set_block_confirmable(link, fees).is_err() {
						break;
					}
					self.bus.publish(Chase::Confirmable(link));
					if self.query.set_block_confirmed(link, next).is_err() {
						break;
					}
					self.confirmed.write().push(link);
					self.bus.publish(Chase::Organized(link));
					if self.snapshot_interval > 0 && next % self.snapshot_interval == 0 {
						self.bus.publish(Chase::Snap(next));
					}
				}
				Err(_) => {
					let _ = self.query.set_block_unconfirmable(link);
					self.bus.publish(Chase::Unconfirmable(link));
					break;
				}
			}
		}
	}

	pub fn spawn(self: &Arc<Self>) -> ObjectKey {
		let this = Arc::clone(self);
		subscribe_events(&self.bus, move |event| {
			match event {
				Chase::Valid(height) => this.do_valid(height),
				Chase::Bump(_) => this.advance(),
				Chase::Regressed(height) | Chase::Disorganized(height) => this.do_regressed(height),
				Chase::Stop => return Flow::Unsubscribe,
				_ => {}
			}
			Flow::Continue
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bcn_store::MemoryQuery;
	use bcn_types::{ChainContext, Header, HeaderHash, ZERO_HASH};

	/// Stands in for a caller's real identity hash; folds the nonce so
	/// distinct fixtures key distinct hashes.
	fn sample_hash(nonce: u32) -> HeaderHash {
		let mut bytes = [0u8; 32];
		bytes[28..].copy_from_slice(&nonce.to_be_bytes());
		HeaderHash(bytes)
	}

	/// Builds a candidate chain of heights `0..=len`, all checked and
	/// valid, ready for `ChaserConfirm` to attempt.
	fn store_with_chain(len: u32) -> (Arc<MemoryQuery>, Vec<HeaderLink>) {
		let store = Arc::new(MemoryQuery::new());
		let mut links = Vec::new();
		for nonce in 0..=len {
			let header = Header { version: 1, previous_hash: ZERO_HASH, merkle_root: ZERO_HASH, timestamp: 0, bits: 0x1d00_ffff, nonce };
			let context = ChainContext::genesis(0x1d00_ffff);
			let link = store.set_header(header, sample_hash(nonce), context).unwrap();
			store.set_block(link, sample_block(link)).unwrap();
			store.set_block_checked(link).unwrap();
			store.set_block_valid(link, 0).unwrap();
			store.set_candidate(link).unwrap();
			links.push(link);
		}
		(store, links)
	}

	fn sample_block(link: HeaderLink) -> bcn_types::Block {
		let header = Header { version: 1, previous_hash: ZERO_HASH, merkle_root: ZERO_HASH, timestamp: 0, bits: 0x1d00_ffff, nonce: link.0 as u32 };
		bcn_types::Block { header, transactions: Vec::new(), arena: bcn_types::ArenaHandle(std::sync::Arc::new(())) }
	}

	fn accepting() -> Confirm {
		Box::new(|_, _| Ok(0))
	}

	#[test]
	fn confirms_checked_heights_up_to_the_valid_target() {
		let (store, _links) = store_with_chain(3);
		let bus = EventBus::new();
		let chaser = ChaserConfirm::new(store as Arc<dyn Query>, bus, 0, accepting());
		chaser.do_valid(3);
		assert_eq!(chaser.confirmed_top(), 3);
	}

	#[test]
	fn failure_marks_unconfirmable_and_stops() {
		let (store, links) = store_with_chain(3);
		let bus = EventBus::new();
		let failing_link = links[2];
		let confirm: Confirm = Box::new(move |_, link| if link == failing_link { Err("bad connect".into()) } else { Ok(0) });
		let chaser = ChaserConfirm::new(store.clone() as Arc<dyn Query>, bus, 0, confirm);
		chaser.do_valid(3);
		assert_eq!(chaser.confirmed_top(), 1);
		assert_eq!(store.get_state(failing_link).unwrap(), bcn_types::HeaderState::Unconfirmable);
	}

	#[test]
	fn weaker_replacement_suffix_is_not_reconfirmed() {
		let (store, _links) = store_with_chain(4);
		let bus = EventBus::new();
		let chaser = ChaserConfirm::new(Arc::clone(&store) as Arc<dyn Query>, bus, 0, accepting());
		chaser.do_valid(4);
		assert_eq!(chaser.confirmed_top(), 4);

		// Roll back to height 1, then replace heights 2-4 with only two
		// weaker-bits headers: less total work than the three popped.
		chaser.do_regressed(1);
		store.truncate_candidate(2).unwrap();
		for nonce in 100..102 {
			let header = Header { version: 1, previous_hash: ZERO_HASH, merkle_root: ZERO_HASH, timestamp: 0, bits: 0x1e00_ffff, nonce };
			let context = ChainContext::genesis(header.bits);
			let link = store.set_header(header, sample_hash(nonce), context).unwrap();
			store.set_block(link, sample_block(link)).unwrap();
			store.set_block_checked(link).unwrap();
			store.set_block_valid(link, 0).unwrap();
			store.set_candidate(link).unwrap();
		}
		chaser.do_valid(3);
		assert_eq!(chaser.confirmed_top(), 1, "replacement suffix is no stronger than what was rolled back");
	}

	#[test]
	fn stronger_replacement_suffix_is_confirmed() {
		let (store, _links) = store_with_chain(4);
		let bus = EventBus::new();
		let chaser = ChaserConfirm::new(Arc::clone(&store) as Arc<dyn Query>, bus, 0, accepting());
		chaser.do_valid(4);
		assert_eq!(chaser.confirmed_top(), 4);

		chaser.do_regressed(1);
		store.truncate_candidate(2).unwrap();
		for nonce in 100..105 {
			let header = Header { version: 1, previous_hash: ZERO_HASH, merkle_root: ZERO_HASH, timestamp: 0, bits: 0x1d00_ffff, nonce };
			let context = ChainContext::genesis(header.bits);
			let link = store.set_header(header, sample_hash(nonce), context).unwrap();
			store.set_block(link, sample_block(link)).unwrap();
			store.set_block_checked(link).unwrap();
			store.set_block_valid(link, 0).unwrap();
			store.set_candidate(link).unwrap();
		}
		chaser.do_valid(6);
		assert_eq!(chaser.confirmed_top(), 6, "replacement suffix carries strictly more work than what was rolled back");
	}

	#[test]
	fn regression_rolls_back_past_the_branch_point() {
		let (store, _links) = store_with_chain(4);
		let bus = EventBus::new();
		let chaser = ChaserConfirm::new(store as Arc<dyn Query>, bus, 0, accepting());
		chaser.do_valid(4);
		assert_eq!(chaser.confirmed_top(), 4);
		chaser.do_regressed(1);
		assert_eq!(chaser.confirmed_top(), 1);
	}

	#[test]
	fn snapshot_interval_zero_never_requests_a_snapshot() {
		let (store, _links) = store_with_chain(2);
		let bus = EventBus::new();
		let chaser = ChaserConfirm::new(store as Arc<dyn Query>, bus, 0, accepting());
		chaser.do_valid(2);
		assert_eq!(chaser.confirmed_top(), 2);
	}
}

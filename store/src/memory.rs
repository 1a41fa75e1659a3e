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

//! In-memory reference `Query` implementation. Not meant to back a real
//! node (persisted layout is out of scope, spec.md §6); this is the
//! fixture the chain crate's own test suite runs against.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lock_api::RawMutex as _;
use parking_lot::{RawMutex, RwLock};

use bcn_types::{Block, ChainContext, Header, HeaderHash, HeaderLink, HeaderState, Height, Transaction};

use crate::error::{Error, ErrorKind};
use crate::query::{EventHandler, Query, ReorganizationLock};

/// Holds the raw lock taken out by `get_reorganization_lock` and releases
/// it on drop. Built on the raw lock directly (rather than a borrowed
/// `MutexGuard`) because the trait method returns an owned, 'static box.
struct MemoryReorgGuard {
	raw: Arc<RawMutex>,
}

impl Drop for MemoryReorgGuard {
	fn drop(&mut self) {
		unsafe { self.raw.unlock() };
	}
}

impl ReorganizationLock for MemoryReorgGuard {}

/// In-memory storage fixture, thread-safe so that it can be shared across
/// the chasers' respective strands the same way a real facade would be.
pub struct MemoryQuery {
	headers: RwLock<HashMap<HeaderLink, Header>>,
	hash_to_link: RwLock<HashMap<HeaderHash, HeaderLink>>,
	link_to_hash: RwLock<HashMap<HeaderLink, HeaderHash>>,
	contexts: RwLock<HashMap<HeaderLink, ChainContext>>,
	states: RwLock<HashMap<HeaderLink, HeaderState>>,
	blocks: RwLock<HashMap<HeaderLink, Block>>,
	fees: RwLock<HashMap<HeaderLink, u64>>,
	filter_bodies: RwLock<HashMap<HeaderLink, Vec<u8>>>,
	prevouts: RwLock<HashMap<HeaderLink, Vec<u64>>>,
	candidate_chain: RwLock<Vec<HeaderLink>>,
	confirmed_chain: RwLock<Vec<HeaderLink>>,
	next_link: AtomicU64,
	fault: RwLock<bool>,
	reorg_lock: Arc<RawMutex>,
	space_required: AtomicU64,
	space_free: AtomicU64,
}

impl MemoryQuery {
	pub fn new() -> MemoryQuery {
		MemoryQuery {
			headers: RwLock::new(HashMap::new()),
			hash_to_link: RwLock::new(HashMap::new()),
			link_to_hash: RwLock::new(HashMap::new()),
			contexts: RwLock::new(HashMap::new()),
			states: RwLock::new(HashMap::new()),
			blocks: RwLock::new(HashMap::new()),
			fees: RwLock::new(HashMap::new()),
			filter_bodies: RwLock::new(HashMap::new()),
			prevouts: RwLock::new(HashMap::new()),
			candidate_chain: RwLock::new(Vec::new()),
			confirmed_chain: RwLock::new(Vec::new()),
			next_link: AtomicU64::new(0),
			fault: RwLock::new(false),
			reorg_lock: Arc::new(RawMutex::INIT),
			space_required: AtomicU64::new(0),
			space_free: AtomicU64::new(u64::MAX),
		}
	}

	/// Test hook: push a link onto the confirmed chain.
	pub fn push_confirmed(&self, link: HeaderLink) {
		self.confirmed_chain.write().push(link);
	}

	/// Test hook: pop the confirmed chain's top link, if any.
	pub fn pop_confirmed(&self) -> Option<HeaderLink> {
		self.confirmed_chain.write().pop()
	}

	/// Test hook: directly configure the simulated free/required space.
	pub fn set_space(&self, free: u64, required: u64) {
		self.space_free.store(free, Ordering::SeqCst);
		self.space_required.store(required, Ordering::SeqCst);
	}

	fn next(&self) -> HeaderLink {
		HeaderLink(self.next_link.fetch_add(1, Ordering::SeqCst))
	}
}

impl Default for MemoryQuery {
	fn default() -> MemoryQuery {
		MemoryQuery::new()
	}
}

impl Query for MemoryQuery {
	fn to_header(&self, hash: &HeaderHash) -> Option<HeaderLink> {
		self.hash_to_link.read().get(hash).copied()
	}

	fn to_confirmed(&self, height: Height) -> Option<HeaderLink> {
		self.confirmed_chain.read().get(height as usize).copied()
	}

	fn to_candidate(&self, height: Height) -> Option<HeaderLink> {
		self.candidate_chain.read().get(height as usize).copied()
	}

	fn get_top_candidate(&self) -> Height {
		self.candidate_chain.read().len().saturating_sub(1) as Height
	}

	fn get_top_confirmed(&self) -> Height {
		self.confirmed_chain.read().len().saturating_sub(1) as Height
	}

	fn get_top_associated_from(&self, from: Height) -> Height {
		let chain = self.candidate_chain.read();
		let states = self.states.read();
		let mut top = from;
		for (height, link) in chain.iter().enumerate() {
			if (height as Height) < from {
				continue;
			}
			match states.get(link) {
				Some(state) if *state != HeaderState::Unassociated => top = height as Height,
				_ => break,
			}
		}
		top
	}

	fn get_header(&self, link: HeaderLink) -> Result<Header, Error> {
		self.headers
			.read()
			.get(&link)
			.cloned()
			.ok_or_else(|| ErrorKind::NotFound(format!("header {}", link)).into())
	}

	fn get_block(&self, link: HeaderLink, _witness: bool) -> Result<Block, Error> {
		self.blocks
			.read()
			.get(&link)
			.cloned()
			.ok_or_else(|| ErrorKind::NotFound(format!("block {}", link)).into())
	}

	fn get_transaction(&self, link: HeaderLink) -> Result<Transaction, Error> {
		let blocks = self.blocks.read();
		let block = blocks.get(&link).ok_or_else(|| ErrorKind::NotFound(format!("block {}", link)))?;
		block
			.transactions
			.first()
			.cloned()
			.ok_or_else(|| ErrorKind::NotFound(format!("transaction for {}", link)).into())
	}

	fn get_context(&self, link: HeaderLink) -> Result<ChainContext, Error> {
		self.contexts
			.read()
			.get(&link)
			.copied()
			.ok_or_else(|| ErrorKind::NotFound(format!("context {}", link)).into())
	}

	fn get_state(&self, link: HeaderLink) -> Result<HeaderState, Error> {
		self.states
			.read()
			.get(&link)
			.copied()
			.ok_or_else(|| ErrorKind::NotFound(format!("state {}", link)).into())
	}

	fn get_fork(&self) -> Vec<HeaderLink> {
		let candidate = self.candidate_chain.read();
		let confirmed = self.confirmed_chain.read();
		let common = candidate
			.iter()
			.zip(confirmed.iter())
			.take_while(|(c, k)| c == k)
			.count();
		candidate[common..].to_vec()
	}

	fn get_candidate_hashes(&self, heights: &[Height]) -> Vec<Option<HeaderHash>> {
		let candidate = self.candidate_chain.read();
		let hashes = self.link_to_hash.read();
		heights
			.iter()
			.map(|h| candidate.get(*h as usize).and_then(|link| hashes.get(link)).copied())
			.collect()
	}

	fn get_filter_body(&self, link: HeaderLink) -> Result<Vec<u8>, Error> {
		self.filter_bodies
			.read()
			.get(&link)
			.cloned()
			.ok_or_else(|| ErrorKind::NotFound(format!("filter body {}", link)).into())
	}

	fn set_header(&self, header: Header, hash: HeaderHash, context: ChainContext) -> Result<HeaderLink, Error> {
		if let Some(existing) = self.hash_to_link.read().get(&hash) {
			return Ok(*existing);
		}
		let link = self.next();
		self.headers.write().insert(link, header);
		self.contexts.write().insert(link, context);
		self.states.write().insert(link, HeaderState::Unassociated);
		self.hash_to_link.write().insert(hash, link);
		self.link_to_hash.write().insert(link, hash);
		Ok(link)
	}

	fn set_block(&self, link: HeaderLink, block: Block) -> Result<HeaderLink, Error> {
		if !self.headers.read().contains_key(&link) {
			return Err(ErrorKind::NotFound(format!("header {}", link)).into());
		}
		self.blocks.write().insert(link, block);
		self.transition(link, HeaderState::Associated)?;
		Ok(link)
	}

	fn set_candidate(&self, link: HeaderLink) -> Result<(), Error> {
		self.candidate_chain.write().push(link);
		Ok(())
	}

	fn truncate_candidate(&self, keep: usize) -> Result<(), Error> {
		self.candidate_chain.write().truncate(keep);
		Ok(())
	}

	fn set_block_checked(&self, link: HeaderLink) -> Result<(), Error> {
		self.transition(link, HeaderState::Checked)
	}

	fn set_block_valid(&self, link: HeaderLink, fees: u64) -> Result<(), Error> {
		self.fees.write().insert(link, fees);
		self.transition(link, HeaderState::Valid)
	}

	fn set_block_unconfirmable(&self, link: HeaderLink) -> Result<(), Error> {
		self.transition(link, HeaderState::Unconfirmable)
	}

	fn set_block_confirmable(&self, link: HeaderLink, fees: u64) -> Result<(), Error> {
		self.fees.write().insert(link, fees);
		self.transition(link, HeaderState::Confirmable)
	}

	fn set_block_confirmed(&self, link: HeaderLink, height: Height) -> Result<(), Error> {
		self.transition(link, HeaderState::Confirmed)?;
		let mut confirmed = self.confirmed_chain.write();
		if height as usize != confirmed.len() {
			return Err(ErrorKind::InvalidTransition(format!("confirm height {} is not the next slot ({})", height, confirmed.len())).into());
		}
		confirmed.push(link);
		Ok(())
	}

	fn set_block_reorganized(&self, link: HeaderLink) -> Result<(), Error> {
		self.transition(link, HeaderState::Reorganized)?;
		let mut confirmed = self.confirmed_chain.write();
		match confirmed.last() {
			Some(top) if *top == link => {
				confirmed.pop();
				Ok(())
			}
			_ => Err(ErrorKind::InvalidTransition("reorganized link is not the confirmed top".into()).into()),
		}
	}

	fn set_strong(&self, link: HeaderLink) -> Result<(), Error> {
		if !self.headers.read().contains_key(&link) {
			return Err(ErrorKind::NotFound(format!("header {}", link)).into());
		}
		Ok(())
	}

	fn set_filter_body(&self, link: HeaderLink, body: Vec<u8>) -> Result<(), Error> {
		self.filter_bodies.write().insert(link, body);
		Ok(())
	}

	fn set_prevouts(&self, link: HeaderLink, prevouts: Vec<u64>) -> Result<(), Error> {
		self.prevouts.write().insert(link, prevouts);
		Ok(())
	}

	fn snapshot(&self, handler: EventHandler) -> Result<(), Error> {
		handler(crate::query::StoreEvent::Started);
		handler(crate::query::StoreEvent::Complete);
		Ok(())
	}

	fn reload(&self, handler: EventHandler) -> Result<(), Error> {
		handler(crate::query::StoreEvent::Started);
		handler(crate::query::StoreEvent::Complete);
		Ok(())
	}

	fn space_required(&self) -> u64 {
		self.space_required.load(Ordering::SeqCst)
	}

	fn space_free(&self) -> u64 {
		self.space_free.load(Ordering::SeqCst)
	}

	fn is_fault(&self) -> bool {
		*self.fault.read()
	}

	fn get_reorganization_lock(&self) -> Box<dyn ReorganizationLock> {
		self.reorg_lock.lock();
		Box::new(MemoryReorgGuard { raw: Arc::clone(&self.reorg_lock) })
	}
}

impl MemoryQuery {
	fn transition(&self, link: HeaderLink, next: HeaderState) -> Result<(), Error> {
		let mut states = self.states.write();
		let current = *states
			.get(&link)
			.ok_or_else(|| ErrorKind::NotFound(format!("state {}", link)))?;
		if current.can_advance_to(next) || current.can_reorganize(next) {
			states.insert(link, next);
			Ok(())
		} else {
			Err(ErrorKind::InvalidTransition(format!("{:?} -> {:?}", current, next)).into())
		}
	}

	/// Mark the store faulted; no further writes should be attempted by
	/// well-behaved callers (spec.md §3 "failure anywhere is fatal and
	/// faults the node").
	pub fn fault(&self) {
		*self.fault.write() = true;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bcn_types::ZERO_HASH;

	fn sample_header(nonce: u32) -> Header {
		Header {
			version: 1,
			previous_hash: ZERO_HASH,
			merkle_root: ZERO_HASH,
			timestamp: 0,
			bits: 0x1d00ffff,
			nonce,
		}
	}

	/// Stands in for a caller's real identity hash (the store never
	/// computes one of its own); folds the nonce so distinct fixtures key
	/// distinct hashes.
	fn sample_hash(nonce: u32) -> HeaderHash {
		let mut bytes = [0u8; 32];
		bytes[28..].copy_from_slice(&nonce.to_be_bytes());
		HeaderHash(bytes)
	}

	#[test]
	fn set_header_is_idempotent_on_identical_hash() {
		let store = MemoryQuery::new();
		let ctx = ChainContext::genesis(0x1d00ffff);
		let first = store.set_header(sample_header(1), sample_hash(1), ctx).unwrap();
		let second = store.set_header(sample_header(1), sample_hash(1), ctx).unwrap();
		assert_eq!(first, second);
	}

	#[test]
	fn get_candidate_hashes_returns_the_hash_set_header_was_given() {
		let store = MemoryQuery::new();
		let ctx = ChainContext::genesis(0x1d00ffff);
		let link = store.set_header(sample_header(1), sample_hash(1), ctx).unwrap();
		store.set_candidate(link).unwrap();
		assert_eq!(store.get_candidate_hashes(&[0]), vec![Some(sample_hash(1))]);
	}

	#[test]
	fn state_transitions_reject_skipped_stages() {
		let store = MemoryQuery::new();
		let ctx = ChainContext::genesis(0x1d00ffff);
		let link = store.set_header(sample_header(2), sample_hash(2), ctx).unwrap();
		assert!(store.set_block_valid(link, 0).is_err());
	}

	#[test]
	fn fork_is_candidate_suffix_past_confirmed() {
		let store = MemoryQuery::new();
		let a = HeaderLink(0);
		let b = HeaderLink(1);
		let c = HeaderLink(2);
		store.push_confirmed(a);
		store.set_candidate(a).unwrap();
		store.set_candidate(b).unwrap();
		store.set_candidate(c).unwrap();
		assert_eq!(store.get_fork(), vec![b, c]);
	}

	#[test]
	fn reorganization_lock_is_exclusive() {
		let store = Arc::new(MemoryQuery::new());
		let _held = store.get_reorganization_lock();
		let store2 = Arc::clone(&store);
		let handle = std::thread::spawn(move || {
			let _second = store2.get_reorganization_lock();
		});
		std::thread::sleep(std::time::Duration::from_millis(20));
		assert!(!handle.is_finished());
		drop(_held);
		handle.join().unwrap();
	}
}

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

//! End-to-end scenarios wiring the organize engine together with the
//! check/validate/confirm chasers over a shared bus, exercising spec.md
//! §8's scenario list at crate-boundary granularity.

use std::sync::Arc;
use std::time::Duration;

use bcn_bus::{Chase, EventBus};
use bcn_chain::{ChaserCheck, ChaserConfirm, Confirm, OrganizeEngine, OrganizeResult, Validator};
use bcn_store::{MemoryQuery, Query};
use bcn_types::{Block, ChainContext, CheckpointTable, Header, HeaderHash, HeaderLink, Height, ZERO_HASH};

struct AcceptAll;

impl Validator<Header> for AcceptAll {
	fn validate(&self, _entity: &Header, _context: &ChainContext, _below_milestone: bool) -> Result<(), String> {
		Ok(())
	}

	fn derive_context(&self, header: &Header, height: Height, _parent: &ChainContext) -> ChainContext {
		ChainContext { height, ..ChainContext::genesis(header.bits) }
	}

	fn identity(&self, header: &Header) -> HeaderHash {
		let mut bytes = [0u8; 32];
		bytes[0..4].copy_from_slice(&header.nonce.to_be_bytes());
		bytes[4..8].copy_from_slice(&header.bits.to_be_bytes());
		bytes[8..12].copy_from_slice(&header.timestamp.to_be_bytes());
		HeaderHash(bytes)
	}
}

fn header(previous_hash: HeaderHash, nonce: u32, bits: u32) -> Header {
	Header { version: 1, previous_hash, merkle_root: ZERO_HASH, timestamp: 0, bits, nonce }
}

fn sample_block(link: HeaderLink) -> Block {
	let header = Header { version: 1, previous_hash: ZERO_HASH, merkle_root: ZERO_HASH, timestamp: 0, bits: 0x1d00_ffff, nonce: link.0 as u32 };
	Block { header, transactions: Vec::new(), arena: bcn_types::ArenaHandle(Arc::new(())) }
}

/// Lets a just-spawned subscriber's task drain whatever was already
/// published before we inspect state through its public accessors.
async fn settle() {
	tokio::task::yield_now().await;
	tokio::time::sleep(Duration::from_millis(20)).await;
}

/// Scenario 1 (spec.md §8): a linear run of headers organizes one at a
/// time and the result lands on the store's own candidate chain, where
/// `ChaserCheck` can see it and queue downloads.
#[tokio::test]
async fn linear_extension_feeds_the_download_queue() {
	let store: Arc<dyn Query> = Arc::new(MemoryQuery::new());
	let bus = EventBus::new();
	let engine = OrganizeEngine::new(Arc::clone(&store), Arc::clone(&bus), AcceptAll, CheckpointTable::default());

	let mut previous = ZERO_HASH;
	for nonce in 0..6u32 {
		let h = header(previous, nonce, 0x1d00_ffff);
		previous = AcceptAll.identity(&h);
		assert_eq!(engine.organize(h).unwrap(), OrganizeResult::Organized(nonce as u64));
	}
	assert_eq!(engine.candidate_top(), 5);
	assert_eq!(store.get_top_candidate(), 5);

	let checker = ChaserCheck::new(Arc::clone(&store), Arc::clone(&bus), 4, 3.0);
	checker.spawn();
	bus.publish(Chase::Bump(engine.candidate_top()));
	settle().await;

	// Genesis (height 0) is pre-seeded, never queued for download.
	assert_eq!(checker.outstanding(), 5);
}

/// Scenario 2 (spec.md §8): a higher-work branch off genesis displaces an
/// incumbent multi-header branch in one shot once its accumulated work
/// exceeds it, and the loser is simply left out of the candidate chain.
#[tokio::test]
async fn stronger_fork_displaces_a_longer_incumbent() {
	let store: Arc<dyn Query> = Arc::new(MemoryQuery::new());
	let bus = EventBus::new();
	let engine = OrganizeEngine::new(Arc::clone(&store), Arc::clone(&bus), AcceptAll, CheckpointTable::default());

	let genesis = header(ZERO_HASH, 0, 0x1d00_ffff);
	let genesis_hash = AcceptAll.identity(&genesis);
	engine.organize(genesis).unwrap();

	let mut weak_tip = genesis_hash;
	for nonce in 1..=3u32 {
		let h = header(weak_tip, nonce, 0x1e00_ffff);
		weak_tip = AcceptAll.identity(&h);
		engine.organize(h).unwrap();
	}
	assert_eq!(engine.candidate_top(), 3);

	// A single 0x1c00ffff header (work 4096) beats three 0x1e00ffff headers
	// (work 1024 each, 3072 total).
	let strong = header(genesis_hash, 10, 0x1c00_ffff);
	assert_eq!(engine.organize(strong).unwrap(), OrganizeResult::Organized(1));
	assert_eq!(engine.candidate_top(), 1);
	assert_eq!(store.get_top_candidate(), 1);
}

/// Scenario 5 (spec.md §8): a block that fails connect at height 4 is
/// marked unconfirmable, the organizer reports fork point 3, and every
/// downstream chaser resets its own cursor to match.
#[tokio::test]
async fn invalid_block_disorganizes_and_every_chaser_resets() {
	let store: Arc<dyn Query> = Arc::new(MemoryQuery::new());
	let bus = EventBus::new();
	let engine = OrganizeEngine::new(Arc::clone(&store), Arc::clone(&bus), AcceptAll, CheckpointTable::default());

	let mut previous = ZERO_HASH;
	for nonce in 0..6u32 {
		let h = header(previous, nonce, 0x1d00_ffff);
		previous = AcceptAll.identity(&h);
		engine.organize(h).unwrap();
	}
	assert_eq!(engine.candidate_top(), 5);

	// Archive bodies and advance every height through checked/valid directly
	// against the store; `ChaserConfirm` below is only asked to confirm up
	// to height 3, leaving 4 and 5 at `valid`.
	for height in 0..=5u64 {
		let link = store.to_candidate(height).unwrap();
		store.set_block(link, sample_block(link)).unwrap();
		store.set_block_checked(link).unwrap();
		store.set_block_valid(link, 0).unwrap();
	}

	let checker = ChaserCheck::new(Arc::clone(&store), Arc::clone(&bus), 10, 3.0);
	checker.spawn();
	bus.publish(Chase::Bump(5));
	settle().await;
	assert_eq!(checker.outstanding(), 5);

	let confirm: Confirm = Box::new(|_, _| Ok(0));
	let confirmer = ChaserConfirm::new(Arc::clone(&store), Arc::clone(&bus), 0, confirm);
	confirmer.spawn();
	bus.publish(Chase::Valid(3));
	settle().await;
	assert_eq!(confirmer.confirmed_top(), 3);

	let bad_link = store.to_candidate(4).unwrap();
	let fork_point = engine.disorganize(bad_link).unwrap();
	assert_eq!(fork_point, 3);
	settle().await;

	assert_eq!(confirmer.confirmed_top(), 3);
	assert_eq!(checker.outstanding(), 3);
	assert_eq!(store.get_state(bad_link).unwrap(), bcn_types::HeaderState::Unconfirmable);
}

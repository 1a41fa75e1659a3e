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

//! `getdata` blocks, installed on channels negotiating protocol version
//! ≥ 31800 once headers are organized (spec.md §4.7): requests a download
//! map from the check chaser, issues `getdata`, then for each arriving
//! block verifies its identity against the already-archived header,
//! archives the body, and publishes `checked(height)` or returns the map
//! to the check chaser on failure.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use bcn_bus::{subscribe_events, Chase, EventBus, Flow, ObjectKey};
use bcn_chain::ChaserCheck;
use bcn_store::Query;
use bcn_types::{Block, Header, HeaderHash, Height};

use crate::channel::Channel;
use crate::error::{Error, ErrorKind};
use crate::message::Message;

/// One height still awaiting its body, paired with the hash the block must
/// match once downloaded.
type Expected = (Height, HeaderHash);

pub struct BlockInProtocol {
	channel: Arc<dyn Channel>,
	bus: Arc<EventBus>,
	query: Arc<dyn Query>,
	checker: Arc<ChaserCheck>,
	identity: Box<dyn Fn(&Header) -> HeaderHash + Send + Sync>,
	expected: Mutex<VecDeque<Expected>>,
}

impl BlockInProtocol {
	pub fn new(
		channel: Arc<dyn Channel>,
		bus: Arc<EventBus>,
		query: Arc<dyn Query>,
		checker: Arc<ChaserCheck>,
		identity: Box<dyn Fn(&Header) -> HeaderHash + Send + Sync>,
	) -> BlockInProtocol {
		BlockInProtocol { channel, bus, query, checker, identity, expected: Mutex::new(VecDeque::new()) }
	}

	/// Pull the next map from the check chaser and issue a `getdata`. If
	/// none is pending, this peer has run dry and publishes `starved` so
	/// the outbound session can split a slower peer's work its way.
	pub fn poll(&self) -> Result<(), Error> {
		let peer_id = self.channel.peer_id();
		let batch = match self.checker.get_map(peer_id) {
			Some(batch) => batch,
			None => {
				self.bus.publish(Chase::Starved(peer_id));
				return Ok(());
			}
		};
		let hashes = self.query.get_candidate_hashes(&batch);
		let mut expected = self.expected.lock();
		let mut wanted = Vec::with_capacity(batch.len());
		for (height, hash) in batch.into_iter().zip(hashes) {
			if let Some(hash) = hash {
				expected.push_back((height, hash));
				wanted.push(hash);
			}
		}
		drop(expected);
		if wanted.is_empty() {
			return Ok(());
		}
		self.channel.send(Message::GetData(wanted))
	}

	pub fn on_block(&self, block: Block) -> Result<(), Error> {
		let (height, expected_hash) = {
			let mut expected = self.expected.lock();
			match expected.pop_front() {
				Some(entry) => entry,
				None => return Err(ErrorKind::UnexpectedBlock.into()),
			}
		};

		let hash = (self.identity)(&block.header);
		if hash != expected_hash {
			self.checker.put_map(self.channel.peer_id(), vec![height]);
			return Err(ErrorKind::IdentityMismatch.into());
		}

		let link = match self.query.to_header(&hash) {
			Some(link) => link,
			None => {
				self.checker.put_map(self.channel.peer_id(), vec![height]);
				return Err(ErrorKind::UnknownHeader.into());
			}
		};

		match self.query.set_block(link, block).and_then(|_| self.query.set_block_checked(link)) {
			Ok(()) => {
				self.bus.publish(Chase::Checked(height));
				Ok(())
			}
			Err(err) => {
				self.checker.put_map(self.channel.peer_id(), vec![height]);
				self.bus.publish(Chase::Unchecked(link));
				Err(err.into())
			}
		}
	}

	/// Halve this peer's outstanding work, returning the dropped half to
	/// the check chaser's pending deque.
	fn split(&self) {
		let mut expected = self.expected.lock();
		let half = expected.len() / 2;
		let dropped: Vec<Height> = expected.split_off(half).into_iter().map(|(height, _)| height).collect();
		drop(expected);
		if !dropped.is_empty() {
			self.checker.put_map(self.channel.peer_id(), dropped);
		}
	}

	/// Drop all outstanding work, returning it to the check chaser.
	fn purge(&self) {
		let dropped: Vec<Height> = self.expected.lock().drain(..).map(|(height, _)| height).collect();
		if !dropped.is_empty() {
			self.checker.put_map(self.channel.peer_id(), dropped);
		}
	}

	/// Subscribe to `split`/`stall`/`purge` directed at this peer's work.
	pub fn spawn(self: &Arc<Self>) -> ObjectKey {
		let this = Arc::clone(self);
		subscribe_events(&self.bus, move |event| {
			match event {
				Chase::Split(peer_id) if peer_id == this.channel.peer_id() => this.split(),
				Chase::Stall | Chase::Purge => this.purge(),
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
	use crate::channel::RecordingChannel;
	use bcn_store::MemoryQuery;
	use bcn_types::{ArenaHandle, ChainContext, PeerId, ZERO_HASH};

	fn identity(header: &Header) -> HeaderHash {
		let mut bytes = [0u8; 32];
		bytes[0..4].copy_from_slice(&header.nonce.to_be_bytes());
		HeaderHash(bytes)
	}

	fn sample_block(nonce: u32) -> Block {
		let header = Header { version: 1, previous_hash: ZERO_HASH, merkle_root: ZERO_HASH, timestamp: 0, bits: 0x1d00_ffff, nonce };
		Block { header, transactions: Vec::new(), arena: ArenaHandle(Arc::new(())) }
	}

	fn fixture() -> (Arc<BlockInProtocol>, Arc<dyn Query>, Arc<RecordingChannel>, HeaderHash) {
		let query: Arc<dyn Query> = Arc::new(MemoryQuery::new());
		let bus = EventBus::new();
		let checker = ChaserCheck::new(Arc::clone(&query), Arc::clone(&bus), 10, 3.0);
		let block = sample_block(1);
		let hash = identity(&block.header);
		let link = query.set_header(block.header.clone(), hash, ChainContext::genesis(block.header.bits)).unwrap();
		query.set_candidate(link).unwrap();
		let channel = Arc::new(RecordingChannel::new(PeerId(1), 70013, 0));
		let protocol = Arc::new(BlockInProtocol::new(
			Arc::clone(&channel) as Arc<dyn Channel>,
			bus,
			Arc::clone(&query),
			checker,
			Box::new(identity),
		));
		(protocol, query, channel, hash)
	}

	#[test]
	fn poll_with_nothing_outstanding_sends_nothing() {
		let (protocol, _query, channel, _hash) = fixture();
		protocol.poll().unwrap();
		assert!(channel.sent().is_empty());
	}

	#[test]
	fn matching_block_is_archived_and_checked() {
		let (protocol, _query, _channel, hash) = fixture();
		protocol.expected.lock().push_back((0, hash));
		let block = sample_block(1);
		protocol.on_block(block).unwrap();
		assert!(protocol.expected.lock().is_empty());
	}

	#[test]
	fn mismatched_identity_returns_the_height_to_the_checker() {
		let (protocol, _query, _channel, hash) = fixture();
		// Expect a different hash than what's actually delivered.
		let wrong = HeaderHash([0xffu8; 32]);
		assert_ne!(wrong, hash);
		protocol.expected.lock().push_back((0, wrong));
		let block = sample_block(1);
		assert!(protocol.on_block(block).is_err());
		assert_eq!(protocol.checker.outstanding(), 1);
	}

	#[test]
	fn unrequested_block_is_an_error() {
		let (protocol, _query, _channel, _hash) = fixture();
		assert!(protocol.on_block(sample_block(1)).is_err());
	}
}

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

//! `getheaders`/`headers` in, installed on channels negotiating protocol
//! version ≥ 31800 (spec.md §4.7). Organizes each received header and, on a
//! full-size response, pipelines another `getheaders` continuing from the
//! last hash received.

use std::sync::Arc;

use bcn_chain::{Organize, OrganizeResult};
use bcn_types::{Header, HeaderHash, ZERO_HASH};

use crate::channel::Channel;
use crate::error::Error;
use crate::fingerprint::Fingerprint;
use crate::message::Message;

pub trait Identity: Fn(&Header) -> HeaderHash + Send + Sync {}
impl<T: Fn(&Header) -> HeaderHash + Send + Sync> Identity for T {}

pub struct HeaderInProtocol {
	channel: Arc<dyn Channel>,
	organizer: Arc<dyn Organize<Header>>,
	fingerprint: Arc<Fingerprint>,
	identity: Box<dyn Identity>,
	max_get_headers: usize,
}

impl HeaderInProtocol {
	pub fn new(
		channel: Arc<dyn Channel>,
		organizer: Arc<dyn Organize<Header>>,
		fingerprint: Arc<Fingerprint>,
		identity: Box<dyn Identity>,
		max_get_headers: usize,
	) -> HeaderInProtocol {
		HeaderInProtocol { channel, organizer, fingerprint, identity, max_get_headers: max_get_headers.max(1) }
	}

	/// End of the protocol's start sequence (spec.md §4.7): request the
	/// first batch with an empty locator.
	pub fn start(&self) -> Result<(), Error> {
		self.send_get_headers(ZERO_HASH)
	}

	fn send_get_headers(&self, from: HeaderHash) -> Result<(), Error> {
		self.channel.send(Message::GetHeaders { locator: vec![from], stop: ZERO_HASH })
	}

	/// Handle an incoming `headers` message.
	pub fn on_headers(&self, headers: Vec<Header>) -> Result<(), Error> {
		let count = headers.len();
		let mut last_hash = None;

		for header in headers {
			let hash = (self.identity)(&header);
			if self.fingerprint.seen_or_insert(hash) {
				last_hash = Some(hash);
				continue;
			}
			match self.organizer.organize(header)? {
				OrganizeResult::Orphan => {
					log::info!("orphan header {} from {}", hash, self.channel.peer_id());
				}
				OrganizeResult::Invalid(reason) => {
					log::warn!("invalid header {} from {}: {}", hash, self.channel.peer_id(), reason);
				}
				OrganizeResult::Duplicate | OrganizeResult::Stored | OrganizeResult::Organized(_) | OrganizeResult::Disorganized(_) => {}
			}
			last_hash = Some(hash);
		}

		if count == self.max_get_headers {
			self.send_get_headers(last_hash.unwrap_or(ZERO_HASH))?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::channel::RecordingChannel;
	use bcn_chain::{OrganizeEngine, Validator};
	use bcn_store::{MemoryQuery, Query};
	use bcn_types::{ChainContext, CheckpointTable, Height, PeerId};
	use bcn_bus::EventBus;

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
			HeaderHash(bytes)
		}
	}

	fn header(previous_hash: HeaderHash, nonce: u32) -> Header {
		Header { version: 1, previous_hash, merkle_root: ZERO_HASH, timestamp: 0, bits: 0x1d00_ffff, nonce }
	}

	fn protocol(max_get_headers: usize) -> (Arc<HeaderInProtocol>, Arc<RecordingChannel>) {
		let query: Arc<dyn Query> = Arc::new(MemoryQuery::new());
		let bus = EventBus::new();
		let engine: Arc<dyn Organize<Header>> = Arc::new(OrganizeEngine::new(query, bus, AcceptAll, CheckpointTable::default()));
		let channel = Arc::new(RecordingChannel::new(PeerId(1), 70013, 0));
		let identity: Box<dyn Identity> = Box::new(|h: &Header| {
			let mut bytes = [0u8; 32];
			bytes[0..4].copy_from_slice(&h.nonce.to_be_bytes());
			HeaderHash(bytes)
		});
		let protocol = Arc::new(HeaderInProtocol::new(
			Arc::clone(&channel) as Arc<dyn Channel>,
			engine,
			Arc::new(Fingerprint::new(100)),
			identity,
			max_get_headers,
		));
		(protocol, channel)
	}

	#[test]
	fn start_sends_an_empty_locator_getheaders() {
		let (protocol, channel) = protocol(2000);
		protocol.start().unwrap();
		assert_eq!(channel.sent().len(), 1);
		match &channel.sent()[0] {
			Message::GetHeaders { locator, stop } => {
				assert_eq!(locator, &vec![ZERO_HASH]);
				assert_eq!(*stop, ZERO_HASH);
			}
			_ => panic!("expected GetHeaders"),
		}
	}

	fn identity_of(header: &Header) -> HeaderHash {
		let mut bytes = [0u8; 32];
		bytes[0..4].copy_from_slice(&header.nonce.to_be_bytes());
		HeaderHash(bytes)
	}

	#[test]
	fn full_batch_pipelines_another_getheaders() {
		let (protocol, channel) = protocol(2);
		let h1 = header(ZERO_HASH, 1);
		let h2 = header(identity_of(&h1), 2);
		protocol.on_headers(vec![h1, h2]).unwrap();
		// One getheaders pipelined after a full-size batch.
		assert_eq!(channel.sent().len(), 1);
	}

	#[test]
	fn short_batch_does_not_pipeline() {
		let (protocol, channel) = protocol(2000);
		let h1 = header(ZERO_HASH, 1);
		protocol.on_headers(vec![h1]).unwrap();
		assert!(channel.sent().is_empty());
	}

	#[test]
	fn repeated_header_is_suppressed_by_fingerprint() {
		let (protocol, _channel) = protocol(2000);
		let h1 = header(ZERO_HASH, 1);
		protocol.on_headers(vec![h1.clone()]).unwrap();
		// Second delivery of the same header is a no-op, not an error.
		protocol.on_headers(vec![h1]).unwrap();
	}
}

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

//! Header-first announcement, installed on channels negotiating protocol
//! version ≥ `bip130` (70012, spec.md §4.7): sends `sendheaders` once at
//! start, then announces each newly organized header directly instead of
//! an `inv` round trip.

use std::sync::Arc;

use bcn_bus::{subscribe_events, Chase, EventBus, Flow, ObjectKey};
use bcn_store::Query;
use bcn_types::HeaderLink;

use crate::channel::Channel;
use crate::error::Error;
use crate::fingerprint::Fingerprint;
use crate::message::Message;

pub struct HeaderOutProtocol {
	channel: Arc<dyn Channel>,
	bus: Arc<EventBus>,
	query: Arc<dyn Query>,
	fingerprint: Arc<Fingerprint>,
}

impl HeaderOutProtocol {
	pub fn new(channel: Arc<dyn Channel>, bus: Arc<EventBus>, query: Arc<dyn Query>, fingerprint: Arc<Fingerprint>) -> Arc<HeaderOutProtocol> {
		Arc::new(HeaderOutProtocol { channel, bus, query, fingerprint })
	}

	pub fn start(&self) -> Result<(), Error> {
		self.channel.send(Message::SendHeaders)
	}

	fn announce(&self, link: HeaderLink) -> Result<(), Error> {
		let header = self.query.get_header(link)?;
		// identity() belongs to the organize engine's validator; the
		// fingerprint only needs *a* stable key per link, and the header
		// hash is recomputed on organize, so link itself is fine here.
		if self.fingerprint.seen_or_insert(header_key(link)) {
			return Ok(());
		}
		self.channel.send(Message::Headers(vec![header]))
	}

	pub fn spawn(self: &Arc<Self>) -> ObjectKey {
		let this = Arc::clone(self);
		subscribe_events(&self.bus, move |event| {
			if let Chase::Block(link) = event {
				if let Err(err) = this.announce(link) {
					log::warn!("failed to announce header to {}: {}", this.channel.peer_id(), err);
				}
			}
			if event == Chase::Stop {
				return Flow::Unsubscribe;
			}
			Flow::Continue
		})
	}
}

fn header_key(link: HeaderLink) -> bcn_types::HeaderHash {
	let mut bytes = [0u8; 32];
	bytes[0..8].copy_from_slice(&link.0.to_be_bytes());
	bcn_types::HeaderHash(bytes)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::channel::RecordingChannel;
	use bcn_store::MemoryQuery;
	use bcn_types::{ChainContext, Header, PeerId, ZERO_HASH};

	#[test]
	fn start_sends_sendheaders() {
		let bus = EventBus::new();
		let query: Arc<dyn Query> = Arc::new(MemoryQuery::new());
		let channel = Arc::new(RecordingChannel::new(PeerId(1), 70013, 0));
		let protocol = HeaderOutProtocol::new(Arc::clone(&channel) as Arc<dyn Channel>, bus, query, Arc::new(Fingerprint::new(10)));
		protocol.start().unwrap();
		assert!(matches!(channel.sent()[0], Message::SendHeaders));
	}

	#[test]
	fn announce_sends_the_stored_header_once() {
		let bus = EventBus::new();
		let query: Arc<dyn Query> = Arc::new(MemoryQuery::new());
		let header = Header { version: 1, previous_hash: ZERO_HASH, merkle_root: ZERO_HASH, timestamp: 0, bits: 0x1d00_ffff, nonce: 1 };
		let link = query.set_header(header, bcn_types::HeaderHash::from_slice(&[1u8; 32]), ChainContext::genesis(0x1d00_ffff)).unwrap();
		let channel = Arc::new(RecordingChannel::new(PeerId(1), 70013, 0));
		let protocol = HeaderOutProtocol::new(Arc::clone(&channel) as Arc<dyn Channel>, bus, query, Arc::new(Fingerprint::new(10)));
		protocol.announce(link).unwrap();
		protocol.announce(link).unwrap();
		assert_eq!(channel.sent().len(), 1);
	}
}

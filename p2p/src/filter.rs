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

//! `bip157` compact-filter serving, installed only when `witness_node` is
//! configured and the peer advertises the service bit (spec.md §4.7 step
//! 4). Filter *construction* is `Query::set_filter_body`'s job elsewhere;
//! this protocol only serves what is already archived.

use std::sync::Arc;

use bcn_store::Query;

use crate::channel::Channel;
use crate::error::{Error, ErrorKind};
use crate::message::Message;

pub struct FilterOutProtocol {
	channel: Arc<dyn Channel>,
	query: Arc<dyn Query>,
}

impl FilterOutProtocol {
	pub fn new(channel: Arc<dyn Channel>, query: Arc<dyn Query>) -> FilterOutProtocol {
		FilterOutProtocol { channel, query }
	}

	pub fn on_get_cfilters(&self, start_height: bcn_types::Height, stop: bcn_types::HeaderHash) -> Result<(), Error> {
		let link = self.query.to_header(&stop).ok_or(ErrorKind::UnknownHeader)?;
		let context = self.query.get_context(link)?;
		if context.height < start_height {
			return Err(ErrorKind::UnknownHeader.into());
		}
		let filter = self.query.get_filter_body(link)?;
		self.channel.send(Message::CFilter { link: stop, filter })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::channel::RecordingChannel;
	use bcn_store::MemoryQuery;
	use bcn_types::{ChainContext, Header, HeaderHash, PeerId, ZERO_HASH};

	#[test]
	fn unknown_stop_hash_is_an_error() {
		let query: Arc<dyn Query> = Arc::new(MemoryQuery::new());
		let channel = Arc::new(RecordingChannel::new(PeerId(1), 70015, 0));
		let protocol = FilterOutProtocol::new(Arc::clone(&channel) as Arc<dyn Channel>, query);
		assert!(protocol.on_get_cfilters(0, ZERO_HASH).is_err());
	}

	#[test]
	fn archived_filter_is_returned() {
		let query: Arc<dyn Query> = Arc::new(MemoryQuery::new());
		let header = Header { version: 1, previous_hash: ZERO_HASH, merkle_root: ZERO_HASH, timestamp: 0, bits: 0x1d00_ffff, nonce: 1 };
		let link = query.set_header(header, HeaderHash::from_slice(&[1u8; 32]), ChainContext::genesis(0x1d00_ffff)).unwrap();
		query.set_candidate(link).unwrap();
		query.set_filter_body(link, vec![1, 2, 3]).unwrap();
		let hash = query.get_candidate_hashes(&[0])[0].unwrap();
		let channel = Arc::new(RecordingChannel::new(PeerId(1), 70015, 0));
		let protocol = FilterOutProtocol::new(Arc::clone(&channel) as Arc<dyn Channel>, query);
		protocol.on_get_cfilters(0, hash).unwrap();
		assert_eq!(channel.sent().len(), 1);
	}
}

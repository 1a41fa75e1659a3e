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

//! Blocks-first `inv`/`getdata`, installed in place of the header/block-in
//! pair on channels negotiating protocol version below 31800 (spec.md
//! §4.7). There is no separate header phase: full blocks are organized
//! directly through the shared block organize engine.

use std::sync::Arc;

use bcn_chain::{Organize, OrganizeResult};
use bcn_types::{Block, Header, HeaderHash, ZERO_HASH};

use crate::channel::Channel;
use crate::error::Error;
use crate::fingerprint::Fingerprint;
use crate::message::Message;

pub struct BlockSyncProtocol {
	channel: Arc<dyn Channel>,
	organizer: Arc<dyn Organize<Block>>,
	fingerprint: Arc<Fingerprint>,
	identity: Box<dyn Fn(&Header) -> HeaderHash + Send + Sync>,
}

impl BlockSyncProtocol {
	pub fn new(
		channel: Arc<dyn Channel>,
		organizer: Arc<dyn Organize<Block>>,
		fingerprint: Arc<Fingerprint>,
		identity: Box<dyn Fn(&Header) -> HeaderHash + Send + Sync>,
	) -> BlockSyncProtocol {
		BlockSyncProtocol { channel, organizer, fingerprint, identity }
	}

	pub fn start(&self) -> Result<(), Error> {
		self.channel.send(Message::GetBlocks { locator: vec![ZERO_HASH], stop: ZERO_HASH })
	}

	/// Handle an `inv` advertisement: request bodies for anything unseen.
	pub fn on_inv(&self, hashes: Vec<HeaderHash>) -> Result<(), Error> {
		let wanted: Vec<HeaderHash> = hashes.into_iter().filter(|hash| !self.fingerprint.seen_or_insert(*hash)).collect();
		if wanted.is_empty() {
			return Ok(());
		}
		self.channel.send(Message::GetData(wanted))
	}

	pub fn on_block(&self, block: Block) -> Result<(), Error> {
		let hash = (self.identity)(&block.header);
		match self.organizer.organize(block)? {
			OrganizeResult::Orphan => {
				log::info!("orphan block {} from {}", hash, self.channel.peer_id());
			}
			OrganizeResult::Invalid(reason) => {
				log::warn!("invalid block {} from {}: {}", hash, self.channel.peer_id(), reason);
			}
			OrganizeResult::Duplicate | OrganizeResult::Stored | OrganizeResult::Organized(_) | OrganizeResult::Disorganized(_) => {}
		}
		Ok(())
	}
}

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

//! Per-peer scheduler (spec.md §4.7): selects which sub-protocols a
//! negotiated channel gets, by version and configuration, and starts them.
//! The handshake itself (version exchange, service negotiation) runs
//! outside this core; `PeerSession::install` only ever sees its result.

use std::sync::Arc;

use bcn_bus::{subscribe_events, Chase, EventBus, Flow, ObjectKey};
use bcn_chain::{ChaserCheck, Organize};
use bcn_store::Query;
use bcn_types::{Block, Header, HeaderHash};

use crate::block_in::BlockInProtocol;
use crate::block_sync::BlockSyncProtocol;
use crate::channel::Channel;
use crate::error::Error;
use crate::filter::FilterOutProtocol;
use crate::fingerprint::Fingerprint;
use crate::header_in::HeaderInProtocol;
use crate::header_out::HeaderOutProtocol;
use crate::observer::ObserverProtocol;
use crate::tx::{TxInProtocol, TxOutProtocol, TxSink};

/// Protocol version introducing header-first announcement
/// (`sendheaders`/`headers` out in place of `inv`).
pub const BIP130_VERSION: u32 = 70012;
/// Protocol version introducing `getheaders`/`headers` sync.
pub const HEADERS_VERSION: u32 = 31800;
/// Service bit a peer advertises to serve compact filters (bip157).
pub const NODE_COMPACT_FILTERS: u64 = 1 << 6;

pub struct PeerSessionConfig {
	pub max_get_headers: usize,
	pub witness_node: bool,
	pub enable_relay: bool,
	pub announcement_cache: usize,
}

/// Handles kept alive for the lifetime of the channel. The `ObjectKey`s
/// unsubscribe their protocol's bus subscription on drop of the session's
/// owner; the `Arc<...Protocol>` handles are message-driven rather than
/// bus-driven and must be held by whatever drives the channel's inbound
/// message loop (out of this core's scope) so it can route `headers`,
/// `block`, `inv` and `tx` messages to the right handler.
pub struct Installed {
	pub observer: ObjectKey,
	pub header_out: Option<ObjectKey>,
	pub tx_out: Option<ObjectKey>,
	pub header_in: Option<Arc<HeaderInProtocol>>,
	pub block_in: Option<Arc<BlockInProtocol>>,
	pub block_in_subscription: Option<ObjectKey>,
	pub block_sync: Option<Arc<BlockSyncProtocol>>,
	pub tx_in: Option<Arc<TxInProtocol>>,
	pub filter_out: Option<Arc<FilterOutProtocol>>,
}

/// Finds the slowest peer with outstanding work once one runs dry
/// (spec.md §4.3 "Starvation protocol"), owned once per node rather than
/// per channel. `PeerSession::install` wires each channel's `BlockInProtocol`
/// to react to the `split(peer_id)` this publishes.
pub struct OutboundSession {
	checker: Arc<ChaserCheck>,
	bus: Arc<EventBus>,
}

impl OutboundSession {
	pub fn new(checker: Arc<ChaserCheck>, bus: Arc<EventBus>) -> Arc<OutboundSession> {
		Arc::new(OutboundSession { checker, bus })
	}

	pub fn spawn(self: &Arc<Self>) -> ObjectKey {
		let this = Arc::clone(self);
		subscribe_events(&self.bus, move |event| {
			match event {
				Chase::Starved(_peer_id) => {
					if let Some(slowest) = this.checker.slowest_with_outstanding_work() {
						this.bus.publish(Chase::Split(slowest));
					}
				}
				Chase::Stop => return Flow::Unsubscribe,
				_ => {}
			}
			Flow::Continue
		})
	}
}

pub struct PeerSession;

impl PeerSession {
	/// Install every protocol spec.md §4.7's gating table calls for at this
	/// channel's negotiated version, and run each handler's start sequence.
	#[allow(clippy::too_many_arguments)]
	pub fn install(
		bus: Arc<EventBus>,
		channel: Arc<dyn Channel>,
		query: Arc<dyn Query>,
		header_engine: Arc<dyn Organize<Header>>,
		block_engine: Arc<dyn Organize<Block>>,
		checker: Arc<ChaserCheck>,
		identity: Arc<dyn Fn(&Header) -> HeaderHash + Send + Sync>,
		tx_sink: Option<Box<dyn TxSink>>,
		config: &PeerSessionConfig,
	) -> Result<Installed, Error> {
		let fingerprint = Arc::new(Fingerprint::new(config.announcement_cache));

		let observer = ObserverProtocol::new(Arc::clone(&bus), Arc::clone(&channel));
		let observer_key = observer.spawn();

		let version = channel.negotiated_version();

		let header_out_key = if version >= BIP130_VERSION {
			let header_out = HeaderOutProtocol::new(Arc::clone(&channel), Arc::clone(&bus), Arc::clone(&query), Arc::clone(&fingerprint));
			header_out.start()?;
			Some(header_out.spawn())
		} else {
			None
		};

		let (header_in, block_in, block_in_subscription, block_sync) = if version >= HEADERS_VERSION {
			let identity_for_headers = Arc::clone(&identity);
			let header_in = Arc::new(HeaderInProtocol::new(
				Arc::clone(&channel),
				Arc::clone(&header_engine),
				Arc::clone(&fingerprint),
				Box::new(move |h: &Header| identity_for_headers(h)),
				config.max_get_headers,
			));
			header_in.start()?;

			let identity_for_blocks = Arc::clone(&identity);
			let block_in = Arc::new(BlockInProtocol::new(
				Arc::clone(&channel),
				Arc::clone(&bus),
				Arc::clone(&query),
				Arc::clone(&checker),
				Box::new(move |h: &Header| identity_for_blocks(h)),
			));
			let block_in_subscription = block_in.spawn();
			block_in.poll()?;
			(Some(header_in), Some(block_in), Some(block_in_subscription), None)
		} else {
			let identity_for_sync = Arc::clone(&identity);
			let block_sync = Arc::new(BlockSyncProtocol::new(
				Arc::clone(&channel),
				Arc::clone(&block_engine),
				Arc::clone(&fingerprint),
				Box::new(move |h: &Header| identity_for_sync(h)),
			));
			block_sync.start()?;
			(None, None, None, Some(block_sync))
		};

		let filter_out = if config.witness_node && channel.services() & NODE_COMPACT_FILTERS != 0 {
			Some(Arc::new(FilterOutProtocol::new(Arc::clone(&channel), Arc::clone(&query))))
		} else {
			None
		};

		let mut tx_in = None;
		let tx_out_key = if config.enable_relay {
			if let Some(sink) = tx_sink {
				tx_in = Some(Arc::new(TxInProtocol::new(Arc::clone(&channel), sink)));
			}
			let tx_out = TxOutProtocol::new(Arc::clone(&channel), Arc::clone(&bus), Arc::clone(&query), Arc::clone(&fingerprint));
			Some(tx_out.spawn())
		} else {
			None
		};

		Ok(Installed {
			observer: observer_key,
			header_out: header_out_key,
			tx_out: tx_out_key,
			header_in,
			block_in,
			block_in_subscription,
			block_sync,
			tx_in,
			filter_out,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::channel::RecordingChannel;
	use bcn_chain::OrganizeEngine;
	use bcn_chain::Validator;
	use bcn_store::MemoryQuery;
	use bcn_types::{ChainContext, CheckpointTable, Height, PeerId};
	use crate::message::Message;

	struct AcceptHeader;
	impl Validator<Header> for AcceptHeader {
		fn validate(&self, _entity: &Header, _context: &ChainContext, _below_milestone: bool) -> Result<(), String> {
			Ok(())
		}
		fn derive_context(&self, header: &Header, height: Height, _parent: &ChainContext) -> ChainContext {
			ChainContext { height, ..ChainContext::genesis(header.bits) }
		}
		fn identity(&self, header: &Header) -> HeaderHash {
			identity_fn(header)
		}
	}

	struct AcceptBlock;
	impl Validator<Block> for AcceptBlock {
		fn validate(&self, _entity: &Block, _context: &ChainContext, _below_milestone: bool) -> Result<(), String> {
			Ok(())
		}
		fn derive_context(&self, header: &Header, height: Height, _parent: &ChainContext) -> ChainContext {
			ChainContext { height, ..ChainContext::genesis(header.bits) }
		}
		fn identity(&self, header: &Header) -> HeaderHash {
			identity_fn(header)
		}
	}

	fn identity_fn(header: &Header) -> HeaderHash {
		let mut bytes = [0u8; 32];
		bytes[0..4].copy_from_slice(&header.nonce.to_be_bytes());
		HeaderHash(bytes)
	}

	fn config() -> PeerSessionConfig {
		PeerSessionConfig { max_get_headers: 2000, witness_node: false, enable_relay: true, announcement_cache: 100 }
	}

	#[tokio::test]
	async fn headers_first_peer_gets_sendheaders_and_getheaders() {
		let query: Arc<dyn Query> = Arc::new(MemoryQuery::new());
		let bus = EventBus::new();
		let header_engine: Arc<dyn Organize<Header>> = Arc::new(OrganizeEngine::new(Arc::clone(&query), Arc::clone(&bus), AcceptHeader, CheckpointTable::default()));
		let block_engine: Arc<dyn Organize<Block>> = Arc::new(OrganizeEngine::new(Arc::clone(&query), Arc::clone(&bus), AcceptBlock, CheckpointTable::default()));
		let checker = ChaserCheck::new(Arc::clone(&query), Arc::clone(&bus), 8, 3.0);
		let channel = Arc::new(RecordingChannel::new(PeerId(1), 70015, 0));
		let identity: Arc<dyn Fn(&Header) -> HeaderHash + Send + Sync> = Arc::new(identity_fn);

		PeerSession::install(bus, Arc::clone(&channel) as Arc<dyn Channel>, query, header_engine, block_engine, checker, identity, None, &config()).unwrap();

		let sent = channel.sent();
		assert!(matches!(sent[0], Message::SendHeaders));
		assert!(matches!(sent[1], Message::GetHeaders { .. }));
	}

	#[tokio::test]
	async fn legacy_peer_gets_blocks_first_getblocks() {
		let query: Arc<dyn Query> = Arc::new(MemoryQuery::new());
		let bus = EventBus::new();
		let header_engine: Arc<dyn Organize<Header>> = Arc::new(OrganizeEngine::new(Arc::clone(&query), Arc::clone(&bus), AcceptHeader, CheckpointTable::default()));
		let block_engine: Arc<dyn Organize<Block>> = Arc::new(OrganizeEngine::new(Arc::clone(&query), Arc::clone(&bus), AcceptBlock, CheckpointTable::default()));
		let checker = ChaserCheck::new(Arc::clone(&query), Arc::clone(&bus), 8, 3.0);
		let channel = Arc::new(RecordingChannel::new(PeerId(2), 60002, 0));
		let identity: Arc<dyn Fn(&Header) -> HeaderHash + Send + Sync> = Arc::new(identity_fn);

		PeerSession::install(bus, Arc::clone(&channel) as Arc<dyn Channel>, query, header_engine, block_engine, checker, identity, None, &config()).unwrap();

		let sent = channel.sent();
		assert!(matches!(sent[0], Message::GetBlocks { .. }));
	}
}

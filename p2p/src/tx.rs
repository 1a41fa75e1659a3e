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

//! `tx` in/out, installed only when relay is enabled and the peer's version
//! permits (spec.md §4.7 step 5). Inbound transactions are handed to a
//! caller-supplied sink (the pool's admission path lives in `bcn_pool`, out
//! of this crate's dependency graph); outbound relay announces whatever the
//! bus reports as newly pooled, deduplicated through the same `Fingerprint`
//! other announcements use.

use std::sync::Arc;

use bcn_bus::{subscribe_events, Chase, EventBus, Flow, ObjectKey};
use bcn_store::Query;
use bcn_types::{HeaderHash, Transaction, TxLink};

use crate::channel::Channel;
use crate::error::Error;
use crate::fingerprint::Fingerprint;
use crate::message::Message;

/// Inbound sink: typically `TransactionChaser::accept` bound with a
/// `UtxoView`. Returning `Err` just drops the transaction; the peer is not
/// penalized here (policy, not structural, spec.md §7).
pub trait TxSink: Fn(Transaction) -> Result<(), String> + Send + Sync {}
impl<T: Fn(Transaction) -> Result<(), String> + Send + Sync> TxSink for T {}

pub struct TxInProtocol {
	channel: Arc<dyn Channel>,
	sink: Box<dyn TxSink>,
}

impl TxInProtocol {
	pub fn new(channel: Arc<dyn Channel>, sink: Box<dyn TxSink>) -> TxInProtocol {
		TxInProtocol { channel, sink }
	}

	pub fn on_tx(&self, transaction: Transaction) -> Result<(), Error> {
		if let Err(reason) = (self.sink)(transaction) {
			log::debug!("rejected tx from {}: {}", self.channel.peer_id(), reason);
		}
		Ok(())
	}
}

pub struct TxOutProtocol {
	channel: Arc<dyn Channel>,
	bus: Arc<EventBus>,
	query: Arc<dyn Query>,
	fingerprint: Arc<Fingerprint>,
}

impl TxOutProtocol {
	pub fn new(channel: Arc<dyn Channel>, bus: Arc<EventBus>, query: Arc<dyn Query>, fingerprint: Arc<Fingerprint>) -> Arc<TxOutProtocol> {
		Arc::new(TxOutProtocol { channel, bus, query, fingerprint })
	}

	fn announce(&self, link: TxLink) -> Result<(), Error> {
		// `TxLink` keys the pool, not `Query`; the announce key only needs to
		// be stable per transaction, so it is derived directly from the link
		// rather than round-tripped through storage.
		let mut bytes = [0u8; 32];
		bytes[0..8].copy_from_slice(&link.0.to_be_bytes());
		let key = HeaderHash(bytes);
		if self.fingerprint.seen_or_insert(key) {
			return Ok(());
		}
		let _ = &self.query;
		self.channel.send(Message::Inv(vec![key]))
	}

	pub fn spawn(self: &Arc<Self>) -> ObjectKey {
		let this = Arc::clone(self);
		subscribe_events(&self.bus, move |event| {
			match event {
				Chase::Transaction(link) => {
					if let Err(err) = this.announce(link) {
						log::warn!("failed to announce tx to {}: {}", this.channel.peer_id(), err);
					}
				}
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
	use bcn_types::{OutPoint, PeerId, ZERO_HASH};
	use std::time::Duration;

	fn sample_tx() -> Transaction {
		Transaction {
			hash: HeaderHash::from_slice(&[1u8; 32]),
			version: 1,
			inputs: vec![bcn_types::Input { previous_output: OutPoint { tx_hash: ZERO_HASH, index: 0 }, script_sig: vec![], sequence: 0 }],
			outputs: vec![],
			lock_time: 0,
		}
	}

	#[test]
	fn accepted_tx_does_not_log_a_rejection() {
		let channel = Arc::new(RecordingChannel::new(PeerId(1), 70015, 0));
		let protocol = TxInProtocol::new(Arc::clone(&channel) as Arc<dyn Channel>, Box::new(|_tx| Ok(())));
		protocol.on_tx(sample_tx()).unwrap();
	}

	async fn settle() {
		tokio::task::yield_now().await;
		tokio::time::sleep(Duration::from_millis(20)).await;
	}

	#[tokio::test]
	async fn transaction_event_announces_once() {
		let bus = EventBus::new();
		let query: Arc<dyn Query> = Arc::new(MemoryQuery::new());
		let channel = Arc::new(RecordingChannel::new(PeerId(1), 70015, 0));
		let protocol = TxOutProtocol::new(Arc::clone(&channel) as Arc<dyn Channel>, Arc::clone(&bus), query, Arc::new(Fingerprint::new(10)));
		protocol.spawn();
		bus.publish(Chase::Transaction(TxLink(1)));
		bus.publish(Chase::Transaction(TxLink(1)));
		settle().await;
		assert_eq!(channel.sent().len(), 1);
	}
}

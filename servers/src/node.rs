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

//! Glues the chain core, the transaction pool and peer sessions into one
//! running node (spec.md §2): constructs the shared `Query` and `EventBus`,
//! spawns every chaser, and hands out `PeerSession::install` for each
//! connected channel. Socket acceptance/dialing stays outside this crate,
//! same as the handshake itself (spec.md §4.7).

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use fs2::FileExt;
use parking_lot::RwLock;

use bcn_bus::EventBus;
use bcn_chain::{ChaserCheck, ChaserConfirm, ChaserSnapshot, ChaserStorage, ChaserValidate, Organize, OrganizeEngine, OrganizeResult};
use bcn_config::Settings;
use bcn_p2p::{Channel, Installed, OutboundSession, PeerSession, PeerSessionConfig, TxSink};
use bcn_pool::TransactionChaser;
use bcn_store::{MemoryQuery, Query};
use bcn_types::{Block, Header, HeaderHash, PeerId};
use bcn_util::StopState;

use crate::error::{Error, ErrorKind};
use crate::validator::StructuralValidator;

const LOCK_FILE_NAME: &str = "bcnode.lock";
/// Initial pool capacity (spec.md §4.9 supplemental); eviction keeps it
/// bounded from there on, so this is a starting allocation, not a cap.
const POOL_CAPACITY: usize = 10_000;
/// Heights between `Chase::Snap` requests; matches `ChaserSnapshot`'s own
/// "inert unless asked" default until a real operator policy exists.
const SNAPSHOT_INTERVAL: u64 = 0;
const STORAGE_POLL_INTERVAL: Duration = Duration::from_secs(30);
/// Headers carried per `getheaders` response; a full batch is what tells
/// `HeaderInProtocol` to pipeline another request (spec.md §4.7).
const MAX_GET_HEADERS: usize = 2000;

/// A running node. Holds every chaser alive for the process's lifetime and
/// the registry of installed peer sessions.
pub struct Node {
	pub settings: Settings,
	pub query: Arc<dyn Query>,
	pub bus: Arc<EventBus>,
	pub stop_state: Arc<StopState>,
	pub header_engine: Arc<dyn Organize<Header>>,
	pub block_engine: Arc<dyn Organize<Block>>,
	pub checker: Arc<ChaserCheck>,
	pub outbound_session: Arc<OutboundSession>,
	pub validate_chaser: Arc<ChaserValidate>,
	pub confirm_chaser: Arc<ChaserConfirm>,
	pub storage_chaser: Arc<ChaserStorage>,
	pub snapshot_chaser: Arc<ChaserSnapshot>,
	pub pool: Arc<TransactionChaser>,
	identity: Arc<dyn Fn(&Header) -> HeaderHash + Send + Sync>,
	sessions: RwLock<HashMap<PeerId, Installed>>,
	_lock_file: File,
}

impl Node {
	/// Builds every component and spawns the chasers, archiving `genesis`
	/// as the confirmed height 0 if the store is otherwise empty.
	pub fn init(settings: Settings, db_root: impl AsRef<Path>, genesis: Block) -> Result<Arc<Node>, Error> {
		let db_root = db_root.as_ref();
		let lock_file = lock_data_dir(db_root)?;

		let stop_state = Arc::new(StopState::new());
		let query: Arc<dyn Query> = Arc::new(MemoryQuery::new());
		let bus = EventBus::new();

		let header_validator = StructuralValidator::new(settings.currency_window_minutes);
		let block_validator = header_validator.clone();
		let identity: Arc<dyn Fn(&Header) -> HeaderHash + Send + Sync> = Arc::new(crate::validator::identity);

		let header_engine: Arc<dyn Organize<Header>> =
			Arc::new(OrganizeEngine::new(Arc::clone(&query), Arc::clone(&bus), header_validator, settings.checkpoints.clone()));
		let block_engine: Arc<dyn Organize<Block>> =
			Arc::new(OrganizeEngine::new(Arc::clone(&query), Arc::clone(&bus), block_validator, settings.checkpoints.clone()));

		seed_genesis(query.as_ref(), &block_engine, genesis)?;

		let checker = ChaserCheck::new(Arc::clone(&query), Arc::clone(&bus), settings.maximum_concurrency as usize, f64::from(settings.allowed_deviation));
		checker.spawn();

		let outbound_session = OutboundSession::new(Arc::clone(&checker), Arc::clone(&bus));
		outbound_session.spawn();

		let validate_chaser = ChaserValidate::new(
			Arc::clone(&query),
			Arc::clone(&bus),
			settings.maximum_backlog as usize,
			Box::new(|_query, _link| Ok(bcn_chain::ValidateOutcome { fees: 0, filter_body: Vec::new(), prevouts: Vec::new() })),
			settings.checkpoints.clone(),
		);
		validate_chaser.spawn();

		let confirm_chaser = ChaserConfirm::new(Arc::clone(&query), Arc::clone(&bus), SNAPSHOT_INTERVAL, Box::new(|_query, _link| Ok(0)));
		confirm_chaser.spawn();

		let storage_chaser = ChaserStorage::new(Arc::clone(&query), Arc::clone(&bus), Arc::clone(&stop_state), STORAGE_POLL_INTERVAL);
		storage_chaser.spawn();

		let snapshot_chaser = ChaserSnapshot::new(Arc::clone(&query), Arc::clone(&bus));
		snapshot_chaser.spawn();

		let pool = TransactionChaser::new(Arc::clone(&bus), POOL_CAPACITY);

		Ok(Arc::new(Node {
			settings,
			query,
			bus,
			stop_state,
			header_engine,
			block_engine,
			checker,
			outbound_session,
			validate_chaser,
			confirm_chaser,
			storage_chaser,
			snapshot_chaser,
			pool,
			identity,
			sessions: RwLock::new(HashMap::new()),
			_lock_file: lock_file,
		}))
	}

	/// Installs every protocol a negotiated channel's version and this
	/// node's configuration call for (spec.md §4.7), and remembers the
	/// result so `disconnect` can clean it up.
	pub fn connect(&self, channel: Arc<dyn Channel>, tx_sink: Option<Box<dyn TxSink>>) -> Result<(), bcn_p2p::Error> {
		let peer_id = channel.peer_id();
		let config = PeerSessionConfig {
			max_get_headers: MAX_GET_HEADERS,
			witness_node: self.settings.witness_node,
			enable_relay: self.settings.enable_relay,
			announcement_cache: self.settings.announcement_cache as usize,
		};
		let installed = PeerSession::install(
			Arc::clone(&self.bus),
			channel,
			Arc::clone(&self.query),
			Arc::clone(&self.header_engine),
			Arc::clone(&self.block_engine),
			Arc::clone(&self.checker),
			Arc::clone(&self.identity),
			tx_sink,
			&config,
		)?;
		self.sessions.write().insert(peer_id, installed);
		Ok(())
	}

	pub fn disconnect(&self, peer_id: PeerId) {
		self.sessions.write().remove(&peer_id);
	}

	pub fn connected_peers(&self) -> usize {
		self.sessions.read().len()
	}

	/// Suspends the network and tells every chaser to unsubscribe and stop
	/// (spec.md §5 "Suspension points").
	pub fn stop(&self) {
		self.stop_state.suspend();
		self.bus.publish(bcn_bus::Chase::Stop);
	}
}

fn lock_data_dir(db_root: &Path) -> Result<File, Error> {
	fs::create_dir_all(db_root)?;
	let path: PathBuf = db_root.join(LOCK_FILE_NAME);
	let lock_file = fs::OpenOptions::new().read(true).write(true).create(true).open(&path)?;
	lock_file
		.try_lock_exclusive()
		.map_err(|_| ErrorKind::AlreadyRunning(format!("{} is already locked (node already running?)", path.display())))?;
	Ok(lock_file)
}

fn seed_genesis(query: &dyn Query, block_engine: &Arc<dyn Organize<Block>>, genesis: Block) -> Result<(), Error> {
	if query.to_confirmed(0).is_some() {
		return Ok(());
	}
	let link = match block_engine.organize(genesis).map_err(|e| ErrorKind::Genesis(e.to_string()))? {
		OrganizeResult::Organized(height) if height == 0 => query.to_candidate(0).expect("just organized genesis"),
		other => return Err(ErrorKind::Genesis(format!("unexpected organize result for genesis: {:?}", other)).into()),
	};
	query.set_block_checked(link).map_err(|e| ErrorKind::Genesis(e.to_string()))?;
	query.set_block_valid(link, 0).map_err(|e| ErrorKind::Genesis(e.to_string()))?;
	query.set_block_confirmable(link, 0).map_err(|e| ErrorKind::Genesis(e.to_string()))?;
	query.set_block_confirmed(link, 0).map_err(|e| ErrorKind::Genesis(e.to_string()))?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use bcn_p2p::Message;
	use bcn_types::{ArenaHandle, Input, Output, Transaction, ZERO_HASH};
	use std::sync::atomic::{AtomicBool, Ordering};

	/// Minimal `Channel` double; `bcn_p2p::RecordingChannel` is test-only
	/// inside its own crate and not visible here as a plain dependency.
	struct TestChannel {
		peer_id: PeerId,
		version: u32,
		closed: AtomicBool,
	}

	impl Channel for TestChannel {
		fn peer_id(&self) -> PeerId {
			self.peer_id
		}
		fn negotiated_version(&self) -> u32 {
			self.version
		}
		fn services(&self) -> u64 {
			0
		}
		fn send(&self, _message: Message) -> Result<(), bcn_p2p::Error> {
			Ok(())
		}
		fn close(&self) {
			self.closed.store(true, Ordering::SeqCst);
		}
		fn is_closed(&self) -> bool {
			self.closed.load(Ordering::SeqCst)
		}
	}

	fn genesis_block() -> Block {
		let header = Header { version: 1, previous_hash: ZERO_HASH, merkle_root: ZERO_HASH, timestamp: 0, bits: 0x1d00_ffff, nonce: 0 };
		let coinbase = Transaction {
			hash: HeaderHash::from_slice(&[1u8; 32]),
			version: 1,
			inputs: vec![Input { previous_output: bcn_types::OutPoint { tx_hash: ZERO_HASH, index: 0xffff_ffff }, script_sig: vec![], sequence: 0 }],
			outputs: vec![Output { value: 50_0000_0000, script_pubkey: vec![] }],
			lock_time: 0,
		};
		Block { header, transactions: vec![coinbase], arena: ArenaHandle(Arc::new(())) }
	}

	#[tokio::test]
	async fn init_seeds_genesis_as_confirmed() {
		let dir = tempfile::tempdir().unwrap();
		let node = Node::init(Settings::default(), dir.path(), genesis_block()).unwrap();
		assert_eq!(node.query.get_top_confirmed(), 0);
		assert!(node.query.to_confirmed(0).is_some());
	}

	#[tokio::test]
	async fn a_second_init_against_the_same_dir_is_rejected() {
		let dir = tempfile::tempdir().unwrap();
		let _node = Node::init(Settings::default(), dir.path(), genesis_block()).unwrap();
		let err = Node::init(Settings::default(), dir.path(), genesis_block()).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::AlreadyRunning(_)));
	}

	#[tokio::test]
	async fn connect_and_disconnect_track_peer_count() {
		let dir = tempfile::tempdir().unwrap();
		let node = Node::init(Settings::default(), dir.path(), genesis_block()).unwrap();
		let channel = Arc::new(TestChannel { peer_id: PeerId(1), version: 70015, closed: AtomicBool::new(false) });
		node.connect(channel as Arc<dyn Channel>, None).unwrap();
		assert_eq!(node.connected_peers(), 1);
		node.disconnect(PeerId(1));
		assert_eq!(node.connected_peers(), 0);
	}
}

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

//! The `Query` storage facade (spec.md §6): the minimum surface the
//! organize/validate/confirm/check/storage/snapshot chasers consume. All
//! writes are synchronous and atomic relative to a single `HeaderLink`;
//! callers never see a partially applied write.

use bcn_types::{Block, ChainContext, Header, HeaderHash, HeaderLink, HeaderState, Height, Transaction};

use crate::error::Error;

/// Callback invoked by `snapshot`/`reload` as they make progress; mirrors
/// the original's plain event-handler parameter rather than a future, since
/// `Query` calls are specified as blocking (spec.md §5 "Query calls that
/// block on I/O").
pub type EventHandler<'a> = &'a (dyn Fn(StoreEvent) + Send + Sync);

/// Progress events a long-running administrative call may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
	Started,
	Progress(u8),
	Complete,
}

/// Held for the duration of a confirmed-chain reorganization (spec.md §3
/// "Reorg atomicity"). Dropping the guard releases the lock; the type
/// carries no data; its existence is the proof of exclusivity.
pub trait ReorganizationLock: Send {}

/// The storage facade. One implementation is expected to back a live node
/// (out of scope here); `MemoryQuery` is the in-memory reference used by
/// this workspace's own tests.
pub trait Query: Send + Sync {
	/// Lookup: resolve a hash to its dense link, if archived.
	fn to_header(&self, hash: &HeaderHash) -> Option<HeaderLink>;
	/// Lookup: the link at `height` on the confirmed chain.
	fn to_confirmed(&self, height: Height) -> Option<HeaderLink>;
	/// Lookup: the link at `height` on the candidate chain.
	fn to_candidate(&self, height: Height) -> Option<HeaderLink>;
	/// Lookup: the highest candidate-chain height.
	fn get_top_candidate(&self) -> Height;
	/// Lookup: the highest confirmed-chain height.
	fn get_top_confirmed(&self) -> Height;
	/// Lookup: the highest height with an associated (body-present) header
	/// at or after `from`.
	fn get_top_associated_from(&self, from: Height) -> Height;

	/// Read: the header for a link.
	fn get_header(&self, link: HeaderLink) -> Result<Header, Error>;
	/// Read: the block body for a link. `witness` selects whether witness
	/// data is included (bip144); irrelevant once script evaluation is
	/// out of scope, kept for interface fidelity.
	fn get_block(&self, link: HeaderLink, witness: bool) -> Result<Block, Error>;
	/// Read: a single archived transaction.
	fn get_transaction(&self, link: HeaderLink) -> Result<Transaction, Error>;
	/// Read: the derived context for a link.
	fn get_context(&self, link: HeaderLink) -> Result<ChainContext, Error>;
	/// Read: the coordination state for a link.
	fn get_state(&self, link: HeaderLink) -> Result<HeaderState, Error>;
	/// Read: the current fork point, as the sequence of candidate links
	/// diverging from the confirmed chain, lowest height first.
	fn get_fork(&self) -> Vec<HeaderLink>;
	/// Read: candidate-chain hashes for a batch of heights, in order.
	fn get_candidate_hashes(&self, heights: &[Height]) -> Vec<Option<HeaderHash>>;
	/// Read: the compact-filter body computed for a link, if any.
	fn get_filter_body(&self, link: HeaderLink) -> Result<Vec<u8>, Error>;

	/// Write: archive a header under `hash` — the caller's own content-hash
	/// computation, the same one used for duplicate detection and fork
	/// lookups — with its derived context, returning the dense link
	/// assigned to it. Idempotent: archiving the same hash twice returns
	/// the existing link. The store never computes this hash itself, so
	/// it always agrees with whatever identity function the caller used.
	fn set_header(&self, header: Header, hash: HeaderHash, context: ChainContext) -> Result<HeaderLink, Error>;
	/// Write: archive a block body for a previously archived header link.
	fn set_block(&self, link: HeaderLink, block: Block) -> Result<HeaderLink, Error>;
	/// Write: extend the candidate chain with `link` as its new top. The
	/// sole path that grows `to_candidate`/`get_top_candidate`; called by
	/// the organize engine once a branch wins the fork choice.
	fn set_candidate(&self, link: HeaderLink) -> Result<(), Error>;
	/// Write: drop the candidate chain down to `keep` entries, by count
	/// rather than height, so the organize engine can express "regress to
	/// before genesis" as `keep = 0`. Called on reorganize and disorganize.
	fn truncate_candidate(&self, keep: usize) -> Result<(), Error>;
	/// Write: mark a link `checked` (structural checks passed, no script
	/// evaluation). Issued by the block-in protocol once a body completes
	/// download; `ChaserValidate` only ever sees links already at this
	/// state.
	fn set_block_checked(&self, link: HeaderLink) -> Result<(), Error>;
	/// Write: mark a link `valid`, recording the total fees collected.
	fn set_block_valid(&self, link: HeaderLink, fees: u64) -> Result<(), Error>;
	/// Write: mark a link `unconfirmable` (terminal).
	fn set_block_unconfirmable(&self, link: HeaderLink) -> Result<(), Error>;
	/// Write: mark a link `confirmable`, recording the total fees.
	fn set_block_confirmable(&self, link: HeaderLink, fees: u64) -> Result<(), Error>;
	/// Write: mark a link `confirmed` and extend the confirmed chain with
	/// it at `height`, which must be exactly one past the current top.
	fn set_block_confirmed(&self, link: HeaderLink, height: Height) -> Result<(), Error>;
	/// Write: mark the confirmed chain's current top link `reorganized`
	/// and pop it. Fails if `link` is not that top.
	fn set_block_reorganized(&self, link: HeaderLink) -> Result<(), Error>;
	/// Write: mark a link as strong (its branch currently wins the fork
	/// choice); used by the organize engine to pin the active candidate.
	fn set_strong(&self, link: HeaderLink) -> Result<(), Error>;
	/// Write: persist a computed compact-filter body for a link.
	fn set_filter_body(&self, link: HeaderLink, body: Vec<u8>) -> Result<(), Error>;
	/// Write: persist the set of previous outputs a block's inputs spent,
	/// used by `ChaserValidate` to compute fees without re-reading parents.
	fn set_prevouts(&self, link: HeaderLink, prevouts: Vec<u64>) -> Result<(), Error>;

	/// Administration: snapshot the store; reports progress through
	/// `handler`. Must be called while holding a `ReorganizationLock`.
	fn snapshot(&self, handler: EventHandler) -> Result<(), Error>;
	/// Administration: reload the store after space was freed.
	fn reload(&self, handler: EventHandler) -> Result<(), Error>;
	/// Administration: bytes the store estimates it needs to stay healthy.
	fn space_required(&self) -> u64;
	/// Administration: bytes currently free on the store's volume.
	fn space_free(&self) -> u64;
	/// Administration: true once the node has been faulted by a prior
	/// unrecoverable error; no further writes are accepted.
	fn is_fault(&self) -> bool;
	/// Administration: acquire the exclusive reorganization lock, serializing
	/// `ConfirmChaser` and `SnapshotChaser` against each other.
	fn get_reorganization_lock(&self) -> Box<dyn ReorganizationLock>;
}

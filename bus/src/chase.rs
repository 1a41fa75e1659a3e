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

//! The control-flow event catalogue chasers publish and subscribe to
//! (spec.md §4.1). This is the sole channel chasers use to hand work to
//! one another; no chaser ever calls another directly.

use bcn_types::{Height, HeaderLink, PeerId};

/// A published event. Doc comments on each variant name its issuer and
/// handlers, the same contract libbitcoin-node's `chase` enum documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chase {
	/// Chasers directed to start operating. Issued by the full node;
	/// handled by check, validate, confirm.
	Start(Height),
	/// Disk space is limited. Issued by the full node; handled by
	/// snapshot and storage.
	Space,
	/// Take a snapshot. Issued by confirm; handled by snapshot.
	Snap(Height),
	/// Chaser directed to attempt to advance from its current position.
	/// Issued by organize; handled by check, validate, confirm.
	Bump(Height),
	/// Channels directed to stop. Issued by the full node; handled by the
	/// observer protocol.
	Suspend,
	/// Chasers directed to resume following a suspend. Issued by the full
	/// node; handled by check, validate, confirm.
	Resume,
	/// Channel starved for work. Issued by the block-in protocol; handled
	/// by the outbound session.
	Starved(PeerId),
	/// Channel directed to split its work and stop. Issued by the outbound
	/// session; handled by the block-in protocol.
	Split(PeerId),
	/// All channels with work directed to split and stop. Issued by the
	/// outbound session; handled by the block-in protocol.
	Stall,
	/// All channels with work directed to drop work and stop. Issued by
	/// check; handled by the block-in protocol.
	Purge,
	/// Channels directed to write their work count to the log. Issued by
	/// the executor; handled by the block-in protocol.
	Report,
	/// A new candidate branch exists from the given branch point. Issued
	/// by the block organizer; handled by confirm and snapshot.
	Blocks(Height),
	/// A new candidate branch exists from the given branch point. Issued
	/// by the header organizer; handled by check.
	Headers(Height),
	/// New candidate headers without bodies exist. Issued by check;
	/// handled by the block-in protocol.
	Download(usize),
	/// The candidate chain has been reorganized below its top. Issued by
	/// organize; handled by check, validate, confirm.
	Regressed(Height),
	/// `Unchecked`, `Unvalid` or `Unconfirmable` was handled. Issued by
	/// organize; handled by check, validate, confirm.
	Disorganized(Height),
	/// A block has been downloaded, checked and stored. Issued by the
	/// block-in protocol; handled by check, validate, snapshot.
	Checked(Height),
	/// A downloaded block has failed check. Issued by the block-in
	/// protocol; handled by organize.
	Unchecked(HeaderLink),
	/// A branch has become valid. Issued by validate; handled by check,
	/// confirm, snapshot.
	Valid(Height),
	/// A checked block has failed validation. Issued by validate; handled
	/// by organize.
	Unvalid(HeaderLink),
	/// A connected block has become confirmable. Issued by confirm;
	/// handled by snapshot.
	Confirmable(HeaderLink),
	/// A connected block has failed confirmability. Issued by confirm;
	/// handled by organize.
	Unconfirmable(HeaderLink),
	/// A current block has been organized. Issued by transaction; handled
	/// by the header/block-out protocols.
	Block(HeaderLink),
	/// A confirmable block has been confirmed. Issued by confirm; handled
	/// by transaction.
	Organized(HeaderLink),
	/// A previously confirmed block has been unconfirmed. Issued by
	/// confirm; handled by transaction.
	Reorganized(HeaderLink),
	/// A transaction has been added to the pool. Issued by transaction;
	/// handled by template assembly.
	Transaction(bcn_types::TxLink),
	/// A candidate block template has been created. Issued by template
	/// assembly; handled by miners (outside this core).
	Template(Height),
	/// Service is stopping.
	Stop,
}

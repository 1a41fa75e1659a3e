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

//! Diagnostic reporting tags (SPEC_FULL.md §3): parallel to `Chase`, but
//! consumed only by logging, never by control flow. Grounded in the
//! original source's `events` enum.

use bcn_types::HeaderLink;

/// A notable state transition worth a log line. `full_node` subscribes to
/// these purely to emit structured `log` records; no chaser reacts to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportEvent {
	HeaderArchived(HeaderLink),
	HeaderOrganized(HeaderLink),
	HeaderReorganized(HeaderLink),
	BlockArchived(HeaderLink),
	BlockBuffered(HeaderLink),
	BlockValidated(HeaderLink),
	BlockConfirmed(HeaderLink),
	BlockUnconfirmable(HeaderLink),
	ValidateBypassed(HeaderLink),
	ConfirmBypassed(HeaderLink),
	TxArchived(bcn_types::TxLink),
	TxValidated(bcn_types::TxLink),
	TxInvalidated(bcn_types::TxLink),
	BlockOrganized(HeaderLink),
	BlockReorganized(HeaderLink),
	TemplateIssued(HeaderLink),
}

impl ReportEvent {
	/// Emit this event at the appropriate `log` level. Archival/validation
	/// milestones are `info`; nothing here is `warn`/`error` — those are
	/// reserved for faults, which are logged where they occur instead.
	pub fn log(&self) {
		log::info!("{:?}", self);
	}
}

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

//! The abstract channel a peer session's protocols write to. Actual framing,
//! TLS and socket I/O live entirely outside this core (spec.md §4.7); a
//! protocol handler only ever sees a `Channel` it can send typed messages
//! on and ask about the negotiated session.

use bcn_types::PeerId;

use crate::error::{Error, ErrorKind};
use crate::message::Message;

/// One negotiated P2P session. A real implementation wraps a socket and its
/// wire codec; this trait is the whole surface the core's protocols need.
pub trait Channel: Send + Sync {
	fn peer_id(&self) -> PeerId;
	/// The lower of the two peers' advertised protocol versions.
	fn negotiated_version(&self) -> u32;
	/// The remote peer's advertised service bits.
	fn services(&self) -> u64;
	fn send(&self, message: Message) -> Result<(), Error>;
	/// Fail the channel, e.g. on a protocol violation or `Chase::Suspend`.
	fn close(&self);
	fn is_closed(&self) -> bool;
}

/// A no-op channel used by tests and by callers that only want to inspect
/// what a protocol handler would have sent.
#[cfg(test)]
pub struct RecordingChannel {
	peer_id: PeerId,
	version: u32,
	services: u64,
	sent: parking_lot::Mutex<Vec<Message>>,
	closed: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl RecordingChannel {
	pub fn new(peer_id: PeerId, version: u32, services: u64) -> RecordingChannel {
		RecordingChannel {
			peer_id,
			version,
			services,
			sent: parking_lot::Mutex::new(Vec::new()),
			closed: std::sync::atomic::AtomicBool::new(false),
		}
	}

	pub fn sent(&self) -> Vec<Message> {
		self.sent.lock().clone()
	}
}

#[cfg(test)]
impl Channel for RecordingChannel {
	fn peer_id(&self) -> PeerId {
		self.peer_id
	}

	fn negotiated_version(&self) -> u32 {
		self.version
	}

	fn services(&self) -> u64 {
		self.services
	}

	fn send(&self, message: Message) -> Result<(), Error> {
		if self.is_closed() {
			return Err(ErrorKind::ChannelClosed.into());
		}
		self.sent.lock().push(message);
		Ok(())
	}

	fn close(&self) {
		self.closed.store(true, std::sync::atomic::Ordering::SeqCst);
	}

	fn is_closed(&self) -> bool {
		self.closed.load(std::sync::atomic::Ordering::SeqCst)
	}
}

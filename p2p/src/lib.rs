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

//! Peer sessions and protocol handlers (spec.md §4.7), over an abstract
//! `Channel` — no socket I/O, TLS or wire framing lives in this crate.

mod block_in;
mod block_sync;
mod channel;
mod error;
mod filter;
mod fingerprint;
mod header_in;
mod header_out;
mod message;
mod observer;
mod session;
mod tx;

pub use block_in::BlockInProtocol;
pub use block_sync::BlockSyncProtocol;
pub use channel::Channel;
pub use error::{Error, ErrorKind};
pub use filter::FilterOutProtocol;
pub use fingerprint::Fingerprint;
pub use header_in::HeaderInProtocol;
pub use header_out::HeaderOutProtocol;
pub use message::Message;
pub use observer::ObserverProtocol;
pub use session::{Installed, OutboundSession, PeerSession, PeerSessionConfig, BIP130_VERSION, HEADERS_VERSION, NODE_COMPACT_FILTERS};
pub use tx::{TxInProtocol, TxOutProtocol, TxSink};

#[cfg(test)]
pub use channel::RecordingChannel;

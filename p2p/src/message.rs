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

//! The wire message set spec.md §6 names. Framing, serialization and actual
//! socket I/O are out of scope; protocol handlers only ever see and produce
//! these typed values over a `Channel`.

use bcn_types::{Block, Header, HeaderHash, Height, Transaction};

/// One P2P message, exactly the set spec.md §6 lists.
#[derive(Debug, Clone)]
pub enum Message {
	Version { version: u32, services: u64, user_agent: String },
	Verack,
	Ping(u64),
	Pong(u64),
	Addr(Vec<std::net::SocketAddr>),
	GetHeaders { locator: Vec<HeaderHash>, stop: HeaderHash },
	Headers(Vec<Header>),
	GetBlocks { locator: Vec<HeaderHash>, stop: HeaderHash },
	Inv(Vec<HeaderHash>),
	GetData(Vec<HeaderHash>),
	Block(Block),
	Tx(Transaction),
	SendHeaders,
	GetCFilters { start_height: Height, stop: HeaderHash },
	CFilter { link: HeaderHash, filter: Vec<u8> },
	GetCFHeaders { start_height: Height, stop: HeaderHash },
	CFHeaders { stop: HeaderHash, filter_hashes: Vec<HeaderHash> },
	GetCFCheckpt(HeaderHash),
	CFCheckpt(Vec<HeaderHash>),
	Reject { message: String, reason: String },
}

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

//! Dense identifiers used as the canonical keys between chasers (spec.md
//! §3: "events carry `HeaderLink`, not hashes").

use std::fmt;

/// A stable dense id assigned when a header is first archived. The
/// canonical key between chasers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct HeaderLink(pub u64);

impl fmt::Display for HeaderLink {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Opaque identity for a connected peer, as assigned by the network session
/// layer (spec.md §1: TCP/TLS framing is an external collaborator).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct PeerId(pub u64);

impl fmt::Display for PeerId {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "peer:{}", self.0)
	}
}

/// A dense id for an archived transaction (pool/validate use).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct TxLink(pub u64);

/// Chain height. A plain alias rather than a newtype: heights are added to,
/// subtracted from and compared against plain integers constantly (slicing,
/// loop bounds) throughout `bcn_chain`, and a newtype would add ceremony at
/// every one of those sites without preventing a real class of bug (unlike
/// `HeaderLink`/`PeerId`, which are never used arithmetically).
pub type Height = u64;

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

//! Full-node orchestrator: constructs the shared `Query`/`EventBus`, spawns
//! every chaser and the transaction pool, and installs peer sessions on
//! connected channels. Everything below the `Channel` abstraction (sockets,
//! framing, the version handshake) is out of this crate's scope, same as
//! it is out of `bcn_p2p`'s.

mod error;
mod node;
mod validator;

pub use error::{Error, ErrorKind};
pub use node::Node;
pub use validator::{identity, StructuralValidator};

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

//! Core data model shared by every other crate in the workspace: hashes,
//! headers, blocks, chain state and the identifiers chasers pass between
//! each other.

pub mod block;
pub mod checkpoint;
pub mod context;
pub mod hash;
pub mod header;
pub mod ids;
pub mod state;
pub mod work;

pub use block::{ArenaHandle, Block, Input, OutPoint, Output, Transaction};
pub use checkpoint::{Checkpoint, CheckpointTable, Milestone};
pub use context::{ChainContext, ContextFlags};
pub use hash::{HeaderHash, ZERO_HASH};
pub use header::Header;
pub use ids::{Height, HeaderLink, PeerId, TxLink};
pub use state::HeaderState;
pub use work::Work;

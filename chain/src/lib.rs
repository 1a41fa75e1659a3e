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

//! Candidate/confirmed chain core (spec.md §4.2-§4.7): the organize engine
//! and the check/validate/confirm/storage/snapshot chasers that advance a
//! header or block through its coordination states.

pub mod candidate;
pub mod check;
pub mod confirm;
pub mod confirmed;
pub mod error;
pub mod organize;
pub mod snapshot;
pub mod storage;
pub mod tree;
pub mod validate;
mod work;

pub use candidate::CandidateChain;
pub use check::{ChaserCheck, DownloadBatch};
pub use confirm::{ChaserConfirm, Confirm};
pub use confirmed::ConfirmedChain;
pub use error::{Error, ErrorKind};
pub use organize::{Organize, OrganizeEngine, OrganizeResult, Organizable, Validator};
pub use snapshot::ChaserSnapshot;
pub use storage::ChaserStorage;
pub use tree::{Tree, TreeEntry};
pub use validate::{ChaserValidate, Validate, ValidateOutcome};
pub use work::header_work;

use bcn_types::{Block, Header};

/// The header-first organize engine: accepts bare headers with no body yet.
pub type HeaderOrganizer<V> = OrganizeEngine<Header, V>;

/// The block organize engine: accepts full bodies, archiving header and
/// body together once a branch wins the fork choice.
pub type BlockOrganizer<V> = OrganizeEngine<Block, V>;

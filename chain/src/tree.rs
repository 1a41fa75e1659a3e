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

//! Transient in-memory map of header/block fragments not yet committed to
//! the candidate chain (spec.md §3 "Tree").

use std::collections::HashMap;

use bcn_types::{Height, HeaderHash, Work};

/// One tree entry: enough to walk ancestry and sum work without touching
/// storage until the branch is selected.
#[derive(Clone)]
pub struct TreeEntry<E> {
	pub entity: E,
	pub parent: HeaderHash,
	pub height: Height,
	pub work: Work,
}

/// The tree itself: a plain hash map keyed by the entity's own hash.
/// Entries are drained into storage once their branch is selected
/// (spec.md §4.2 step 6); entries belonging to a branch that lost the fork
/// choice are simply left here until dropped or overwritten.
pub struct Tree<E> {
	entries: HashMap<HeaderHash, TreeEntry<E>>,
}

impl<E: Clone> Tree<E> {
	pub fn new() -> Tree<E> {
		Tree { entries: HashMap::new() }
	}

	pub fn insert(&mut self, hash: HeaderHash, entry: TreeEntry<E>) {
		self.entries.insert(hash, entry);
	}

	pub fn get(&self, hash: &HeaderHash) -> Option<&TreeEntry<E>> {
		self.entries.get(hash)
	}

	pub fn remove(&mut self, hash: &HeaderHash) -> Option<TreeEntry<E>> {
		self.entries.remove(hash)
	}

	pub fn contains(&self, hash: &HeaderHash) -> bool {
		self.entries.contains_key(hash)
	}

	/// Walk from `from` back toward the branch point, collecting each
	/// tree-resident ancestor in root-to-tip order along with the total
	/// work accumulated purely from tree entries (storage-resident
	/// ancestors are summed separately by the caller, which knows the
	/// confirmed/candidate chain's per-height work).
	pub fn ancestry(&self, from: HeaderHash) -> (Vec<HeaderHash>, Work) {
		let mut chain = Vec::new();
		let mut total = Work::zero();
		let mut cursor = from;
		while let Some(entry) = self.entries.get(&cursor) {
			chain.push(cursor);
			total = total + entry.work;
			cursor = entry.parent;
		}
		chain.reverse();
		(chain, total)
	}
}

impl<E: Clone> Default for Tree<E> {
	fn default() -> Tree<E> {
		Tree::new()
	}
}

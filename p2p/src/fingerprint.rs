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

//! Bounded announcement-suppression cache (spec.md §3/§8 "no echo"): once a
//! hash has been seen from or sent to a peer, it is not announced back.

use std::collections::{HashSet, VecDeque};

use parking_lot::Mutex;

use bcn_types::HeaderHash;

struct Inner {
	order: VecDeque<HeaderHash>,
	seen: HashSet<HeaderHash>,
}

pub struct Fingerprint {
	capacity: usize,
	inner: Mutex<Inner>,
}

impl Fingerprint {
	pub fn new(capacity: usize) -> Fingerprint {
		Fingerprint { capacity: capacity.max(1), inner: Mutex::new(Inner { order: VecDeque::new(), seen: HashSet::new() }) }
	}

	/// Records `hash` as seen, returning `true` if it had already been
	/// recorded (the caller should suppress re-announcing it).
	pub fn seen_or_insert(&self, hash: HeaderHash) -> bool {
		let mut inner = self.inner.lock();
		if inner.seen.contains(&hash) {
			return true;
		}
		inner.seen.insert(hash);
		inner.order.push_back(hash);
		if inner.order.len() > self.capacity {
			if let Some(oldest) = inner.order.pop_front() {
				inner.seen.remove(&oldest);
			}
		}
		false
	}

	pub fn len(&self) -> usize {
		self.inner.lock().order.len()
	}
}

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

//! `CandidateChain` (spec.md §3): "ordered list of `HeaderLink` by height.
//! May regress (drop suffix) when a stronger branch is organized."

use bcn_types::{Height, HeaderLink};

/// An in-memory index paralleling the candidate chain the organize engine
/// maintains in storage; the organize engine is the only writer.
#[derive(Default)]
pub struct CandidateChain {
	links: Vec<HeaderLink>,
}

impl CandidateChain {
	pub fn new() -> CandidateChain {
		CandidateChain { links: Vec::new() }
	}

	pub fn top(&self) -> Height {
		self.links.len().saturating_sub(1) as Height
	}

	pub fn at(&self, height: Height) -> Option<HeaderLink> {
		self.links.get(height as usize).copied()
	}

	pub fn push(&mut self, link: HeaderLink) {
		self.links.push(link);
	}

	/// Drop the suffix above `height`, as the organize engine does when a
	/// stronger branch displaces the incumbent (spec.md §4.2 step 6).
	pub fn regress_to(&mut self, height: Height) -> Vec<HeaderLink> {
		let keep = (height as usize) + 1;
		if keep >= self.links.len() {
			return Vec::new();
		}
		self.links.split_off(keep)
	}

	/// Drop every link at or past index `keep`, by raw count rather than
	/// height; used where the caller already holds a "before genesis"
	/// sentinel that `regress_to`'s height-based API can't express.
	pub fn truncate_to(&mut self, keep: usize) {
		self.links.truncate(keep);
	}

	pub fn len(&self) -> usize {
		self.links.len()
	}

	pub fn is_empty(&self) -> bool {
		self.links.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn regress_drops_everything_above_the_branch_point() {
		let mut chain = CandidateChain::new();
		for i in 0..5u64 {
			chain.push(HeaderLink(i));
		}
		let popped = chain.regress_to(2);
		assert_eq!(popped, vec![HeaderLink(3), HeaderLink(4)]);
		assert_eq!(chain.top(), 2);
	}

	#[test]
	fn regress_above_top_is_a_no_op() {
		let mut chain = CandidateChain::new();
		chain.push(HeaderLink(0));
		assert!(chain.regress_to(5).is_empty());
	}
}

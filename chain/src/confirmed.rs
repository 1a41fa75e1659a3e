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

//! `ConfirmedChain` (spec.md §3): "ordered list of `HeaderLink` by height.
//! Mutated only by `ConfirmChaser` under the reorganization lock."

use bcn_types::{Height, HeaderLink};

#[derive(Default)]
pub struct ConfirmedChain {
	links: Vec<HeaderLink>,
}

impl ConfirmedChain {
	pub fn new() -> ConfirmedChain {
		ConfirmedChain { links: Vec::new() }
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

	pub fn pop(&mut self) -> Option<HeaderLink> {
		self.links.pop()
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
	fn push_and_pop_are_symmetric() {
		let mut chain = ConfirmedChain::new();
		chain.push(HeaderLink(0));
		chain.push(HeaderLink(1));
		assert_eq!(chain.top(), 1);
		assert_eq!(chain.pop(), Some(HeaderLink(1)));
		assert_eq!(chain.top(), 0);
	}
}

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

//! Encapsulation of a lazily-set value for one-time initialization after
//! construction. Used where a chaser is built before the `EventBus` or the
//! sibling chasers it posts to exist yet, and is wired in a second pass.

use parking_lot::RwLock;

/// Holds a `T` that is set exactly once, after construction. Reading before
/// the value is set panics: this is the "fail hard if not used properly"
/// helper the constructor/wiring split in `bcn_servers` relies on.
pub struct OneTime<T> {
	inner: RwLock<Option<T>>,
}

impl<T: Clone> OneTime<T> {
	/// Build an uninitialized `OneTime`.
	pub fn new() -> OneTime<T> {
		OneTime {
			inner: RwLock::new(None),
		}
	}

	/// Set the value. Panics if already set — a `OneTime` is meant to be
	/// wired exactly once during node startup.
	pub fn init(&self, value: T) {
		let mut inner = self.inner.write();
		if inner.is_some() {
			panic!("OneTime already initialized");
		}
		*inner = Some(value);
	}

	/// True once `init` has been called.
	pub fn is_initialized(&self) -> bool {
		self.inner.read().is_some()
	}

	/// Read the value. Panics if `init` was never called.
	pub fn borrow(&self) -> T {
		self.inner
			.read()
			.clone()
			.expect("OneTime read before initialization")
	}
}

impl<T: Clone> Default for OneTime<T> {
	fn default() -> Self {
		OneTime::new()
	}
}

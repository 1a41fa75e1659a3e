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

//! Monitors free disk space while the node is suspended for it, and
//! resumes once the store reports enough room to reload (spec.md §4.6
//! "ChaserStorage"). Does not itself decide to suspend: that's whichever
//! write path first discovers the shortage; this chaser only watches for
//! the shortage to clear.

use std::sync::Arc;
use std::time::Duration;

use bcn_bus::{subscribe_events, Chase, EventBus, Flow, ObjectKey};
use bcn_store::{Query, StoreEvent};
use bcn_util::StopState;

fn noop_handler(_event: StoreEvent) {}

pub struct ChaserStorage {
	query: Arc<dyn Query>,
	bus: Arc<EventBus>,
	stop: Arc<StopState>,
	poll_interval: Duration,
}

impl ChaserStorage {
	pub fn new(query: Arc<dyn Query>, bus: Arc<EventBus>, stop: Arc<StopState>, poll_interval: Duration) -> Arc<ChaserStorage> {
		Arc::new(ChaserStorage { query, bus, stop, poll_interval })
	}

	fn has_capacity(&self) -> bool {
		self.query.space_free() >= self.query.space_required()
	}

	fn do_reload(&self) {
		if self.query.reload(&noop_handler).is_ok() {
			self.stop.resume();
			self.bus.publish(Chase::Resume);
		}
		// A failed reload leaves the node suspended; the store is expected
		// to fault separately if the condition is unrecoverable.
	}

	/// React to a `Chase::Space` notification: if the node isn't actually
	/// suspended (someone else already resumed it, or it never needed to
	/// be), there's nothing to watch. Otherwise check once immediately,
	/// then poll on a timer until space frees up.
	fn do_space(self: &Arc<Self>) {
		if self.query.is_fault() || !self.stop.is_suspended() {
			return;
		}
		if self.has_capacity() {
			self.do_reload();
			return;
		}
		let this = Arc::clone(self);
		tokio::spawn(async move {
			let mut interval = tokio::time::interval(this.poll_interval);
			loop {
				interval.tick().await;
				if this.query.is_fault() || !this.stop.is_suspended() {
					return;
				}
				if this.has_capacity() {
					this.do_reload();
					return;
				}
			}
		});
	}

	pub fn spawn(self: &Arc<Self>) -> ObjectKey {
		let this = Arc::clone(self);
		subscribe_events(&self.bus, move |event| {
			match event {
				Chase::Space => this.do_space(),
				Chase::Stop => return Flow::Unsubscribe,
				_ => {}
			}
			Flow::Continue
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bcn_store::MemoryQuery;

	#[tokio::test]
	async fn capacity_already_sufficient_resumes_immediately() {
		let store = Arc::new(MemoryQuery::new());
		store.set_space(100, 100);
		let bus = EventBus::new();
		let stop = Arc::new(StopState::new());
		stop.suspend();
		let chaser = ChaserStorage::new(store as Arc<dyn Query>, bus, Arc::clone(&stop), Duration::from_millis(5));
		chaser.do_space();
		assert!(!stop.is_suspended());
	}

	#[tokio::test]
	async fn insufficient_space_leaves_node_suspended() {
		let store = Arc::new(MemoryQuery::new());
		store.set_space(10, 100);
		let bus = EventBus::new();
		let stop = Arc::new(StopState::new());
		stop.suspend();
		let chaser = ChaserStorage::new(store as Arc<dyn Query>, bus, Arc::clone(&stop), Duration::from_secs(60));
		chaser.do_space();
		assert!(stop.is_suspended());
	}

	#[tokio::test]
	async fn not_suspended_is_a_no_op() {
		let store = Arc::new(MemoryQuery::new());
		store.set_space(10, 100);
		let bus = EventBus::new();
		let stop = Arc::new(StopState::new());
		let chaser = ChaserStorage::new(store as Arc<dyn Query>, bus, Arc::clone(&stop), Duration::from_secs(60));
		chaser.do_space();
		assert!(!stop.is_suspended());
	}
}

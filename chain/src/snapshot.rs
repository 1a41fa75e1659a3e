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

//! Takes a store snapshot on request, under the reorganization lock so it
//! never races a confirm/reorganize (spec.md §4.7 "ChaserSnapshot").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bcn_bus::{subscribe_events, Chase, EventBus, Flow, ObjectKey};
use bcn_store::{Query, StoreEvent};
use bcn_types::Height;

fn noop_handler(_event: StoreEvent) {}

pub struct ChaserSnapshot {
	query: Arc<dyn Query>,
	bus: Arc<EventBus>,
	/// Set once a snapshot has run; exposed for tests and for operators who
	/// only want a one-shot snapshot on the first request.
	taken: AtomicBool,
}

impl ChaserSnapshot {
	pub fn new(query: Arc<dyn Query>, bus: Arc<EventBus>) -> Arc<ChaserSnapshot> {
		Arc::new(ChaserSnapshot { query, bus, taken: AtomicBool::new(false) })
	}

	pub fn has_taken(&self) -> bool {
		self.taken.load(Ordering::SeqCst)
	}

	fn do_snap(&self, _height: Height) {
		if self.query.is_fault() {
			return;
		}
		let _lock = self.query.get_reorganization_lock();
		if self.query.snapshot(&noop_handler).is_ok() {
			self.taken.store(true, Ordering::SeqCst);
		}
	}

	pub fn spawn(self: &Arc<Self>) -> ObjectKey {
		let this = Arc::clone(self);
		subscribe_events(&self.bus, move |event| {
			match event {
				Chase::Snap(height) => this.do_snap(height),
				Chase::Stop => return Flow::Unsubscribe,
				_ => {}
			}
			Flow::Continue
		})
	}
}

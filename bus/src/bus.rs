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

//! Typed publish/subscribe bus. Each subscriber owns an inbox drained on
//! its own task, so `publish` never runs subscriber code on the
//! publisher's strand (spec.md §4.1).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::chase::Chase;

/// Handle returned by `subscribe_events`, used to remove a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectKey(u64);

/// What a subscriber's handler wants to happen after processing an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
	Continue,
	Unsubscribe,
}

/// The event bus. Held as an `Arc` by every chaser and protocol handler
/// that publishes or subscribes.
pub struct EventBus {
	subscribers: RwLock<HashMap<ObjectKey, mpsc::UnboundedSender<Chase>>>,
	next_key: AtomicU64,
}

impl EventBus {
	pub fn new() -> Arc<EventBus> {
		Arc::new(EventBus { subscribers: RwLock::new(HashMap::new()), next_key: AtomicU64::new(0) })
	}

	/// Register a raw inbox. Most callers want `subscribe_events`, which
	/// also spawns the draining task; this is exposed for callers (tests,
	/// protocol handlers with their own run loop) that want to drive the
	/// receiver themselves.
	pub fn subscribe_raw(&self) -> (ObjectKey, mpsc::UnboundedReceiver<Chase>) {
		let key = ObjectKey(self.next_key.fetch_add(1, Ordering::SeqCst));
		let (tx, rx) = mpsc::unbounded_channel();
		self.subscribers.write().insert(key, tx);
		(key, rx)
	}

	/// Remove a subscription. Idempotent: removing a key twice is a no-op.
	pub fn unsubscribe(&self, key: ObjectKey) {
		self.subscribers.write().remove(&key);
	}

	/// Publish an event to every current subscriber. A subscriber whose
	/// inbox has been dropped (its task already exited) is pruned here
	/// rather than on the next `subscribe`, so `subscriber_count` stays
	/// accurate between publishes.
	pub fn publish(&self, event: Chase) {
		let mut dead = Vec::new();
		{
			let subscribers = self.subscribers.read();
			for (key, sender) in subscribers.iter() {
				if sender.send(event).is_err() {
					dead.push(*key);
				}
			}
		}
		if !dead.is_empty() {
			let mut subscribers = self.subscribers.write();
			for key in dead {
				subscribers.remove(&key);
			}
		}
	}

	pub fn subscriber_count(&self) -> usize {
		self.subscribers.read().len()
	}
}

/// Spawn a task that drains `bus`'s inbox for one subscriber, invoking
/// `handler` for each event. The task (and the subscription) ends when
/// `handler` returns `Flow::Unsubscribe` or the bus is dropped.
pub fn subscribe_events<F>(bus: &Arc<EventBus>, mut handler: F) -> ObjectKey
where
	F: FnMut(Chase) -> Flow + Send + 'static,
{
	let (key, mut rx) = bus.subscribe_raw();
	let bus = Arc::clone(bus);
	tokio::spawn(async move {
		while let Some(event) = rx.recv().await {
			if handler(event) == Flow::Unsubscribe {
				bus.unsubscribe(key);
				break;
			}
		}
	});
	key
}

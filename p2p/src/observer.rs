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

//! Installed on every channel regardless of negotiated version (spec.md
//! §4.7 step 2): fails the channel when the bus announces a suspend.

use std::sync::Arc;

use bcn_bus::{subscribe_events, Chase, EventBus, Flow, ObjectKey};

use crate::channel::Channel;

pub struct ObserverProtocol {
	bus: Arc<EventBus>,
	channel: Arc<dyn Channel>,
}

impl ObserverProtocol {
	pub fn new(bus: Arc<EventBus>, channel: Arc<dyn Channel>) -> Arc<ObserverProtocol> {
		Arc::new(ObserverProtocol { bus, channel })
	}

	pub fn spawn(self: &Arc<Self>) -> ObjectKey {
		let channel = Arc::clone(&self.channel);
		subscribe_events(&self.bus, move |event| match event {
			Chase::Suspend => {
				channel.close();
				Flow::Unsubscribe
			}
			Chase::Stop => Flow::Unsubscribe,
			_ => Flow::Continue,
		})
	}
}

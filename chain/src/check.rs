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

//! Maintains the set of pending download identifiers for the candidate
//! header chain and tracks per-channel download speed, evicting channels
//! that fall too far below the pack (spec.md §4.3 "ChaserCheck").

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use bcn_bus::{subscribe_events, Chase, EventBus, Flow, ObjectKey};
use bcn_store::Query;
use bcn_types::{Height, PeerId};

/// Below this many samples there isn't enough data to compute a meaningful
/// standard deviation, so no channel is evicted.
const MINIMUM_FOR_STANDARD_DEVIATION: usize = 3;

/// A batch of candidate heights assigned to one channel for download.
pub type DownloadBatch = Vec<Height>;

pub struct ChaserCheck {
	#[allow(dead_code)]
	query: Arc<dyn Query>,
	bus: Arc<EventBus>,
	maximum_concurrency: usize,
	allowed_deviation: f64,
	pending: RwLock<VecDeque<DownloadBatch>>,
	/// Maps currently out with a peer. At most one entry per `PeerId`,
	/// enforcing spec.md §4.3's "at-most-one map per peer" invariant.
	assigned: RwLock<HashMap<PeerId, DownloadBatch>>,
	speeds: RwLock<HashMap<PeerId, f64>>,
	advanced: AtomicU64,
}

impl ChaserCheck {
	pub fn new(query: Arc<dyn Query>, bus: Arc<EventBus>, maximum_concurrency: usize, allowed_deviation: f64) -> Arc<ChaserCheck> {
		Arc::new(ChaserCheck {
			query,
			bus,
			maximum_concurrency: maximum_concurrency.max(1),
			allowed_deviation,
			pending: RwLock::new(VecDeque::new()),
			assigned: RwLock::new(HashMap::new()),
			speeds: RwLock::new(HashMap::new()),
			advanced: AtomicU64::new(0),
		})
	}

	/// Hand `peer_id` the oldest pending map. Returns `None` if that peer
	/// already holds an unreturned map, or if nothing is pending.
	pub fn get_map(&self, peer_id: PeerId) -> Option<DownloadBatch> {
		if self.assigned.read().contains_key(&peer_id) {
			return None;
		}
		let batch = self.pending.write().pop_front()?;
		self.assigned.write().insert(peer_id, batch.clone());
		Some(batch)
	}

	/// Return a map `peer_id` failed to fully download (or a split-off
	/// remainder), so it can be reassigned. Clears that peer's outstanding
	/// assignment whether or not anything is actually returned.
	pub fn put_map(&self, peer_id: PeerId, batch: DownloadBatch) {
		self.assigned.write().remove(&peer_id);
		if !batch.is_empty() {
			self.pending.write().push_front(batch);
		}
	}

	/// Record a peer's measured download speed. A peer reporting `0.0` is
	/// stalled and evicted outright; one reporting an infinite rate (a
	/// cache hit with no observable transfer time) is skipped rather than
	/// folded into the mean. Otherwise returns `false` once enough samples
	/// exist and this one falls more than `allowed_deviation` standard
	/// deviations below the mean, publishing `split(peer_id)` so the peer
	/// forfeits half its outstanding work (spec.md §4.3 "outlier policing").
	pub fn update(&self, peer_id: PeerId, speed: f64) -> bool {
		if speed == 0.0 {
			self.speeds.write().remove(&peer_id);
			self.bus.publish(Chase::Stall);
			return false;
		}
		if speed.is_infinite() {
			return true;
		}
		let mut speeds = self.speeds.write();
		speeds.insert(peer_id, speed);
		if speeds.len() < MINIMUM_FOR_STANDARD_DEVIATION {
			return true;
		}
		let values: Vec<f64> = speeds.values().copied().collect();
		let mean = values.iter().sum::<f64>() / values.len() as f64;
		let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
		let stddev = variance.sqrt();
		if stddev == 0.0 {
			return true;
		}
		let deviation = (mean - speed) / stddev;
		let keep = deviation <= self.allowed_deviation;
		if !keep {
			speeds.remove(&peer_id);
			drop(speeds);
			self.bus.publish(Chase::Split(peer_id));
		}
		keep
	}

	/// The slowest peer currently holding an assigned map, if any peer has
	/// both outstanding work and a recorded speed. Used by the starvation
	/// protocol: a peer that runs dry asks this chaser who else to split.
	pub fn slowest_with_outstanding_work(&self) -> Option<PeerId> {
		let assigned = self.assigned.read();
		let speeds = self.speeds.read();
		assigned
			.keys()
			.filter_map(|peer_id| speeds.get(peer_id).map(|speed| (*peer_id, *speed)))
			.min_by(|a, b| a.1.partial_cmp(&b.1).expect("speeds are never NaN"))
			.map(|(peer_id, _)| peer_id)
	}

	pub fn outstanding(&self) -> usize {
		let pending: usize = self.pending.read().iter().map(|batch| batch.len()).sum();
		let assigned: usize = self.assigned.read().values().map(|batch| batch.len()).sum();
		pending + assigned
	}

	fn do_bump(&self, height: Height) {
		let previous = self.advanced.load(Ordering::SeqCst);
		if height <= previous {
			return;
		}
		let mut cursor = previous + 1;
		let mut pending = self.pending.write();
		while cursor <= height {
			let end = (cursor + self.maximum_concurrency as u64 - 1).min(height);
			pending.push_back((cursor..=end).collect());
			cursor = end + 1;
		}
		drop(pending);
		self.advanced.store(height, Ordering::SeqCst);
		self.bus.publish(Chase::Download(self.outstanding()));
	}

	/// A regression invalidates every map currently out with a peer, not
	/// just the pending deque: an assigned map may reference heights past
	/// the new branch point. Every peer holding one is purged outright
	/// (spec.md §4.3 "Purge") and must re-request via `get_map`.
	fn do_regressed(&self, branch_point: Height) {
		self.advanced.fetch_min(branch_point, Ordering::SeqCst);
		self.pending.write().retain_mut(|batch| {
			batch.retain(|height| *height <= branch_point);
			!batch.is_empty()
		});
		let mut assigned = self.assigned.write();
		if !assigned.is_empty() {
			assigned.clear();
			drop(assigned);
			self.bus.publish(Chase::Purge);
		}
	}

	/// Subscribe to the bus and begin servicing `bump`/`headers` and
	/// `regressed`/`disorganized` events.
	pub fn spawn(self: &Arc<Self>) -> ObjectKey {
		let this = Arc::clone(self);
		subscribe_events(&self.bus, move |event| {
			match event {
				Chase::Bump(height) | Chase::Headers(height) => this.do_bump(height),
				Chase::Regressed(height) | Chase::Disorganized(height) => this.do_regressed(height),
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

	fn checker(concurrency: usize, deviation: f64) -> Arc<ChaserCheck> {
		let query: Arc<dyn Query> = Arc::new(MemoryQuery::new());
		let bus = EventBus::new();
		ChaserCheck::new(query, bus, concurrency, deviation)
	}

	#[test]
	fn bump_splits_into_concurrency_sized_batches() {
		let checker = checker(2, 3.0);
		checker.do_bump(5);
		assert_eq!(checker.get_map(PeerId(1)), Some(vec![1, 2]));
		assert_eq!(checker.get_map(PeerId(2)), Some(vec![3, 4]));
		assert_eq!(checker.get_map(PeerId(3)), Some(vec![5]));
		assert_eq!(checker.get_map(PeerId(4)), None);
	}

	#[test]
	fn a_peer_already_holding_a_map_gets_none() {
		let checker = checker(2, 3.0);
		checker.do_bump(5);
		assert!(checker.get_map(PeerId(1)).is_some());
		assert_eq!(checker.get_map(PeerId(1)), None);
	}

	#[test]
	fn returned_batches_are_reassigned_first() {
		let checker = checker(10, 3.0);
		checker.do_bump(3);
		let batch = checker.get_map(PeerId(1)).unwrap();
		checker.put_map(PeerId(1), vec![batch[0]]);
		assert_eq!(checker.get_map(PeerId(2)), Some(vec![batch[0]]));
	}

	#[test]
	fn returning_a_map_frees_its_peer_to_request_another() {
		let checker = checker(10, 3.0);
		checker.do_bump(6);
		let batch = checker.get_map(PeerId(1)).unwrap();
		checker.put_map(PeerId(1), batch);
		assert!(checker.get_map(PeerId(1)).is_some());
	}

	#[test]
	fn regression_drops_heights_above_the_branch_point() {
		let checker = checker(10, 3.0);
		checker.do_bump(5);
		checker.do_regressed(2);
		assert_eq!(checker.get_map(PeerId(1)), Some(vec![1, 2]));
		assert_eq!(checker.get_map(PeerId(2)), None);
	}

	#[test]
	fn regression_purges_maps_already_assigned_to_a_peer() {
		let checker = checker(10, 3.0);
		checker.do_bump(2);
		checker.get_map(PeerId(1)).unwrap();
		checker.do_regressed(2);
		checker.do_bump(4);
		// Peer 1's prior map was dropped outright, not merely requeued, so
		// it is free to request a fresh one rather than blocked as already
		// holding one.
		assert!(checker.get_map(PeerId(1)).is_some());
	}

	#[test]
	fn far_below_average_speed_is_evicted() {
		let checker = checker(10, 1.0);
		assert!(checker.update(PeerId(1), 100.0));
		assert!(checker.update(PeerId(2), 105.0));
		assert!(checker.update(PeerId(3), 95.0));
		assert!(!checker.update(PeerId(4), 1.0));
	}

	#[test]
	fn too_few_samples_never_evicts() {
		let checker = checker(10, 0.01);
		assert!(checker.update(PeerId(1), 100.0));
		assert!(checker.update(PeerId(2), 1.0));
	}

	#[test]
	fn zero_speed_stalls_the_peer() {
		let checker = checker(10, 3.0);
		assert!(!checker.update(PeerId(1), 0.0));
	}

	#[test]
	fn infinite_speed_is_skipped_rather_than_evicted() {
		let checker = checker(10, 0.01);
		assert!(checker.update(PeerId(1), f64::INFINITY));
		assert!(checker.update(PeerId(2), 100.0));
		assert!(checker.update(PeerId(3), 105.0));
	}

	#[test]
	fn slowest_with_outstanding_work_picks_the_peer_with_the_lowest_recorded_speed() {
		let checker = checker(3, 3.0);
		checker.do_bump(6);
		checker.get_map(PeerId(1)).unwrap();
		checker.get_map(PeerId(2)).unwrap();
		checker.speeds.write().insert(PeerId(1), 50.0);
		checker.speeds.write().insert(PeerId(2), 10.0);
		assert_eq!(checker.slowest_with_outstanding_work(), Some(PeerId(2)));
	}
}

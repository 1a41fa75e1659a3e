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

//! A one-shot, thread-unsafe bump allocator that builds a single block's
//! object graph in a chain of heap slabs, freed together rather than
//! object-by-object (spec.md §4.8).
//!
//! `BlockArena` is not `Sync`; it is owned by the channel strand receiving
//! one block for the duration of `start()`..`detach()`. Growth is linear: a
//! new slab is pushed whenever the current one can't satisfy a request,
//! sized to `wire_size * multiple` the first time and to the outstanding
//! request thereafter.

use failure_derive::Fail;

/// Allocation failures. `Overflow` is the only case the caller must expect
/// in practice; reaching it implies a block far larger than the P2P wire
/// format permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Fail)]
pub enum ArenaError {
	#[fail(display = "arena allocation size overflows")]
	Overflow,
}

/// Round `value` up to the next multiple of `align`. `align` must be a
/// nonzero power of two.
fn to_aligned(value: usize, align: usize) -> usize {
	assert!(align != 0 && align.is_power_of_two(), "alignment must be a nonzero power of two");
	(value + align - 1) & !(align - 1)
}

/// The detached output of one allocation session: the slab chain, kept
/// alive for as long as anything still references data inside it. Freeing
/// it (`release`, or simply dropping it) frees every slab in the chain at
/// once, never piecemeal.
pub struct ArenaSlabs(Vec<Box<[u8]>>);

impl ArenaSlabs {
	/// Total bytes across all slabs (including unused tail padding on the
	/// last one), matching `detach`'s accounting.
	pub fn total_bytes(&self) -> usize {
		self.0.iter().map(|slab| slab.len()).sum()
	}

	/// Release the chain. Equivalent to dropping the value; kept as a named
	/// operation for parity with `block_arena::release`.
	pub fn release(self) {
		drop(self)
	}
}

/// The allocator itself. `start` begins a session, `allocate` bumps within
/// it (pushing new slabs as needed), `detach` ends it and hands the slab
/// chain to the caller.
pub struct BlockArena {
	multiple: usize,
	slabs: Vec<Box<[u8]>>,
	offset: usize,
	total: usize,
	size: usize,
}

impl BlockArena {
	/// `multiple` scales the first slab's size relative to the wire size
	/// passed to `start`, giving headroom for the deserialized
	/// representation (typically larger than the wire encoding).
	pub fn new(multiple: usize) -> BlockArena {
		BlockArena { multiple, slabs: Vec::new(), offset: 0, total: 0, size: 0 }
	}

	/// Begin an allocation session sized from the wire length of the
	/// incoming block. Starting a session discards any prior one that was
	/// never detached.
	pub fn start(&mut self, wire_size: usize) -> Result<(), ArenaError> {
		let size = wire_size.checked_mul(self.multiple).ok_or(ArenaError::Overflow)?;
		self.size = size.max(1);
		self.slabs.clear();
		self.offset = 0;
		self.total = 0;
		self.push(0)
	}

	/// Bytes remaining in the current (last) slab.
	fn capacity(&self) -> usize {
		self.slabs.last().map(|slab| slab.len()).unwrap_or(0).saturating_sub(self.offset)
	}

	fn push(&mut self, minimum: usize) -> Result<(), ArenaError> {
		let needed = minimum.max(self.size);
		self.total += self.offset;
		self.slabs.push(vec![0u8; needed].into_boxed_slice());
		self.offset = 0;
		Ok(())
	}

	/// Allocate `bytes` aligned to `align` within the current session,
	/// pushing a new slab if the current one is exhausted. Returns a raw
	/// pointer into the slab; the pointer is valid for as long as the
	/// `ArenaSlabs` produced by `detach` is kept alive.
	pub fn allocate(&mut self, bytes: usize, align: usize) -> Result<*mut u8, ArenaError> {
		assert!(!self.slabs.is_empty(), "allocate called before start");
		let aligned_offset = to_aligned(self.offset, align);
		let padding = aligned_offset - self.offset;
		let allocation = padding.checked_add(bytes).ok_or(ArenaError::Overflow)?;
		if allocation > self.capacity() {
			self.push(allocation)?;
			return self.allocate(bytes, align);
		}
		self.offset += allocation;
		let slab = self.slabs.last_mut().expect("start() must precede allocate()");
		Ok(unsafe { slab.as_mut_ptr().add(aligned_offset) })
	}

	/// Finalize the session, handing the slab chain to the caller along
	/// with the total bytes allocated within it.
	pub fn detach(&mut self) -> (usize, ArenaSlabs) {
		let total = self.total + self.offset;
		let slabs = std::mem::take(&mut self.slabs);
		self.offset = 0;
		self.total = 0;
		(total, ArenaSlabs(slabs))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn single_allocation_fits_initial_slab() {
		let mut arena = BlockArena::new(2);
		arena.start(64).unwrap();
		let ptr = arena.allocate(32, 8).unwrap();
		assert!(!ptr.is_null());
		let (total, slabs) = arena.detach();
		assert_eq!(total, 32);
		assert_eq!(slabs.total_bytes(), 128);
	}

	#[test]
	fn exhausting_a_slab_pushes_another() {
		let mut arena = BlockArena::new(1);
		arena.start(16).unwrap();
		let _first = arena.allocate(16, 1).unwrap();
		let _second = arena.allocate(16, 1).unwrap();
		let (total, slabs) = arena.detach();
		assert_eq!(total, 32);
		assert!(slabs.total_bytes() >= 32);
	}

	#[test]
	fn alignment_padding_is_respected() {
		let mut arena = BlockArena::new(1);
		arena.start(64).unwrap();
		let _one_byte = arena.allocate(1, 1).unwrap();
		let aligned = arena.allocate(8, 8).unwrap();
		assert_eq!((aligned as usize) % 8, 0);
	}

	#[test]
	fn overflowing_wire_size_is_rejected() {
		let mut arena = BlockArena::new(usize::MAX);
		assert_eq!(arena.start(2), Err(ArenaError::Overflow));
	}

	#[test]
	fn detach_resets_the_session() {
		let mut arena = BlockArena::new(4);
		arena.start(8).unwrap();
		arena.allocate(4, 1).unwrap();
		let (total, _slabs) = arena.detach();
		assert_eq!(total, 4);
		let (total_again, _slabs_again) = arena.detach();
		assert_eq!(total_again, 0);
	}
}

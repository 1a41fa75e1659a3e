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

//! The organize engine shared by the header and block chasers (spec.md
//! §4.2): duplicate check, parent lookup, validate, tree insert, fork
//! choice, reorganize candidate, disorganize.

use std::sync::Arc;

use parking_lot::RwLock;

use bcn_bus::{Chase, EventBus};
use bcn_store::Query;
use bcn_types::{Block, ChainContext, CheckpointTable, Header, HeaderHash, HeaderLink, HeaderState, Height, Work, ZERO_HASH};

use crate::candidate::CandidateChain;
use crate::error::Error;
use crate::tree::{Tree, TreeEntry};
use crate::work::header_work;

/// The entity kind an `OrganizeEngine` works over: a bare `Header` for
/// header-first sync, or a full `Block`. Each knows how to archive itself
/// and which branch event its chaser announces.
pub trait Organizable: Clone + Send + Sync + 'static {
	fn header(&self) -> &Header;
	fn archive(&self, query: &dyn Query, hash: HeaderHash, context: ChainContext) -> Result<HeaderLink, bcn_store::Error>;
	fn branch_event(branch_point: Height) -> Chase;
}

impl Organizable for Header {
	fn header(&self) -> &Header {
		self
	}
	fn archive(&self, query: &dyn Query, hash: HeaderHash, context: ChainContext) -> Result<HeaderLink, bcn_store::Error> {
		query.set_header(self.clone(), hash, context)
	}
	fn branch_event(branch_point: Height) -> Chase {
		Chase::Headers(branch_point)
	}
}

impl Organizable for Block {
	fn header(&self) -> &Header {
		&self.header
	}
	fn archive(&self, query: &dyn Query, hash: HeaderHash, context: ChainContext) -> Result<HeaderLink, bcn_store::Error> {
		let link = query.set_header(self.header.clone(), hash, context)?;
		query.set_block(link, self.clone())?;
		Ok(link)
	}
	fn branch_event(branch_point: Height) -> Chase {
		Chase::Blocks(branch_point)
	}
}

/// Pluggable validation and identity seam. The organize engine's structure
/// (duplicate/parent/tree/fork-choice/reorganize) is entirely mechanical;
/// validation itself (header checks, script connect above a milestone) and
/// hashing are supplied by the caller, matching the original's pure
/// virtual `validate`/`is_storable` methods on `chaser_organize<Block>`.
pub trait Validator<E>: Send + Sync {
	/// Full validation when above the milestone/checkpoint boundary,
	/// identity-only checks otherwise (spec.md §4.2 step 3).
	fn validate(&self, entity: &E, context: &ChainContext, below_milestone: bool) -> Result<(), String>;
	/// Derive a header's own context from its already-known `height` (the
	/// engine, not the validator, resolves height, since it alone knows
	/// how to read the genesis sentinel) and its parent's context.
	fn derive_context(&self, header: &Header, height: Height, parent: &ChainContext) -> ChainContext;
	/// Content hash of a header.
	fn identity(&self, header: &Header) -> HeaderHash;
}

/// Outcome of one `organize` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizeResult {
	Duplicate,
	Orphan,
	Invalid(String),
	/// Inserted into the tree but did not (yet) win the fork choice.
	Stored,
	Disorganized(Height),
	Organized(Height),
}

enum ParentLocation {
	Genesis,
	Found(Height),
}

/// The organize engine itself. One instance per entity kind (header or
/// block); `HeaderOrganizer`/`BlockOrganizer` in `bcn-chain`'s public API
/// are just `OrganizeEngine<Header, _>` / `OrganizeEngine<Block, _>`.
pub struct OrganizeEngine<E: Organizable, V: Validator<E>> {
	query: Arc<dyn Query>,
	bus: Arc<EventBus>,
	validator: V,
	checkpoints: RwLock<CheckpointTable>,
	tree: RwLock<Tree<E>>,
	candidate: RwLock<CandidateChain>,
	/// Per-height (not cumulative) work, parallel to `candidate`'s links.
	candidate_work: RwLock<Vec<Work>>,
}

impl<E: Organizable, V: Validator<E>> OrganizeEngine<E, V> {
	pub fn new(query: Arc<dyn Query>, bus: Arc<EventBus>, validator: V, checkpoints: CheckpointTable) -> OrganizeEngine<E, V> {
		OrganizeEngine {
			query,
			bus,
			validator,
			checkpoints: RwLock::new(checkpoints),
			tree: RwLock::new(Tree::new()),
			candidate: RwLock::new(CandidateChain::new()),
			candidate_work: RwLock::new(Vec::new()),
		}
	}

	pub fn candidate_top(&self) -> Height {
		self.candidate.read().top()
	}

	fn locate_parent(&self, parent_hash: &HeaderHash) -> Option<ParentLocation> {
		if *parent_hash == ZERO_HASH {
			return Some(ParentLocation::Genesis);
		}
		{
			let candidate = self.candidate.read();
			if !candidate.is_empty() {
				if let Some(top_link) = candidate.at(candidate.top()) {
					if let Ok(top_header) = self.query.get_header(top_link) {
						if self.validator.identity(&top_header) == *parent_hash {
							return Some(ParentLocation::Found(candidate.top()));
						}
					}
				}
			}
		}
		if let Some(entry) = self.tree.read().get(parent_hash) {
			return Some(ParentLocation::Found(entry.height));
		}
		if let Some(link) = self.query.to_header(parent_hash) {
			if let Ok(context) = self.query.get_context(link) {
				return Some(ParentLocation::Found(context.height));
			}
		}
		None
	}

	fn parent_context(&self, parent_hash: &HeaderHash, location: &ParentLocation) -> ChainContext {
		match location {
			ParentLocation::Genesis => ChainContext::genesis(0),
			ParentLocation::Found(height) => {
				if let Some(link) = self.query.to_header(parent_hash) {
					if let Ok(context) = self.query.get_context(link) {
						return context;
					}
				}
				// Parent lives only in the tree (a not-yet-selected, pending
				// ancestor several levels deep): it has no recorded context
				// of its own yet, so its height is all we can say for sure.
				ChainContext { height: *height, ..ChainContext::genesis(0) }
			}
		}
	}

	/// Work accumulated by the candidate chain strictly above `branch_point`
	/// (`None` meaning genesis, i.e. the whole chain).
	fn candidate_suffix_work(&self, branch_point: Option<Height>) -> Work {
		let from = branch_point.map(|h| (h + 1) as usize).unwrap_or(0);
		self.candidate_work.read().iter().skip(from).fold(Work::zero(), |acc, w| acc + *w)
	}

	/// Steps 1-6 of spec.md §4.2.
	pub fn organize(&self, entity: E) -> Result<OrganizeResult, Error> {
		let header = entity.header().clone();
		let hash = self.validator.identity(&header);

		// 1. Duplicate check.
		if let Some(link) = self.query.to_header(&hash) {
			return match self.query.get_state(link)? {
				HeaderState::Unconfirmable => Ok(OrganizeResult::Invalid("previously marked unconfirmable".into())),
				_ => Ok(OrganizeResult::Duplicate),
			};
		}
		if self.tree.read().contains(&hash) {
			return Ok(OrganizeResult::Duplicate);
		}

		// 2. Parent lookup.
		let location = match self.locate_parent(&header.previous_hash) {
			Some(location) => location,
			None => return Ok(OrganizeResult::Orphan),
		};
		let parent_height = match location {
			ParentLocation::Genesis => None,
			ParentLocation::Found(height) => Some(height),
		};
		let entity_height = parent_height.map(|h| h + 1).unwrap_or(0);
		let parent_context = self.parent_context(&header.previous_hash, &location);
		let context = self.validator.derive_context(&header, entity_height, &parent_context);

		// 3. Validate.
		let below_milestone = self.checkpoints.read().below_milestone(entity_height);
		if let Some(checkpoint) = self.checkpoints.read().checkpoint_at(entity_height) {
			if checkpoint.hash != hash {
				return Ok(OrganizeResult::Invalid("checkpoint mismatch".into()));
			}
		}
		if let Err(reason) = self.validator.validate(&entity, &context, below_milestone) {
			return Ok(OrganizeResult::Invalid(reason));
		}

		// 4. Tree insert.
		let work = header_work(header.bits);
		self.tree.write().insert(
			hash,
			TreeEntry { entity: entity.clone(), parent: header.previous_hash, height: entity_height, work },
		);

		// 5. Fork choice.
		let (branch_chain, new_branch_work) = self.tree.read().ancestry(hash);
		let existing_work = self.candidate_suffix_work(parent_height);
		let strong = new_branch_work > existing_work;

		if !strong {
			return Ok(OrganizeResult::Stored);
		}

		// 6. Reorganize candidate. `keep` counts surviving links rather than
		// a height, since the branch point may be "before genesis".
		let regressed = {
			let keep = parent_height.map(|h| (h + 1) as usize).unwrap_or(0);
			let regressed = self.candidate.read().len() > keep;
			self.candidate.write().truncate_to(keep);
			self.candidate_work.write().truncate(keep);
			self.query.truncate_candidate(keep)?;
			regressed
		};
		if regressed {
			self.bus.publish(Chase::Regressed(parent_height.unwrap_or(0)));
		}

		let mut cursor_context = parent_context;
		for branch_hash in &branch_chain {
			let entry = self.tree.write().remove(branch_hash).expect("branch entry must still be in the tree");
			let child_context = self.validator.derive_context(entry.entity.header(), entry.height, &cursor_context);
			let link = entry.entity.archive(&*self.query, *branch_hash, child_context)?;
			self.query.set_candidate(link)?;
			self.candidate.write().push(link);
			self.candidate_work.write().push(entry.work);
			cursor_context = child_context;
		}

		let new_top = self.candidate.read().top();
		self.bus.publish(E::branch_event(parent_height.unwrap_or(0)));
		Ok(OrganizeResult::Organized(new_top))
	}

	/// Step 7: disorganize. Called when a downstream chaser reports
	/// `unchecked`, `unvalid` or `unconfirmable` for `link`.
	pub fn disorganize(&self, link: HeaderLink) -> Result<Height, Error> {
		self.query.set_block_unconfirmable(link)?;
		let bad_height = self.query.get_context(link)?.height;
		let fork_point = bad_height.saturating_sub(1);
		let keep = (fork_point + 1) as usize;
		self.candidate.write().truncate_to(keep);
		self.candidate_work.write().truncate(keep);
		self.query.truncate_candidate(keep)?;
		self.bus.publish(Chase::Disorganized(fork_point));
		Ok(fork_point)
	}
}

/// Object-safe facade over `OrganizeEngine`, so a caller across a crate
/// boundary (a peer protocol handler) can hold a trait object without
/// naming the validator type parameter.
pub trait Organize<E>: Send + Sync {
	fn organize(&self, entity: E) -> Result<OrganizeResult, Error>;
	fn disorganize(&self, link: HeaderLink) -> Result<Height, Error>;
	fn candidate_top(&self) -> Height;
}

impl<E: Organizable, V: Validator<E>> Organize<E> for OrganizeEngine<E, V> {
	fn organize(&self, entity: E) -> Result<OrganizeResult, Error> {
		OrganizeEngine::organize(self, entity)
	}
	fn disorganize(&self, link: HeaderLink) -> Result<Height, Error> {
		OrganizeEngine::disorganize(self, link)
	}
	fn candidate_top(&self) -> Height {
		OrganizeEngine::candidate_top(self)
	}
}

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

//! Error types for the chain core.

use failure::{Backtrace, Context, Fail};
use std::fmt::{self, Display};

use bcn_store::Error as StoreError;

/// Error definition.
#[derive(Debug, Fail)]
pub struct Error {
	inner: Context<ErrorKind>,
}

/// Chain error definitions. `is_fatal` distinguishes errors that fault the
/// node (spec.md §3/§4.2 "any storage error returned from Query is fatal")
/// from ones a chaser can absorb and continue past.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// The header/block hash is already archived in a non-`unconfirmable`
	/// state.
	#[fail(display = "Duplicate entity")]
	Duplicate,
	/// No parent could be found in the candidate chain, the tree, or
	/// storage.
	#[fail(display = "Orphan entity")]
	Orphan,
	/// Header- or block-level validation failed for the given reason.
	#[fail(display = "Invalid: {}", _0)]
	Invalid(String),
	/// A storage call returned an error; fatal per spec.md §4.2.
	#[fail(display = "Store error: {}", _0)]
	Store(String),
	/// A reorganization failed partway; the node must be faulted.
	#[fail(display = "Reorganization failed: {}", _0)]
	ReorgFailed(String),
	/// A store reload (after space was freed) failed; the node must be
	/// faulted.
	#[fail(display = "Store reload failed")]
	ReloadFailed,
	/// A store snapshot failed; the node must be faulted.
	#[fail(display = "Store snapshot failed")]
	SnapshotFailed,
	/// Accumulated work overflowed its 256-bit representation.
	#[fail(display = "Work overflow")]
	WorkOverflow,
}

impl ErrorKind {
	/// True for errors the node cannot continue past (spec.md §9 "Faults").
	pub fn is_fatal(&self) -> bool {
		matches!(
			self,
			ErrorKind::Store(_) | ErrorKind::ReorgFailed(_) | ErrorKind::ReloadFailed | ErrorKind::SnapshotFailed | ErrorKind::WorkOverflow
		)
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		Display::fmt(&self.inner, f)
	}
}

impl Error {
	pub fn kind(&self) -> ErrorKind {
		self.inner.get_context().clone()
	}

	pub fn cause(&self) -> Option<&dyn Fail> {
		self.inner.cause()
	}

	pub fn backtrace(&self) -> Option<&Backtrace> {
		self.inner.backtrace()
	}

	pub fn is_fatal(&self) -> bool {
		self.kind().is_fatal()
	}
}

impl From<ErrorKind> for Error {
	fn from(kind: ErrorKind) -> Error {
		Error { inner: Context::new(kind) }
	}
}

impl From<Context<ErrorKind>> for Error {
	fn from(inner: Context<ErrorKind>) -> Error {
		Error { inner }
	}
}

impl From<StoreError> for Error {
	fn from(error: StoreError) -> Error {
		let message = format!("{}", error);
		Error { inner: error.context(ErrorKind::Store(message)) }
	}
}

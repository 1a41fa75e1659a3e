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

//! Error types for the storage facade.

use failure::{Backtrace, Context, Fail};
use std::fmt::{self, Display};

/// Error definition.
#[derive(Debug, Fail)]
pub struct Error {
	inner: Context<ErrorKind>,
}

/// Storage error definitions. Every writing call the core makes is assumed
/// atomic and idempotent; a facade implementation that cannot guarantee
/// that for a given call should fail the call rather than partially apply
/// it.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// The facade has not completed initialization (first open, or still
	/// replaying a prior crash).
	#[fail(display = "Store is uninitialized")]
	Uninitialized,
	/// A reload requested by the storage chaser failed.
	#[fail(display = "Store reload failed")]
	Reload,
	/// A snapshot requested by the snapshot chaser failed.
	#[fail(display = "Store snapshot failed")]
	Snapshot,
	/// No record exists for the given key.
	#[fail(display = "Not found: {}", _0)]
	NotFound(String),
	/// A write was attempted for a `HeaderLink` already holding that value.
	#[fail(display = "Duplicate write for link {}", _0)]
	Duplicate(String),
	/// The requested state transition is not reachable from the link's
	/// current state.
	#[fail(display = "Invalid state transition: {}", _0)]
	InvalidTransition(String),
	/// Catch-all for facade-internal failures (I/O, serialization).
	#[fail(display = "Store error: {}", _0)]
	Other(String),
}

impl Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		Display::fmt(&self.inner, f)
	}
}

impl Error {
	/// The classified kind behind this error.
	pub fn kind(&self) -> ErrorKind {
		self.inner.get_context().clone()
	}

	/// The underlying cause, if this error wraps another.
	pub fn cause(&self) -> Option<&dyn Fail> {
		self.inner.cause()
	}

	/// Backtrace captured at the error site, if any.
	pub fn backtrace(&self) -> Option<&Backtrace> {
		self.inner.backtrace()
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

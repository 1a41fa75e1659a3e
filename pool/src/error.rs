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

//! Error types for transaction admission.

use failure::{Backtrace, Context, Fail};
use std::fmt::{self, Display};

/// Error definition.
#[derive(Debug, Fail)]
pub struct Error {
	inner: Context<ErrorKind>,
}

/// Reasons a transaction is refused entry to the pool. None of these are
/// fatal to the node; they are reported back to the originating protocol
/// handler, not published on the bus.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// No inputs or no outputs.
	#[fail(display = "Transaction has no inputs or no outputs")]
	Empty,
	/// The same previous output is spent by two inputs of this transaction.
	#[fail(display = "Duplicate input within transaction")]
	DuplicateInput,
	/// Already present in the pool.
	#[fail(display = "Transaction already in pool")]
	AlreadyInPool,
	/// An input spends an output already spent by another pool entry.
	#[fail(display = "Double spend of an output already spent in the pool")]
	DoubleSpend,
	/// An input spends an output the confirmed chain does not show as
	/// unspent (already spent, or never existed).
	#[fail(display = "Input spends an output that is not confirmed-unspent")]
	MissingOutput,
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

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

//! Error types for peer sessions and protocol handlers.

use std::fmt::{self, Display};

use failure::{Backtrace, Context, Fail};

#[derive(Debug, Fail)]
pub struct Error {
	inner: Context<ErrorKind>,
}

#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	#[fail(display = "channel closed")]
	ChannelClosed,
	#[fail(display = "received a block that was not requested")]
	UnexpectedBlock,
	#[fail(display = "block identity does not match the requested header")]
	IdentityMismatch,
	#[fail(display = "block has no associated header on record")]
	UnknownHeader,
	#[fail(display = "store fault: {}", _0)]
	Store(String),
	#[fail(display = "organize fault: {}", _0)]
	Organize(String),
}

impl Fail for Error {
	fn cause(&self) -> Option<&dyn Fail> {
		self.inner.cause()
	}

	fn backtrace(&self) -> Option<&Backtrace> {
		self.inner.backtrace()
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

impl From<bcn_store::Error> for Error {
	fn from(err: bcn_store::Error) -> Error {
		ErrorKind::Store(err.to_string()).into()
	}
}

impl From<bcn_chain::Error> for Error {
	fn from(err: bcn_chain::Error) -> Error {
		ErrorKind::Organize(err.to_string()).into()
	}
}

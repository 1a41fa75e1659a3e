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

//! Error types for node construction and startup.

use failure::{Backtrace, Context, Fail};
use std::fmt::{self, Display};

/// Error definition.
#[derive(Debug, Fail)]
pub struct Error {
	inner: Context<ErrorKind>,
}

#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// Another instance already holds the data directory's lock file.
	#[fail(display = "{}", _0)]
	AlreadyRunning(String),
	/// The data directory could not be created or opened.
	#[fail(display = "I/O error: {}", _0)]
	Io(String),
	/// The genesis header supplied at startup was rejected by the organize
	/// engine (it should never be anything but `Organized(0)`).
	#[fail(display = "Genesis rejected: {}", _0)]
	Genesis(String),
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

impl From<std::io::Error> for Error {
	fn from(error: std::io::Error) -> Error {
		let message = format!("{}", error);
		Error { inner: error.context(ErrorKind::Io(message)) }
	}
}

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

//! Error type for configuration loading.

use std::fmt;

/// Error loading or parsing a `Settings` file.
#[derive(Debug)]
pub enum ConfigError {
	/// The file could not be read.
	FileIo(String, String),
	/// The file's contents are not valid TOML, or don't match `Settings`.
	Parse(String, String),
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			ConfigError::FileIo(path, message) => write!(f, "error reading {}: {}", path, message),
			ConfigError::Parse(path, message) => write!(f, "error parsing {}: {}", path, message),
		}
	}
}

impl std::error::Error for ConfigError {}

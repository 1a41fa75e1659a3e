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

//! Logging wrapper used throughout the bcnode workspace. Initializes the
//! `log` facade with a `log4rs` sink; level and destinations come from
//! `LoggingConfig`, which is owned by `bcn_config::Settings` and plumbed
//! through at startup.

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use parking_lot::Mutex;
use std::path::PathBuf;

lazy_static::lazy_static! {
    static ref WAS_INIT: Mutex<bool> = Mutex::new(false);
}

const LOGGING_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {h({l})} {M} - {m}{n}";

/// Logging configuration consumed by [`init_logger`].
#[derive(Clone, Debug, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct LoggingConfig {
	/// Level for the stdout appender.
	pub stdout_log_level: LogLevel,
	/// Level for the rotating file appender, if `log_file` is set.
	pub file_log_level: LogLevel,
	/// Optional path to a log file; stdout-only when `None`.
	pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		LoggingConfig {
			stdout_log_level: LogLevel::Info,
			file_log_level: LogLevel::Debug,
			log_file: None,
		}
	}
}

/// Mirrors `log::LevelFilter` so it can derive `Serialize`/`Deserialize`
/// without requiring a wrapper at every config call site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde_derive::Serialize, serde_derive::Deserialize)]
pub enum LogLevel {
	/// Error
	Error,
	/// Warning
	Warning,
	/// Info
	Info,
	/// Debug
	Debug,
	/// Trace
	Trace,
}

fn convert_log_level(level: LogLevel) -> LevelFilter {
	match level {
		LogLevel::Error => LevelFilter::Error,
		LogLevel::Warning => LevelFilter::Warn,
		LogLevel::Info => LevelFilter::Info,
		LogLevel::Debug => LevelFilter::Debug,
		LogLevel::Trace => LevelFilter::Trace,
	}
}

/// Initialize the global logger. Idempotent: a second call is a no-op, so
/// library code (tests, nested invocations) can call it defensively.
pub fn init_logger(config: &LoggingConfig) {
	let mut was_init = WAS_INIT.lock();
	if *was_init {
		return;
	}

	let stdout_level = convert_log_level(config.stdout_log_level);
	let file_level = convert_log_level(config.file_log_level);
	let root_level = std::cmp::max(stdout_level, file_level);

	let stdout = ConsoleAppender::builder()
		.encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
		.build();

	let mut builder =
		Config::builder().appender(Appender::builder().build("stdout", Box::new(stdout)));
	let mut root_builder = Root::builder().appender("stdout");

	if let Some(path) = &config.log_file {
		if let Ok(file) = FileAppender::builder()
			.encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
			.build(path)
		{
			builder = builder.appender(Appender::builder().build("file", Box::new(file)));
			root_builder = root_builder.appender("file");
		}
	}

	let config = builder
		.logger(Logger::builder().build("bcn", root_level))
		.build(root_builder.build(root_level))
		.expect("static logging configuration is always valid");

	// A second call to `log4rs::init_config` after the process has already
	// initialized a logger panics; we've already short-circuited on that
	// above, but ignore a racing initializer rather than panic the caller.
	let _ = log4rs::init_config(config);
	*was_init = true;
}

/// Initialize a logger suitable for `#[cfg(test)]` modules: trace to
/// stdout, no file sink.
pub fn init_test_logger() {
	init_logger(&LoggingConfig {
		stdout_log_level: LogLevel::Trace,
		file_log_level: LogLevel::Trace,
		log_file: None,
	});
}

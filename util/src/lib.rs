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

//! Logging, as well as various low-level utilities that factor patterns
//! that are frequent within the bcnode codebase.

#![deny(unused_mut)]

pub mod logger;
pub use crate::logger::{init_logger, init_test_logger, LogLevel, LoggingConfig};

mod one_time;
pub use crate::one_time::OneTime;

mod stop_state;
pub use crate::stop_state::StopState;

pub use parking_lot::{Mutex, RwLock};

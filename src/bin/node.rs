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

//! Entry point for the `bcnode` binary: loads settings, starts a `Node`,
//! and runs until SIGINT/SIGTERM.

#[macro_use]
extern crate clap;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::App;

use bcn_config::Settings;
use bcn_servers::Node;
use bcn_types::{ArenaHandle, Block, Header, Input, OutPoint, Output, Transaction, ZERO_HASH};

fn main() {
	let yml = load_yaml!("../cli.yml");
	let matches = App::from_yaml(yml).get_matches();

	let settings = match matches.value_of("config") {
		Some(path) => Settings::from_file(path).unwrap_or_else(|e| {
			eprintln!("failed to load {}: {}", path, e);
			std::process::exit(1);
		}),
		None => Settings::default(),
	};

	bcn_util::init_logger(&settings.logging);

	let data_dir: PathBuf = matches.value_of("data_dir").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./bcnode-data"));

	let node = match Node::init(settings, &data_dir, genesis_block()) {
		Ok(node) => node,
		Err(e) => {
			log::error!("failed to start node: {}", e);
			std::process::exit(1);
		}
	};

	let running = Arc::new(AtomicBool::new(true));
	let r = Arc::clone(&running);
	ctrlc::set_handler(move || {
		r.store(false, Ordering::SeqCst);
	})
	.expect("Error setting handler for both SIGINT (Ctrl+C) and SIGTERM (kill)");

	log::info!("bcnode started in {}", data_dir.display());
	while running.load(Ordering::SeqCst) {
		thread::sleep(Duration::from_secs(1));
	}
	log::warn!("received SIGINT (Ctrl+C) or SIGTERM (kill), shutting down");
	node.stop();
}

/// Placeholder network genesis; a production deployment would bake in the
/// real chain's genesis block instead of constructing one at startup.
fn genesis_block() -> Block {
	let header = Header { version: 1, previous_hash: ZERO_HASH, merkle_root: ZERO_HASH, timestamp: 0, bits: 0x1d00_ffff, nonce: 0 };
	let coinbase = Transaction {
		hash: bcn_types::HeaderHash::from_slice(&[0u8; 32]),
		version: 1,
		inputs: vec![Input { previous_output: OutPoint { tx_hash: ZERO_HASH, index: 0xffff_ffff }, script_sig: vec![], sequence: 0 }],
		outputs: vec![Output { value: 50_0000_0000, script_pubkey: vec![] }],
		lock_time: 0,
	};
	Block { header, transactions: vec![coinbase], arena: ArenaHandle(Arc::new(())) }
}

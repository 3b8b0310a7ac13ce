// This file is part of Substrate.

// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: Apache-2.0

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// 	http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! The explorer bootstrap command line.
use crate::{
	ChainProfile, HttpRpcClient, MetadataRegistry, Service, SqliteRuntimeStore, StartupPath,
	StoredMetadataInitializer, LOG_TARGET,
};
use clap::Parser;

// Parsed command instructions from the command line
#[derive(Parser, Debug)]
#[clap(author, about, version)]
pub struct CliCommand {
	/// The node url to fetch the runtime metadata from
	#[clap(long, env = "NODE_RPC_URL", default_value = "ws://127.0.0.1:9944")]
	pub node_rpc_url: String,

	/// The configured network name, the bootstrap only runs for the target chain
	#[clap(long, env = "NETWORK_NODE", default_value = "")]
	pub network: String,

	/// The database the runtime versions are stored in
	#[clap(long, env = "DATABASE_URL", default_value = "sqlite://explorer.db?mode=rwc")]
	pub database_url: String,

	/// Skip the finality check after the bootstrap
	#[clap(long)]
	pub skip_finality_check: bool,
}

/// Prepare the runtime metadata of the configured network.
pub async fn run(cmd: CliCommand) -> anyhow::Result<StartupPath> {
	let CliCommand { node_rpc_url, network, database_url, skip_finality_check } = cmd;

	let profile = ChainProfile::new(&node_rpc_url).with_finality_check(!skip_finality_check);
	let rpc = HttpRpcClient::for_profile(&profile)?;
	log::info!(
		target: LOG_TARGET,
		"Using node endpoint {} (configured as {})",
		rpc.endpoint(),
		profile.ws_endpoint
	);

	let store = SqliteRuntimeStore::connect(&database_url).await?;
	let service = Service::new(profile, network, rpc, store, MetadataRegistry::new());

	let path = service.start(&StoredMetadataInitializer).await?;
	match service.registry().latest() {
		Some(metadata) => log::info!(
			target: LOG_TARGET,
			"Runtime metadata ready: spec version {} via {path:?}",
			metadata.spec_version
		),
		None => log::warn!(target: LOG_TARGET, "No runtime metadata registered"),
	}
	Ok(path)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let cmd = CliCommand::try_parse_from(["explorer-bootstrap"]).unwrap();
		assert_eq!(cmd.node_rpc_url, "ws://127.0.0.1:9944");
		assert!(!cmd.skip_finality_check);
	}

	#[test]
	fn flags() {
		let cmd = CliCommand::try_parse_from([
			"explorer-bootstrap",
			"--node-rpc-url",
			"wss://example.com:9944",
			"--network",
			"cbc-chain",
			"--database-url",
			"sqlite::memory:",
			"--skip-finality-check",
		])
		.unwrap();
		assert_eq!(cmd.node_rpc_url, "wss://example.com:9944");
		assert_eq!(cmd.network, "cbc-chain");
		assert_eq!(cmd.database_url, "sqlite::memory:");
		assert!(cmd.skip_finality_check);
	}
}

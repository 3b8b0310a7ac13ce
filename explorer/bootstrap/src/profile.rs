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
//! The chain profile the bootstrap targets.

/// Name of the target chain.
pub const CHAIN_NAME: &str = "cbc-chain";

/// Identifier matched against the configured network name.
pub const NETWORK_IDENTIFIER: &str = "cbc";

/// Spec version the explorer expects the chain to run.
pub const DEFAULT_SPEC_VERSION: u32 = 100;

/// Runtime modules recorded alongside the metadata.
pub const RUNTIME_MODULES: &str =
	"System|Timestamp|Balances|TransactionPayment|Sudo|PalletCbcPoi|PalletCbcPos|Dcf";

/// Pallets that only exist on the target chain.
pub const CUSTOM_PALLETS: [&str; 3] = [
	// Proof of Integrity
	"PalletCbcPoi",
	// Proof of Stake
	"PalletCbcPos",
	// Deterministic Consensus Framework
	"Dcf",
];

/// Translates a websocket endpoint into the matching HTTP endpoint.
///
/// `ws://` becomes `http://` and `wss://` becomes `https://`; anything else is returned as is.
pub fn http_endpoint(endpoint: &str) -> String {
	if let Some(rest) = endpoint.strip_prefix("ws://") {
		format!("http://{rest}")
	} else if let Some(rest) = endpoint.strip_prefix("wss://") {
		format!("https://{rest}")
	} else {
		endpoint.to_string()
	}
}

/// Returns `true` if `pallet` is one of the [`CUSTOM_PALLETS`].
pub fn is_custom_pallet(pallet: &str) -> bool {
	CUSTOM_PALLETS.contains(&pallet)
}

/// Static description of the chain the bootstrap applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainProfile {
	pub chain_name: String,
	/// Lowercase identifier searched for in the configured network name.
	pub network_identifier: String,
	/// Expected spec version. A different fetched version is only reported.
	pub spec_version: u32,
	/// `|`-separated runtime module list stored with the metadata.
	pub runtime_modules: String,
	/// Whether to sample finality after the bootstrap.
	pub finality_check: bool,
	/// The configured websocket endpoint, used by the rest of the explorer.
	pub ws_endpoint: String,
	/// The HTTP endpoint metadata is fetched from.
	pub http_endpoint: String,
}

impl ChainProfile {
	/// The default profile for a node reachable at `ws_endpoint`.
	pub fn new(ws_endpoint: &str) -> Self {
		Self {
			chain_name: CHAIN_NAME.to_string(),
			network_identifier: NETWORK_IDENTIFIER.to_string(),
			spec_version: DEFAULT_SPEC_VERSION,
			runtime_modules: RUNTIME_MODULES.to_string(),
			finality_check: true,
			ws_endpoint: ws_endpoint.to_string(),
			http_endpoint: http_endpoint(ws_endpoint),
		}
	}

	/// Enables or disables the post-bootstrap finality check.
	pub fn with_finality_check(mut self, enabled: bool) -> Self {
		self.finality_check = enabled;
		self
	}

	/// The modules of [`Self::runtime_modules`] that are [`CUSTOM_PALLETS`].
	pub fn custom_modules(&self) -> Vec<&str> {
		self.runtime_modules.split('|').filter(|module| is_custom_pallet(module)).collect()
	}

	/// Returns `true` if the configured `network` name selects this chain.
	///
	/// Matching is case-insensitive; the identifier may appear anywhere in the name.
	pub fn matches_network(&self, network: &str) -> bool {
		let network = network.to_lowercase();
		network == self.chain_name || network.contains(&self.network_identifier)
	}
}

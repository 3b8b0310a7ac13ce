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
//! Post-bootstrap finality sampling.
//!
//! Purely informational: the outcome is logged for operators and never fails startup.

use crate::{NodeRpc, RpcError, RpcRequest};
use serde_json::Value;

const LOG_TARGET: &str = "explorer-bootstrap::finality";

/// The result of a finality check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalityStatus {
	/// The finalized head is a real block.
	Finalizing { hash: String },
	/// The finalized head is empty or the zero hash.
	NotFinalizing { hash: String },
	/// The node could not be queried.
	CheckFailed { reason: String },
}

impl FinalityStatus {
	/// Returns `true` if finality looks healthy.
	pub fn is_finalizing(&self) -> bool {
		matches!(self, FinalityStatus::Finalizing { .. })
	}
}

/// Returns `true` if `hash` does not point at a finalized block.
///
/// That is the case for an empty value and for the all-zero 32-byte hash.
pub fn is_unfinalized_head(hash: &str) -> bool {
	let digits = hash.strip_prefix("0x").unwrap_or(hash);
	digits.is_empty() || (digits.len() == 64 && digits.bytes().all(|b| b == b'0'))
}

/// Queries the finalized head and its block, and classifies the head.
///
/// Failures are logged as warnings and reported as [`FinalityStatus::CheckFailed`].
pub async fn verify_finality<R: NodeRpc + ?Sized>(rpc: &R) -> FinalityStatus {
	log::info!(target: LOG_TARGET, "Verifying finality...");

	let hash = match finalized_head(rpc).await {
		Ok(hash) => hash,
		Err(err) => {
			log::warn!(target: LOG_TARGET, "Finality verification warning: {err}");
			return FinalityStatus::CheckFailed { reason: err.to_string() };
		},
	};

	log::info!(target: LOG_TARGET, "Finalized block hash: {hash}");
	if is_unfinalized_head(&hash) {
		log::warn!(
			target: LOG_TARGET,
			"Finalized head appears to be the genesis block, finality may not be progressing"
		);
		log::warn!(
			target: LOG_TARGET,
			"This is expected right after the chain started. If blocks are produced but never \
			finalized, check the node's finality gadget"
		);
		FinalityStatus::NotFinalizing { hash }
	} else {
		log::info!(target: LOG_TARGET, "Finality verification passed");
		FinalityStatus::Finalizing { hash }
	}
}

async fn finalized_head<R: NodeRpc + ?Sized>(rpc: &R) -> Result<String, RpcError> {
	let result = rpc.call(RpcRequest::new(1, "chain_getFinalizedHead")).await?;
	let hash: String = serde_json::from_value(result)?;

	let request =
		RpcRequest::new(2, "chain_getBlock").with_params(vec![Value::String(hash.clone())]);
	rpc.call(request).await?;

	Ok(hash)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::bootstrap::tests::{MockRpc, Reply};
	use serde_json::json;

	const ZERO_HASH: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";
	const BLOCK_HASH: &str = "0x91b171bb158e2d3848fa23a9f1c25182fb8e20313b2c1eb49219da7a70ce90c3";

	fn block() -> Value {
		json!({
			"block": { "header": { "number": "0x2a" }, "extrinsics": [] },
			"justifications": null
		})
	}

	#[test]
	fn head_classification() {
		assert!(is_unfinalized_head(""));
		assert!(is_unfinalized_head("0x"));
		assert!(is_unfinalized_head(ZERO_HASH));
		assert!(is_unfinalized_head(&"0".repeat(64)));
		assert!(!is_unfinalized_head(BLOCK_HASH));
		assert!(!is_unfinalized_head(&format!("0x{}1", "0".repeat(63))));
		assert!(!is_unfinalized_head("0x00"));
	}

	#[tokio::test]
	async fn real_head_is_finalizing() {
		let rpc = MockRpc::default()
			.with("chain_getFinalizedHead", [Reply::Ok(json!(BLOCK_HASH))])
			.with("chain_getBlock", [Reply::Ok(block())]);

		let status = verify_finality(&rpc).await;
		assert_eq!(status, FinalityStatus::Finalizing { hash: BLOCK_HASH.into() });
		assert!(status.is_finalizing());

		let requests = rpc.requests();
		assert_eq!(requests[1].method, "chain_getBlock");
		assert_eq!(requests[1].params, vec![json!(BLOCK_HASH)]);
	}

	#[tokio::test]
	async fn zero_head_is_not_finalizing() {
		for head in [ZERO_HASH, ""] {
			let rpc = MockRpc::default()
				.with("chain_getFinalizedHead", [Reply::Ok(json!(head))])
				.with("chain_getBlock", [Reply::Ok(block())]);

			let status = verify_finality(&rpc).await;
			assert_eq!(status, FinalityStatus::NotFinalizing { hash: head.into() });
			assert!(!status.is_finalizing());
		}
	}

	#[tokio::test]
	async fn rpc_failures_are_swallowed() {
		let rpc = MockRpc::default().with("chain_getFinalizedHead", [Reply::Unavailable]);
		assert!(matches!(verify_finality(&rpc).await, FinalityStatus::CheckFailed { .. }));
		assert_eq!(rpc.calls("chain_getBlock"), 0);

		let rpc = MockRpc::default()
			.with("chain_getFinalizedHead", [Reply::Ok(json!(BLOCK_HASH))])
			.with("chain_getBlock", [Reply::Remote(-32000, "unknown block")]);
		assert_eq!(
			verify_finality(&rpc).await,
			FinalityStatus::CheckFailed { reason: "RPC error: unknown block (code: -32000)".into() }
		);

		let rpc = MockRpc::default().with("chain_getFinalizedHead", [Reply::Ok(json!(42))]);
		assert!(matches!(verify_finality(&rpc).await, FinalityStatus::CheckFailed { .. }));
	}
}

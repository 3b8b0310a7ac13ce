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
//! JSON-RPC envelopes and the node payloads decoded from them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The JSON-RPC protocol version sent with every request.
pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC request envelope.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RpcRequest {
	pub id: u64,
	pub jsonrpc: String,
	pub method: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub params: Vec<Value>,
}

impl RpcRequest {
	/// Creates a request without parameters.
	pub fn new(id: u64, method: impl Into<String>) -> Self {
		Self { id, jsonrpc: JSONRPC_VERSION.to_string(), method: method.into(), params: vec![] }
	}

	/// Sets the positional parameters of the request.
	pub fn with_params(mut self, params: Vec<Value>) -> Self {
		self.params = params;
		self
	}
}

/// A JSON-RPC response envelope.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RpcResponse {
	#[serde(default)]
	pub id: Option<u64>,
	#[serde(default)]
	pub jsonrpc: String,
	/// `None` if the member is absent, `Some(Value::Null)` for an explicit `null`.
	#[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<RpcErrorObject>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
	Value::deserialize(deserializer).map(Some)
}

/// The error object of a failed JSON-RPC call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RpcErrorObject {
	pub code: i64,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Value>,
}

/// The result of `state_getRuntimeVersion`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeVersion {
	pub spec_name: String,
	#[serde(default)]
	pub impl_name: String,
	#[serde(default)]
	pub authoring_version: u32,
	pub spec_version: u32,
	#[serde(default)]
	pub impl_version: u32,
	/// Runtime API identifiers and their versions.
	#[serde(default)]
	pub apis: Vec<(String, u32)>,
	#[serde(default)]
	pub transaction_version: u32,
	#[serde(default)]
	pub state_version: u8,
}

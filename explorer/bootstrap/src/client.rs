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
//! The HTTP JSON-RPC client used to query the chain node.
//!
//! Every call is an independent POST with its own timeout: runtime metadata can be several
//! megabytes, which plain request/response handles better than a long-lived websocket with a
//! frame size limit. Retries are the caller's business.

use crate::{http_endpoint, ChainProfile, RpcRequest, RpcResponse};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const LOG_TARGET: &str = "explorer-bootstrap::rpc";

/// Timeout applied to every request sent to the node.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The error type for the node client.
#[derive(Error, Debug)]
pub enum RpcError {
	/// The configured endpoint is not a valid URL.
	#[error("invalid RPC endpoint: {0}")]
	InvalidEndpoint(String),
	/// Connection failure, timeout or unreadable body.
	#[error("failed to make request: {0}")]
	Transport(#[from] reqwest::Error),
	/// The node answered with a non-success HTTP status.
	#[error("unexpected status code: {0}")]
	HttpStatus(StatusCode),
	/// The body or its result does not have the expected shape.
	#[error("failed to decode response: {0}")]
	Decode(#[from] serde_json::Error),
	/// The result decoded but carries an invalid value.
	#[error("unexpected result: {0}")]
	UnexpectedResult(String),
	/// The node returned a JSON-RPC error object.
	#[error("RPC error: {message} (code: {code})")]
	Remote { code: i64, message: String },
}

impl RpcError {
	/// Returns `true` if the node itself rejected the call.
	pub fn is_remote(&self) -> bool {
		matches!(self, RpcError::Remote { .. })
	}
}

/// A request/response channel to a chain node.
#[async_trait]
pub trait NodeRpc: Send + Sync {
	/// Sends `request` and returns the `result` member of the response.
	///
	/// A response carrying neither a result nor an error is rejected.
	async fn call(&self, request: RpcRequest) -> Result<Value, RpcError>;
}

impl RpcResponse {
	/// Converts the envelope into its result, or the remote error it carries.
	pub fn into_result(self) -> Result<Value, RpcError> {
		match (self.error, self.result) {
			(Some(error), _) => Err(RpcError::Remote { code: error.code, message: error.message }),
			(None, Some(result)) => Ok(result),
			(None, None) =>
				Err(RpcError::UnexpectedResult("response has neither result nor error".into())),
		}
	}
}

/// [`NodeRpc`] over HTTP POST.
#[derive(Clone, Debug)]
pub struct HttpRpcClient {
	inner: Client,
	url: Url,
}

impl HttpRpcClient {
	/// Builds a client for `endpoint` with the default [`REQUEST_TIMEOUT`].
	///
	/// Websocket endpoints are translated to their HTTP counterpart.
	pub fn new(endpoint: &str) -> Result<Self, RpcError> {
		Self::with_timeout(endpoint, REQUEST_TIMEOUT)
	}

	/// Builds a client for the HTTP endpoint of `profile`.
	pub fn for_profile(profile: &ChainProfile) -> Result<Self, RpcError> {
		Self::new(&profile.http_endpoint)
	}

	/// Builds a client for `endpoint` with a custom request timeout.
	pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, RpcError> {
		let url = Url::parse(&http_endpoint(endpoint))
			.map_err(|err| RpcError::InvalidEndpoint(err.to_string()))?;
		let inner = Client::builder().timeout(timeout).build()?;
		Ok(Self { inner, url })
	}

	/// Returns the HTTP endpoint requests are sent to.
	pub fn endpoint(&self) -> &Url {
		&self.url
	}
}

#[async_trait]
impl NodeRpc for HttpRpcClient {
	async fn call(&self, request: RpcRequest) -> Result<Value, RpcError> {
		log::trace!(
			target: LOG_TARGET,
			"Calling {} (id {}) on {}",
			request.method,
			request.id,
			self.url
		);

		let response = self.inner.post(self.url.clone()).json(&request).send().await?;
		let status = response.status();
		if !status.is_success() {
			log::debug!(target: LOG_TARGET, "{} answered with status {status}", request.method);
			return Err(RpcError::HttpStatus(status));
		}

		let body = response.bytes().await?;
		let response: RpcResponse = serde_json::from_slice(&body)?;
		response.into_result()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::RpcErrorObject;
	use serde_json::json;

	#[test]
	fn websocket_endpoint_is_translated() {
		let client = HttpRpcClient::new("ws://172.17.0.1:9933").unwrap();
		assert_eq!(client.endpoint().as_str(), "http://172.17.0.1:9933/");

		let client = HttpRpcClient::new("wss://example.com:9944").unwrap();
		assert_eq!(client.endpoint().as_str(), "https://example.com:9944/");
	}

	#[test]
	fn client_uses_profile_http_endpoint() {
		let profile = ChainProfile::new("wss://example.com:9944");
		let client = HttpRpcClient::for_profile(&profile).unwrap();
		assert_eq!(client.endpoint().as_str(), format!("{}/", profile.http_endpoint));
		assert_eq!(client.endpoint().scheme(), "https");
	}

	#[test]
	fn invalid_endpoint_is_rejected() {
		assert!(matches!(HttpRpcClient::new("not a url"), Err(RpcError::InvalidEndpoint(_))));
	}

	#[test]
	fn error_object_becomes_remote_error() {
		let response = RpcResponse {
			id: Some(1),
			jsonrpc: "2.0".into(),
			result: None,
			error: Some(RpcErrorObject { code: -32000, message: "busy".into(), data: None }),
		};

		let err = response.into_result().unwrap_err();
		assert!(err.is_remote());
		assert_eq!(err.to_string(), "RPC error: busy (code: -32000)");
	}

	#[test]
	fn missing_result_is_rejected() {
		let response =
			RpcResponse { id: Some(1), jsonrpc: "2.0".into(), result: None, error: None };
		assert!(matches!(response.into_result(), Err(RpcError::UnexpectedResult(_))));

		let response = RpcResponse {
			id: Some(1),
			jsonrpc: "2.0".into(),
			result: Some(Value::Null),
			error: None,
		};
		assert_eq!(response.into_result().unwrap(), Value::Null);

		let response = RpcResponse {
			id: Some(1),
			jsonrpc: "2.0".into(),
			result: Some(json!("0x00")),
			error: None,
		};
		assert_eq!(response.into_result().unwrap(), json!("0x00"));
	}
}

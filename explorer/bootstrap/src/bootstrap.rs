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
//! Detection, fetch and persistence of the runtime metadata.

use crate::{
	finality::{verify_finality, FinalityStatus},
	ChainProfile, MetadataRegistry, NodeRpc, RpcError, RpcRequest, RuntimeStore, RuntimeVersion,
	StoreError, METADATA_PREFIX, MIN_METADATA_LEN,
};
use std::{future::Future, time::Duration};
use thiserror::Error;

const LOG_TARGET: &str = "explorer-bootstrap::bootstrap";

/// Block number recorded for a bootstrapped runtime version.
pub const BOOTSTRAP_BLOCK_NUMBER: u32 = 0;

/// How many times, and how far apart, each fetch is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	pub attempts: u32,
	pub delay: Duration,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self { attempts: 3, delay: Duration::from_secs(2) }
	}
}

/// The error type for the bootstrap.
#[derive(Error, Debug)]
pub enum BootstrapError {
	/// Every attempt to fetch from the node failed.
	#[error("failed to fetch {what} after {attempts} attempts: {source}")]
	RetriesExhausted {
		what: &'static str,
		attempts: u32,
		#[source]
		source: RpcError,
	},
	/// The writes were issued but the stored record does not match.
	#[error("failed to verify runtime version {spec_version} after insert: metadata not stored")]
	VerificationFailed { spec_version: u32 },
	/// The store could not be read or written.
	#[error("runtime store error: {0}")]
	Store(#[from] StoreError),
}

/// What a call to [`Bootstrapper::initialize`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
	/// The configured network is not the target chain. Nothing was done.
	NotApplicable { network: String },
	/// The store already held usable metadata. No network call was made.
	AlreadyPresent { spec_version: u32 },
	/// Metadata was fetched, persisted, verified and registered.
	Bootstrapped { spec_version: u32, metadata_len: usize },
}

/// Populates the runtime store from a node when it lacks usable metadata.
pub struct Bootstrapper<'a, R: ?Sized, S: ?Sized> {
	rpc: &'a R,
	store: &'a S,
	registry: &'a MetadataRegistry,
	profile: &'a ChainProfile,
	network: &'a str,
	retry: RetryPolicy,
}

impl<'a, R, S> Bootstrapper<'a, R, S>
where
	R: NodeRpc + ?Sized,
	S: RuntimeStore + ?Sized,
{
	/// Creates a bootstrapper for the configured `network`.
	pub fn new(
		rpc: &'a R,
		store: &'a S,
		registry: &'a MetadataRegistry,
		profile: &'a ChainProfile,
		network: &'a str,
	) -> Self {
		Self { rpc, store, registry, profile, network, retry: RetryPolicy::default() }
	}

	/// Overrides the default [`RetryPolicy`].
	pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}

	/// Makes sure the store holds usable metadata for the latest runtime.
	///
	/// Returns immediately if the network is not the target chain, or if the store already
	/// holds a usable record. Otherwise fetches the runtime version and metadata, each with
	/// its own retry budget, persists them, verifies the write and registers the metadata.
	pub async fn initialize(&self) -> Result<BootstrapOutcome, BootstrapError> {
		if !self.profile.matches_network(self.network) {
			log::info!(
				target: LOG_TARGET,
				"Not a {} network (network: {}), skipping bootstrap",
				self.profile.chain_name,
				self.network
			);
			return Ok(BootstrapOutcome::NotApplicable { network: self.network.to_string() });
		}

		log::info!(target: LOG_TARGET, "Starting {} runtime bootstrap...", self.profile.chain_name);

		if let Some(recent) = self.store.most_recent_runtime_version().await? {
			if recent.is_usable() {
				log::info!(
					target: LOG_TARGET,
					"Runtime version already exists (spec: {}), skipping bootstrap",
					recent.spec_version
				);
				return Ok(BootstrapOutcome::AlreadyPresent { spec_version: recent.spec_version });
			}
		}

		log::info!(target: LOG_TARGET, "Runtime versions empty or incomplete, bootstrapping...");

		let version = self
			.with_retries("runtime version", move || self.request_runtime_version())
			.await?;
		log::info!(
			target: LOG_TARGET,
			"Fetched runtime version: {} v{}",
			version.spec_name,
			version.spec_version
		);
		if version.spec_version != self.profile.spec_version {
			log::warn!(
				target: LOG_TARGET,
				"Node runs spec version {}, expected {}",
				version.spec_version,
				self.profile.spec_version
			);
		}

		let metadata = self.with_retries("metadata", move || self.request_metadata()).await?;
		log::info!(target: LOG_TARGET, "Fetched metadata: {} bytes", metadata.len());

		self.persist(&version, &metadata).await?;

		let metadata_len = metadata.len();
		self.registry.register_latest(version.spec_version, metadata);

		log::info!(target: LOG_TARGET, "{} runtime bootstrap completed", self.profile.chain_name);
		Ok(BootstrapOutcome::Bootstrapped { spec_version: version.spec_version, metadata_len })
	}

	/// Samples whether the chain is finalizing blocks. Never fails.
	pub async fn verify_finality(&self) -> FinalityStatus {
		verify_finality(self.rpc).await
	}

	async fn with_retries<T, F, Fut>(
		&self,
		what: &'static str,
		mut fetch: F,
	) -> Result<T, BootstrapError>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<T, RpcError>>,
	{
		let attempts = self.retry.attempts.max(1);
		let mut attempt = 1;
		loop {
			match fetch().await {
				Ok(value) => return Ok(value),
				Err(source) if attempt >= attempts =>
					return Err(BootstrapError::RetriesExhausted { what, attempts, source }),
				Err(err) => {
					log::debug!(target: LOG_TARGET, "Fetching {what} failed: {err}");
					log::warn!(target: LOG_TARGET, "Retry {attempt}/{attempts}: fetching {what}");
					attempt += 1;
					tokio::time::sleep(self.retry.delay).await;
				},
			}
		}
	}

	async fn request_runtime_version(&self) -> Result<RuntimeVersion, RpcError> {
		let result = self.rpc.call(RpcRequest::new(1, "state_getRuntimeVersion")).await?;
		Ok(serde_json::from_value(result)?)
	}

	async fn request_metadata(&self) -> Result<String, RpcError> {
		let result = self.rpc.call(RpcRequest::new(1, "state_getMetadata")).await?;
		let metadata: String = serde_json::from_value(result)?;
		if !metadata.starts_with(METADATA_PREFIX) {
			return Err(RpcError::UnexpectedResult(
				"invalid metadata format: missing 0x prefix".into(),
			));
		}
		Ok(metadata)
	}

	async fn persist(
		&self,
		version: &RuntimeVersion,
		metadata: &str,
	) -> Result<(), BootstrapError> {
		let spec_version = version.spec_version;
		log::info!(target: LOG_TARGET, "Inserting runtime version {spec_version} into store...");

		if let Some(recent) = self.store.most_recent_runtime_version().await? {
			if recent.spec_version == spec_version && recent.raw_metadata.len() > MIN_METADATA_LEN {
				log::info!(
					target: LOG_TARGET,
					"Runtime version {spec_version} already stored ({} bytes), skipping insert",
					recent.raw_metadata.len()
				);
				return Ok(());
			}
		}

		let created = self
			.store
			.create_runtime_version(&version.spec_name, spec_version, BOOTSTRAP_BLOCK_NUMBER)
			.await?;
		log::info!(target: LOG_TARGET, "create_runtime_version returned: {created}");

		log::debug!(
			target: LOG_TARGET,
			"Recording modules {}, chain specific: {:?}",
			self.profile.runtime_modules,
			self.profile.custom_modules()
		);
		let affected = self
			.store
			.set_runtime_data(spec_version, &self.profile.runtime_modules, metadata)
			.await?;
		log::info!(target: LOG_TARGET, "set_runtime_data affected {affected} rows");

		match self.store.most_recent_runtime_version().await? {
			Some(recent)
				if recent.spec_version == spec_version &&
					recent.raw_metadata.len() > MIN_METADATA_LEN =>
			{
				log::info!(
					target: LOG_TARGET,
					"Runtime version {spec_version} stored with {} bytes of metadata",
					recent.raw_metadata.len()
				);
				Ok(())
			},
			_ => Err(BootstrapError::VerificationFailed { spec_version }),
		}
	}
}

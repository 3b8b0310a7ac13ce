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
//! Startup wiring of the bootstrap into the explorer service.

use crate::{
	BootstrapOutcome, Bootstrapper, ChainProfile, MetadataRegistry, NodeRpc, RetryPolicy,
	RuntimeStore,
};
use async_trait::async_trait;

const LOG_TARGET: &str = "explorer-bootstrap::service";

/// The generic metadata initialization the explorer falls back to.
#[async_trait]
pub trait GenericInitializer: Send + Sync {
	/// Populates `registry` without the chain specific bootstrap.
	async fn initialize(
		&self,
		store: &dyn RuntimeStore,
		registry: &MetadataRegistry,
	) -> anyhow::Result<()>;
}

/// Registers whatever usable metadata the store already holds.
#[derive(Debug, Default, Clone, Copy)]
pub struct StoredMetadataInitializer;

#[async_trait]
impl GenericInitializer for StoredMetadataInitializer {
	async fn initialize(
		&self,
		store: &dyn RuntimeStore,
		registry: &MetadataRegistry,
	) -> anyhow::Result<()> {
		match store.most_recent_runtime_version().await? {
			Some(record) if record.is_usable() => {
				log::info!(
					target: LOG_TARGET,
					"Using stored metadata of {} v{}",
					record.spec_name,
					record.spec_version
				);
				registry.register_latest(record.spec_version, record.raw_metadata);
				Ok(())
			},
			_ => anyhow::bail!("Can not find chain metadata, please check network"),
		}
	}
}

/// Which path populated the metadata registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupPath {
	Bootstrap,
	Fallback,
}

/// The service root: owns the node client, the store and the metadata registry.
pub struct Service<R, S> {
	profile: ChainProfile,
	network: String,
	rpc: R,
	store: S,
	registry: MetadataRegistry,
	retry: RetryPolicy,
}

impl<R: NodeRpc, S: RuntimeStore> Service<R, S> {
	pub fn new(
		profile: ChainProfile,
		network: impl Into<String>,
		rpc: R,
		store: S,
		registry: MetadataRegistry,
	) -> Self {
		Self {
			profile,
			network: network.into(),
			rpc,
			store,
			registry,
			retry: RetryPolicy::default(),
		}
	}

	/// Overrides the retry policy of the bootstrap fetches.
	pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}

	/// The registry shared with the rest of the explorer.
	pub fn registry(&self) -> &MetadataRegistry {
		&self.registry
	}

	pub fn store(&self) -> &S {
		&self.store
	}

	/// Makes the runtime metadata available before the explorer starts decoding.
	///
	/// Runs the bootstrap when the configured network is the target chain. If the bootstrap
	/// does not apply or fails, `fallback` is run instead and its error, if any, is returned.
	pub async fn start(&self, fallback: &dyn GenericInitializer) -> anyhow::Result<StartupPath> {
		let bootstrapper =
			Bootstrapper::new(&self.rpc, &self.store, &self.registry, &self.profile, &self.network)
				.with_retry_policy(self.retry);

		match bootstrapper.initialize().await {
			Ok(BootstrapOutcome::NotApplicable { network }) => {
				log::info!(
					target: LOG_TARGET,
					"Using generic initialization for network {network:?}"
				);
			},
			Ok(BootstrapOutcome::AlreadyPresent { spec_version }) => {
				if self.register_stored(spec_version).await? {
					self.check_finality(&bootstrapper).await;
					return Ok(StartupPath::Bootstrap)
				}
				log::warn!(
					target: LOG_TARGET,
					"Stored runtime version {spec_version} is no longer usable, falling back"
				);
			},
			Ok(BootstrapOutcome::Bootstrapped { .. }) => {
				self.check_finality(&bootstrapper).await;
				return Ok(StartupPath::Bootstrap)
			},
			Err(err) => {
				log::warn!(
					target: LOG_TARGET,
					"{} bootstrap failed: {err}, falling back to generic initialization",
					self.profile.chain_name
				);
			},
		}

		fallback.initialize(&self.store, &self.registry).await?;
		Ok(StartupPath::Fallback)
	}

	async fn register_stored(&self, spec_version: u32) -> anyhow::Result<bool> {
		match self.store.most_recent_runtime_version().await? {
			Some(record) if record.is_usable() => {
				log::debug!(
					target: LOG_TARGET,
					"Loading stored metadata for spec version {spec_version}"
				);
				self.registry.register_latest(record.spec_version, record.raw_metadata);
				Ok(true)
			},
			_ => Ok(false),
		}
	}

	async fn check_finality(&self, bootstrapper: &Bootstrapper<'_, R, S>) {
		if !self.profile.finality_check {
			log::debug!(target: LOG_TARGET, "Finality check disabled");
			return
		}
		let status = bootstrapper.verify_finality().await;
		log::debug!(target: LOG_TARGET, "Finality status: {status:?}");
	}
}

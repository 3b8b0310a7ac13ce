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
//! Process-wide handle to the metadata used for decoding.

use parking_lot::RwLock;
use std::sync::Arc;

/// Raw runtime metadata registered for decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeMetadata {
	pub spec_version: u32,
	/// `0x`-prefixed hex encoded metadata.
	pub raw: String,
}

/// Holds the latest runtime metadata.
///
/// Created once by the service root and cloned into every component that decodes chain data.
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
	latest: Arc<RwLock<Option<RuntimeMetadata>>>,
}

impl MetadataRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `raw` as the latest metadata, replacing any previous entry.
	pub fn register_latest(&self, spec_version: u32, raw: String) {
		log::debug!(
			target: crate::LOG_TARGET,
			"Registering metadata for spec version {spec_version} ({} bytes)",
			raw.len()
		);
		*self.latest.write() = Some(RuntimeMetadata { spec_version, raw });
	}

	/// Returns the latest registered metadata.
	pub fn latest(&self) -> Option<RuntimeMetadata> {
		self.latest.read().clone()
	}

	/// Returns the spec version of the latest registered metadata.
	pub fn spec_version(&self) -> Option<u32> {
		self.latest.read().as_ref().map(|metadata| metadata.spec_version)
	}
}

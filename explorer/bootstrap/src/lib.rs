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
//! Runtime metadata bootstrap for the block explorer.
//!
//! On startup the explorer needs the chain's runtime metadata in its datastore before it can
//! decode any block. [`Bootstrapper`] detects whether a usable record is already stored, and if
//! not, fetches the runtime version and metadata from a node over HTTP JSON-RPC, persists them
//! and registers the metadata with the in-process [`MetadataRegistry`]. The [`Service`] wires
//! the bootstrap into the startup sequence and falls back to a [`GenericInitializer`] whenever
//! the bootstrap does not apply or fails.
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cli;

mod bootstrap;
pub use bootstrap::*;

mod client;
pub use client::*;

mod finality;
pub use finality::*;

mod profile;
pub use profile::*;

mod registry;
pub use registry::*;

mod service;
pub use service::*;

mod store;
pub use store::*;

mod types;
pub use types::*;


pub const LOG_TARGET: &str = "explorer-bootstrap";

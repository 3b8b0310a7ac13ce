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
//! Persistent storage of runtime versions and their metadata.

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use thiserror::Error;

const LOG_TARGET: &str = "explorer-bootstrap::store";

/// Prefix of hex encoded metadata.
pub const METADATA_PREFIX: &str = "0x";

/// Stored metadata must be longer than this to be usable.
pub const MIN_METADATA_LEN: usize = 100;

/// Returns `true` if `raw` looks like decodable hex metadata.
pub fn is_usable_metadata(raw: &str) -> bool {
	raw.starts_with(METADATA_PREFIX) && raw.len() > MIN_METADATA_LEN
}

/// The error type for runtime stores.
#[derive(Error, Debug)]
pub enum StoreError {
	/// A [`sqlx::Error`] wrapper error.
	#[error(transparent)]
	Database(#[from] sqlx::Error),
	/// A [`sqlx::migrate::MigrateError`] wrapper error.
	#[error(transparent)]
	Migrate(#[from] sqlx::migrate::MigrateError),
}

/// A runtime version and the metadata attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeVersionRecord {
	pub spec_name: String,
	pub spec_version: u32,
	/// First block known to run this version.
	pub block_number: u32,
	/// `0x`-prefixed hex encoded metadata, empty until attached.
	pub raw_metadata: String,
}

impl RuntimeVersionRecord {
	/// Returns `true` if the attached metadata is usable for decoding.
	pub fn is_usable(&self) -> bool {
		is_usable_metadata(&self.raw_metadata)
	}
}

/// Storage of runtime versions.
///
/// Both writes are upserts keyed by spec version, so repeating them is safe.
#[async_trait]
pub trait RuntimeStore: Send + Sync {
	/// Returns the record with the highest spec version, if any.
	async fn most_recent_runtime_version(&self) -> Result<Option<RuntimeVersionRecord>, StoreError>;

	/// Creates the entry for `spec_version`. Returns `false` if it already existed.
	async fn create_runtime_version(
		&self,
		spec_name: &str,
		spec_version: u32,
		block_number: u32,
	) -> Result<bool, StoreError>;

	/// Attaches the module list and metadata to `spec_version`. Returns the rows affected.
	async fn set_runtime_data(
		&self,
		spec_version: u32,
		modules: &str,
		metadata_hex: &str,
	) -> Result<u64, StoreError>;
}

/// [`RuntimeStore`] backed by a SQLite database.
#[derive(Clone, Debug)]
pub struct SqliteRuntimeStore {
	pool: SqlitePool,
}

impl SqliteRuntimeStore {
	/// Creates a store on `pool`, applying pending migrations.
	pub async fn new(pool: SqlitePool) -> Result<Self, StoreError> {
		sqlx::migrate!().run(&pool).await?;
		Ok(Self { pool })
	}

	/// Connects to `database_url` and creates a store on it.
	pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
		log::debug!(target: LOG_TARGET, "Opening runtime store at {database_url}");
		let pool = SqlitePool::connect(database_url).await?;
		Self::new(pool).await
	}
}

fn decode_u32(row: &SqliteRow, column: &str) -> Result<u32, sqlx::Error> {
	let value: i64 = row.try_get(column)?;
	u32::try_from(value)
		.map_err(|err| sqlx::Error::ColumnDecode { index: column.into(), source: Box::new(err) })
}

#[async_trait]
impl RuntimeStore for SqliteRuntimeStore {
	async fn most_recent_runtime_version(
		&self,
	) -> Result<Option<RuntimeVersionRecord>, StoreError> {
		let row = sqlx::query(
			r#"
			SELECT spec_name, spec_version, block_num, raw_data
			FROM runtime_versions
			ORDER BY spec_version DESC
			LIMIT 1
			"#,
		)
		.fetch_optional(&self.pool)
		.await?;

		let Some(row) = row else { return Ok(None) };
		Ok(Some(RuntimeVersionRecord {
			spec_name: row.try_get("spec_name")?,
			spec_version: decode_u32(&row, "spec_version")?,
			block_number: decode_u32(&row, "block_num")?,
			raw_metadata: row.try_get("raw_data")?,
		}))
	}

	async fn create_runtime_version(
		&self,
		spec_name: &str,
		spec_version: u32,
		block_number: u32,
	) -> Result<bool, StoreError> {
		let result = sqlx::query(
			r#"
			INSERT INTO runtime_versions (spec_version, spec_name, block_num)
			VALUES ($1, $2, $3)
			ON CONFLICT (spec_version) DO NOTHING
			"#,
		)
		.bind(i64::from(spec_version))
		.bind(spec_name)
		.bind(i64::from(block_number))
		.execute(&self.pool)
		.await?;

		let created = result.rows_affected() > 0;
		log::trace!(target: LOG_TARGET, "Create runtime version {spec_version}: created={created}");
		Ok(created)
	}

	async fn set_runtime_data(
		&self,
		spec_version: u32,
		modules: &str,
		metadata_hex: &str,
	) -> Result<u64, StoreError> {
		let result = sqlx::query(
			r#"
			UPDATE runtime_versions
			SET modules = $1, raw_data = $2
			WHERE spec_version = $3
			"#,
		)
		.bind(modules)
		.bind(metadata_hex)
		.bind(i64::from(spec_version))
		.execute(&self.pool)
		.await?;

		log::trace!(
			target: LOG_TARGET,
			"Set runtime data for {spec_version}: {} rows affected",
			result.rows_affected()
		);
		Ok(result.rows_affected())
	}
}

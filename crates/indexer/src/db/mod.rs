// Copyright 2026 Boundless Foundation, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Entity persistence.
//!
//! Handlers see a plain key-value store of typed entities: `get`, `save` and
//! `remove` by id. There is no query API and no multi-row transaction; every
//! call is individually atomic.

pub mod any;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub use any::AnyStore;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQL error {0:?}")]
    SqlErr(#[from] sqlx::Error),

    #[error("SQL Migration error {0:?}")]
    MigrateErr(#[from] sqlx::migrate::MigrateError),

    #[error("Failed to (de)serialize {entity} {id}: {source}")]
    Serde {
        entity: &'static str,
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A persisted, strongly-typed record.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name of the table-like namespace the entity lives in.
    const NAME: &'static str;

    fn id(&self) -> &str;
}

/// Raw document store, keyed by entity name and id.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn get_raw(&self, entity: &'static str, id: &str) -> Result<Option<String>, DbError>;

    async fn set_raw(&self, entity: &'static str, id: &str, data: String) -> Result<(), DbError>;

    async fn remove_raw(&self, entity: &'static str, id: &str) -> Result<(), DbError>;
}

pub type StoreObj = Arc<dyn EntityStore>;

/// Typed access on top of any [EntityStore].
#[async_trait]
pub trait StoreExt: EntityStore {
    async fn get<E: Entity>(&self, id: &str) -> Result<Option<E>, DbError> {
        let Some(data) = self.get_raw(E::NAME, id).await? else {
            return Ok(None);
        };
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|source| DbError::Serde { entity: E::NAME, id: id.to_string(), source })
    }

    async fn exists<E: Entity>(&self, id: &str) -> Result<bool, DbError> {
        Ok(self.get_raw(E::NAME, id).await?.is_some())
    }

    async fn save<E: Entity>(&self, entity: &E) -> Result<(), DbError> {
        let data = serde_json::to_string(entity).map_err(|source| DbError::Serde {
            entity: E::NAME,
            id: entity.id().to_string(),
            source,
        })?;
        self.set_raw(E::NAME, entity.id(), data).await
    }

    async fn remove<E: Entity>(&self, id: &str) -> Result<(), DbError> {
        self.remove_raw(E::NAME, id).await
    }
}

impl<T: EntityStore + ?Sized> StoreExt for T {}

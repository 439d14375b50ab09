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

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    any::{install_default_drivers, AnyConnectOptions, AnyPoolOptions},
    AnyPool, Row,
};

use super::{DbError, EntityStore};

/// Entity store over SQLite or Postgres, one JSON document per row.
#[derive(Debug, Clone)]
pub struct AnyStore {
    pool: AnyPool,
}

impl AnyStore {
    /// For SQLite use a `sqlite:file_path` URL; for Postgres `postgres://`.
    pub async fn new(conn_str: &str) -> Result<Self, DbError> {
        install_default_drivers();
        let opts = AnyConnectOptions::from_str(conn_str)?;

        let pool = AnyPoolOptions::new().max_connections(5).connect_with(opts).await?;

        sqlx::migrate!().run(&pool).await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

#[async_trait]
impl EntityStore for AnyStore {
    async fn get_raw(&self, entity: &'static str, id: &str) -> Result<Option<String>, DbError> {
        let res = sqlx::query("SELECT data FROM entities WHERE entity = $1 AND id = $2")
            .bind(entity)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = res else {
            return Ok(None);
        };

        Ok(Some(row.try_get("data")?))
    }

    async fn set_raw(&self, entity: &'static str, id: &str, data: String) -> Result<(), DbError> {
        tracing::trace!("Saving {entity} {id}");
        sqlx::query(
            "INSERT INTO entities (entity, id, data) VALUES ($1, $2, $3)
         ON CONFLICT (entity, id) DO UPDATE SET data = EXCLUDED.data",
        )
        .bind(entity)
        .bind(id)
        .bind(data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_raw(&self, entity: &'static str, id: &str) -> Result<(), DbError> {
        tracing::trace!("Removing {entity} {id}");
        sqlx::query("DELETE FROM entities WHERE entity = $1 AND id = $2")
            .bind(entity)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

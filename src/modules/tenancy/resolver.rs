use async_trait::async_trait;
use sqlx::{Connection, MySqlConnection};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::core::{cancellable, AppError, Result};
use crate::modules::tenancy::{MySqlReadModel, ReadModel};

/// Maps an estate to a handle on its isolated read model
#[async_trait]
pub trait StoreResolver: Send + Sync {
    async fn resolve(&self, estate_id: Uuid) -> Result<Box<dyn ReadModel>>;
}

/// Resolves estates to `<base database name>-<estate id>` on the templated server
pub struct MySqlStoreResolver {
    config: DatabaseConfig,
}

impl MySqlStoreResolver {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl StoreResolver for MySqlStoreResolver {
    async fn resolve(&self, estate_id: Uuid) -> Result<Box<dyn ReadModel>> {
        let options = self.config.connect_options(&estate_id)?;

        let conn = tokio::time::timeout(
            self.config.connect_timeout(),
            MySqlConnection::connect_with(&options),
        )
        .await
        .map_err(|_| {
            AppError::Database(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("Timed out connecting to read model for estate {}", estate_id),
            )))
        })??;

        debug!(
            %estate_id,
            database = %self.config.database_name(&estate_id),
            "Read model connection opened"
        );

        Ok(Box::new(MySqlReadModel::new(estate_id, conn)))
    }
}

/// Resolve a request's read model, abandoning the attempt on cancellation
pub async fn acquire(
    resolver: &dyn StoreResolver,
    estate_id: Uuid,
    token: &CancellationToken,
) -> Result<Box<dyn ReadModel>> {
    cancellable(token, resolver.resolve(estate_id)).await
}

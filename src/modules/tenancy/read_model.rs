use async_trait::async_trait;
use sqlx::{Connection, MySqlConnection};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::modules::dimensions::repositories::DimensionReader;
use crate::modules::facts::repositories::FactReader;
use crate::modules::search::repositories::TransactionSearchReader;

/// Handle on one estate's read model, scoped to a single request
#[async_trait]
pub trait ReadModel: DimensionReader + FactReader + TransactionSearchReader + Send {
    /// Give the underlying connection back. Must be called on every exit path.
    async fn release(self: Box<Self>);
}

/// Read model backed by a dedicated MySQL connection to the estate database
pub struct MySqlReadModel {
    estate_id: Uuid,
    conn: MySqlConnection,
}

impl MySqlReadModel {
    pub fn new(estate_id: Uuid, conn: MySqlConnection) -> Self {
        Self { estate_id, conn }
    }

    pub fn estate_id(&self) -> Uuid {
        self.estate_id
    }

    pub(crate) fn conn(&mut self) -> &mut MySqlConnection {
        &mut self.conn
    }
}

#[async_trait]
impl ReadModel for MySqlReadModel {
    async fn release(self: Box<Self>) {
        let MySqlReadModel { estate_id, conn } = *self;
        match conn.close().await {
            Ok(()) => debug!(%estate_id, "Read model connection released"),
            Err(e) => warn!(%estate_id, error = %e, "Failed to close read model connection"),
        }
    }
}

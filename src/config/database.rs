use crate::core::{AppError, Result};
use sqlx::mysql::MySqlConnectOptions;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default base name of the per-estate read model databases
pub const DEFAULT_READ_MODEL_DATABASE: &str = "TransactionProcessorReadModel";

/// Read model connection settings shared by every tenant
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Connection string whose database part is replaced per estate.
    /// `None` means no template is registered.
    pub connection_template: Option<String>,
    pub base_database_name: String,
    pub connect_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        Ok(DatabaseConfig {
            connection_template: env::var("READ_MODEL_CONNECTION_TEMPLATE")
                .ok()
                .filter(|template| !template.trim().is_empty()),
            base_database_name: env::var("READ_MODEL_DATABASE_NAME")
                .unwrap_or_else(|_| DEFAULT_READ_MODEL_DATABASE.to_string()),
            connect_timeout_secs: env::var("READ_MODEL_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| {
                    AppError::Configuration("Invalid READ_MODEL_CONNECT_TIMEOUT_SECS".to_string())
                })?,
        })
    }

    /// Database name of one estate's read model
    pub fn database_name(&self, estate_id: &uuid::Uuid) -> String {
        format!("{}-{}", self.base_database_name, estate_id)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Connection options for one estate, built from the registered template
    pub fn connect_options(&self, estate_id: &uuid::Uuid) -> Result<MySqlConnectOptions> {
        let template = self.connection_template.as_deref().ok_or_else(|| {
            AppError::configuration("No read model connection template registered")
        })?;

        let options = MySqlConnectOptions::from_str(template).map_err(|e| {
            AppError::Configuration(format!("Invalid read model connection template: {}", e))
        })?;

        Ok(options.database(&self.database_name(estate_id)))
    }
}

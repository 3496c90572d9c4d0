use crate::error::CliError;
use async_trait::async_trait;
use connectors::sql::{base::adapter::SqlAdapter, postgres::adapter::PgAdapter};
use tracing::{error, info};

/// Trait for "pinging" a data source
#[async_trait]
pub trait ConnectionPinger {
    /// Attempts to ping; returns Err if unreachable
    async fn ping(&self) -> Result<(), CliError>;
}

/// Postgres pinger
pub struct PostgresConnectionPinger {
    pub conn_str: String,
}

#[async_trait]
impl ConnectionPinger for PostgresConnectionPinger {
    async fn ping(&self) -> Result<(), CliError> {
        info!("Pinging Postgres");

        let adapter = PgAdapter::connect(&self.conn_str).await.map_err(|e| {
            error!("Postgres connection failed: {}", e);
            CliError::Connector(e)
        })?;

        adapter.ping().await.map_err(|e| {
            error!("Postgres ping query failed: {}", e);
            CliError::Db(e)
        })?;

        info!("Postgres ping succeeded");
        Ok(())
    }
}

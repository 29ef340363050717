//! PostgreSQL client implementation
//!
//! Pooled connections to the source database. Every query runs with the
//! session time zone pinned to UTC and the configured statement timeout.

use crate::config::SourceConfig;
use crate::domain::{HighwaterError, Result};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use postgres_native_tls::MakeTlsConnector;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::config::SslMode;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row, Statement};

/// PostgreSQL client for Highwater
pub struct PostgreSQLClient {
    pool: Pool,
    statement_timeout_ms: u64,
    endpoint: String,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// No connection is opened until the first query or
    /// [`PostgreSQLClient::test_connection`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unparseable URL or TLS setup,
    /// and a connection error if the pool cannot be built.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let statement_timeout_ms = config
            .statement_timeout_ms()
            .map_err(HighwaterError::Configuration)?;
        let pg_config = pg_config(config)?;
        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = match pg_config.get_ssl_mode() {
            SslMode::Disable => Manager::from_config(pg_config, NoTls, manager_config),
            _ => Manager::from_config(pg_config, tls_connector(&config.ssl_mode)?, manager_config),
        };

        let timeout = Duration::from_secs(config.connection_timeout_seconds);
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(timeout))
            .create_timeout(Some(timeout))
            .recycle_timeout(Some(timeout))
            .build()
            .map_err(|e| {
                HighwaterError::Connection(format!("Failed to create connection pool: {e}"))
            })?;

        Ok(Self {
            pool,
            statement_timeout_ms,
            endpoint: config.url_safe(),
        })
    }

    /// Redacted connection URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Test the connection to PostgreSQL
    ///
    /// # Errors
    ///
    /// Returns a connection error if no connection can be established.
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| HighwaterError::Connection(format!("Connection test failed: {e}")))?;

        tracing::debug!(endpoint = %self.endpoint, "PostgreSQL connection test successful");
        Ok(())
    }

    async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            HighwaterError::Connection(format!(
                "Failed to get connection to {}: {e}",
                self.endpoint
            ))
        })
    }

    /// Prepare and run a query, returning its statement metadata and rows
    ///
    /// # Errors
    ///
    /// Returns [`HighwaterError::Extract`] if session setup, preparation
    /// or execution fails.
    pub async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<(Statement, Vec<Row>)> {
        let client = self.get_connection().await?;

        client
            .batch_execute(&format!(
                "SET TIME ZONE 'UTC'; SET statement_timeout = {}",
                self.statement_timeout_ms
            ))
            .await
            .map_err(|e| HighwaterError::Extract(format!("Failed to configure session: {e}")))?;

        let statement = client
            .prepare(sql)
            .await
            .map_err(|e| HighwaterError::Extract(format!("Failed to prepare query: {e}")))?;

        let rows = client
            .query(&statement, params)
            .await
            .map_err(|e| HighwaterError::Extract(format!("Query failed: {e}")))?;

        Ok((statement, rows))
    }

    /// Close the pool; idle connections are dropped and new checkouts fail
    pub fn close(&self) {
        self.pool.close();
    }
}

fn pg_config(config: &SourceConfig) -> Result<tokio_postgres::Config> {
    let url = config.url.strip_prefix("jdbc:").unwrap_or(&config.url);
    let mut pg_config: tokio_postgres::Config = url.parse().map_err(|e| {
        HighwaterError::Configuration(format!("Invalid PostgreSQL connection URL: {e}"))
    })?;

    if pg_config.get_user().is_none() && !config.username.is_empty() {
        pg_config.user(&config.username);
    }
    if pg_config.get_password().is_none() {
        let password: &str = config.password.expose_secret().as_ref();
        if !password.is_empty() {
            pg_config.password(password);
        }
    }

    pg_config
        .ssl_mode(ssl_mode(&config.ssl_mode))
        .connect_timeout(Duration::from_secs(config.connection_timeout_seconds))
        .application_name("highwater");

    Ok(pg_config)
}

fn ssl_mode(mode: &str) -> SslMode {
    match mode {
        "disable" => SslMode::Disable,
        "require" | "verify-ca" | "verify-full" => SslMode::Require,
        _ => SslMode::Prefer,
    }
}

fn tls_connector(mode: &str) -> Result<MakeTlsConnector> {
    let mut builder = native_tls::TlsConnector::builder();
    match mode {
        "verify-full" => {}
        "verify-ca" => {
            builder.danger_accept_invalid_hostnames(true);
        }
        // prefer/require encrypt without verifying the server certificate
        _ => {
            builder.danger_accept_invalid_certs(true);
        }
    }

    let connector = builder
        .build()
        .map_err(|e| HighwaterError::Configuration(format!("Failed to configure TLS: {e}")))?;
    Ok(MakeTlsConnector::new(connector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[test]
    fn test_jdbc_prefix_and_credentials() {
        let config = SourceConfig {
            url: "jdbc:postgresql://db.internal:5433/warehouse".to_string(),
            username: "etl".to_string(),
            password: secret_string("s3cret".to_string()),
            ..SourceConfig::default()
        };

        let pg = pg_config(&config).unwrap();
        assert_eq!(pg.get_user(), Some("etl"));
        assert_eq!(pg.get_password(), Some("s3cret".as_bytes()));
        assert_eq!(pg.get_dbname(), Some("warehouse"));
        assert_eq!(pg.get_ports(), &[5433]);
    }

    #[test]
    fn test_url_credentials_take_precedence() {
        let config = SourceConfig {
            url: "postgresql://owner:fromurl@db/warehouse".to_string(),
            ..SourceConfig::default()
        };

        let pg = pg_config(&config).unwrap();
        assert_eq!(pg.get_user(), Some("owner"));
        assert_eq!(pg.get_password(), Some("fromurl".as_bytes()));
    }

    #[test]
    fn test_oversized_statement_timeout_is_configuration_error() {
        let config = SourceConfig {
            statement_timeout_seconds: u64::MAX / 100,
            ..SourceConfig::default()
        };

        match PostgreSQLClient::new(&config) {
            Err(HighwaterError::Configuration(msg)) => {
                assert!(msg.contains("statement_timeout_seconds"))
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("client built with an out-of-range statement timeout"),
        }
    }

    #[test]
    fn test_ssl_mode_mapping() {
        assert_eq!(ssl_mode("disable"), SslMode::Disable);
        assert_eq!(ssl_mode("allow"), SslMode::Prefer);
        assert_eq!(ssl_mode("verify-full"), SslMode::Require);
    }

    #[tokio::test]
    async fn test_pool_is_lazy() {
        let config = SourceConfig {
            url: "postgresql://127.0.0.1:1/none".to_string(),
            ssl_mode: "disable".to_string(),
            ..SourceConfig::default()
        };

        let client = PostgreSQLClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "postgresql://127.0.0.1:1/none");
        client.close();
    }
}

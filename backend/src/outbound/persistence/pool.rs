//! Async PostgreSQL connection pool shared by the Diesel repositories.
//!
//! Thin wrapper over `bb8` with `diesel-async`'s connection manager.
//! Constructed once at startup and cloned into each repository adapter;
//! checkouts never block the runtime.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);

/// Failures raised while constructing the pool or borrowing from it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The pool itself could not be built.
    #[error("connection pool setup failed: {message}")]
    Setup { message: String },
    /// No connection became available within the checkout timeout.
    #[error("no database connection available: {message}")]
    Unavailable { message: String },
}

impl PoolError {
    fn setup(message: impl Into<String>) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }

    fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Sizing and timeout settings for [`DbPool`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_connections: u32,
    checkout_timeout: Duration,
}

impl PoolConfig {
    /// Settings for the given database URL: 10 connections and a
    /// 30 second checkout timeout unless overridden.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            checkout_timeout: DEFAULT_CHECKOUT_TIMEOUT,
        }
    }

    /// Cap the number of open connections.
    #[must_use]
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Bound how long a checkout may wait for a free connection.
    #[must_use]
    pub fn with_checkout_timeout(mut self, timeout: Duration) -> Self {
        self.checkout_timeout = timeout;
        self
    }

    /// The configured connection string.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Shared handle to the bb8 pool of async Diesel connections.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Setup`] when the pool cannot be constructed.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager =
            AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url());
        let inner = Pool::builder()
            .max_size(config.max_connections)
            .connection_timeout(config.checkout_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::setup(err.to_string()))?;
        Ok(Self { inner })
    }

    /// Borrow a connection for one operation.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Unavailable`] when the checkout timeout
    /// elapses first.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::unavailable(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn settings_default_then_override() {
        let config = PoolConfig::new("postgres://localhost/assist");
        assert_eq!(config.database_url(), "postgres://localhost/assist");
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.checkout_timeout, DEFAULT_CHECKOUT_TIMEOUT);

        let tuned = config
            .with_max_connections(4)
            .with_checkout_timeout(Duration::from_secs(5));
        assert_eq!(tuned.max_connections, 4);
        assert_eq!(tuned.checkout_timeout, Duration::from_secs(5));
    }

    #[rstest]
    #[case(PoolError::setup("bad url"), "bad url")]
    #[case(PoolError::unavailable("timed out"), "timed out")]
    fn errors_carry_their_causes(#[case] error: PoolError, #[case] cause: &str) {
        assert!(error.to_string().contains(cause));
    }
}

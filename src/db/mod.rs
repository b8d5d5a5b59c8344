//! Database abstraction layer for Crimewatch.
//!
//! Provides a trait-based interface for query execution, allowing the
//! dashboard to run against Postgres in production and in-memory mocks in
//! tests.
//!
//! Submitted SQL is executed verbatim: there is no sanitization, statement
//! whitelist, or sandboxing here. The dashboard trusts its operator; this
//! layer is not a security boundary.

mod mock;
mod postgres;
mod types;

pub use mock::{FailingDatabaseClient, MockDatabaseClient};
pub use postgres::PostgresClient;
pub use types::{ColumnInfo, QueryOutput, QueryResult, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Trait defining the interface for database clients.
///
/// All operations are async and return Results with DashboardError.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Executes a single SQL statement and returns its outcome.
    ///
    /// Statements that produce a result set (SELECT and friends) yield
    /// `QueryOutput::ResultSet` with all rows fetched eagerly. Statements
    /// that execute without producing one (DDL/DML) yield
    /// `QueryOutput::NoResultSet`. Execution failures are returned as
    /// `DashboardError::Query` carrying the database's message text.
    async fn execute_query(&self, sql: &str) -> Result<QueryOutput>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}

/// Connects to Postgres with the given configuration.
///
/// This is the central factory function for production database connections.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    let client = PostgresClient::connect(config).await?;
    Ok(Box::new(client))
}

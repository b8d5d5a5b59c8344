//! Mock database clients for testing.
//!
//! Provides in-memory implementations of `DatabaseClient` so the dashboard
//! pipeline can be exercised without a running Postgres.

use super::{ColumnInfo, DatabaseClient, QueryOutput, QueryResult, Row, Value};
use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// A mock database client that returns a fixed result for reading statements.
pub struct MockDatabaseClient {
    fixture: Option<QueryResult>,
}

impl MockDatabaseClient {
    /// Creates a mock that answers reading statements with a one-row result.
    pub fn new() -> Self {
        Self { fixture: None }
    }

    /// Creates a mock that answers reading statements with the given result.
    pub fn with_result(columns: Vec<&str>, rows: Vec<Row>) -> Self {
        let columns = columns
            .into_iter()
            .map(|name| ColumnInfo::new(name, "text"))
            .collect();
        Self {
            fixture: Some(QueryResult::with_data(columns, rows)),
        }
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryOutput> {
        let sql_upper = sql.trim().to_uppercase();

        // SELECT and CTE statements produce result sets; everything else is
        // treated as a write with nothing to display.
        if sql_upper.starts_with("SELECT") || sql_upper.starts_with("WITH") {
            let result = match &self.fixture {
                Some(fixture) => fixture.clone(),
                None => QueryResult::with_data(
                    vec![ColumnInfo::new("result", "text")],
                    vec![vec![Value::String(format!("Mock result for: {}", sql))]],
                ),
            };

            Ok(QueryOutput::ResultSet(
                result.with_execution_time(Duration::from_millis(1)),
            ))
        } else {
            Ok(QueryOutput::NoResultSet)
        }
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A mock database client that fails every statement with a fixed message.
pub struct FailingDatabaseClient {
    message: String,
}

impl FailingDatabaseClient {
    /// Creates a failing mock with the given error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute_query(&self, _sql: &str) -> Result<QueryOutput> {
        Err(DashboardError::query(self.message.clone()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

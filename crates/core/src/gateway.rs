use async_trait::async_trait;
use thiserror::Error;

pub const NULL_TEXT: &str = "NULL";
pub const DEFAULT_ROW_LIMIT: usize = 100;
pub const STATEMENT_RESULT_HEADER: &str = "Result";
pub const STATEMENT_SUCCESS_TEXT: &str = "Query executed successfully";

/// Column headers plus rows of rendered cell text, aligned by position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultSet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultSet {
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Synthetic single-column result reporting a completed mutation.
    #[must_use]
    pub fn statement_outcome(rows_affected: u64) -> Self {
        Self {
            headers: vec![STATEMENT_RESULT_HEADER.to_string()],
            rows: vec![
                vec![STATEMENT_SUCCESS_TEXT.to_string()],
                vec![format!("Rows affected: {rows_affected}")],
            ],
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GatewayError {
    message: String,
}

impl GatewayError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait StorageGateway: Send + Sync {
    async fn list_tables(&self) -> Result<Vec<String>, GatewayError>;

    async fn fetch_rows(&self, table: &str, limit: usize) -> Result<ResultSet, GatewayError>;

    /// Runs arbitrary SQL. Reads return every matching row; anything else
    /// returns [`ResultSet::statement_outcome`].
    async fn execute(&self, statement: &str) -> Result<ResultSet, GatewayError>;
}

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use browseql_core::gateway::{GatewayError, ResultSet, StorageGateway, NULL_TEXT};
use browseql_core::statement::{classify, quote_identifier, StatementKind};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use thiserror::Error;

const LIST_TABLES_SQL: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
     ORDER BY name";

#[derive(Debug, Error)]
pub enum SqliteOpenError {
    #[error("database file not found at {path}")]
    NotFound { path: PathBuf },
    #[error("failed to open database at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
}

/// SQLite-backed gateway. The connection is shared behind a mutex and every
/// call runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct SqliteGateway {
    path: PathBuf,
    connection: Arc<Mutex<Connection>>,
}

impl SqliteGateway {
    /// Opens an existing database file and checks that it is readable.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteOpenError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(SqliteOpenError::NotFound { path });
        }

        let connection = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| SqliteOpenError::Open {
            path: path.clone(),
            source,
        })?;

        connection
            .query_row("SELECT count(*) FROM sqlite_master", [], |_| Ok(()))
            .map_err(|source| SqliteOpenError::Open {
                path: path.clone(),
                source,
            })?;

        tracing::info!(path = %path.display(), "opened sqlite database");
        Ok(Self {
            path,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn with_connection<T, F>(&self, work: F) -> Result<T, GatewayError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, GatewayError> + Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let guard = connection
                .lock()
                .map_err(|_| GatewayError::new("database connection lock poisoned"))?;
            work(&guard)
        })
        .await
        .map_err(|error| GatewayError::new(format!("database worker failed: {error}")))?
    }
}

#[async_trait]
impl StorageGateway for SqliteGateway {
    async fn list_tables(&self) -> Result<Vec<String>, GatewayError> {
        self.with_connection(list_tables).await
    }

    async fn fetch_rows(&self, table: &str, limit: usize) -> Result<ResultSet, GatewayError> {
        let table = table.to_string();
        self.with_connection(move |connection| fetch_rows(connection, &table, limit))
            .await
    }

    async fn execute(&self, statement: &str) -> Result<ResultSet, GatewayError> {
        let statement = statement.to_string();
        self.with_connection(move |connection| execute(connection, &statement))
            .await
    }
}

pub fn list_tables(connection: &Connection) -> Result<Vec<String>, GatewayError> {
    let mut statement = connection
        .prepare(LIST_TABLES_SQL)
        .map_err(to_gateway_error)?;
    let names = statement
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(to_gateway_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_gateway_error)?;
    Ok(names)
}

pub fn fetch_rows(
    connection: &Connection,
    table: &str,
    limit: usize,
) -> Result<ResultSet, GatewayError> {
    let sql = format!("SELECT * FROM {} LIMIT ?1", quote_identifier(table));
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    query_result_set(connection, &sql, &[&limit])
}

pub fn execute(connection: &Connection, statement: &str) -> Result<ResultSet, GatewayError> {
    let statement = statement.trim();
    match classify(statement) {
        None => Err(GatewayError::new("empty query")),
        Some(StatementKind::Read) => {
            tracing::debug!("executing read statement");
            query_result_set(connection, statement, &[])
        }
        Some(StatementKind::Mutation) => {
            tracing::debug!("executing mutating statement");
            let before = connection.total_changes();
            connection
                .execute_batch(statement)
                .map_err(to_gateway_error)?;
            let affected = connection.total_changes().saturating_sub(before);
            Ok(ResultSet::statement_outcome(affected))
        }
    }
}

fn query_result_set(
    connection: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<ResultSet, GatewayError> {
    let mut statement = connection.prepare(sql).map_err(to_gateway_error)?;
    let headers = statement
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let column_count = headers.len();

    let rows = statement
        .query_map(params, |row| row_to_cells(row, column_count))
        .map_err(to_gateway_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_gateway_error)?;

    Ok(ResultSet::new(headers, rows))
}

fn row_to_cells(row: &Row<'_>, column_count: usize) -> rusqlite::Result<Vec<String>> {
    (0..column_count)
        .map(|index| row.get_ref(index).map(value_to_string))
        .collect()
}

fn value_to_string(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => NULL_TEXT.to_string(),
        ValueRef::Integer(value) => value.to_string(),
        ValueRef::Real(value) => value.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn to_gateway_error(error: rusqlite::Error) -> GatewayError {
    GatewayError::new(error.to_string())
}

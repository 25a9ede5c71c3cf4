use std::sync::Arc;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::gateway::{GatewayError, ResultSet, StorageGateway};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultSource {
    Table(String),
    Statement(String),
}

impl ResultSource {
    #[must_use]
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::Table(name) => Some(name),
            Self::Statement(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    Tables,
    Rows { table: String },
    Statement { sql: String },
}

impl LoadRequest {
    fn label(&self) -> &'static str {
        match self {
            Self::Tables => "load-tables",
            Self::Rows { .. } => "load-rows",
            Self::Statement { .. } => "execute",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("failed to list tables: {0}")]
    Tables(#[source] GatewayError),
    #[error("failed to load table `{table}`: {source}")]
    Rows {
        table: String,
        #[source]
        source: GatewayError,
    },
    #[error("SQL error: {0}")]
    Statement(#[source] GatewayError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    TablesLoaded(Vec<String>),
    RowsLoaded {
        source: ResultSource,
        result: ResultSet,
    },
    LoadFailed(LoadError),
}

pub async fn resolve<G>(gateway: &G, request: LoadRequest, row_limit: usize) -> LoadEvent
where
    G: StorageGateway + ?Sized,
{
    match request {
        LoadRequest::Tables => match gateway.list_tables().await {
            Ok(tables) => LoadEvent::TablesLoaded(tables),
            Err(error) => LoadEvent::LoadFailed(LoadError::Tables(error)),
        },
        LoadRequest::Rows { table } => match gateway.fetch_rows(&table, row_limit).await {
            Ok(result) => LoadEvent::RowsLoaded {
                source: ResultSource::Table(table),
                result,
            },
            Err(source) => LoadEvent::LoadFailed(LoadError::Rows { table, source }),
        },
        LoadRequest::Statement { sql } => match gateway.execute(&sql).await {
            Ok(result) => LoadEvent::RowsLoaded {
                source: ResultSource::Statement(sql),
                result,
            },
            Err(error) => LoadEvent::LoadFailed(LoadError::Statement(error)),
        },
    }
}

#[derive(Debug)]
pub struct LoadDispatcher<G: StorageGateway + 'static> {
    runtime: Handle,
    gateway: Arc<G>,
    row_limit: usize,
    events: UnboundedSender<LoadEvent>,
}

impl<G: StorageGateway + 'static> LoadDispatcher<G> {
    #[must_use]
    pub fn new(
        runtime: Handle,
        gateway: Arc<G>,
        row_limit: usize,
        events: UnboundedSender<LoadEvent>,
    ) -> Self {
        Self {
            runtime,
            gateway,
            row_limit,
            events,
        }
    }

    /// Builds a dispatcher together with the receiving end of its event channel.
    #[must_use]
    pub fn channel(
        runtime: Handle,
        gateway: Arc<G>,
        row_limit: usize,
    ) -> (Self, UnboundedReceiver<LoadEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(runtime, gateway, row_limit, sender), receiver)
    }

    pub fn dispatch(&self, request: LoadRequest) -> JoinHandle<()> {
        let gateway = Arc::clone(&self.gateway);
        let events = self.events.clone();
        let row_limit = self.row_limit;
        let label = request.label();
        tracing::debug!(request = label, "dispatching background load");

        self.runtime.spawn(async move {
            let event = resolve(gateway.as_ref(), request, row_limit).await;
            match &event {
                LoadEvent::LoadFailed(error) => {
                    tracing::warn!(request = label, %error, "background load failed");
                }
                LoadEvent::RowsLoaded { result, .. } => {
                    tracing::debug!(
                        request = label,
                        rows = result.row_count(),
                        "background load resolved"
                    );
                }
                LoadEvent::TablesLoaded(tables) => {
                    tracing::debug!(
                        request = label,
                        tables = tables.len(),
                        "background load resolved"
                    );
                }
            }

            if events.send(event).is_err() {
                tracing::debug!(request = label, "session closed; dropping load result");
            }
        })
    }
}

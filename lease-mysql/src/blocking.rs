use crate::{MySqlConnection, MySqlConnector};
use lease_core::{
    AsyncConnector, BlockingExecutor, ConnectOptions, Connection, ConnectionError, Connector,
    Error, Executor, Query, Result, Row, RowsAffected, stream::TryStreamExt,
};
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};

/// Opens autocommit MySQL sessions for synchronous call sites.
///
/// Each session drives its connection on a private current-thread runtime.
/// Connecting from inside an async runtime fails with a [`ConnectionError`],
/// use [`MySqlConnector`] there.
#[derive(Clone, Debug)]
pub struct MySqlBlockingConnector {
    connector: MySqlConnector,
}

impl MySqlBlockingConnector {
    pub fn new(options: ConnectOptions) -> Self {
        MySqlConnector::new(options).into()
    }

    /// Credentials from `DBENDPOINT`, `DBUSER`, `DBPASS`, `DBNAME` and `DBPORT`.
    pub fn from_env() -> Result<Self> {
        MySqlConnector::from_env().map(Into::into)
    }

    /// Like [`MySqlBlockingConnector::from_env`], loading `.env` first.
    pub fn from_dotenv() -> Result<Self> {
        MySqlConnector::from_dotenv().map(Into::into)
    }

    /// Upper bound on the connection handshake, `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connector = self.connector.with_timeout(timeout);
        self
    }

    pub fn options(&self) -> &ConnectOptions {
        self.connector.options()
    }

    /// Endpoint with the password masked, safe to log.
    pub fn url(&self) -> String {
        self.connector.url()
    }
}

impl From<MySqlConnector> for MySqlBlockingConnector {
    fn from(connector: MySqlConnector) -> Self {
        Self { connector }
    }
}

impl Connector for MySqlBlockingConnector {
    type Connection = MySqlBlockingConnection;

    fn connect(&self) -> Result<MySqlBlockingConnection, ConnectionError> {
        if Handle::try_current().is_ok() {
            return Err(ConnectionError::new(
                self.url(),
                Error::msg("Blocking connections cannot be opened inside an async runtime"),
            ));
        }
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ConnectionError::new(self.url(), e))?;
        let connection = runtime.block_on(AsyncConnector::connect(&self.connector))?;
        Ok(MySqlBlockingConnection {
            connection,
            runtime,
        })
    }
}

/// Autocommit MySQL session serving synchronous call sites.
pub struct MySqlBlockingConnection {
    connection: MySqlConnection,
    runtime: Runtime,
}

impl Connection for MySqlBlockingConnection {
    fn id(&self) -> u64 {
        self.connection.id()
    }

    fn close(self) {
        let Self {
            connection,
            runtime,
        } = self;
        let id = connection.id();
        if Handle::try_current().is_ok() {
            log::debug!("Session {id} released inside an async runtime, dropping it");
            drop(connection);
            runtime.shutdown_background();
            return;
        }
        if let Err(e) = runtime.block_on(connection.disconnect()) {
            log::warn!("{:#}", e);
        }
    }
}

impl BlockingExecutor for MySqlBlockingConnection {
    fn execute(&mut self, query: impl Into<Query>) -> Result<RowsAffected> {
        let query = query.into();
        self.runtime.block_on(self.connection.execute(query))
    }

    fn fetch(&mut self, query: impl Into<Query>) -> Result<Vec<Row>> {
        let query = query.into();
        self.runtime
            .block_on(self.connection.fetch(query).try_collect())
    }
}

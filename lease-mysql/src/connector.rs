use crate::MySqlConnection;
use lease_core::{AsyncConnector, ConnectOptions, ConnectionError, Context, Error, Result};
use mysql_async::{Conn, Opts, OptsBuilder};
use std::time::Duration;

/// Opens autocommit MySQL sessions from one set of credentials.
#[derive(Clone, Debug)]
pub struct MySqlConnector {
    options: ConnectOptions,
    timeout: Option<Duration>,
}

impl MySqlConnector {
    pub const NAME: &'static str = "mysql";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(options: ConnectOptions) -> Self {
        Self {
            options,
            timeout: Some(Self::DEFAULT_TIMEOUT),
        }
    }

    /// Credentials from `DBENDPOINT`, `DBUSER`, `DBPASS`, `DBNAME` and `DBPORT`.
    pub fn from_env() -> Result<Self> {
        ConnectOptions::from_env().map(Self::new)
    }

    /// Like [`MySqlConnector::from_env`], loading `.env` first.
    pub fn from_dotenv() -> Result<Self> {
        ConnectOptions::from_dotenv().map(Self::new)
    }

    /// Upper bound on the connection handshake, `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }

    /// Endpoint with the password masked, safe to log.
    pub fn url(&self) -> String {
        format!("{}://{}", Self::NAME, self.options)
    }

    fn opts(&self) -> Result<Opts> {
        let url = self.options.to_url(Self::NAME)?;
        let opts = Opts::from_url(url.as_str())
            .with_context(|| format!("While parsing the options for `{}`", self.url()))?;
        Ok(OptsBuilder::from_opts(opts)
            .init(vec!["SET autocommit=1"])
            .into())
    }
}

impl AsyncConnector for MySqlConnector {
    type Connection = MySqlConnection;

    async fn connect(&self) -> Result<MySqlConnection, ConnectionError> {
        let endpoint = self.url();
        let opts = self
            .opts()
            .map_err(|e| ConnectionError::new(&endpoint, e))?;
        log::trace!("Connecting to `{endpoint}`");
        let connection = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, Conn::new(opts))
                .await
                .map_err(|_| {
                    ConnectionError::new(
                        &endpoint,
                        Error::msg(format!("Timed out after {timeout:?}")),
                    )
                })?,
            None => Conn::new(opts).await,
        }
        .map_err(|e| ConnectionError::new(&endpoint, e))?;
        Ok(MySqlConnection::new(connection))
    }
}

use crate::{Error, Result};
use anyhow::Context;
use std::{
    env,
    fmt::{self, Debug, Display},
};
use url::Url;

pub const DEFAULT_PORT: u16 = 3306;

pub const ENV_USER: &str = "DBUSER";
pub const ENV_PASSWORD: &str = "DBPASS";
pub const ENV_DATABASE: &str = "DBNAME";
pub const ENV_HOST: &str = "DBENDPOINT";
pub const ENV_PORT: &str = "DBPORT";

/// Credentials and endpoint used by a connection factory.
///
/// Read once at process start and never mutated afterwards. The password is
/// redacted from both `Debug` and `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectOptions {
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            user: user.into(),
            password: password.into(),
            database: database.into(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Read `DBENDPOINT`, `DBUSER`, `DBPASS`, `DBNAME` and the optional `DBPORT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`ConnectOptions::from_env`], loading `.env` from the working directory first.
    pub fn from_dotenv() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded environment from `{}`", path.display()),
            Err(e) if e.not_found() => log::debug!("No .env file found"),
            Err(e) => return Err(Error::new(e).context("While loading the .env file")),
        }
        Self::from_env()
    }

    /// Build the options from any key-value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).with_context(|| format!("Missing environment variable `{key}`"))
        };
        let port = match lookup(ENV_PORT) {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("Invalid port `{v}` in `{ENV_PORT}`"))?,
            None => DEFAULT_PORT,
        };
        Ok(Self {
            host: required(ENV_HOST)?,
            port,
            user: required(ENV_USER)?,
            password: required(ENV_PASSWORD)?,
            database: required(ENV_DATABASE)?,
        })
    }

    /// Connection url for `scheme`, credentials percent-encoded.
    pub fn to_url(&self, scheme: &str) -> Result<Url> {
        let context = || format!("While building the connection url for `{}`", self);
        let mut url = Url::parse(&format!("{scheme}://{}", self.host)).with_context(context)?;
        url.set_port(Some(self.port))
            .map_err(|_| Error::msg("The url cannot carry a port"))
            .with_context(context)?;
        url.set_username(&self.user)
            .map_err(|_| Error::msg("The url cannot carry a username"))
            .with_context(context)?;
        url.set_password(Some(&self.password))
            .map_err(|_| Error::msg("The url cannot carry a password"))
            .with_context(context)?;
        url.set_path(&self.database);
        Ok(url)
    }
}

impl Display for ConnectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:***@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

impl Debug for ConnectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

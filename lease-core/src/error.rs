use anyhow::Chain;
use std::{
    error::Error as StdError,
    fmt::{self, Display},
};
use thiserror::Error;

type Source = Box<dyn StdError + Send + Sync + 'static>;

/// The connection factory could not establish a connection.
///
/// Raised before the wrapped operation runs, the operation is never invoked
/// when this error is returned by a guard.
///
/// The alternate form (`{:#}`) appends the whole source chain, like
/// `anyhow::Error` does.
#[derive(Error, Debug)]
pub struct ConnectionError {
    endpoint: String,
    #[source]
    source: Source,
}

impl ConnectionError {
    /// `endpoint` must not carry the password, use [`crate::ConnectOptions`]'s `Display`.
    pub fn new(endpoint: impl Into<String>, source: impl Into<Source>) -> Self {
        Self {
            endpoint: endpoint.into(),
            source: source.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not connect to `{}`", self.endpoint)?;
        if f.alternate() {
            let source: &(dyn StdError + 'static) = &*self.source;
            for cause in Chain::new(source) {
                write!(f, ": {cause}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_source_and_endpoint() {
        let error = ConnectionError::new("mysql://bot@db:3306/app", "Connection refused");
        assert_eq!(error.endpoint(), "mysql://bot@db:3306/app");
        assert_eq!(
            error.to_string(),
            "Could not connect to `mysql://bot@db:3306/app`"
        );
        assert_eq!(
            error.source().map(|v| v.to_string()).as_deref(),
            Some("Connection refused")
        );
    }

    #[test]
    fn downcast_through_anyhow() {
        let error: anyhow::Error =
            ConnectionError::new("db", anyhow::anyhow!("Access denied")).into();
        assert!(error.is::<ConnectionError>());
        assert_eq!(format!("{:#}", error), "Could not connect to `db`: Access denied");
    }

    #[test]
    fn alternate_lists_the_chain() {
        let source = anyhow::anyhow!("Connection refused").context("While opening the socket");
        let error = ConnectionError::new("db", source);
        assert_eq!(error.to_string(), "Could not connect to `db`");
        assert_eq!(
            format!("{:#}", error),
            "Could not connect to `db`: While opening the socket: Connection refused"
        );
    }
}

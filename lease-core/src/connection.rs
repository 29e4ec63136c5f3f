use crate::{ConnectionError, Result};
use std::future::Future;

/// A live session with the backend, exclusively owned by one [`crate::Cursor`].
pub trait Connection: Send + Sized {
    /// Backend session identifier.
    fn id(&self) -> u64;

    /// Release the session. Must not block an async runtime.
    fn close(self);

    /// Gracefully release the session, reporting backend failures.
    fn disconnect(self) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.close();
            Ok(())
        }
    }
}

/// Connection factory for blocking call sites.
pub trait Connector {
    type Connection: Connection;

    fn connect(&self) -> Result<Self::Connection, ConnectionError>;
}

/// Connection factory for async call sites.
pub trait AsyncConnector: Send + Sync {
    type Connection: Connection;

    fn connect(&self) -> impl Future<Output = Result<Self::Connection, ConnectionError>> + Send;
}

impl<K: Connector> Connector for &K {
    type Connection = K::Connection;

    fn connect(&self) -> Result<Self::Connection, ConnectionError> {
        (**self).connect()
    }
}

impl<K: AsyncConnector> AsyncConnector for &K {
    type Connection = K::Connection;

    fn connect(&self) -> impl Future<Output = Result<Self::Connection, ConnectionError>> + Send {
        (**self).connect()
    }
}

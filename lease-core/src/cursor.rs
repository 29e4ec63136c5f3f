use crate::{AsyncConnector, Connection, ConnectionError, Connector, Result};
use std::{
    fmt::{self, Debug},
    ops::{Deref, DerefMut},
};

/// Handle to a connection-scoped unit of work.
///
/// The cursor owns its connection and releases it exactly once: through
/// [`Cursor::close`], [`Cursor::disconnect`], or on drop, whichever happens
/// first. Dropping covers the panic and cancellation paths.
pub struct Cursor<C: Connection> {
    connection: Option<C>,
}

impl<C: Connection> Cursor<C> {
    pub fn new(connection: C) -> Self {
        Self {
            connection: Some(connection),
        }
    }

    /// Open a cursor whose lifetime belongs to the caller.
    pub fn open<K>(connector: &K) -> Result<Self, ConnectionError>
    where
        K: Connector<Connection = C>,
    {
        connector.connect().map(Self::new)
    }

    /// Open a cursor whose lifetime belongs to the caller.
    pub async fn open_async<K>(connector: &K) -> Result<Self, ConnectionError>
    where
        K: AsyncConnector<Connection = C>,
    {
        connector.connect().await.map(Self::new)
    }

    pub fn id(&self) -> u64 {
        self.connection().id()
    }

    pub fn close(mut self) {
        if let Some(connection) = self.connection.take() {
            log::trace!("Closing the cursor of session {}", connection.id());
            connection.close();
        }
    }

    pub async fn disconnect(mut self) -> Result<()> {
        match self.connection.take() {
            Some(connection) => {
                log::trace!("Disconnecting the cursor of session {}", connection.id());
                connection.disconnect().await
            }
            None => Ok(()),
        }
    }

    fn connection(&self) -> &C {
        self.connection
            .as_ref()
            .expect("The connection is present until the cursor is consumed")
    }
}

impl<C: Connection> Deref for Cursor<C> {
    type Target = C;

    fn deref(&self) -> &Self::Target {
        self.connection()
    }
}

impl<C: Connection> DerefMut for Cursor<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection
            .as_mut()
            .expect("The connection is present until the cursor is consumed")
    }
}

impl<C: Connection> Drop for Cursor<C> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            log::debug!(
                "Cursor of session {} dropped while open, closing it",
                connection.id()
            );
            connection.close();
        }
    }
}

impl<C: Connection> Debug for Cursor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("session", &self.connection.as_ref().map(Connection::id))
            .finish()
    }
}

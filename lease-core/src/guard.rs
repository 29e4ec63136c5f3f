use crate::{AsyncConnector, Connection, ConnectionError, Connector, Cursor};
use std::{
    borrow::Cow,
    fmt::{self, Debug},
};

pub const DEFAULT_LABEL: &str = "lease";

/// Supplies a cursor to an operation.
///
/// When the caller passes a cursor it is handed to the operation untouched and
/// stays the caller's responsibility. Otherwise a fresh connection is opened,
/// wrapped in a cursor for the duration of the call, and released on every
/// exit path: return, error, panic and, for [`CursorGuard::ensure_async`],
/// cancellation of the returned future.
///
/// ```rust,ignore
/// let guard = CursorGuard::new(connector).with_label("vertool::db");
/// let count = guard
///     .ensure_async(None, async |cursor| {
///         let row = cursor.fetch_one("SELECT COUNT(*) AS n FROM users").await?;
///         Ok::<_, anyhow::Error>(row.map(|mut v| v.take::<u64>("n")).transpose()?)
///     })
///     .await?;
/// ```
#[derive(Clone)]
pub struct CursorGuard<K> {
    connector: K,
    label: Cow<'static, str>,
}

impl<K> CursorGuard<K> {
    pub fn new(connector: K) -> Self {
        Self {
            connector,
            label: DEFAULT_LABEL.into(),
        }
    }

    /// Log target used for every record emitted by this guard.
    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    pub fn connector(&self) -> &K {
        &self.connector
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn report(&self, error: &ConnectionError) {
        log::error!(target: self.label(), "{:#}", error);
    }

    fn opened<C: Connection>(&self, cursor: &Cursor<C>) {
        log::debug!(target: self.label(), "Opened session {}", cursor.id());
    }
}

impl<K: Connector> CursorGuard<K> {
    /// Open a cursor whose lifetime belongs to the caller.
    pub fn open(&self) -> Result<Cursor<K::Connection>, ConnectionError> {
        let cursor = Cursor::open(&self.connector).inspect_err(|e| self.report(e))?;
        self.opened(&cursor);
        Ok(cursor)
    }

    /// Run `op` with the provided cursor, or with a fresh one released before returning.
    pub fn ensure<R, E, F>(&self, cursor: Option<&mut Cursor<K::Connection>>, op: F) -> Result<R, E>
    where
        E: From<ConnectionError>,
        F: FnOnce(&mut Cursor<K::Connection>) -> Result<R, E>,
    {
        let mut scope = match cursor {
            Some(cursor) => Scope::Provided(cursor),
            None => Scope::Opened(self.open()?),
        };
        let result = op(scope.cursor());
        scope.release(&self.label);
        result
    }
}

impl<K: AsyncConnector> CursorGuard<K> {
    /// Open a cursor whose lifetime belongs to the caller.
    pub async fn open_async(&self) -> Result<Cursor<K::Connection>, ConnectionError> {
        let cursor = Cursor::open_async(&self.connector)
            .await
            .inspect_err(|e| self.report(e))?;
        self.opened(&cursor);
        Ok(cursor)
    }

    /// Async counterpart of [`CursorGuard::ensure`].
    ///
    /// Dropping the returned future while `op` is suspended still releases
    /// the connection opened for it, exactly once.
    pub async fn ensure_async<R, E, F>(
        &self,
        cursor: Option<&mut Cursor<K::Connection>>,
        op: F,
    ) -> Result<R, E>
    where
        E: From<ConnectionError>,
        F: AsyncFnOnce(&mut Cursor<K::Connection>) -> Result<R, E>,
    {
        let mut scope = match cursor {
            Some(cursor) => Scope::Provided(cursor),
            None => Scope::Opened(self.open_async().await?),
        };
        let result = op(scope.cursor()).await;
        scope.release_async(&self.label).await;
        result
    }
}

impl<K> Debug for CursorGuard<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorGuard")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Cursor resolved for one call: either borrowed from the caller or owned by the guard.
enum Scope<'c, C: Connection> {
    Provided(&'c mut Cursor<C>),
    Opened(Cursor<C>),
}

impl<'c, C: Connection> Scope<'c, C> {
    fn cursor(&mut self) -> &mut Cursor<C> {
        match self {
            Scope::Provided(cursor) => &mut **cursor,
            Scope::Opened(cursor) => cursor,
        }
    }

    fn release(self, label: &str) {
        if let Scope::Opened(cursor) = self {
            log::debug!(target: label, "Releasing session {}", cursor.id());
            cursor.close();
        }
    }

    async fn release_async(self, label: &str) {
        if let Scope::Opened(cursor) = self {
            let id = cursor.id();
            log::debug!(target: label, "Releasing session {id}");
            if let Err(e) = cursor.disconnect().await {
                log::warn!(target: label, "{:#}", e.context(format!("While releasing session {id}")));
            }
        }
    }
}

/// Run `op` with `cursor`, or with a cursor opened from `connector` for the duration of the call.
pub fn ensure_cursor<K, R, E, F>(
    connector: K,
    cursor: Option<&mut Cursor<K::Connection>>,
    op: F,
) -> Result<R, E>
where
    K: Connector,
    E: From<ConnectionError>,
    F: FnOnce(&mut Cursor<K::Connection>) -> Result<R, E>,
{
    CursorGuard::new(connector).ensure(cursor, op)
}

/// Async counterpart of [`ensure_cursor`].
pub async fn ensure_cursor_async<K, R, E, F>(
    connector: K,
    cursor: Option<&mut Cursor<K::Connection>>,
    op: F,
) -> Result<R, E>
where
    K: AsyncConnector,
    E: From<ConnectionError>,
    F: AsyncFnOnce(&mut Cursor<K::Connection>) -> Result<R, E>,
{
    CursorGuard::new(connector).ensure_async(cursor, op).await
}

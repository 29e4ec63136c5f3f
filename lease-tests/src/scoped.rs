use lease::{AsyncConnector, ConnectionError, CursorGuard, Error, ensure_cursor_async};
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Operation error that is not an `anyhow::Error`, to check it is returned as is.
#[derive(Debug, PartialEq)]
enum Refusal {
    Connection(String),
    Rejected(u32),
}

impl From<ConnectionError> for Refusal {
    fn from(value: ConnectionError) -> Self {
        Refusal::Connection(value.endpoint().to_string())
    }
}

pub async fn fresh_sessions<K: AsyncConnector>(connector: &K) {
    let first = ensure_cursor_async(connector, None, async |cursor| Ok::<_, Error>(cursor.id()))
        .await
        .expect("Failed to run the first guarded call");
    let second = ensure_cursor_async(connector, None, async |cursor| Ok::<_, Error>(cursor.id()))
        .await
        .expect("Failed to run the second guarded call");
    assert_ne!(first, second, "Each guarded call must open its own session");
}

pub async fn provided_cursor<K: AsyncConnector>(connector: &K) {
    let guard = CursorGuard::new(connector).with_label("lease::tests");
    let mut cursor = guard
        .open_async()
        .await
        .expect("Failed to open the caller cursor");
    let id = cursor.id();
    let seen = guard
        .ensure_async(Some(&mut cursor), async |cursor| {
            Ok::<_, Error>(cursor.id())
        })
        .await
        .expect("Failed to run with the provided cursor");
    assert_eq!(seen, id);
    // Still open and owned by the caller
    assert_eq!(cursor.id(), id);
    cursor
        .disconnect()
        .await
        .expect("Failed to disconnect the caller cursor");
}

pub async fn nested<K: AsyncConnector>(connector: &K) {
    let guard = CursorGuard::new(connector);
    let (outer, inner) = guard
        .ensure_async(None, async |cursor| {
            let outer = cursor.id();
            let inner = guard
                .ensure_async(Some(cursor), async |cursor| Ok::<_, Error>(cursor.id()))
                .await?;
            Ok::<_, Error>((outer, inner))
        })
        .await
        .expect("Failed to run the nested guarded calls");
    assert_eq!(outer, inner, "Nested calls must share the outer session");
}

pub async fn operation_error<K: AsyncConnector>(connector: &K) {
    let result = ensure_cursor_async(connector, None, async |_| {
        Err::<(), _>(Refusal::Rejected(7))
    })
    .await;
    assert_eq!(result, Err(Refusal::Rejected(7)));
}

pub async fn cancellation<K: AsyncConnector>(connector: &K) {
    let outcome = timeout(
        Duration::from_millis(500),
        ensure_cursor_async(connector, None, async |_| {
            sleep(Duration::from_secs(60)).await;
            Ok::<_, Error>(())
        }),
    )
    .await;
    assert!(outcome.is_err(), "The operation should have been cancelled");
    let id = ensure_cursor_async(connector, None, async |cursor| Ok::<_, Error>(cursor.id()))
        .await
        .expect("Failed to run a guarded call after a cancelled one");
    assert!(id > 0);
}

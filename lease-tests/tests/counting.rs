use lease::{
    ConnectionError, Cursor, CursorGuard, Error, Executor, ensure_cursor, ensure_cursor_async,
};
use lease_tests::{CountingConnector, CountingSession, execute_tests, init_logs, silent_logs};
use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    time::Duration,
};
use tokio::time::{sleep, timeout};

fn wrapped(
    connector: &CountingConnector,
    x: i32,
    cursor: Option<&mut Cursor<CountingSession>>,
) -> lease::Result<i32> {
    ensure_cursor(connector, cursor, |_| Ok(x + 41))
}

#[test]
fn scenario_without_cursor() {
    init_logs();
    let connector = CountingConnector::new();
    assert_eq!(wrapped(&connector, 1, None).unwrap(), 42);
    assert_eq!(connector.opened(), 1);
    assert_eq!(connector.closed(), 1);
}

#[test]
fn scenario_with_cursor() {
    init_logs();
    let connector = CountingConnector::new();
    let mut cursor = Cursor::open(&connector).expect("Could not open the cursor");
    assert_eq!(wrapped(&connector, 1, Some(&mut cursor)).unwrap(), 42);
    assert_eq!(connector.opened(), 1);
    assert_eq!(connector.closed(), 0);
    cursor.close();
    assert_eq!(connector.closed(), 1);
}

#[test]
fn sync_releases_on_error_and_panic() {
    init_logs();
    let connector = CountingConnector::new();
    let result: lease::Result<()> = ensure_cursor(&connector, None, |_| Err(Error::msg("nope")));
    assert_eq!(result.unwrap_err().to_string(), "nope");
    assert_eq!((connector.opened(), connector.closed()), (1, 1));

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let _: lease::Result<()> = ensure_cursor(&connector, None, |_| panic!("Boom"));
    }));
    assert!(outcome.is_err());
    assert_eq!((connector.opened(), connector.closed()), (2, 2));
}

#[test]
fn sync_refused_connection() {
    init_logs();
    let connector = CountingConnector::refusing();
    let mut invoked = false;
    let result: lease::Result<()>;
    silent_logs! {
        result = ensure_cursor(&connector, None, |_| {
            invoked = true;
            Ok(())
        });
    }
    assert!(!invoked);
    let error = result.unwrap_err();
    let error = error
        .downcast_ref::<ConnectionError>()
        .expect("Expected a ConnectionError");
    assert!(error.endpoint().starts_with("counting://"));
    assert_eq!(connector.opened(), 0);
    assert_eq!(connector.closed(), 0);
}

#[tokio::test]
async fn async_releases_once() {
    init_logs();
    let connector = CountingConnector::new();
    let value = ensure_cursor_async(&connector, None, async |cursor| {
        let mut row = cursor
            .fetch_one("SELECT CONNECTION_ID() AS session")
            .await?
            .expect("A row was expected");
        row.take::<u64>("session")
    })
    .await
    .expect("Failed to run the guarded call");
    assert_eq!(value, 1);
    assert_eq!((connector.opened(), connector.closed()), (1, 1));
    assert_eq!(
        connector.statements(),
        ["SELECT CONNECTION_ID() AS session"]
    );

    let result = ensure_cursor_async(&connector, None, async |cursor| {
        cursor.execute("DELETE FROM sessions").await?;
        Err::<(), _>(Error::msg("rolled back by hand"))
    })
    .await;
    assert_eq!(result.unwrap_err().to_string(), "rolled back by hand");
    assert_eq!((connector.opened(), connector.closed()), (2, 2));
}

#[tokio::test]
async fn async_failed_disconnect_keeps_result() {
    init_logs();
    let connector = CountingConnector::failing_disconnect();
    let value: lease::Result<i32>;
    silent_logs! {
        value = ensure_cursor_async(&connector, None, async |_| Ok(42)).await;
    }
    assert_eq!(value.unwrap(), 42);
    assert_eq!(connector.disconnect_failures(), 1);
    assert_eq!((connector.opened(), connector.closed()), (1, 1));

    let value: lease::Result<i32>;
    silent_logs! {
        value = ensure_cursor_async(&connector, None, async |_| {
            Err(Error::msg("operation failed"))
        })
        .await;
    }
    assert_eq!(value.unwrap_err().to_string(), "operation failed");
    assert_eq!(connector.disconnect_failures(), 2);
    assert_eq!((connector.opened(), connector.closed()), (2, 2));
}

#[tokio::test]
async fn async_provided_cursor_is_not_closed() {
    init_logs();
    let connector = CountingConnector::new();
    let guard = CursorGuard::new(&connector);
    let mut cursor = guard.open_async().await.expect("Could not open the cursor");
    for _ in 0..3 {
        let id = guard
            .ensure_async(Some(&mut cursor), async |cursor| Ok::<_, Error>(cursor.id()))
            .await
            .unwrap();
        assert_eq!(id, 1);
    }
    assert_eq!((connector.opened(), connector.closed()), (1, 0));
    cursor.disconnect().await.unwrap();
    assert_eq!(connector.closed(), 1);
}

#[tokio::test]
async fn async_cancelled_after_acquisition() {
    init_logs();
    let connector = CountingConnector::new();
    let outcome = timeout(
        Duration::from_millis(50),
        ensure_cursor_async(&connector, None, async |_| {
            sleep(Duration::from_secs(60)).await;
            Ok::<_, Error>(())
        }),
    )
    .await;
    assert!(outcome.is_err());
    assert_eq!(connector.opened(), 1);
    assert_eq!(connector.closed(), 1);
}

#[tokio::test]
async fn async_dropped_while_suspended() {
    init_logs();
    let connector = CountingConnector::new();
    let (started, wait) = tokio::sync::oneshot::channel();
    let guarded = ensure_cursor_async(&connector, None, async move |_| {
        let _ = started.send(());
        sleep(Duration::from_secs(60)).await;
        Ok::<_, Error>(())
    });
    tokio::select! {
        _ = guarded => panic!("The operation should still be suspended"),
        signal = wait => signal.expect("The operation did not start"),
    }
    assert_eq!(connector.opened(), 1);
    assert_eq!(connector.closed(), 1);
}

#[tokio::test]
async fn async_refused_connection() {
    init_logs();
    let connector = CountingConnector::refusing();
    let mut invoked = false;
    let result: lease::Result<()>;
    silent_logs! {
        result = ensure_cursor_async(&connector, None, async |_| {
            invoked = true;
            Ok(())
        })
        .await;
    }
    assert!(!invoked);
    assert!(result.unwrap_err().is::<ConnectionError>());
    assert_eq!(connector.opened(), 0);
}

#[tokio::test]
async fn counting_connector() {
    init_logs();
    let connector = CountingConnector::new();
    execute_tests(connector.clone()).await;
    assert_eq!(
        connector.opened() as usize,
        connector.closed(),
        "Every session must be released"
    );
}

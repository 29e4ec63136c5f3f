use lease::{Cursor, Error, Executor, Result, ensure_cursor};
use lease_tests::{CountingConnector, CountingSession, init_logs};

#[ensure_cursor(connector)]
fn answer(connector: &CountingConnector, x: i32, cursor: &mut Cursor<CountingSession>) -> Result<i32> {
    assert!(cursor.id() > 0);
    if x < 0 {
        return Err(Error::msg("x must not be negative"));
    }
    Ok(x + 41)
}

#[ensure_cursor(connector, cursor = session)]
async fn session_of(connector: &CountingConnector, session: &mut Cursor<CountingSession>) -> Result<u64> {
    let mut row = session
        .fetch_one("SELECT CONNECTION_ID() AS session")
        .await?
        .ok_or_else(|| Error::msg("No row"))?;
    row.take::<u64>("session")
}

struct Repository {
    connector: CountingConnector,
}

impl Repository {
    #[ensure_cursor(&self.connector)]
    async fn touch(&self, table: &str, cursor: &mut Cursor<CountingSession>) -> Result<u64> {
        let affected = cursor.execute(format!("UPDATE {table} SET touched = 1")).await?;
        Ok(affected.rows_affected)
    }
}

#[test]
fn sync_without_cursor() {
    init_logs();
    let connector = CountingConnector::new();
    assert_eq!(answer(&connector, 1, None).unwrap(), 42);
    assert_eq!((connector.opened(), connector.closed()), (1, 1));
    assert!(answer(&connector, -1, None).is_err());
    assert_eq!((connector.opened(), connector.closed()), (2, 2));
}

#[test]
fn sync_with_cursor() {
    init_logs();
    let connector = CountingConnector::new();
    let mut cursor = Cursor::open(&connector).unwrap();
    assert_eq!(answer(&connector, 1, Some(&mut cursor)).unwrap(), 42);
    assert_eq!((connector.opened(), connector.closed()), (1, 0));
    cursor.close();
    assert_eq!(connector.closed(), 1);
}

#[tokio::test]
async fn async_without_cursor() {
    init_logs();
    let connector = CountingConnector::new();
    assert_eq!(session_of(&connector, None).await.unwrap(), 1);
    assert_eq!(session_of(&connector, None).await.unwrap(), 2);
    assert_eq!((connector.opened(), connector.closed()), (2, 2));
}

#[tokio::test]
async fn async_with_cursor() {
    init_logs();
    let connector = CountingConnector::new();
    let mut cursor = Cursor::open(&connector).unwrap();
    assert_eq!(session_of(&connector, Some(&mut cursor)).await.unwrap(), 1);
    assert_eq!(session_of(&connector, Some(&mut cursor)).await.unwrap(), 1);
    assert_eq!((connector.opened(), connector.closed()), (1, 0));
    cursor.disconnect().await.unwrap();
    assert_eq!(connector.closed(), 1);
}

#[tokio::test]
async fn method() {
    init_logs();
    let repository = Repository {
        connector: CountingConnector::new(),
    };
    assert_eq!(repository.touch("users", None).await.unwrap(), 1);
    assert_eq!(
        repository.connector.statements(),
        ["UPDATE users SET touched = 1"]
    );
    assert_eq!(repository.connector.closed(), 1);
}

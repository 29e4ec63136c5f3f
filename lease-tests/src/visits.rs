use indoc::indoc;
use lease::{
    AsyncConnector, CursorGuard, Error, Executor, Query,
    stream::{StreamExt, TryStreamExt},
};
use time::macros::datetime;

pub async fn visits<K>(connector: &K)
where
    K: AsyncConnector,
    K::Connection: Executor,
{
    let guard = CursorGuard::new(connector).with_label("lease::tests");

    // Setup
    guard
        .ensure_async(None, async |cursor| {
            cursor.execute("DROP TABLE IF EXISTS lease_visits").await?;
            cursor
                .execute(indoc! {"
                    CREATE TABLE lease_visits (
                        id INT AUTO_INCREMENT PRIMARY KEY,
                        visitor VARCHAR(64) NOT NULL,
                        visited_at DATETIME(6) NOT NULL,
                        pages INT UNSIGNED NULL
                    )
                "})
                .await?;
            Ok::<_, Error>(())
        })
        .await
        .expect("Failed to create the lease_visits table");

    // Written in one session
    let affected = guard
        .ensure_async(None, async |cursor| {
            cursor
                .execute(
                    Query::new(indoc! {"
                        INSERT INTO lease_visits (visitor, visited_at, pages)
                        VALUES (?, ?, ?), (?, ?, ?)
                    "})
                    .bind("alice")
                    .bind(datetime!(2024-02-29 13:45:07.25))
                    .bind(Some(3u32))
                    .bind("bob")
                    .bind(datetime!(2024-03-01 08:00:00))
                    .bind(None::<u32>),
                )
                .await
        })
        .await
        .expect("Failed to insert the visits");
    assert_eq!(affected.rows_affected, 2);

    // Visible from another session, sessions are autocommit
    let visitors = guard
        .ensure_async(None, async |cursor| {
            cursor
                .fetch("SELECT visitor FROM lease_visits ORDER BY id")
                .map(|row| row.and_then(|mut row| row.take::<String>("visitor")))
                .try_collect::<Vec<_>>()
                .await
        })
        .await
        .expect("Failed to read the visitors");
    assert_eq!(visitors, ["alice", "bob"]);

    // Parameters and typed columns
    let (visited_at, pages) = guard
        .ensure_async(None, async |cursor| {
            let mut row = cursor
                .fetch_one(
                    Query::new("SELECT visited_at, pages FROM lease_visits WHERE visitor = ?")
                        .bind("alice"),
                )
                .await?
                .ok_or_else(|| Error::msg("alice is missing"))?;
            Ok::<_, Error>((
                row.take::<time::PrimitiveDateTime>("visited_at")?,
                row.take::<Option<u32>>("pages")?,
            ))
        })
        .await
        .expect("Failed to read alice's visit");
    assert_eq!(visited_at, datetime!(2024-02-29 13:45:07.25));
    assert_eq!(pages, Some(3));

    let pages = guard
        .ensure_async(None, async |cursor| {
            let mut row = cursor
                .fetch_one("SELECT pages FROM lease_visits WHERE visitor = 'bob'")
                .await?
                .ok_or_else(|| Error::msg("bob is missing"))?;
            row.take::<Option<u32>>("pages")
        })
        .await
        .expect("Failed to read bob's visit");
    assert_eq!(pages, None);

    // Cleanup
    guard
        .ensure_async(None, async |cursor| {
            cursor.execute("DROP TABLE lease_visits").await
        })
        .await
        .expect("Failed to drop the lease_visits table");
}

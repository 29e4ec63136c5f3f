#[cfg(test)]
mod tests {
    use lease::{
        AsyncConnector, Connection, ConnectionError, Connector, Cursor, CursorGuard, Result,
        ensure_cursor,
    };
    use std::sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    };

    #[derive(Default)]
    struct Pool {
        opened: AtomicU64,
        closed: Arc<AtomicU64>,
    }

    struct Lease {
        id: u64,
        closed: Arc<AtomicU64>,
    }

    impl Connection for Lease {
        fn id(&self) -> u64 {
            self.id
        }
        fn close(self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Connector for Pool {
        type Connection = Lease;
        fn connect(&self) -> Result<Lease, ConnectionError> {
            Ok(Lease {
                id: self.opened.fetch_add(1, Ordering::SeqCst) + 1,
                closed: self.closed.clone(),
            })
        }
    }

    impl AsyncConnector for Pool {
        type Connection = Lease;
        async fn connect(&self) -> Result<Lease, ConnectionError> {
            Connector::connect(self)
        }
    }

    #[ensure_cursor(pool)]
    fn sync_id(pool: &Pool, cursor: &mut Cursor<Lease>) -> Result<u64> {
        Ok(cursor.id())
    }

    #[ensure_cursor(pool)]
    async fn async_id(pool: &Pool, cursor: &mut Cursor<Lease>) -> Result<u64> {
        tokio::task::yield_now().await;
        Ok(cursor.id())
    }

    #[test]
    fn sync_decorator() {
        let pool = Pool::default();
        assert_eq!(sync_id(&pool, None).unwrap(), 1);
        assert_eq!(sync_id(&pool, None).unwrap(), 2);
        assert_eq!(pool.closed.load(Ordering::SeqCst), 2);
        let mut cursor = Cursor::open(&pool).unwrap();
        assert_eq!(sync_id(&pool, Some(&mut cursor)).unwrap(), 3);
        assert_eq!(pool.closed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn async_decorator() {
        let pool = Pool::default();
        let guard = CursorGuard::new(&pool).with_label("facade");
        let mut cursor = guard.open_async().await.unwrap();
        assert_eq!(async_id(&pool, Some(&mut cursor)).await.unwrap(), 1);
        assert_eq!(async_id(&pool, None).await.unwrap(), 2);
        assert_eq!(pool.closed.load(Ordering::SeqCst), 1);
        drop(cursor);
        assert_eq!(pool.closed.load(Ordering::SeqCst), 2);
    }
}

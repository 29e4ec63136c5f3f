mod counting;
mod scoped;
mod visits;

pub use counting::*;
use lease::{AsyncConnector, Executor};
use log::LevelFilter;
use scoped::*;
use std::env;
use visits::visits;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Guard behavior every async connector must show.
pub async fn execute_tests<K: AsyncConnector>(connector: K) {
    fresh_sessions(&connector).await;
    provided_cursor(&connector).await;
    nested(&connector).await;
    operation_error(&connector).await;
    cancellation(&connector).await;
}

/// Statements through guarded cursors, for connectors backed by a SQL server.
pub async fn execute_sql_tests<K>(connector: K)
where
    K: AsyncConnector,
    K::Connection: Executor,
{
    execute_tests(&connector).await;
    visits(&connector).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}

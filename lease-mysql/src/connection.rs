use crate::{RowWrap, ValueWrap};
use async_stream::try_stream;
use lease_core::{
    Connection, Error, Executor, Query, Result, Row, RowsAffected,
    stream::{Stream, StreamExt, TryStreamExt},
    truncate_long,
};
use mysql_async::{Conn, Params, prelude::Queryable};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Autocommit MySQL session.
pub struct MySqlConnection {
    pub(crate) connection: Conn,
}

impl MySqlConnection {
    pub(crate) fn new(connection: Conn) -> Self {
        Self { connection }
    }
}

fn take_params(query: &mut Query) -> Result<Params> {
    let params = std::mem::take(&mut query.params)
        .into_iter()
        .map(|v| mysql_async::Value::try_from(ValueWrap(v)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Params::Positional(params))
}

impl Connection for MySqlConnection {
    fn id(&self) -> u64 {
        self.connection.id() as _
    }

    fn close(self) {
        let id = self.id();
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = self.connection.disconnect().await {
                        log::warn!("Could not disconnect session {id}: {e}");
                    }
                });
            }
            Err(..) => {
                log::debug!("No async runtime to disconnect session {id}, dropping it");
                drop(self.connection);
            }
        }
    }

    async fn disconnect(self) -> Result<()> {
        let id = self.id();
        self.connection
            .disconnect()
            .await
            .map_err(|e| Error::new(e).context(format!("While disconnecting session {id}")))
    }
}

impl Executor for MySqlConnection {
    async fn execute(&mut self, query: impl Into<Query> + Send) -> Result<RowsAffected> {
        let mut query = query.into();
        let context = format!("While executing the query:\n{}", truncate_long!(query.sql));
        let result = if query.is_prepared() {
            match take_params(&mut query) {
                Ok(params) => self.connection.exec_drop(&*query.sql, params).await,
                Err(e) => {
                    let e = e.context(context);
                    log::error!("{:#}", e);
                    return Err(e);
                }
            }
        } else {
            self.connection.query_drop(&*query.sql).await
        };
        if let Err(e) = result {
            let e = Error::new(e).context(context);
            log::error!("{:#}", e);
            return Err(e);
        }
        Ok(RowsAffected {
            rows_affected: self.connection.affected_rows(),
            last_affected_id: self.connection.last_insert_id(),
        })
    }

    fn fetch<'s>(
        &'s mut self,
        query: impl Into<Query> + Send + 's,
    ) -> impl Stream<Item = Result<Row>> + Send + 's {
        let mut query = query.into();
        let context = Arc::new(format!(
            "While fetching the query:\n{}",
            truncate_long!(query.sql)
        ));
        try_stream! {
            if query.is_prepared() {
                let params = take_params(&mut query)?;
                let mut stream = self
                    .connection
                    .exec_stream::<RowWrap, _, _>(&*query.sql, params)
                    .await?;
                while let Some(row) = stream.next().await.transpose()? {
                    yield row.0
                }
            } else {
                let mut result = self.connection.query_iter(&*query.sql).await?;
                while let Some(mut stream) = result.stream::<RowWrap>().await? {
                    while let Some(row) = stream.next().await.transpose()? {
                        yield row.0
                    }
                }
            }
        }
        .map_err(move |e: Error| {
            let e = e.context(context.clone());
            log::error!("{:#}", e);
            e
        })
    }
}

use crate::{
    Query, Result, Row, RowsAffected,
    stream::{Stream, StreamExt},
};
use std::{future::Future, pin::pin};

/// Statement surface of a connection, reached from a cursor through `Deref`.
pub trait Executor: Send {
    /// Execute the statement and return the number of rows affected.
    fn execute(
        &mut self,
        query: impl Into<Query> + Send,
    ) -> impl Future<Output = Result<RowsAffected>> + Send;

    /// Execute the query and stream the rows.
    fn fetch<'s>(
        &'s mut self,
        query: impl Into<Query> + Send + 's,
    ) -> impl Stream<Item = Result<Row>> + Send + 's;

    /// Execute the query and return the first row, if any.
    fn fetch_one(
        &mut self,
        query: impl Into<Query> + Send,
    ) -> impl Future<Output = Result<Option<Row>>> + Send {
        let query = query.into();
        async move {
            let mut stream = pin!(self.fetch(query));
            stream.next().await.transpose()
        }
    }
}

/// Blocking statement surface, for connections serving synchronous call sites.
pub trait BlockingExecutor {
    /// Execute the statement and return the number of rows affected.
    fn execute(&mut self, query: impl Into<Query>) -> Result<RowsAffected>;

    /// Execute the query and collect the rows.
    fn fetch(&mut self, query: impl Into<Query>) -> Result<Vec<Row>>;

    /// Execute the query and return the first row, if any.
    fn fetch_one(&mut self, query: impl Into<Query>) -> Result<Option<Row>> {
        Ok(self.fetch(query)?.into_iter().next())
    }
}

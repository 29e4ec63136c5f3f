use crate::{AsValue, Error, Result, Value};
use std::{
    borrow::Cow,
    fmt::{self, Display},
    sync::Arc,
};

/// SQL text plus the positional parameters bound to its `?` placeholders.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Query {
    pub sql: Cow<'static, str>,
    pub params: Vec<Value>,
}

impl Query {
    pub fn new(sql: impl Into<Cow<'static, str>>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append the next positional parameter.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn is_prepared(&self) -> bool {
        !self.params.is_empty()
    }
}

impl From<&'static str> for Query {
    fn from(value: &'static str) -> Self {
        Query::new(value)
    }
}

impl From<String> for Query {
    fn from(value: String) -> Self {
        Query::new(value)
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)?;
        if !self.params.is_empty() {
            f.write_str(" -- params: ")?;
            for (i, v) in self.params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{v}")?;
            }
        }
        Ok(())
    }
}

/// Outcome of a statement that modifies data.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Backend-specific last inserted identifier when available.
    pub last_affected_id: Option<u64>,
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
            if elem.last_affected_id.is_some() {
                self.last_affected_id = elem.last_affected_id;
            }
        }
    }
}

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;

/// A row with its column labels.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Row {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(labels: RowNames, values: Vec<Value>) -> Self {
        Self { labels, values }
    }

    pub fn names(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == column)
            .and_then(|i| self.values.get(i))
    }

    /// Convert the column `column` into `T`.
    pub fn take<T: AsValue>(&mut self, column: &str) -> Result<T> {
        let index = self
            .labels
            .iter()
            .position(|v| v == column)
            .ok_or_else(|| Error::msg(format!("The row has no column `{column}`")))?;
        let (values_len, labels_len) = (self.values.len(), self.labels.len());
        let value = self.values.get_mut(index).ok_or_else(|| {
            Error::msg(format!(
                "The row has {} values for {} labels, column `{column}` is missing",
                values_len, labels_len
            ))
        })?;
        T::try_from_value(std::mem::take(value))
            .map_err(|e| e.context(format!("While reading the column `{column}`")))
    }
}

use crate::{Error, Result};
use std::{
    any,
    fmt::{self, Display},
    str,
};
use time::{
    Date, Duration, PrimitiveDateTime, format_description::BorrowedFormatItem,
    macros::format_description,
};

/// Dynamically typed value moved between drivers and wrapped operations.
///
/// Text protocols usually return every column as bytes, so the numeric
/// conversions in [`AsValue`] also accept `Blob` and `Varchar` holding a
/// decimal literal.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Varchar(String),
    Blob(Box<[u8]>),
    Timestamp(PrimitiveDateTime),
    Interval(Duration),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Textual view of the value, when it is text or UTF-8 bytes.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Varchar(v) => Some(v),
            Value::Blob(v) => str::from_utf8(v).ok(),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::UInt64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Varchar(v) => write!(f, "'{v}'"),
            Value::Blob(v) => match str::from_utf8(v) {
                Ok(v) => write!(f, "'{v}'"),
                Err(..) => write!(f, "<{} bytes>", v.len()),
            },
            Value::Timestamp(v) => write!(f, "{v}"),
            Value::Interval(v) => write!(f, "{v}"),
        }
    }
}

/// Conversion between native Rust types and [`Value`].
pub trait AsValue {
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

/// `YYYY-MM-DD hh:mm:ss[.ffffff]`, as sent by text protocols.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
);

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Date-only text is read as midnight.
fn parse_timestamp(text: &str) -> Option<PrimitiveDateTime> {
    let text = text.trim();
    PrimitiveDateTime::parse(text, TIMESTAMP_FORMAT)
        .or_else(|_| Date::parse(text, DATE_FORMAT).map(Date::midnight))
        .ok()
}

/// `[-]hhh:mm:ss[.ffffff]`, the text form of a `TIME` column.
fn parse_interval(text: &str) -> Option<Duration> {
    let text = text.trim();
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let mut parts = text.splitn(3, ':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds = parts.next()?;
    let (seconds, fraction) = seconds.split_once('.').unwrap_or((seconds, ""));
    let seconds: i64 = seconds.parse().ok()?;
    if hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return None;
    }
    if fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let nanoseconds: i32 = if fraction.is_empty() {
        0
    } else {
        format!("{fraction:0<9}").parse().ok()?
    };
    let total = hours.checked_mul(3600)?.checked_add(minutes * 60 + seconds)?;
    let result = Duration::new(total, nanoseconds);
    Some(if negative { -result } else { result })
}

fn mismatch<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert `{:?}` into {}",
        value,
        any::type_name::<T>()
    ))
}

fn parse_text<T: str::FromStr>(value: &Value) -> Result<T> {
    value
        .as_str()
        .and_then(|v| v.trim().parse::<T>().ok())
        .ok_or_else(|| mismatch::<T>(value))
}

macro_rules! impl_as_value_integer {
    ($variant:ident, $wide:ty, $($t:ty),+) => {
        $(
            impl AsValue for $t {
                fn as_value(self) -> Value {
                    Value::$variant(self as $wide)
                }
                fn try_from_value(value: Value) -> Result<Self> {
                    match &value {
                        Value::Int64(v) => <$t>::try_from(*v).map_err(|_| mismatch::<$t>(&value)),
                        Value::UInt64(v) => <$t>::try_from(*v).map_err(|_| mismatch::<$t>(&value)),
                        Value::Boolean(v) => Ok(*v as $t),
                        Value::Varchar(..) | Value::Blob(..) => parse_text::<$t>(&value),
                        _ => Err(mismatch::<$t>(&value)),
                    }
                }
            }
        )+
    };
}

impl_as_value_integer!(Int64, i64, i8, i16, i32, i64);
impl_as_value_integer!(UInt64, u64, u8, u16, u32, u64);

impl AsValue for bool {
    fn as_value(self) -> Value {
        Value::Boolean(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Boolean(v) => Ok(*v),
            Value::Int64(v) => Ok(*v != 0),
            Value::UInt64(v) => Ok(*v != 0),
            Value::Varchar(..) | Value::Blob(..) => parse_text::<i64>(&value).map(|v| v != 0),
            _ => Err(mismatch::<bool>(&value)),
        }
    }
}

impl AsValue for f32 {
    fn as_value(self) -> Value {
        Value::Float32(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Float32(v) => Ok(*v),
            Value::Varchar(..) | Value::Blob(..) => parse_text::<f32>(&value),
            _ => Err(mismatch::<f32>(&value)),
        }
    }
}

impl AsValue for f64 {
    fn as_value(self) -> Value {
        Value::Float64(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Float64(v) => Ok(*v),
            Value::Float32(v) => Ok(*v as f64),
            Value::Int64(v) => Ok(*v as f64),
            Value::UInt64(v) => Ok(*v as f64),
            Value::Varchar(..) | Value::Blob(..) => parse_text::<f64>(&value),
            _ => Err(mismatch::<f64>(&value)),
        }
    }
}

impl AsValue for String {
    fn as_value(self) -> Value {
        Value::Varchar(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(v) => Ok(v),
            Value::Blob(v) => String::from_utf8(v.into_vec())
                .map_err(|e| Error::new(e).context("Cannot convert the blob into String")),
            Value::Null => Err(mismatch::<String>(&Value::Null)),
            v => Ok(v.to_string()),
        }
    }
}

impl AsValue for Vec<u8> {
    fn as_value(self) -> Value {
        Value::Blob(self.into())
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(v) => Ok(v.into_vec()),
            Value::Varchar(v) => Ok(v.into_bytes()),
            v => Err(mismatch::<Vec<u8>>(&v)),
        }
    }
}

impl AsValue for PrimitiveDateTime {
    fn as_value(self) -> Value {
        Value::Timestamp(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Timestamp(v) => Ok(*v),
            Value::Varchar(..) | Value::Blob(..) => value
                .as_str()
                .and_then(parse_timestamp)
                .ok_or_else(|| mismatch::<PrimitiveDateTime>(&value)),
            _ => Err(mismatch::<PrimitiveDateTime>(&value)),
        }
    }
}

impl AsValue for Duration {
    fn as_value(self) -> Value {
        Value::Interval(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Interval(v) => Ok(*v),
            Value::Varchar(..) | Value::Blob(..) => value
                .as_str()
                .and_then(parse_interval)
                .ok_or_else(|| mismatch::<Duration>(&value)),
            _ => Err(mismatch::<Duration>(&value)),
        }
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => Value::Null,
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            v => T::try_from_value(v).map(Some),
        }
    }
}

impl<T: AsValue> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.as_value()
    }
}

impl AsValue for Value {
    fn as_value(self) -> Value {
        self
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(value.into())
    }
}

macro_rules! impl_from_for_value {
    ($($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    value.as_value()
                }
            }
        )+
    };
}

impl_from_for_value!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    Vec<u8>,
    PrimitiveDateTime,
    Duration
);

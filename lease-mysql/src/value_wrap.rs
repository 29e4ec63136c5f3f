use lease_core::{Error, Value};
use mysql_async::FromValueError;
use time::{Date, Duration, Month, PrimitiveDateTime, Time};

const SECS_IN_DAY: i64 = 86_400;

pub(crate) struct ValueWrap(pub(crate) Value);

impl From<Value> for ValueWrap {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<ValueWrap> for Value {
    fn from(value: ValueWrap) -> Self {
        value.0
    }
}

impl mysql_async::prelude::FromValue for ValueWrap {
    type Intermediate = ValueWrap;
}

impl TryFrom<mysql_async::Value> for ValueWrap {
    type Error = FromValueError;

    fn try_from(value: mysql_async::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            mysql_async::Value::NULL => Value::Null,
            mysql_async::Value::Bytes(v) => Value::Blob(v.into()),
            mysql_async::Value::Int(v) => Value::Int64(v),
            mysql_async::Value::UInt(v) => Value::UInt64(v),
            mysql_async::Value::Float(v) => Value::Float32(v),
            mysql_async::Value::Double(v) => Value::Float64(v),
            mysql_async::Value::Date(year, month, day, hour, minute, second, microsecond) => {
                let Ok(month) = Month::try_from(month) else {
                    return Err(FromValueError(value));
                };
                let Ok(date) = Date::from_calendar_date(year as _, month, day) else {
                    return Err(FromValueError(value));
                };
                let Ok(time) = Time::from_hms_micro(hour, minute, second, microsecond) else {
                    return Err(FromValueError(value));
                };
                Value::Timestamp(PrimitiveDateTime::new(date, time))
            }
            mysql_async::Value::Time(negative, days, hours, minutes, seconds, micro) => {
                let mut result = Duration::days(days as _)
                    + Duration::hours(hours as _)
                    + Duration::minutes(minutes as _)
                    + Duration::seconds(seconds as _)
                    + Duration::microseconds(micro as _);
                if negative {
                    result = -result;
                }
                Value::Interval(result)
            }
        }
        .into())
    }
}

impl TryFrom<ValueWrap> for mysql_async::Value {
    type Error = Error;

    fn try_from(value: ValueWrap) -> Result<Self, Self::Error> {
        type MySQLValue = mysql_async::Value;
        Ok(match value.0 {
            Value::Null => MySQLValue::NULL,
            Value::Boolean(v) => MySQLValue::from(v),
            Value::Int64(v) => MySQLValue::Int(v),
            Value::UInt64(v) => MySQLValue::UInt(v),
            Value::Float32(v) => MySQLValue::Float(v),
            Value::Float64(v) => MySQLValue::Double(v),
            Value::Varchar(v) => MySQLValue::Bytes(v.into_bytes()),
            Value::Blob(v) => MySQLValue::Bytes(v.into_vec()),
            Value::Timestamp(v) => {
                let Ok(year) = u16::try_from(v.year()) else {
                    return Err(Error::msg(format!("Date {v} is out of range for MySQL")));
                };
                MySQLValue::Date(
                    year,
                    v.month().into(),
                    v.day(),
                    v.hour(),
                    v.minute(),
                    v.second(),
                    v.microsecond(),
                )
            }
            Value::Interval(v) => {
                let abs = v.abs();
                let mut secs = abs.whole_seconds();
                let Ok(days) = u32::try_from(secs / SECS_IN_DAY) else {
                    return Err(Error::msg(format!("Interval {v} is out of range for MySQL")));
                };
                secs %= SECS_IN_DAY;
                let hours = secs / 3600;
                secs %= 3600;
                MySQLValue::Time(
                    v.is_negative(),
                    days,
                    hours as _,
                    (secs / 60) as _,
                    (secs % 60) as _,
                    abs.subsec_microseconds() as _,
                )
            }
        })
    }
}

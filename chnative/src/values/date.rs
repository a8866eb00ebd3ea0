use chrono::{Duration, TimeZone, Utc};
use chrono_tz::{Tz, UTC};

use crate::{
    convert::{unexpected_type, FromSql, ToSql},
    types::Type,
    ChNativeError, Result, Value,
};

/// Days since 1970-01-01 corresponding to 2149-06-06, the last day representable by `Date`.
/// Equal to `u16::MAX`; the bound is enforced at the widening `chrono::Date<Utc> -> Date`
/// conversion, before the `as u16` narrowing cast, since every already-constructed `u16` is
/// trivially in range.
const DATE_MAX_DAYS: i64 = u16::MAX as i64;

/// Unix seconds corresponding to 2105-12-31 23:59:59, the last instant representable by `DateTime`.
const DATE_TIME_MAX_SECS: u32 = 4_291_747_199;

/// Wrapper type for ChNative `Date` type.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd, Debug, Default)]
pub struct Date(pub u16);

impl ToSql for Date {
    fn to_sql(self, _type_hint: Option<&Type>) -> Result<Value> {
        Ok(Value::Date(self))
    }
}

impl FromSql for Date {
    fn from_sql(type_: &Type, value: Value) -> Result<Self> {
        if !matches!(type_, Type::Date) {
            return Err(unexpected_type(type_));
        }
        match value {
            Value::Date(x) => Ok(x),
            _ => unimplemented!(),
        }
    }
}

impl From<Date> for chrono::Date<Utc> {
    fn from(date: Date) -> Self {
        chrono::MIN_DATE + Duration::days(date.0 as i64)
    }
}

impl TryFrom<chrono::Date<Utc>> for Date {
    type Error = ChNativeError;

    fn try_from(other: chrono::Date<Utc>) -> Result<Self> {
        let days = other.signed_duration_since(chrono::MIN_DATE).num_days();
        if !(0..=DATE_MAX_DAYS).contains(&days) {
            return Err(ChNativeError::Overflow(format!(
                "date {} days since 1970-01-01 is outside the representable range [1970-01-01, 2149-06-06]",
                days
            )));
        }
        Ok(Self(days as u16))
    }
}

/// Wrapper type for ChNative `DateTime` type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateTime(pub Tz, pub u32);

impl ToSql for DateTime {
    fn to_sql(self, _type_hint: Option<&Type>) -> Result<Value> {
        if self.1 > DATE_TIME_MAX_SECS {
            return Err(ChNativeError::Overflow(format!(
                "DateTime value {} (unix seconds) exceeds maximum of {} (2105-12-31 23:59:59)",
                self.1, DATE_TIME_MAX_SECS
            )));
        }
        Ok(Value::DateTime(self))
    }
}

impl FromSql for DateTime {
    fn from_sql(type_: &Type, value: Value) -> Result<Self> {
        if !matches!(type_, Type::DateTime(_)) {
            return Err(unexpected_type(type_));
        }
        match value {
            Value::DateTime(x) => Ok(x),
            _ => unimplemented!(),
        }
    }
}

impl Default for DateTime {
    fn default() -> Self {
        Self(UTC, 0)
    }
}

impl From<DateTime> for chrono::DateTime<Tz> {
    fn from(date: DateTime) -> Self {
        let native_date = chrono::NaiveDateTime::from_timestamp(date.1 as i64, 0);
        Self::from_utc(native_date, date.0.offset_from_utc_datetime(&native_date))
    }
}

impl From<chrono::DateTime<Tz>> for DateTime {
    fn from(other: chrono::DateTime<Tz>) -> Self {
        Self(other.timezone(), other.timestamp() as u32)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for DateTime {
    fn from(other: chrono::DateTime<Utc>) -> Self {
        Self(chrono_tz::UTC, other.timestamp() as u32)
    }
}

/// Wrapper type for ChNative `DateTime64` type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateTime64<const PRECISION: usize>(pub Tz, pub u64);

impl<const PRECISION: usize> ToSql for DateTime64<PRECISION> {
    fn to_sql(self, _type_hint: Option<&Type>) -> Result<Value> {
        Ok(Value::DateTime64(self.0, PRECISION, self.1))
    }
}

impl<const PRECISION: usize> FromSql for DateTime64<PRECISION> {
    fn from_sql(type_: &Type, value: Value) -> Result<Self> {
        if !matches!(type_, Type::DateTime64(x, _) if *x == PRECISION) {
            return Err(unexpected_type(type_));
        }
        match value {
            Value::DateTime64(tz, _, value) => Ok(Self(tz, value)),
            _ => unimplemented!(),
        }
    }
}

impl<const PRECISION: usize> Default for DateTime64<PRECISION> {
    fn default() -> Self {
        Self(UTC, 0)
    }
}

impl<const PRECISION: usize> From<DateTime64<PRECISION>> for chrono::DateTime<Tz> {
    fn from(date: DateTime64<PRECISION>) -> Self {
        chrono::MIN_DATETIME.with_timezone(&date.0) + Duration::seconds(date.1 as i64)
    }
}

impl<const PRECISION: usize> From<chrono::DateTime<Tz>> for DateTime64<PRECISION> {
    fn from(other: chrono::DateTime<Tz>) -> Self {
        Self(
            other.timezone(),
            other
                .signed_duration_since(chrono::MIN_DATETIME)
                .num_seconds() as u64,
        )
    }
}

use std::borrow::Cow;
use std::fmt;

use chrono_tz::Tz;

use crate::{
    convert::{unexpected_type, FromSql, ToSql},
    types::Type,
    Result,
};

mod bytes;
mod chnative_uuid;
mod date;
#[cfg(feature = "decimal")]
mod decimal;
mod fixed_point;
mod geo;
mod int256;
mod ip;

pub use bytes::Bytes;
pub use date::*;
pub use fixed_point::*;
pub use geo::*;
pub use int256::*;
pub use ip::*;

#[cfg(test)]
mod tests;

/// A raw ChNative value.
/// Types are not strictly/completely preserved (i.e. types `String` and `FixedString` both are value `String`).
/// Use this if you want dynamically typed queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Int128(i128),
    Int256(i256),

    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    UInt128(u128),
    UInt256(u256),

    Float32(u32),
    Float64(u64),

    Decimal32(usize, i32),
    Decimal64(usize, i64),
    Decimal128(usize, i128),
    Decimal256(usize, i256),

    String(String),

    Uuid(::uuid::Uuid),

    Date(Date),
    DateTime(DateTime),
    DateTime64(Tz, usize, u64),

    Enum8(i8),
    Enum16(i16),

    Array(Vec<Value>),

    // Nested(IndexMap<String, Value>),
    Tuple(Vec<Value>),

    Null,

    Map(Vec<Value>, Vec<Value>),

    Ipv4(Ipv4),
    Ipv6(Ipv6),

    Point(Point),
    Ring(Ring),
    Polygon(Polygon),
    MultiPolygon(MultiPolygon),
}

impl Value {
    /// Convenience constructor for a string value, e.g. for building query arguments.
    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    pub(crate) fn index_value(&self) -> usize {
        match self {
            Value::UInt8(x) => *x as usize,
            Value::UInt16(x) => *x as usize,
            Value::UInt32(x) => *x as usize,
            Value::UInt64(x) => *x as usize,
            _ => unimplemented!(),
        }
    }

    pub(crate) fn unwrap_array(&self) -> &[Value] {
        match self {
            Value::Array(a) => &a[..],
            _ => unimplemented!(),
        }
    }

    pub(crate) fn justify_null<'a>(&'a self, type_: &Type) -> Cow<'a, Value> {
        if self == &Value::Null {
            Cow::Owned(type_.default_value())
        } else {
            Cow::Borrowed(self)
        }
    }

    /// Converts a [`Value`] to a [`T`] type by calling [`T::from_sql`].
    pub fn to_value<T: FromSql>(self, type_: &Type) -> Result<T> {
        T::from_sql(type_, self)
    }

    /// Converts a [`T`] type to a [`Value`] by calling [`T::to_sql`].
    pub fn from_value<T: ToSql>(value: T) -> Result<Self> {
        value.to_sql(None)
    }

    /// Guesses a [`Type`] from the value, may not correspond to actual column type in ChNative
    pub fn guess_type(&self) -> Type {
        match self {
            Value::Int8(_) => Type::Int8,
            Value::Int16(_) => Type::Int16,
            Value::Int32(_) => Type::Int32,
            Value::Int64(_) => Type::Int64,
            Value::Int128(_) => Type::Int128,
            Value::Int256(_) => Type::Int256,
            Value::UInt8(_) => Type::UInt8,
            Value::UInt16(_) => Type::UInt16,
            Value::UInt32(_) => Type::UInt32,
            Value::UInt64(_) => Type::UInt64,
            Value::UInt128(_) => Type::UInt128,
            Value::UInt256(_) => Type::UInt256,
            Value::Float32(_) => Type::Float32,
            Value::Float64(_) => Type::Float64,
            Value::Decimal32(p, _) => Type::Decimal32(*p),
            Value::Decimal64(p, _) => Type::Decimal64(*p),
            Value::Decimal128(p, _) => Type::Decimal128(*p),
            Value::Decimal256(p, _) => Type::Decimal256(*p),
            Value::String(_) => Type::String,
            Value::Uuid(_) => Type::Uuid,
            Value::Date(_) => Type::Date,
            Value::DateTime(time) => Type::DateTime(time.0),
            Value::DateTime64(tz, p, _) => Type::DateTime64(*p, *tz),
            Value::Enum8(x) => Type::Enum8(vec![(x.to_string(), *x)]),
            Value::Enum16(x) => Type::Enum16(vec![(x.to_string(), *x)]),
            Value::Array(x) => Type::Array(Box::new(
                x.first().map(|x| x.guess_type()).unwrap_or(Type::String),
            )),
            Value::Tuple(values) => Type::Tuple(values.iter().map(|x| x.guess_type()).collect()),
            Value::Null => Type::Nullable(Box::new(Type::String)),
            Value::Map(k, v) => Type::Map(
                Box::new(k.first().map(|x| x.guess_type()).unwrap_or(Type::String)),
                Box::new(v.first().map(|x| x.guess_type()).unwrap_or(Type::String)),
            ),
            Value::Ipv4(_) => Type::Ipv4,
            Value::Ipv6(_) => Type::Ipv6,
            Value::Point(_) => Type::Point,
            Value::Ring(_) => Type::Ring,
            Value::Polygon(_) => Type::Polygon,
            Value::MultiPolygon(_) => Type::MultiPolygon,
        }
    }
}

/// Inserts a decimal point `scale` digits from the right of an unsigned digit string.
fn format_decimal_digits(negative: bool, digits: &str, scale: usize) -> String {
    let sign = if negative { "-" } else { "" };
    if scale == 0 {
        return format!("{sign}{digits}");
    }
    let padded;
    let digits = if digits.len() <= scale {
        padded = format!("{}{}", "0".repeat(scale - digits.len() + 1), digits);
        &padded
    } else {
        digits
    };
    let point = digits.len() - scale;
    format!("{sign}{}.{}", &digits[..point], &digits[point..])
}

fn format_decimal(mantissa: i128, scale: usize) -> String {
    format_decimal_digits(mantissa < 0, &mantissa.unsigned_abs().to_string(), scale)
}

fn format_decimal256(mantissa: i256, scale: usize) -> String {
    let rendered = mantissa.to_string();
    match rendered.strip_prefix('-') {
        Some(digits) => format_decimal_digits(true, digits, scale),
        None => format_decimal_digits(false, &rendered, scale),
    }
}

fn write_sql_string(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    write!(f, "'")?;
    for c in value.chars() {
        match c {
            '\\' => write!(f, "\\\\")?,
            '\'' => write!(f, "\\'")?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "'")
}

impl fmt::Display for Value {
    /// Renders a value as a ChNative SQL literal, as used for client-side query argument
    /// substitution. Types aren't round-tripped here; this only needs to parse back to the
    /// same value on the server.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int8(x) => write!(f, "{x}"),
            Value::Int16(x) => write!(f, "{x}"),
            Value::Int32(x) => write!(f, "{x}"),
            Value::Int64(x) => write!(f, "{x}"),
            Value::Int128(x) => write!(f, "{x}"),
            Value::Int256(x) => write!(f, "{x}"),
            Value::UInt8(x) => write!(f, "{x}"),
            Value::UInt16(x) => write!(f, "{x}"),
            Value::UInt32(x) => write!(f, "{x}"),
            Value::UInt64(x) => write!(f, "{x}"),
            Value::UInt128(x) => write!(f, "{x}"),
            Value::UInt256(x) => write!(f, "{x}"),
            Value::Float32(x) => write!(f, "{}", f32::from_bits(*x)),
            Value::Float64(x) => write!(f, "{}", f64::from_bits(*x)),
            Value::Decimal32(scale, x) => write!(f, "{}", format_decimal(*x as i128, *scale)),
            Value::Decimal64(scale, x) => write!(f, "{}", format_decimal(*x as i128, *scale)),
            Value::Decimal128(scale, x) => write!(f, "{}", format_decimal(*x, *scale)),
            Value::Decimal256(scale, x) => write!(f, "{}", format_decimal256(*x, *scale)),
            Value::String(s) => write_sql_string(f, s),
            Value::Uuid(u) => write!(f, "'{u}'"),
            Value::Date(d) => write!(f, "{}", d.0),
            Value::DateTime(dt) => write!(f, "{}", dt.1),
            Value::DateTime64(_, _, raw) => write!(f, "{raw}"),
            Value::Enum8(x) => write!(f, "{x}"),
            Value::Enum16(x) => write!(f, "{x}"),
            Value::Array(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Tuple(values) => {
                write!(f, "(")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, ")")
            }
            Value::Null => write!(f, "NULL"),
            Value::Map(keys, values) => {
                write!(f, "map(")?;
                for (i, (k, v)) in keys.iter().zip(values.iter()).enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}, {v}")?;
                }
                write!(f, ")")
            }
            Value::Ipv4(ip) => write!(f, "'{ip}'"),
            Value::Ipv6(ip) => write!(f, "'{ip}'"),
            Value::Point(p) => write!(f, "({}, {})", p.0[0], p.0[1]),
            Value::Ring(r) => {
                write!(f, "[")?;
                for (i, p) in r.0.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "({}, {})", p.0[0], p.0[1])?;
                }
                write!(f, "]")
            }
            Value::Polygon(p) => {
                write!(f, "[")?;
                for (i, r) in p.0.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", Value::Ring(r.clone()))?;
                }
                write!(f, "]")
            }
            Value::MultiPolygon(mp) => {
                write!(f, "[")?;
                for (i, poly) in mp.0.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", Value::Polygon(poly.clone()))?;
                }
                write!(f, "]")
            }
        }
    }
}

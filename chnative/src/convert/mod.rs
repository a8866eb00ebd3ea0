use std::borrow::Cow;

use indexmap::IndexMap;

use crate::{types::Type, ChNativeError, Result, Value};

mod json;
mod raw_row;
mod std_deserialize;
mod std_serialize;
mod unit_value;
mod vec_tuple;

pub use json::Json;
pub use raw_row::{RawRow, RowIndex};
pub use unit_value::UnitValue;
pub use vec_tuple::VecTuple;

/// A type that can be converted to a raw ChNative SQL value.
///
/// `type_hint` carries the server-reported column type when one is known (e.g. during an
/// insert against an already-described table); implementations that need it to disambiguate
/// (tuples, nested structs, enums) should thread it through to their children.
pub trait ToSql {
    fn to_sql(self, type_hint: Option<&Type>) -> Result<Value>;
}

impl ToSql for Value {
    fn to_sql(self, _type_hint: Option<&Type>) -> Result<Value> {
        Ok(self)
    }
}

pub fn unexpected_type(type_: &Type) -> ChNativeError {
    ChNativeError::DeserializeError(format!("unexpected type: {}", type_))
}

/// A type that can be converted from a raw ChNative SQL value.
pub trait FromSql: Sized {
    fn from_sql(type_: &Type, value: Value) -> Result<Self>;
}

impl FromSql for Value {
    fn from_sql(_type_: &Type, value: Value) -> Result<Self> {
        Ok(value)
    }
}

/// A row that can be deserialized and serialized from a raw ChNative SQL value.
/// Generally this is not implemented manually, but using `chnative_derive::Row`.
/// I.e. `#[derive(chnative::Row)]`.
pub trait Row: Sized {
    /// The number of columns this row always serializes to, if known statically.
    const COLUMN_COUNT: Option<usize>;

    /// The names of the columns this row serializes to, if known without an instance.
    fn column_names() -> Option<Vec<Cow<'static, str>>>;

    fn deserialize_row(map: Vec<(&str, &Type, Value)>) -> Result<Self>;

    fn serialize_row(
        self,
        type_hints: &IndexMap<String, Type>,
    ) -> Result<Vec<(Cow<'static, str>, Value)>>;
}

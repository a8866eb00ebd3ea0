use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;

use super::*;

macro_rules! scalar_to_sql {
    ($ty:ty, $variant:ident) => {
        impl ToSql for $ty {
            fn to_sql(self, _type_hint: Option<&Type>) -> Result<Value> {
                Ok(Value::$variant(self))
            }
        }
    };
}

scalar_to_sql!(u8, UInt8);
scalar_to_sql!(u16, UInt16);
scalar_to_sql!(u32, UInt32);
scalar_to_sql!(u64, UInt64);
scalar_to_sql!(u128, UInt128);
scalar_to_sql!(i32, Int32);
scalar_to_sql!(i64, Int64);
scalar_to_sql!(i128, Int128);

impl ToSql for i8 {
    fn to_sql(self, type_hint: Option<&Type>) -> Result<Value> {
        match type_hint {
            Some(Type::Enum8(_)) => Ok(Value::Enum8(self)),
            _ => Ok(Value::Int8(self)),
        }
    }
}

impl ToSql for i16 {
    fn to_sql(self, type_hint: Option<&Type>) -> Result<Value> {
        match type_hint {
            Some(Type::Enum16(_)) => Ok(Value::Enum16(self)),
            _ => Ok(Value::Int16(self)),
        }
    }
}

impl ToSql for f32 {
    fn to_sql(self, _type_hint: Option<&Type>) -> Result<Value> {
        Ok(Value::Float32(self.to_bits()))
    }
}

impl ToSql for f64 {
    fn to_sql(self, _type_hint: Option<&Type>) -> Result<Value> {
        Ok(Value::Float64(self.to_bits()))
    }
}

fn enum_name_to_sql(name: &str, type_hint: Option<&Type>) -> Option<Result<Value>> {
    match type_hint {
        Some(Type::Enum8(items)) => Some(
            items
                .iter()
                .find(|(item_name, _)| item_name == name)
                .map(|(_, value)| Value::Enum8(*value))
                .ok_or_else(|| {
                    ChNativeError::SerializeError(format!("unknown Enum8 name: '{}'", name))
                }),
        ),
        Some(Type::Enum16(items)) => Some(
            items
                .iter()
                .find(|(item_name, _)| item_name == name)
                .map(|(_, value)| Value::Enum16(*value))
                .ok_or_else(|| {
                    ChNativeError::SerializeError(format!("unknown Enum16 name: '{}'", name))
                }),
        ),
        _ => None,
    }
}

impl ToSql for String {
    fn to_sql(self, type_hint: Option<&Type>) -> Result<Value> {
        match enum_name_to_sql(&self, type_hint) {
            Some(result) => result,
            None => Ok(Value::String(self)),
        }
    }
}

impl<'a> ToSql for &'a str {
    fn to_sql(self, type_hint: Option<&Type>) -> Result<Value> {
        match enum_name_to_sql(self, type_hint) {
            Some(result) => result,
            None => Ok(Value::String(self.to_string())),
        }
    }
}

impl<T: ToSql> ToSql for Vec<T> {
    fn to_sql(self, type_hint: Option<&Type>) -> Result<Value> {
        let inner_hint = type_hint.and_then(|t| t.unarray());
        Ok(Value::Array(
            self.into_iter()
                .map(|x| x.to_sql(inner_hint))
                .collect::<Result<Vec<_>>>()?,
        ))
    }
}

impl<T: ToSql, Y: ToSql> ToSql for HashMap<T, Y> {
    fn to_sql(self, type_hint: Option<&Type>) -> Result<Value> {
        let (key_hint, value_hint) = match type_hint.and_then(|t| t.unmap()) {
            Some((k, v)) => (Some(k), Some(v)),
            None => (None, None),
        };
        let mut keys = Vec::with_capacity(self.len());
        let mut values = Vec::with_capacity(self.len());
        for (key, value) in self {
            keys.push(key.to_sql(key_hint)?);
            values.push(value.to_sql(value_hint)?);
        }
        Ok(Value::Map(keys, values))
    }
}

impl<T: ToSql, Y: ToSql> ToSql for BTreeMap<T, Y> {
    fn to_sql(self, type_hint: Option<&Type>) -> Result<Value> {
        let (key_hint, value_hint) = match type_hint.and_then(|t| t.unmap()) {
            Some((k, v)) => (Some(k), Some(v)),
            None => (None, None),
        };
        let mut keys = Vec::with_capacity(self.len());
        let mut values = Vec::with_capacity(self.len());
        for (key, value) in self {
            keys.push(key.to_sql(key_hint)?);
            values.push(value.to_sql(value_hint)?);
        }
        Ok(Value::Map(keys, values))
    }
}

impl<T: ToSql, Y: ToSql> ToSql for IndexMap<T, Y> {
    fn to_sql(self, type_hint: Option<&Type>) -> Result<Value> {
        let (key_hint, value_hint) = match type_hint.and_then(|t| t.unmap()) {
            Some((k, v)) => (Some(k), Some(v)),
            None => (None, None),
        };
        let mut keys = Vec::with_capacity(self.len());
        let mut values = Vec::with_capacity(self.len());
        for (key, value) in self {
            keys.push(key.to_sql(key_hint)?);
            values.push(value.to_sql(value_hint)?);
        }
        Ok(Value::Map(keys, values))
    }
}

impl<T: ToSql> ToSql for Option<T> {
    fn to_sql(self, type_hint: Option<&Type>) -> Result<Value> {
        let inner_hint = type_hint.and_then(|t| t.unnull());
        match self {
            Some(x) => Ok(x.to_sql(inner_hint)?),
            None => Ok(Value::Null),
        }
    }
}

#[cfg(const_generics)]
impl<T: ToSql, const N: usize> ToSql for [T; N] {
    fn to_sql(self, type_hint: Option<&Type>) -> Result<Value> {
        let inner_hint = type_hint.and_then(|t| t.unarray());
        Ok(Value::Array(
            IntoIterator::into_iter(self)
                .map(|x| x.to_sql(inner_hint))
                .collect::<Result<Vec<_>>>()?,
        ))
    }
}

impl<'a, T: ToSql + Clone> ToSql for &'a T {
    fn to_sql(self, type_hint: Option<&Type>) -> Result<Value> {
        self.clone().to_sql(type_hint)
    }
}

impl<'a, T: ToSql + Clone> ToSql for &'a mut T {
    fn to_sql(self, type_hint: Option<&Type>) -> Result<Value> {
        self.clone().to_sql(type_hint)
    }
}

impl<T: ToSql> ToSql for Box<T> {
    fn to_sql(self, type_hint: Option<&Type>) -> Result<Value> {
        (*self).to_sql(type_hint)
    }
}

macro_rules! tuple_impls {
    ($($len:expr => ($($n:tt $name:ident)+))+) => {
        $(
            impl<$($name: ToSql),+> ToSql for ($($name,)+) {
                fn to_sql(self, type_hint: Option<&Type>) -> Result<Value> {
                    let subtypes = type_hint.and_then(|t| t.untuple());
                    Ok(Value::Tuple(vec![
                        $(
                            self.$n.to_sql(subtypes.and_then(|s| s.get($n)))?,
                        )+
                    ]))
                }
            }
        )+
    }
}

tuple_impls! {
    1 => (0 T0)
    2 => (0 T0 1 T1)
    3 => (0 T0 1 T1 2 T2)
    4 => (0 T0 1 T1 2 T2 3 T3)
    5 => (0 T0 1 T1 2 T2 3 T3 4 T4)
    6 => (0 T0 1 T1 2 T2 3 T3 4 T4 5 T5)
    7 => (0 T0 1 T1 2 T2 3 T3 4 T4 5 T5 6 T6)
    8 => (0 T0 1 T1 2 T2 3 T3 4 T4 5 T5 6 T6 7 T7)
    9 => (0 T0 1 T1 2 T2 3 T3 4 T4 5 T5 6 T6 7 T7 8 T8)
    10 => (0 T0 1 T1 2 T2 3 T3 4 T4 5 T5 6 T6 7 T7 8 T8 9 T9)
    11 => (0 T0 1 T1 2 T2 3 T3 4 T4 5 T5 6 T6 7 T7 8 T8 9 T9 10 T10)
    12 => (0 T0 1 T1 2 T2 3 T3 4 T4 5 T5 6 T6 7 T7 8 T8 9 T9 10 T10 11 T11)
    13 => (0 T0 1 T1 2 T2 3 T3 4 T4 5 T5 6 T6 7 T7 8 T8 9 T9 10 T10 11 T11 12 T12)
    14 => (0 T0 1 T1 2 T2 3 T3 4 T4 5 T5 6 T6 7 T7 8 T8 9 T9 10 T10 11 T11 12 T12 13 T13)
    15 => (0 T0 1 T1 2 T2 3 T3 4 T4 5 T5 6 T6 7 T7 8 T8 9 T9 10 T10 11 T11 12 T12 13 T13 14 T14)
    16 => (0 T0 1 T1 2 T2 3 T3 4 T4 5 T5 6 T6 7 T7 8 T8 9 T9 10 T10 11 T11 12 T12 13 T13 14 T14 15 T15)
}

use tokio::io::AsyncWriteExt;

use crate::{io::ChNativeWrite, values::Value, ChNativeError, Result};

use super::{Serializer, SerializerState, Type};

pub struct StringSerializer;

async fn emit_bytes<W: ChNativeWrite>(type_: &Type, bytes: &[u8], writer: &mut W) -> Result<()> {
    if let Type::FixedString(s) = type_ {
        if bytes.len() > *s {
            return Err(ChNativeError::Overflow(format!(
                "value of {} bytes does not fit in FixedString({})",
                bytes.len(),
                s
            )));
        } else if bytes.len() == *s {
            writer.write_all(bytes).await?;
        } else {
            writer.write_all(bytes).await?;
            let padding = *s - bytes.len();
            for _ in 0..padding {
                writer.write_u8(0).await?;
            }
        }
    } else {
        writer.write_string(bytes).await?;
    }
    Ok(())
}

#[async_trait::async_trait]
impl Serializer for StringSerializer {
    async fn write<W: ChNativeWrite>(
        type_: &Type,
        values: Vec<Value>,
        writer: &mut W,
        _state: &mut SerializerState,
    ) -> Result<()> {
        for value in values {
            let value = if value == Value::Null {
                type_.default_value()
            } else {
                value
            };
            match value {
                Value::String(bytes) => {
                    emit_bytes(type_, &bytes, writer).await?;
                }
                Value::Array(items) => {
                    // validate function already confirmed the types here (it's an indirect Vec<u8>/Vec<i8>)
                    let bytes = items
                        .into_iter()
                        .filter_map(|x| {
                            match x {
                                Value::UInt8(x) => Ok(x),
                                Value::Int8(x) => Ok(x as u8),
                                // TODO: This is wrong, it will never deserialize w/ missing pieces
                                _ => Err(ChNativeError::SerializeError(format!(
                                    "StringSerializer called with non-string type: {:?}",
                                    type_
                                ))),
                            }
                            .ok()
                        })
                        .collect::<Vec<u8>>();
                    emit_bytes(type_, &bytes, writer).await?;
                }
                _ => {
                    return Err(ChNativeError::SerializeError(format!(
                        "StringSerializer unimplemented: {type_:?} for value = {value:?}",
                    )));
                }
            }
        }
        Ok(())
    }
}

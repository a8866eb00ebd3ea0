use std::borrow::Cow;

use thiserror::Error;

use crate::types::Type;

/// Every way a request against the native protocol can fail.
///
/// Variant names are error *kinds*, not wrappers around a single upstream type: several
/// variants are produced from multiple distinct failure sites that all mean the same thing
/// to a caller (e.g. a short read and a bad varuint both surface as `Protocol`).
#[derive(Error, Debug)]
pub enum ChNativeError {
    #[error("failed to connect to any configured server: {0}")]
    Dial(String),

    #[error("protocol error: {0}")]
    ProtocolError(String),

    #[error("server exception: (code {code}) {name}: {message}\n{stack_trace}")]
    ServerException {
        code: i32,
        name: String,
        message: String,
        stack_trace: String,
    },

    #[error("invalid type string: {0}")]
    TypeParseError(String),

    #[error("could not convert value for column: from={from} to={to} op={op}")]
    ColumnConvert {
        from: String,
        to: String,
        op: String,
    },

    #[error("value out of range for column type: {0}")]
    Overflow(String),

    #[error("batch is not in a valid state for this operation: {0}")]
    BatchState(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("connection is broken and must be discarded")]
    BadConn,

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("duplicate field: {0}")]
    DuplicateField(&'static str),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("unexpected type for column `{0}`: {1}")]
    UnexpectedTypeWithColumn(Cow<'static, str>, Type),

    #[error("column fetched twice")]
    DoubleFetch,

    #[error("row index out of bounds")]
    OutOfBounds,

    #[error("no row available")]
    MissingRow,

    #[error("failed to deserialize value: {0}")]
    DeserializeError(String),

    #[error("failed to serialize value: {0}")]
    SerializeError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("internal channel closed: {0}")]
    ChannelClosed(String),
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for ChNativeError {
    fn from(e: tokio::sync::mpsc::error::SendError<T>) -> Self {
        ChNativeError::ChannelClosed(e.to_string())
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for ChNativeError {
    fn from(e: tokio::sync::oneshot::error::RecvError) -> Self {
        ChNativeError::ChannelClosed(e.to_string())
    }
}

impl From<std::string::FromUtf8Error> for ChNativeError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        ChNativeError::ProtocolError(format!("invalid utf8 string: {e}"))
    }
}

impl ChNativeError {
    /// Annotates a field-level conversion failure with the column name it occurred on,
    /// used by derived `Row` impls to give scan errors more context.
    pub fn with_column_name(self, name: &'static str) -> Self {
        match self {
            ChNativeError::DeserializeError(msg) => {
                ChNativeError::DeserializeError(format!("column `{}`: {}", name, msg))
            }
            ChNativeError::UnexpectedTypeWithColumn(_, type_) => {
                ChNativeError::UnexpectedTypeWithColumn(Cow::Borrowed(name), type_)
            }
            other => other,
        }
    }
}

pub(crate) fn missing_field(field: &'static str) -> ChNativeError {
    ChNativeError::MissingField(field)
}

pub(crate) fn duplicate_field(field: &'static str) -> ChNativeError {
    ChNativeError::DuplicateField(field)
}


pub const VERSION_MAJOR: u64 = 21;
pub const VERSION_MINOR: u64 = 6;

mod io;
mod internal_client_out;
mod internal_client_in;
mod protocol;
mod client;
mod block;
#[cfg(feature = "compression")]
mod compression;
mod progress;
mod types;
mod values;
mod convert;
mod query;
mod query_parser;
pub mod errors;

pub use uuid::Uuid;

pub use client::*;
pub use values::*;
pub use convert::{FromSql, ToSql, Row, RawRow, RowIndex};
pub use types::Type;
pub use query::{ParsedQuery, QueryBuilder};
pub use query::select::SelectBuilder;
pub use indexmap::IndexMap;

pub use errors::ChNativeError;

/// Result alias used throughout the crate; the error side is always [`ChNativeError`].
pub type Result<T> = std::result::Result<T, ChNativeError>;
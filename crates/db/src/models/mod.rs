//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - The entity struct returned by the store (enum-typed columns already parsed)
//! - A crate-private `FromRow` row struct where a column needs parsing
//! - `Deserialize` create / update DTOs
//! - `Serialize` read views with references resolved

pub mod comment;
pub mod company;
pub mod dashboard;
pub mod favorite;
pub mod notification;
pub mod user;

use std::str::FromStr;

/// Parse a TEXT column holding one of the core enums.
pub(crate) fn decode_text<T>(column: &str, value: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = String>,
{
    value.parse::<T>().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: e.into(),
    })
}

//! Command handlers

use std::str::FromStr;

use anyhow::Result;

pub mod account;
pub mod book;
pub mod config;
pub mod search;
pub mod stats;
pub mod transfer;
pub mod word;

/// Parse an optional string flag into a typed value
pub(crate) fn parse_opt<T>(value: Option<String>) -> Result<Option<T>>
where
    T: FromStr<Err = String>,
{
    value
        .map(|v| v.parse().map_err(anyhow::Error::msg))
        .transpose()
}

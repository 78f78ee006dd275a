//! Column readers for text-encoded ids, times, enums and JSON records.

use std::error::Error;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;
use rusqlite::types::Type;
use schoolbase_core::UnknownVariant;
use schoolbase_core::time::{parse_date, parse_timestamp};
use serde::de::DeserializeOwned;
use uuid::Uuid;

type Cell<T> = rusqlite::Result<T>;

fn conversion<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse<T, E>(row: &Row<'_>, idx: usize, f: impl FnOnce(&str) -> Result<T, E>) -> Cell<T>
where
    E: Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    f(&raw).map_err(|e| conversion(idx, e))
}

fn parse_opt<T, E>(
    row: &Row<'_>,
    idx: usize,
    f: impl FnOnce(&str) -> Result<T, E>,
) -> Cell<Option<T>>
where
    E: Error + Send + Sync + 'static,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|r| f(&r).map_err(|e| conversion(idx, e))).transpose()
}

pub(crate) fn uuid(row: &Row<'_>, idx: usize) -> Cell<Uuid> {
    parse(row, idx, Uuid::parse_str)
}

pub(crate) fn opt_uuid(row: &Row<'_>, idx: usize) -> Cell<Option<Uuid>> {
    parse_opt(row, idx, Uuid::parse_str)
}

pub(crate) fn stamp(row: &Row<'_>, idx: usize) -> Cell<DateTime<Utc>> {
    parse(row, idx, parse_timestamp)
}

pub(crate) fn opt_stamp(row: &Row<'_>, idx: usize) -> Cell<Option<DateTime<Utc>>> {
    parse_opt(row, idx, parse_timestamp)
}

pub(crate) fn date(row: &Row<'_>, idx: usize) -> Cell<NaiveDate> {
    parse(row, idx, parse_date)
}

pub(crate) fn opt_date(row: &Row<'_>, idx: usize) -> Cell<Option<NaiveDate>> {
    parse_opt(row, idx, parse_date)
}

pub(crate) fn variant<T>(row: &Row<'_>, idx: usize) -> Cell<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    parse(row, idx, |s| s.parse::<T>())
}

pub(crate) fn opt_variant<T>(row: &Row<'_>, idx: usize) -> Cell<Option<T>>
where
    T: FromStr<Err = UnknownVariant>,
{
    parse_opt(row, idx, |s| s.parse::<T>())
}

pub(crate) fn json<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> Cell<T> {
    parse(row, idx, |s| serde_json::from_str(s))
}

pub(crate) fn opt_json<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> Cell<Option<T>> {
    parse_opt(row, idx, |s| serde_json::from_str(s))
}

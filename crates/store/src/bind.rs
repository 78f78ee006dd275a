//! Runs sea-query output on a rusqlite connection.

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, Row, params_from_iter};
use schoolbase_schema::db::Built;
use sea_query::Value;

use crate::error::{Result, StoreError};

#[allow(unreachable_patterns)]
fn sql_value(value: Value) -> Result<SqlValue> {
    let converted = match value {
        Value::Bool(v) => v.map(|b| SqlValue::Integer(i64::from(b))),
        Value::TinyInt(v) => v.map(|n| SqlValue::Integer(n.into())),
        Value::SmallInt(v) => v.map(|n| SqlValue::Integer(n.into())),
        Value::Int(v) => v.map(|n| SqlValue::Integer(n.into())),
        Value::BigInt(v) => v.map(SqlValue::Integer),
        Value::TinyUnsigned(v) => v.map(|n| SqlValue::Integer(n.into())),
        Value::SmallUnsigned(v) => v.map(|n| SqlValue::Integer(n.into())),
        Value::Unsigned(v) => v.map(|n| SqlValue::Integer(n.into())),
        Value::BigUnsigned(v) => match v {
            Some(n) => Some(SqlValue::Integer(i64::try_from(n).map_err(|_| {
                StoreError::Bind(format!("{n} does not fit in an SQLite integer"))
            })?)),
            None => None,
        },
        Value::Float(v) => v.map(|f| SqlValue::Real(f.into())),
        Value::Double(v) => v.map(SqlValue::Real),
        Value::String(v) => v.map(|s| SqlValue::Text(*s)),
        Value::Char(v) => v.map(|c| SqlValue::Text(c.to_string())),
        Value::Bytes(v) => v.map(|b| SqlValue::Blob(*b)),
        other => return Err(StoreError::Bind(format!("unsupported value {other:?}"))),
    };
    Ok(converted.unwrap_or(SqlValue::Null))
}

fn sql_values(values: sea_query::Values) -> Result<Vec<SqlValue>> {
    values.0.into_iter().map(sql_value).collect()
}

pub(crate) fn execute(conn: &Connection, (sql, values): Built) -> Result<usize> {
    let params = sql_values(values)?;
    Ok(conn.execute(&sql, params_from_iter(params))?)
}

pub(crate) fn fetch_optional<T>(
    conn: &Connection,
    (sql, values): Built,
    decode: impl FnOnce(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Option<T>> {
    let params = sql_values(values)?;
    Ok(conn
        .query_row(&sql, params_from_iter(params), decode)
        .optional()?)
}

pub(crate) fn fetch_all<T>(
    conn: &Connection,
    (sql, values): Built,
    decode: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let params = sql_values(values)?;
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params), decode)?;
    let out = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(out)
}

pub(crate) fn fetch_count(conn: &Connection, built: Built) -> Result<i64> {
    Ok(fetch_optional(conn, built, |row| row.get(0))?.unwrap_or(0))
}

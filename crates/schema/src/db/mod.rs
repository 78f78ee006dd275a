//! SQL builders over the typed table identifiers.
//!
//! Every builder returns the rendered SQLite statement and its bind values.

pub mod academics;
pub mod complaints;
pub mod events;
pub mod fees;
pub mod leads;
pub mod people;
pub mod tables;
pub mod tenancy;
pub mod users;

use chrono::{DateTime, NaiveDate, Utc};
use schoolbase_core::time::{format_date, format_timestamp};
use sea_query::SimpleExpr;
use uuid::Uuid;

pub type Built = (String, sea_query::Values);

pub(crate) fn uuid(id: Uuid) -> SimpleExpr {
    id.to_string().into()
}

pub(crate) fn opt_uuid(id: Option<Uuid>) -> SimpleExpr {
    id.map(|u| u.to_string()).into()
}

pub(crate) fn date(value: NaiveDate) -> SimpleExpr {
    format_date(value).into()
}

pub(crate) fn opt_date(value: Option<NaiveDate>) -> SimpleExpr {
    value.map(format_date).into()
}

pub(crate) fn stamp(value: &DateTime<Utc>) -> SimpleExpr {
    format_timestamp(value).into()
}

pub(crate) fn opt_stamp(value: Option<&DateTime<Utc>>) -> SimpleExpr {
    value.map(format_timestamp).into()
}

pub(crate) fn opt_text(value: Option<&str>) -> SimpleExpr {
    value.map(str::to_string).into()
}

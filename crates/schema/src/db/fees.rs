//! Fee definitions and per-student fee ledgers.

use chrono::{DateTime, NaiveDate, Utc};
use schoolbase_core::{FeeStatus, NewFee, PaymentMethod};
use sea_query::{Expr, Order, Query, SelectStatement, SqliteQueryBuilder};
use uuid::Uuid;

use super::tables::{FEE_COLUMNS, Fees, STUDENT_FEE_COLUMNS, StudentFees};
use super::{Built, date, opt_stamp, opt_text, opt_uuid, uuid};

pub fn insert_fee(id: Uuid, fee: &NewFee) -> Built {
    Query::insert()
        .into_table(Fees::Table)
        .columns([
            Fees::Id,
            Fees::SchoolId,
            Fees::ClassId,
            Fees::Name,
            Fees::FeeType,
            Fees::Amount,
            Fees::DueDate,
            Fees::AcademicYear,
            Fees::Description,
        ])
        .values_panic([
            uuid(id),
            uuid(fee.school_id),
            opt_uuid(fee.class_id),
            fee.name.as_str().into(),
            fee.fee_type.as_str().into(),
            fee.amount.into(),
            date(fee.due_date),
            opt_text(fee.academic_year.as_deref()),
            opt_text(fee.description.as_deref()),
        ])
        .build(SqliteQueryBuilder)
}

fn select_fees() -> SelectStatement {
    Query::select()
        .columns(FEE_COLUMNS)
        .from(Fees::Table)
        .to_owned()
}

pub fn get_fee(id: Uuid) -> Built {
    select_fees()
        .and_where(Expr::col(Fees::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn fees_for_school(school_id: Uuid) -> Built {
    select_fees()
        .and_where(Expr::col(Fees::SchoolId).eq(school_id.to_string()))
        .order_by(Fees::DueDate, Order::Asc)
        .build(SqliteQueryBuilder)
}

/// Fields of a new student fee row. `status` must already be derived.
pub struct StudentFeeRow<'a> {
    pub id: Uuid,
    pub fee_id: Uuid,
    pub student_id: Uuid,
    pub amount: i64,
    pub status: FeeStatus,
    pub due_date: NaiveDate,
    pub scholarship_json: Option<&'a str>,
}

pub fn insert_student_fee(row: &StudentFeeRow<'_>) -> Built {
    Query::insert()
        .into_table(StudentFees::Table)
        .columns([
            StudentFees::Id,
            StudentFees::FeeId,
            StudentFees::StudentId,
            StudentFees::Amount,
            StudentFees::PaidAmount,
            StudentFees::Status,
            StudentFees::DueDate,
            StudentFees::ScholarshipDetails,
        ])
        .values_panic([
            uuid(row.id),
            uuid(row.fee_id),
            uuid(row.student_id),
            row.amount.into(),
            0i64.into(),
            row.status.as_str().into(),
            date(row.due_date),
            opt_text(row.scholarship_json),
        ])
        .build(SqliteQueryBuilder)
}

fn select_student_fees() -> SelectStatement {
    Query::select()
        .columns(STUDENT_FEE_COLUMNS)
        .from(StudentFees::Table)
        .to_owned()
}

pub fn get_student_fee(id: Uuid) -> Built {
    select_student_fees()
        .and_where(Expr::col(StudentFees::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn student_fees_for_student(student_id: Uuid) -> Built {
    select_student_fees()
        .and_where(Expr::col(StudentFees::StudentId).eq(student_id.to_string()))
        .order_by(StudentFees::DueDate, Order::Asc)
        .build(SqliteQueryBuilder)
}

pub fn student_fees_for_fee(fee_id: Uuid) -> Built {
    select_student_fees()
        .and_where(Expr::col(StudentFees::FeeId).eq(fee_id.to_string()))
        .order_by(StudentFees::CreatedAt, Order::Asc)
        .build(SqliteQueryBuilder)
}

/// Payment write. `paid_at` is only overwritten when the fee just became paid.
///
/// `payment_method` and `transaction_ref` hold the latest payment only; each
/// call replaces what an earlier partial payment stored.
pub fn record_payment(
    id: Uuid,
    paid_amount: i64,
    status: FeeStatus,
    paid_at: Option<&DateTime<Utc>>,
    method: PaymentMethod,
    transaction_ref: Option<&str>,
) -> Built {
    let mut q = Query::update();
    q.table(StudentFees::Table)
        .value(StudentFees::PaidAmount, paid_amount)
        .value(StudentFees::Status, status.as_str())
        .value(StudentFees::PaymentMethod, method.as_str())
        .value(StudentFees::TransactionRef, opt_text(transaction_ref))
        .value(StudentFees::UpdatedAt, Expr::current_timestamp())
        .and_where(Expr::col(StudentFees::Id).eq(id.to_string()));
    if paid_at.is_some() {
        q.value(StudentFees::PaidAt, opt_stamp(paid_at));
    }
    q.build(SqliteQueryBuilder)
}

/// Move unpaid fees whose due date has passed to `overdue`.
pub fn mark_overdue(today: NaiveDate) -> Built {
    Query::update()
        .table(StudentFees::Table)
        .value(StudentFees::Status, FeeStatus::Overdue.as_str())
        .value(StudentFees::UpdatedAt, Expr::current_timestamp())
        .and_where(
            Expr::col(StudentFees::Status)
                .is_in([FeeStatus::Pending.as_str(), FeeStatus::Partial.as_str()]),
        )
        .and_where(Expr::col(StudentFees::DueDate).lt(date(today)))
        .and_where(Expr::col(StudentFees::PaidAmount).lt(Expr::col(StudentFees::Amount)))
        .build(SqliteQueryBuilder)
}

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;
use schoolbase_core::validate::{ValidationError, validate_new_fee, validate_scholarship};
use schoolbase_core::{
    Fee, NewFee, PaymentMethod, ScholarshipDetails, StudentFee, apply_payment, derive_fee_status,
};
use schoolbase_schema::db::fees::{self as sql, StudentFeeRow};
use schoolbase_schema::db::people as people_sql;
use tracing::info;
use uuid::Uuid;

use crate::bind::{execute, fetch_all, fetch_optional};
use crate::db::Db;
use crate::decode;
use crate::error::{Result, StoreError};
use crate::repo::SameSchool;

/// One student to bill, with an optional scholarship reducing the amount.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeAssignment {
    pub student_id: Uuid,
    pub scholarship: Option<ScholarshipDetails>,
}

impl FeeAssignment {
    pub fn new(student_id: Uuid) -> Self {
        Self {
            student_id,
            scholarship: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    /// Minor currency units, must be positive.
    pub amount: i64,
    pub method: PaymentMethod,
    pub transaction_ref: Option<String>,
}

impl Db {
    pub fn insert_fee(&self, fee: &NewFee) -> Result<Fee> {
        validate_new_fee(fee)?;
        let id = Uuid::new_v4();
        self.write(|tx| {
            let mut scope = SameSchool::new(tx, fee.school_id);
            if let Some(class_id) = fee.class_id {
                scope.class("class_id", class_id)?;
            }
            scope.finish()?;
            execute(tx, sql::insert_fee(id, fee))?;
            fetch_optional(tx, sql::get_fee(id), row_to_fee)?
                .ok_or_else(|| StoreError::not_found("fee", id))
        })
    }

    pub fn get_fee(&self, id: Uuid) -> Result<Option<Fee>> {
        fetch_optional(&self.conn(), sql::get_fee(id), row_to_fee)
    }

    pub fn fees_for_school(&self, school_id: Uuid) -> Result<Vec<Fee>> {
        fetch_all(&self.conn(), sql::fees_for_school(school_id), row_to_fee)
    }

    /// Bill a fee to the given students in one transaction. Each row's amount
    /// is the fee amount after the student's scholarship, and its status is
    /// derived as of `today`. Every student must belong to the fee's school.
    pub fn assign_fee(
        &self,
        fee_id: Uuid,
        assignments: &[FeeAssignment],
        today: NaiveDate,
    ) -> Result<Vec<StudentFee>> {
        for scholarship in assignments.iter().filter_map(|a| a.scholarship.as_ref()) {
            validate_scholarship(scholarship)?;
        }
        self.write(|tx| {
            let fee = fetch_optional(tx, sql::get_fee(fee_id), row_to_fee)?
                .ok_or_else(|| StoreError::not_found("fee", fee_id))?;
            let mut scope = SameSchool::new(tx, fee.school_id);
            for assignment in assignments {
                scope.student("student_id", assignment.student_id)?;
            }
            scope.finish()?;
            let mut created = Vec::with_capacity(assignments.len());
            for assignment in assignments {
                let id = Uuid::new_v4();
                let amount = match &assignment.scholarship {
                    Some(scholarship) => scholarship.apply(fee.amount),
                    None => fee.amount,
                };
                let scholarship_json = assignment
                    .scholarship
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?;
                let row = StudentFeeRow {
                    id,
                    fee_id,
                    student_id: assignment.student_id,
                    amount,
                    status: derive_fee_status(amount, 0, fee.due_date, today),
                    due_date: fee.due_date,
                    scholarship_json: scholarship_json.as_deref(),
                };
                execute(tx, sql::insert_student_fee(&row))?;
                let stored = fetch_optional(tx, sql::get_student_fee(id), row_to_student_fee)?
                    .ok_or_else(|| StoreError::not_found("student_fee", id))?;
                created.push(stored);
            }
            info!(%fee_id, students = created.len(), "assigned fee");
            Ok(created)
        })
    }

    /// Bill a class fee to every active student of its class. `scholarships`
    /// supplies per-student awards. All rows commit together or none do.
    pub fn assign_fee_to_class(
        &self,
        fee_id: Uuid,
        scholarships: &[FeeAssignment],
        today: NaiveDate,
    ) -> Result<Vec<StudentFee>> {
        let fee = self
            .get_fee(fee_id)?
            .ok_or_else(|| StoreError::not_found("fee", fee_id))?;
        let Some(class_id) = fee.class_id else {
            return Err(StoreError::Validation(vec![ValidationError::MissingField {
                field: "class_id".to_string(),
            }]));
        };
        let students = fetch_all(
            &self.conn(),
            people_sql::students_in_class(class_id, true),
            |row| decode::uuid(row, 0),
        )?;
        let assignments: Vec<_> = students
            .into_iter()
            .map(|student_id| {
                scholarships
                    .iter()
                    .find(|a| a.student_id == student_id)
                    .cloned()
                    .unwrap_or_else(|| FeeAssignment::new(student_id))
            })
            .collect();
        self.assign_fee(fee_id, &assignments, today)
    }

    pub fn get_student_fee(&self, id: Uuid) -> Result<Option<StudentFee>> {
        fetch_optional(&self.conn(), sql::get_student_fee(id), row_to_student_fee)
    }

    pub fn student_fees_for_student(&self, student_id: Uuid) -> Result<Vec<StudentFee>> {
        fetch_all(
            &self.conn(),
            sql::student_fees_for_student(student_id),
            row_to_student_fee,
        )
    }

    pub fn student_fees_for_fee(&self, fee_id: Uuid) -> Result<Vec<StudentFee>> {
        fetch_all(&self.conn(), sql::student_fees_for_fee(fee_id), row_to_student_fee)
    }

    /// Apply one payment and re-derive the status. `paid_at` is stamped with
    /// `now` when the fee becomes fully paid. The stored method and reference
    /// are those of this payment; earlier ones are not kept.
    pub fn record_payment(
        &self,
        student_fee_id: Uuid,
        payment: &Payment,
        now: DateTime<Utc>,
    ) -> Result<StudentFee> {
        self.write(|tx| {
            let current = fetch_optional(tx, sql::get_student_fee(student_fee_id), row_to_student_fee)?
                .ok_or_else(|| StoreError::not_found("student_fee", student_fee_id))?;
            let outcome = apply_payment(&current, payment.amount, now.date_naive())?;
            let paid_at = outcome.fully_paid.then_some(&now);
            execute(
                tx,
                sql::record_payment(
                    student_fee_id,
                    outcome.paid_amount,
                    outcome.status,
                    paid_at,
                    payment.method,
                    payment.transaction_ref.as_deref(),
                ),
            )?;
            fetch_optional(tx, sql::get_student_fee(student_fee_id), row_to_student_fee)?
                .ok_or_else(|| StoreError::not_found("student_fee", student_fee_id))
        })
    }

    /// Flip unpaid fees past their due date to `overdue`. Returns rows changed.
    pub fn refresh_overdue_fees(&self, today: NaiveDate) -> Result<usize> {
        let changed = execute(&self.conn(), sql::mark_overdue(today))?;
        if changed > 0 {
            info!(changed, %today, "marked fees overdue");
        }
        Ok(changed)
    }
}

fn row_to_fee(row: &Row<'_>) -> rusqlite::Result<Fee> {
    Ok(Fee {
        id: decode::uuid(row, 0)?,
        school_id: decode::uuid(row, 1)?,
        class_id: decode::opt_uuid(row, 2)?,
        name: row.get(3)?,
        fee_type: decode::variant(row, 4)?,
        amount: row.get(5)?,
        due_date: decode::date(row, 6)?,
        academic_year: row.get(7)?,
        description: row.get(8)?,
        is_active: row.get(9)?,
        created_at: decode::stamp(row, 10)?,
        updated_at: decode::stamp(row, 11)?,
    })
}

fn row_to_student_fee(row: &Row<'_>) -> rusqlite::Result<StudentFee> {
    Ok(StudentFee {
        id: decode::uuid(row, 0)?,
        fee_id: decode::uuid(row, 1)?,
        student_id: decode::uuid(row, 2)?,
        amount: row.get(3)?,
        paid_amount: row.get(4)?,
        status: decode::variant(row, 5)?,
        due_date: decode::date(row, 6)?,
        paid_at: decode::opt_stamp(row, 7)?,
        payment_method: decode::opt_variant(row, 8)?,
        transaction_ref: row.get(9)?,
        remarks: row.get(10)?,
        scholarship: decode::opt_json(row, 11)?,
        created_at: decode::stamp(row, 12)?,
        updated_at: decode::stamp(row, 13)?,
    })
}

//! Fee definitions, per-student fee ledgers, and the status derivation rule.
//!
//! Amounts are integer minor currency units, capped at [`MAX_AMOUNT`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::enums::{FeeStatus, FeeType, PaymentMethod};

/// Largest fee, price or award accepted, in minor units.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    pub id: Uuid,
    pub school_id: Uuid,
    pub class_id: Option<Uuid>,
    pub name: String,
    pub fee_type: FeeType,
    pub amount: i64,
    pub due_date: NaiveDate,
    pub academic_year: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFee {
    pub school_id: Uuid,
    pub class_id: Option<Uuid>,
    pub name: String,
    pub fee_type: FeeType,
    pub amount: i64,
    pub due_date: NaiveDate,
    pub academic_year: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentFee {
    pub id: Uuid,
    pub fee_id: Uuid,
    pub student_id: Uuid,
    /// Amount owed after any scholarship.
    pub amount: i64,
    pub paid_amount: i64,
    pub status: FeeStatus,
    pub due_date: NaiveDate,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_method: Option<PaymentMethod>,
    pub transaction_ref: Option<String>,
    pub remarks: Option<String>,
    pub scholarship: Option<ScholarshipDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentFee {
    pub fn balance(&self) -> i64 {
        (self.amount - self.paid_amount).max(0)
    }
}

/// Scholarship attached to a student fee, stored as a JSON column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScholarshipDetails {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awarded_on: Option<NaiveDate>,
    pub award: ScholarshipAward,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScholarshipAward {
    Percentage { percent: u8 },
    FixedAmount { amount: i64 },
}

impl ScholarshipDetails {
    /// Net amount owed on `gross` after this award. Never negative.
    pub fn apply(&self, gross: i64) -> i64 {
        let discount = match self.award {
            ScholarshipAward::Percentage { percent } => {
                let percent = i64::from(percent.min(100));
                gross / 100 * percent + gross % 100 * percent / 100
            }
            ScholarshipAward::FixedAmount { amount } => amount,
        };
        gross.saturating_sub(discount).max(0)
    }
}

/// Derive a student fee's status from what has been paid and when it is due.
///
/// `paid` wins over everything, a passed due date wins over partial payment.
pub fn derive_fee_status(
    amount: i64,
    paid_amount: i64,
    due_date: NaiveDate,
    today: NaiveDate,
) -> FeeStatus {
    if paid_amount >= amount {
        FeeStatus::Paid
    } else if due_date < today {
        FeeStatus::Overdue
    } else if paid_amount > 0 {
        FeeStatus::Partial
    } else {
        FeeStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("payment amount must be positive, got {0}")]
    NonPositive(i64),
    #[error("fee is already paid in full")]
    AlreadyPaid,
    #[error("payment of {payment} overflows the {paid} already paid")]
    Overflow { paid: i64, payment: i64 },
}

/// Result of applying one payment to a student fee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub paid_amount: i64,
    pub status: FeeStatus,
    pub fully_paid: bool,
}

pub fn apply_payment(
    fee: &StudentFee,
    payment: i64,
    today: NaiveDate,
) -> Result<PaymentOutcome, PaymentError> {
    if payment <= 0 {
        return Err(PaymentError::NonPositive(payment));
    }
    if fee.status == FeeStatus::Paid {
        return Err(PaymentError::AlreadyPaid);
    }
    let paid_amount = fee
        .paid_amount
        .checked_add(payment)
        .ok_or(PaymentError::Overflow {
            paid: fee.paid_amount,
            payment,
        })?;
    let status = derive_fee_status(fee.amount, paid_amount, fee.due_date, today);
    Ok(PaymentOutcome {
        paid_amount,
        status,
        fully_paid: status == FeeStatus::Paid,
    })
}

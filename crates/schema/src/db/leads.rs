//! Sales inquiries and website contact messages. Integer keys, no tenant.

use chrono::{DateTime, Utc};
use schoolbase_core::{InquiryStatus, NewContactMessage, NewInquiry};
use sea_query::{Expr, Order, Query, SelectStatement, SqliteQueryBuilder};

use super::tables::{CONTACT_MESSAGE_COLUMNS, ContactMessages, INQUIRY_COLUMNS, Inquiries};
use super::{Built, opt_stamp, opt_text};

pub fn insert_inquiry(inquiry: &NewInquiry) -> Built {
    Query::insert()
        .into_table(Inquiries::Table)
        .columns([
            Inquiries::SchoolName,
            Inquiries::ContactName,
            Inquiries::Email,
            Inquiries::Phone,
            Inquiries::City,
            Inquiries::StudentCount,
            Inquiries::Message,
        ])
        .values_panic([
            inquiry.school_name.as_str().into(),
            inquiry.contact_name.as_str().into(),
            inquiry.email.as_str().into(),
            opt_text(inquiry.phone.as_deref()),
            opt_text(inquiry.city.as_deref()),
            inquiry.student_count.into(),
            opt_text(inquiry.message.as_deref()),
        ])
        .build(SqliteQueryBuilder)
}

fn select_inquiries() -> SelectStatement {
    Query::select()
        .columns(INQUIRY_COLUMNS)
        .from(Inquiries::Table)
        .to_owned()
}

pub fn get_inquiry(id: i64) -> Built {
    select_inquiries()
        .and_where(Expr::col(Inquiries::Id).eq(id))
        .build(SqliteQueryBuilder)
}

pub fn list_inquiries(status: Option<InquiryStatus>) -> Built {
    let mut q = select_inquiries();
    if let Some(status) = status {
        q.and_where(Expr::col(Inquiries::Status).eq(status.as_str()));
    }
    q.order_by(Inquiries::CreatedAt, Order::Desc)
        .order_by(Inquiries::Id, Order::Desc)
        .build(SqliteQueryBuilder)
}

/// Status write guarded on the current status. Notes and demo time are only
/// written when given.
pub fn update_inquiry_status(
    id: i64,
    from: InquiryStatus,
    to: InquiryStatus,
    demo_scheduled_at: Option<&DateTime<Utc>>,
    notes: Option<&str>,
) -> Built {
    let mut q = Query::update();
    q.table(Inquiries::Table)
        .value(Inquiries::Status, to.as_str())
        .value(Inquiries::UpdatedAt, Expr::current_timestamp())
        .and_where(Expr::col(Inquiries::Id).eq(id))
        .and_where(Expr::col(Inquiries::Status).eq(from.as_str()));
    if demo_scheduled_at.is_some() {
        q.value(Inquiries::DemoScheduledAt, opt_stamp(demo_scheduled_at));
    }
    if notes.is_some() {
        q.value(Inquiries::Notes, opt_text(notes));
    }
    q.build(SqliteQueryBuilder)
}

pub fn insert_contact_message(message: &NewContactMessage) -> Built {
    Query::insert()
        .into_table(ContactMessages::Table)
        .columns([
            ContactMessages::Name,
            ContactMessages::Email,
            ContactMessages::Phone,
            ContactMessages::Subject,
            ContactMessages::Message,
        ])
        .values_panic([
            message.name.as_str().into(),
            message.email.as_str().into(),
            opt_text(message.phone.as_deref()),
            opt_text(message.subject.as_deref()),
            message.message.as_str().into(),
        ])
        .build(SqliteQueryBuilder)
}

pub fn get_contact_message(id: i64) -> Built {
    Query::select()
        .columns(CONTACT_MESSAGE_COLUMNS)
        .from(ContactMessages::Table)
        .and_where(Expr::col(ContactMessages::Id).eq(id))
        .build(SqliteQueryBuilder)
}

pub fn list_contact_messages(limit: u64) -> Built {
    Query::select()
        .columns(CONTACT_MESSAGE_COLUMNS)
        .from(ContactMessages::Table)
        .order_by(ContactMessages::Id, Order::Desc)
        .limit(limit)
        .build(SqliteQueryBuilder)
}

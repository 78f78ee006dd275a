use chrono::{DateTime, Utc};
use rusqlite::Row;
use schoolbase_core::validate::{
    ValidationError, validate_new_contact_message, validate_new_inquiry,
};
use schoolbase_core::{ContactMessage, Inquiry, InquiryStatus, NewContactMessage, NewInquiry};
use schoolbase_schema::db::leads as sql;
use tracing::info;

use crate::bind::{execute, fetch_all, fetch_optional};
use crate::db::Db;
use crate::decode;
use crate::error::{Result, StoreError};
use crate::repo::touched;

impl Db {
    pub fn insert_inquiry(&self, inquiry: &NewInquiry) -> Result<Inquiry> {
        validate_new_inquiry(inquiry)?;
        let conn = self.conn();
        execute(&conn, sql::insert_inquiry(inquiry))?;
        let id = conn.last_insert_rowid();
        fetch_optional(&conn, sql::get_inquiry(id), row_to_inquiry)?
            .ok_or_else(|| StoreError::not_found("inquiry", id))
    }

    pub fn get_inquiry(&self, id: i64) -> Result<Option<Inquiry>> {
        fetch_optional(&self.conn(), sql::get_inquiry(id), row_to_inquiry)
    }

    /// Newest first.
    pub fn list_inquiries(&self, status: Option<InquiryStatus>) -> Result<Vec<Inquiry>> {
        fetch_all(&self.conn(), sql::list_inquiries(status), row_to_inquiry)
    }

    /// Move an inquiry along the sales pipeline. Planning a demo needs the
    /// demo time; `notes` replaces the stored notes when given.
    pub fn advance_inquiry(
        &self,
        id: i64,
        to: InquiryStatus,
        demo_scheduled_at: Option<DateTime<Utc>>,
        notes: Option<&str>,
    ) -> Result<Inquiry> {
        if to == InquiryStatus::DemoPlanned && demo_scheduled_at.is_none() {
            return Err(StoreError::Validation(vec![ValidationError::MissingField {
                field: "demo_scheduled_at".to_string(),
            }]));
        }
        self.write(|tx| {
            let current = fetch_optional(tx, sql::get_inquiry(id), row_to_inquiry)?
                .ok_or_else(|| StoreError::not_found("inquiry", id))?;
            current.status.check_transition(to)?;
            let rows = execute(
                tx,
                sql::update_inquiry_status(id, current.status, to, demo_scheduled_at.as_ref(), notes),
            )?;
            touched(rows, "inquiry", id)?;
            info!(inquiry = id, from = %current.status, %to, "inquiry advanced");
            fetch_optional(tx, sql::get_inquiry(id), row_to_inquiry)?
                .ok_or_else(|| StoreError::not_found("inquiry", id))
        })
    }

    pub fn insert_contact_message(&self, message: &NewContactMessage) -> Result<ContactMessage> {
        validate_new_contact_message(message)?;
        let conn = self.conn();
        execute(&conn, sql::insert_contact_message(message))?;
        let id = conn.last_insert_rowid();
        fetch_optional(&conn, sql::get_contact_message(id), row_to_contact_message)?
            .ok_or_else(|| StoreError::not_found("contact_message", id))
    }

    /// The most recent `limit` messages, newest first.
    pub fn list_contact_messages(&self, limit: u64) -> Result<Vec<ContactMessage>> {
        fetch_all(
            &self.conn(),
            sql::list_contact_messages(limit),
            row_to_contact_message,
        )
    }
}

fn row_to_inquiry(row: &Row<'_>) -> rusqlite::Result<Inquiry> {
    Ok(Inquiry {
        id: row.get(0)?,
        school_name: row.get(1)?,
        contact_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        city: row.get(5)?,
        student_count: row.get(6)?,
        message: row.get(7)?,
        status: decode::variant(row, 8)?,
        notes: row.get(9)?,
        demo_scheduled_at: decode::opt_stamp(row, 10)?,
        created_at: decode::stamp(row, 11)?,
        updated_at: decode::stamp(row, 12)?,
    })
}

fn row_to_contact_message(row: &Row<'_>) -> rusqlite::Result<ContactMessage> {
    Ok(ContactMessage {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        subject: row.get(4)?,
        message: row.get(5)?,
        created_at: decode::stamp(row, 6)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use schoolbase_core::TransitionError;

    use super::*;
    use crate::repo::test_db;
    use InquiryStatus::*;

    fn inquiry(school: &str) -> NewInquiry {
        NewInquiry {
            school_name: school.to_string(),
            contact_name: "Principal".into(),
            email: "principal@school.example.com".into(),
            student_count: Some(450),
            ..Default::default()
        }
    }

    #[test]
    fn test_ids_are_sequential_and_status_starts_pending() {
        let db = test_db();
        let first = db.insert_inquiry(&inquiry("Green Valley")).unwrap();
        let second = db.insert_inquiry(&inquiry("Hill Top")).unwrap();
        assert_eq!(second.id, first.id + 1);
        assert_eq!(first.status, Pending);
        assert_eq!(db.list_inquiries(Some(Pending)).unwrap().len(), 2);
    }

    #[test]
    fn test_pipeline() {
        let db = test_db();
        let lead = db.insert_inquiry(&inquiry("Green Valley")).unwrap();
        let demo_at = Utc.with_ymd_and_hms(2024, 8, 5, 11, 0, 0).unwrap();

        let err = db.advance_inquiry(lead.id, DemoPlanned, None, None).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let planned = db
            .advance_inquiry(lead.id, DemoPlanned, Some(demo_at), Some("Prefers mornings"))
            .unwrap();
        assert_eq!(planned.demo_scheduled_at, Some(demo_at));
        assert_eq!(planned.notes.as_deref(), Some("Prefers mornings"));

        let err = db.advance_inquiry(lead.id, Onboarded, None, None).unwrap_err();
        assert!(matches!(err, StoreError::Transition(TransitionError::NotAllowed { .. })));

        db.advance_inquiry(lead.id, DemoDone, None, None).unwrap();
        let done = db.advance_inquiry(lead.id, Onboarded, None, None).unwrap();
        assert_eq!(done.status, Onboarded);
        assert_eq!(done.notes.as_deref(), Some("Prefers mornings"));
        assert!(db.advance_inquiry(lead.id, Denied, None, None).is_err());
    }

    #[test]
    fn test_unknown_inquiry_is_not_found() {
        let db = test_db();
        let err = db.advance_inquiry(99, Denied, None, None).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "inquiry", .. }));
    }

    #[test]
    fn test_contact_messages_newest_first() {
        let db = test_db();
        for subject in ["Admissions", "Fees"] {
            db.insert_contact_message(&NewContactMessage {
                name: "Visitor".into(),
                email: "visitor@example.com".into(),
                subject: Some(subject.into()),
                message: "Please call back.".into(),
                ..Default::default()
            })
            .unwrap();
        }
        let latest = db.list_contact_messages(1).unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].subject.as_deref(), Some("Fees"));
    }
}

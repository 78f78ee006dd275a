use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row};
use schoolbase_core::validate::{ValidationError, validate_new_complaint};
use schoolbase_core::{Complaint, ComplaintStatus, ComplaintUpdate, NewComplaint, plan_transition};
use schoolbase_schema::db::complaints as sql;
use tracing::info;
use uuid::Uuid;

use crate::bind::{execute, fetch_all, fetch_optional};
use crate::db::Db;
use crate::decode;
use crate::error::{Result, StoreError};
use crate::repo::{SameSchool, touched};

/// A requested status change on a complaint.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplaintChange {
    pub to: ComplaintStatus,
    /// Required when `to` is `resolved`, rejected otherwise.
    pub resolution: Option<String>,
    pub updated_by: Option<Uuid>,
    pub comment: Option<String>,
}

impl ComplaintChange {
    pub fn to(status: ComplaintStatus) -> Self {
        Self {
            to: status,
            resolution: None,
            updated_by: None,
            comment: None,
        }
    }
}

impl Db {
    /// Open a complaint and write the first trail entry.
    pub fn insert_complaint(&self, complaint: &NewComplaint) -> Result<Complaint> {
        validate_new_complaint(complaint)?;
        let id = Uuid::new_v4();
        self.write(|tx| {
            let mut scope = SameSchool::new(tx, complaint.school_id);
            scope.user("raised_by", complaint.raised_by, &[])?;
            if let Some(student) = complaint.student_id {
                scope.student("student_id", student)?;
            }
            if let Some(assignee) = complaint.assigned_to {
                scope.user("assigned_to", assignee, &[])?;
            }
            scope.finish()?;
            execute(tx, sql::insert_complaint(id, complaint))?;
            execute(
                tx,
                sql::insert_update(
                    Uuid::new_v4(),
                    id,
                    Some(complaint.raised_by),
                    None,
                    Some(ComplaintStatus::Open),
                    None,
                ),
            )?;
            load(tx, id)
        })
    }

    pub fn get_complaint(&self, id: Uuid) -> Result<Option<Complaint>> {
        fetch_optional(&self.conn(), sql::get_complaint(id), row_to_complaint)
    }

    /// Newest first.
    pub fn complaints_for_school(
        &self,
        school_id: Uuid,
        status: Option<ComplaintStatus>,
    ) -> Result<Vec<Complaint>> {
        fetch_all(
            &self.conn(),
            sql::complaints_for_school(school_id, status),
            row_to_complaint,
        )
    }

    /// Move a complaint to a new status. The status write and its trail entry
    /// commit together.
    pub fn transition_complaint(&self, id: Uuid, change: &ComplaintChange) -> Result<Complaint> {
        self.transition_complaint_at(id, change, Utc::now())
    }

    pub fn transition_complaint_at(
        &self,
        id: Uuid,
        change: &ComplaintChange,
        now: DateTime<Utc>,
    ) -> Result<Complaint> {
        self.write(|tx| {
            let current = load(tx, id)?;
            let plan = plan_transition(current.status, change.to, change.resolution.as_deref(), now)?;
            // Guarded on the status read above.
            let rows = execute(tx, sql::apply_transition(id, &plan))?;
            touched(rows, "complaint", id)?;
            execute(
                tx,
                sql::insert_update(
                    Uuid::new_v4(),
                    id,
                    change.updated_by,
                    Some(plan.from),
                    Some(plan.to),
                    change.comment.as_deref(),
                ),
            )?;
            info!(complaint = %id, from = %plan.from, to = %plan.to, "complaint transitioned");
            load(tx, id)
        })
    }

    /// Append a note without changing the status.
    pub fn add_complaint_comment(
        &self,
        id: Uuid,
        updated_by: Option<Uuid>,
        comment: &str,
    ) -> Result<ComplaintUpdate> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(StoreError::Validation(vec![ValidationError::MissingField {
                field: "comment".to_string(),
            }]));
        }
        self.write(|tx| {
            load(tx, id)?;
            let update_id = Uuid::new_v4();
            execute(
                tx,
                sql::insert_update(update_id, id, updated_by, None, None, Some(comment)),
            )?;
            let history = fetch_all(tx, sql::complaint_history(id), row_to_update)?;
            history
                .into_iter()
                .find(|u| u.id == update_id)
                .ok_or_else(|| StoreError::not_found("complaint_update", update_id))
        })
    }

    pub fn assign_complaint(&self, id: Uuid, assignee: Option<Uuid>) -> Result<()> {
        self.write(|tx| {
            let complaint = load(tx, id)?;
            if let Some(assignee) = assignee {
                SameSchool::new(tx, complaint.school_id)
                    .user("assigned_to", assignee, &[])?
                    .finish()?;
            }
            let rows = execute(tx, sql::assign_complaint(id, assignee))?;
            touched(rows, "complaint", id)
        })
    }

    /// Trail entries oldest first.
    pub fn complaint_history(&self, id: Uuid) -> Result<Vec<ComplaintUpdate>> {
        fetch_all(&self.conn(), sql::complaint_history(id), row_to_update)
    }
}

fn load(conn: &Connection, id: Uuid) -> Result<Complaint> {
    fetch_optional(conn, sql::get_complaint(id), row_to_complaint)?
        .ok_or_else(|| StoreError::not_found("complaint", id))
}

fn row_to_complaint(row: &Row<'_>) -> rusqlite::Result<Complaint> {
    Ok(Complaint {
        id: decode::uuid(row, 0)?,
        school_id: decode::uuid(row, 1)?,
        raised_by: decode::uuid(row, 2)?,
        student_id: decode::opt_uuid(row, 3)?,
        assigned_to: decode::opt_uuid(row, 4)?,
        title: row.get(5)?,
        description: row.get(6)?,
        category: decode::variant(row, 7)?,
        priority: decode::variant(row, 8)?,
        status: decode::variant(row, 9)?,
        resolution: row.get(10)?,
        resolved_at: decode::opt_stamp(row, 11)?,
        created_at: decode::stamp(row, 12)?,
        updated_at: decode::stamp(row, 13)?,
    })
}

fn row_to_update(row: &Row<'_>) -> rusqlite::Result<ComplaintUpdate> {
    Ok(ComplaintUpdate {
        id: decode::uuid(row, 0)?,
        complaint_id: decode::uuid(row, 1)?,
        updated_by: decode::opt_uuid(row, 2)?,
        from_status: decode::opt_variant(row, 3)?,
        to_status: decode::opt_variant(row, 4)?,
        comment: row.get(5)?,
        created_at: decode::stamp(row, 6)?,
    })
}

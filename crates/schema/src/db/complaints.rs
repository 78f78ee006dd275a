//! Complaints and the append-only update trail.

use schoolbase_core::{ComplaintStatus, ComplaintTransition, NewComplaint};
use sea_query::{Expr, Order, Query, SelectStatement, SqliteQueryBuilder};
use uuid::Uuid;

use super::tables::{COMPLAINT_COLUMNS, COMPLAINT_UPDATE_COLUMNS, ComplaintUpdates, Complaints};
use super::{Built, opt_stamp, opt_text, opt_uuid, uuid};

pub fn insert_complaint(id: Uuid, complaint: &NewComplaint) -> Built {
    Query::insert()
        .into_table(Complaints::Table)
        .columns([
            Complaints::Id,
            Complaints::SchoolId,
            Complaints::RaisedBy,
            Complaints::StudentId,
            Complaints::AssignedTo,
            Complaints::Title,
            Complaints::Description,
            Complaints::Category,
            Complaints::Priority,
            Complaints::Status,
        ])
        .values_panic([
            uuid(id),
            uuid(complaint.school_id),
            uuid(complaint.raised_by),
            opt_uuid(complaint.student_id),
            opt_uuid(complaint.assigned_to),
            complaint.title.as_str().into(),
            complaint.description.as_str().into(),
            complaint.category.as_str().into(),
            complaint.priority.as_str().into(),
            ComplaintStatus::Open.as_str().into(),
        ])
        .build(SqliteQueryBuilder)
}

fn select_complaints() -> SelectStatement {
    Query::select()
        .columns(COMPLAINT_COLUMNS)
        .from(Complaints::Table)
        .to_owned()
}

pub fn get_complaint(id: Uuid) -> Built {
    select_complaints()
        .and_where(Expr::col(Complaints::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn complaints_for_school(school_id: Uuid, status: Option<ComplaintStatus>) -> Built {
    let mut q = select_complaints();
    q.and_where(Expr::col(Complaints::SchoolId).eq(school_id.to_string()));
    if let Some(status) = status {
        q.and_where(Expr::col(Complaints::Status).eq(status.as_str()));
    }
    q.order_by(Complaints::CreatedAt, Order::Desc)
        .build(SqliteQueryBuilder)
}

/// Status write guarded on the status the transition was planned from.
pub fn apply_transition(id: Uuid, transition: &ComplaintTransition) -> Built {
    Query::update()
        .table(Complaints::Table)
        .value(Complaints::Status, transition.to.as_str())
        .value(Complaints::Resolution, opt_text(transition.resolution.as_deref()))
        .value(Complaints::ResolvedAt, opt_stamp(transition.resolved_at.as_ref()))
        .value(Complaints::UpdatedAt, Expr::current_timestamp())
        .and_where(Expr::col(Complaints::Id).eq(id.to_string()))
        .and_where(Expr::col(Complaints::Status).eq(transition.from.as_str()))
        .build(SqliteQueryBuilder)
}

pub fn assign_complaint(id: Uuid, assignee: Option<Uuid>) -> Built {
    Query::update()
        .table(Complaints::Table)
        .value(Complaints::AssignedTo, opt_uuid(assignee))
        .value(Complaints::UpdatedAt, Expr::current_timestamp())
        .and_where(Expr::col(Complaints::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn insert_update(
    id: Uuid,
    complaint_id: Uuid,
    updated_by: Option<Uuid>,
    from: Option<ComplaintStatus>,
    to: Option<ComplaintStatus>,
    comment: Option<&str>,
) -> Built {
    Query::insert()
        .into_table(ComplaintUpdates::Table)
        .columns([
            ComplaintUpdates::Id,
            ComplaintUpdates::ComplaintId,
            ComplaintUpdates::UpdatedBy,
            ComplaintUpdates::FromStatus,
            ComplaintUpdates::ToStatus,
            ComplaintUpdates::Comment,
        ])
        .values_panic([
            uuid(id),
            uuid(complaint_id),
            opt_uuid(updated_by),
            opt_text(from.map(|s| s.as_str())),
            opt_text(to.map(|s| s.as_str())),
            opt_text(comment),
        ])
        .build(SqliteQueryBuilder)
}

/// Audit trail in insertion order.
pub fn complaint_history(complaint_id: Uuid) -> Built {
    Query::select()
        .columns(COMPLAINT_UPDATE_COLUMNS)
        .from(ComplaintUpdates::Table)
        .and_where(Expr::col(ComplaintUpdates::ComplaintId).eq(complaint_id.to_string()))
        .order_by(ComplaintUpdates::CreatedAt, Order::Asc)
        .order_by_expr(Expr::cust("rowid"), Order::Asc)
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_transition_is_guarded_by_from_status() {
        let transition = ComplaintTransition {
            from: ComplaintStatus::InProgress,
            to: ComplaintStatus::Resolved,
            resolution: Some("Fan replaced".into()),
            resolved_at: Some(Utc::now()),
        };
        let (sql, values) = apply_transition(Uuid::nil(), &transition);
        assert!(sql.contains(r#""resolved_at" = ?"#));
        assert!(sql.ends_with(r#""status" = ?"#));
        assert_eq!(values.0.len(), 5);
    }
}

//! School calendar events.

use chrono::{DateTime, Utc};
use schoolbase_core::{NewEvent, TargetAudience};
use sea_query::{Cond, Expr, Order, Query, SelectStatement, SqliteQueryBuilder};
use uuid::Uuid;

use super::tables::{EVENT_COLUMNS, Events};
use super::{Built, opt_stamp, opt_text, opt_uuid, stamp, uuid};

pub fn insert_event(id: Uuid, event: &NewEvent) -> Built {
    Query::insert()
        .into_table(Events::Table)
        .columns([
            Events::Id,
            Events::SchoolId,
            Events::ClassId,
            Events::CreatedBy,
            Events::Title,
            Events::Description,
            Events::EventType,
            Events::TargetAudience,
            Events::StartDate,
            Events::EndDate,
            Events::Location,
        ])
        .values_panic([
            uuid(id),
            uuid(event.school_id),
            opt_uuid(event.class_id),
            opt_uuid(event.created_by),
            event.title.as_str().into(),
            opt_text(event.description.as_deref()),
            event.event_type.as_str().into(),
            event.target_audience.as_str().into(),
            stamp(&event.start_date),
            opt_stamp(event.end_date.as_ref()),
            opt_text(event.location.as_deref()),
        ])
        .build(SqliteQueryBuilder)
}

fn select_events() -> SelectStatement {
    Query::select()
        .columns(EVENT_COLUMNS)
        .from(Events::Table)
        .to_owned()
}

pub fn get_event(id: Uuid) -> Built {
    select_events()
        .and_where(Expr::col(Events::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn set_event_published(id: Uuid, published: bool) -> Built {
    Query::update()
        .table(Events::Table)
        .value(Events::IsPublished, published)
        .value(Events::UpdatedAt, Expr::current_timestamp())
        .and_where(Expr::col(Events::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn delete_event(id: Uuid) -> Built {
    Query::delete()
        .from_table(Events::Table)
        .and_where(Expr::col(Events::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

/// Calendar query filters. The default lists every event of the school.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub published_only: bool,
    /// Restrict to these audiences.
    pub audiences: Option<Vec<TargetAudience>>,
    /// Include school-wide events plus events of this class only.
    pub class_id: Option<Uuid>,
    /// Events still running at or after this instant.
    pub from: Option<DateTime<Utc>>,
}

pub fn events_for_school(school_id: Uuid, filter: &EventFilter) -> Built {
    let mut q = select_events();
    q.and_where(Expr::col(Events::SchoolId).eq(school_id.to_string()));
    if filter.published_only {
        q.and_where(Expr::col(Events::IsPublished).eq(true));
    }
    if let Some(audiences) = &filter.audiences {
        q.and_where(Expr::col(Events::TargetAudience).is_in(audiences.iter().map(|a| a.as_str())));
    }
    if let Some(class_id) = filter.class_id {
        q.cond_where(
            Cond::any()
                .add(Expr::col(Events::ClassId).is_null())
                .add(Expr::col(Events::ClassId).eq(class_id.to_string())),
        );
    }
    if let Some(from) = &filter.from {
        q.cond_where(
            Cond::any()
                .add(Expr::col(Events::StartDate).gte(stamp(from)))
                .add(Expr::col(Events::EndDate).gte(stamp(from))),
        );
    }
    q.order_by(Events::StartDate, Order::Asc)
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_only_scopes_school() {
        let (_, values) = events_for_school(Uuid::nil(), &EventFilter::default());
        assert_eq!(values.0.len(), 1);
    }

    #[test]
    fn test_audience_and_class_filters() {
        let filter = EventFilter {
            published_only: true,
            audiences: Some(TargetAudience::visible_to(schoolbase_core::UserRole::Parent)),
            class_id: Some(Uuid::nil()),
            from: None,
        };
        let (sql, _) = events_for_school(Uuid::nil(), &filter);
        assert!(sql.contains(r#""target_audience" IN (?, ?)"#));
        assert!(sql.contains(r#""class_id" IS NULL OR "class_id" = ?"#));
    }
}

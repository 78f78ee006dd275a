use chrono::{DateTime, Utc};
use rusqlite::Row;
use schoolbase_core::validate::validate_new_event;
use schoolbase_core::{Event, NewEvent, TargetAudience, UserRole};
use schoolbase_schema::db::events::{self as sql, EventFilter};
use uuid::Uuid;

use crate::bind::{execute, fetch_all, fetch_optional};
use crate::db::Db;
use crate::decode;
use crate::error::{Result, StoreError};
use crate::repo::{SameSchool, touched};

impl Db {
    /// New events start unpublished.
    pub fn insert_event(&self, event: &NewEvent) -> Result<Event> {
        validate_new_event(event)?;
        let id = Uuid::new_v4();
        self.write(|tx| {
            let mut scope = SameSchool::new(tx, event.school_id);
            if let Some(class_id) = event.class_id {
                scope.class("class_id", class_id)?;
            }
            if let Some(author) = event.created_by {
                scope.user("created_by", author, &[])?;
            }
            scope.finish()?;
            execute(tx, sql::insert_event(id, event))?;
            fetch_optional(tx, sql::get_event(id), row_to_event)?
                .ok_or_else(|| StoreError::not_found("event", id))
        })
    }

    pub fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
        fetch_optional(&self.conn(), sql::get_event(id), row_to_event)
    }

    pub fn set_event_published(&self, id: Uuid, published: bool) -> Result<()> {
        let rows = execute(&self.conn(), sql::set_event_published(id, published))?;
        touched(rows, "event", id)
    }

    pub fn delete_event(&self, id: Uuid) -> Result<()> {
        let rows = execute(&self.conn(), sql::delete_event(id))?;
        touched(rows, "event", id)
    }

    /// Events of a school ordered by start time.
    pub fn events_for_school(&self, school_id: Uuid, filter: &EventFilter) -> Result<Vec<Event>> {
        fetch_all(&self.conn(), sql::events_for_school(school_id, filter), row_to_event)
    }

    /// Published, not yet finished events a user with `role` should see.
    /// `class_id` narrows class-specific events to the viewer's class.
    pub fn upcoming_events_for(
        &self,
        school_id: Uuid,
        role: UserRole,
        class_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        let filter = EventFilter {
            published_only: true,
            audiences: Some(TargetAudience::visible_to(role)),
            class_id,
            from: Some(now),
        };
        self.events_for_school(school_id, &filter)
    }
}

fn row_to_event(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: decode::uuid(row, 0)?,
        school_id: decode::uuid(row, 1)?,
        class_id: decode::opt_uuid(row, 2)?,
        created_by: decode::opt_uuid(row, 3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        event_type: decode::variant(row, 6)?,
        target_audience: decode::variant(row, 7)?,
        start_date: decode::stamp(row, 8)?,
        end_date: decode::opt_stamp(row, 9)?,
        location: row.get(10)?,
        is_published: row.get(11)?,
        created_at: decode::stamp(row, 12)?,
        updated_at: decode::stamp(row, 13)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use schoolbase_core::testing;
    use schoolbase_core::EventType;

    use super::*;
    use crate::ConstraintKind;
    use crate::repo::test_db;

    fn event(school_id: Uuid, title: &str, audience: TargetAudience, start: DateTime<Utc>) -> NewEvent {
        NewEvent {
            school_id,
            class_id: None,
            created_by: None,
            title: title.to_string(),
            description: None,
            event_type: EventType::Other,
            target_audience: audience,
            start_date: start,
            end_date: None,
            location: Some("Main hall".into()),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_visibility_by_role_and_publication() {
        let db = test_db();
        let school = db.insert_school(&testing::school("a@b.com")).unwrap();
        let soon = now() + Duration::days(3);
        let mut ids = Vec::new();
        for (hour, title, audience) in [
            (0, "Sports day", TargetAudience::All),
            (1, "PTM", TargetAudience::Parents),
            (2, "Staff meeting", TargetAudience::Staff),
        ] {
            let start = soon + Duration::hours(hour);
            let created = db.insert_event(&event(school.id, title, audience, start)).unwrap();
            assert!(!created.is_published);
            ids.push(created.id);
        }
        assert!(db.upcoming_events_for(school.id, UserRole::Parent, None, now()).unwrap().is_empty());

        for id in &ids {
            db.set_event_published(*id, true).unwrap();
        }
        let titles = |role| -> Vec<String> {
            db.upcoming_events_for(school.id, role, None, now())
                .unwrap()
                .into_iter()
                .map(|e| e.title)
                .collect()
        };
        assert_eq!(titles(UserRole::Parent), ["Sports day", "PTM"]);
        assert_eq!(titles(UserRole::Teacher), ["Sports day", "Staff meeting"]);
        assert_eq!(titles(UserRole::SchoolAdmin).len(), 3);
    }

    #[test]
    fn test_past_events_drop_out_unless_still_running() {
        let db = test_db();
        let school = db.insert_school(&testing::school("a@b.com")).unwrap();
        let past = db
            .insert_event(&event(school.id, "Last term", TargetAudience::All, now() - Duration::days(30)))
            .unwrap();
        let mut camp = event(school.id, "Camp", TargetAudience::All, now() - Duration::days(1));
        camp.end_date = Some(now() + Duration::days(2));
        let camp = db.insert_event(&camp).unwrap();
        db.set_event_published(past.id, true).unwrap();
        db.set_event_published(camp.id, true).unwrap();

        let visible = db.upcoming_events_for(school.id, UserRole::Student, None, now()).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, camp.id);
    }

    #[test]
    fn test_class_event_needs_a_class_of_the_same_school() {
        let db = test_db();
        let school = db.insert_school(&testing::school("a@b.com")).unwrap();
        let other = db.insert_school(&testing::school("other@b.com")).unwrap();
        let foreign = db.insert_class(&testing::class(other.id, "10", "A")).unwrap();

        let mut trip = event(school.id, "Field trip", TargetAudience::Students, now());
        trip.class_id = Some(foreign.id);
        let err = db.insert_event(&trip).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)), "{err}");
        assert!(
            db.events_for_school(school.id, &EventFilter::default())
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let db = test_db();
        let school = db.insert_school(&testing::school("a@b.com")).unwrap();
        let mut bad = event(school.id, "Backwards", TargetAudience::All, now());
        bad.end_date = Some(now() - Duration::hours(1));
        assert!(matches!(db.insert_event(&bad), Err(StoreError::Validation(_))));

        let err = db
            .conn()
            .execute(
                "INSERT INTO events (id, school_id, title, event_type, start_date, end_date)
                 VALUES ('e', ?1, 'Backwards', 'other', '2024-07-02 10:00:00', '2024-07-01 10:00:00')",
                [school.id.to_string()],
            )
            .map_err(StoreError::from)
            .unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Check));
    }
}

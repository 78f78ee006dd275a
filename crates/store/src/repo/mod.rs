//! Entity repositories. Each submodule adds methods to [`Db`](crate::Db).

pub(crate) mod academics;
pub(crate) mod complaints;
pub(crate) mod events;
pub(crate) mod fees;
pub(crate) mod leads;
pub(crate) mod people;
pub(crate) mod tenancy;
pub(crate) mod users;

use rusqlite::Connection;
use schoolbase_core::validate::ValidationError;
use schoolbase_core::{PlanResource, UserRole};
use schoolbase_schema::db::{academics as academics_sql, people as people_sql};
use schoolbase_schema::db::{tenancy as sql, users as users_sql};
use tracing::debug;
use uuid::Uuid;

use crate::bind::{fetch_count, fetch_optional};
use crate::error::{Result, StoreError};

/// Fails when the school's plan has no room for one more active `resource`.
/// Schools without a subscription are unbounded.
pub(crate) fn check_plan_limit(
    conn: &Connection,
    school_id: Uuid,
    resource: PlanResource,
) -> Result<()> {
    let plan = fetch_optional(
        conn,
        sql::subscription_for_school(school_id),
        tenancy::row_to_subscription,
    )?;
    let Some(plan) = plan else {
        return Ok(());
    };
    let current = fetch_count(conn, sql::count_active(resource, school_id))?;
    if plan.limits.permits(resource, current) {
        return Ok(());
    }
    debug!(%school_id, %resource, current, plan = %plan.name, "plan limit reached");
    Err(StoreError::PlanLimitExceeded {
        resource,
        limit: plan.limits.limit_for(resource),
    })
}

/// Roles that may teach a class or subject.
pub(crate) const STAFF: &[UserRole] = &[UserRole::Teacher, UserRole::SchoolAdmin];

/// Checks that the rows a write points at belong to the writing school.
///
/// References to rows that do not exist pass here and are left for the
/// foreign key to reject.
pub(crate) struct SameSchool<'c> {
    conn: &'c Connection,
    school_id: Uuid,
    errors: Vec<ValidationError>,
}

impl<'c> SameSchool<'c> {
    pub(crate) fn new(conn: &'c Connection, school_id: Uuid) -> Self {
        Self {
            conn,
            school_id,
            errors: Vec::new(),
        }
    }

    fn owned(&mut self, field: &str, owner: Option<Uuid>) {
        if owner != Some(self.school_id) {
            self.errors.push(ValidationError::ForeignSchool {
                field: field.to_string(),
            });
        }
    }

    /// `roles` empty accepts any role.
    pub(crate) fn user(&mut self, field: &str, id: Uuid, roles: &[UserRole]) -> Result<&mut Self> {
        let user = fetch_optional(self.conn, users_sql::get_user(id), users::row_to_user)?;
        if let Some(user) = user {
            self.owned(field, user.school_id);
            if !roles.is_empty() && !roles.contains(&user.role) {
                self.errors.push(ValidationError::WrongRole {
                    field: field.to_string(),
                    role: user.role.to_string(),
                    expected: roles
                        .iter()
                        .map(|r| r.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }
        Ok(self)
    }

    pub(crate) fn class(&mut self, field: &str, id: Uuid) -> Result<&mut Self> {
        let class = fetch_optional(self.conn, academics_sql::get_class(id), academics::row_to_class)?;
        if let Some(class) = class {
            self.owned(field, Some(class.school_id));
        }
        Ok(self)
    }

    pub(crate) fn student(&mut self, field: &str, id: Uuid) -> Result<&mut Self> {
        let student = fetch_optional(self.conn, people_sql::get_student(id), people::row_to_student)?;
        if let Some(student) = student {
            self.owned(field, Some(student.school_id));
        }
        Ok(self)
    }

    pub(crate) fn parent(&mut self, field: &str, id: Uuid) -> Result<&mut Self> {
        let parent = fetch_optional(self.conn, people_sql::get_parent(id), people::row_to_parent)?;
        if let Some(parent) = parent {
            self.owned(field, Some(parent.school_id));
        }
        Ok(self)
    }

    pub(crate) fn finish(&mut self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

/// Error for an update that matched no row.
pub(crate) fn touched(rows: usize, entity: &'static str, id: impl ToString) -> Result<()> {
    if rows == 0 {
        Err(StoreError::not_found(entity, id))
    } else {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_db() -> crate::Db {
    let db = crate::Db::open_in_memory().unwrap();
    crate::Migrator::new(&db).migrate().unwrap();
    db
}

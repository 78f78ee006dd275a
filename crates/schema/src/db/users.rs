//! User / auth query builders.

use chrono::{DateTime, Utc};
use schoolbase_core::credentials::PasswordHash;
use schoolbase_core::{NewUser, UserRole};
use sea_query::{Expr, Order, Query, SelectStatement, SqliteQueryBuilder};
use uuid::Uuid;

use super::tables::{Classes, USER_COLUMNS, Users};
use super::{Built, opt_text, opt_uuid, stamp, uuid};

pub fn insert_user(id: Uuid, user: &NewUser, password: &PasswordHash) -> Built {
    Query::insert()
        .into_table(Users::Table)
        .columns([
            Users::Id,
            Users::Email,
            Users::PasswordHash,
            Users::PasswordSalt,
            Users::FirstName,
            Users::LastName,
            Users::Phone,
            Users::Role,
            Users::SchoolId,
        ])
        .values_panic([
            uuid(id),
            user.email.as_str().into(),
            password.hash.as_str().into(),
            password.salt.as_str().into(),
            user.first_name.as_str().into(),
            user.last_name.as_str().into(),
            opt_text(user.phone.as_deref()),
            user.role.as_str().into(),
            opt_uuid(user.school_id),
        ])
        .build(SqliteQueryBuilder)
}

fn select_users() -> SelectStatement {
    Query::select()
        .columns(USER_COLUMNS.map(|c| (Users::Table, c)))
        .from(Users::Table)
        .to_owned()
}

pub fn get_user(id: Uuid) -> Built {
    select_users()
        .and_where(Expr::col((Users::Table, Users::Id)).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn get_user_by_email(email: &str) -> Built {
    select_users()
        .and_where(Expr::col((Users::Table, Users::Email)).eq(email))
        .build(SqliteQueryBuilder)
}

/// Users of one school, optionally narrowed to a role.
pub fn users_for_school(school_id: Uuid, role: Option<UserRole>) -> Built {
    let mut q = select_users();
    q.and_where(Expr::col((Users::Table, Users::SchoolId)).eq(school_id.to_string()));
    if let Some(role) = role {
        q.and_where(Expr::col((Users::Table, Users::Role)).eq(role.as_str()));
    }
    q.order_by((Users::Table, Users::LastName), Order::Asc)
        .order_by((Users::Table, Users::FirstName), Order::Asc)
        .build(SqliteQueryBuilder)
}

/// The user set as a class's class teacher.
pub fn class_teacher(class_id: Uuid) -> Built {
    select_users()
        .inner_join(
            Classes::Table,
            Expr::col((Classes::Table, Classes::ClassTeacherId)).equals((Users::Table, Users::Id)),
        )
        .and_where(Expr::col((Classes::Table, Classes::Id)).eq(class_id.to_string()))
        .build(SqliteQueryBuilder)
}

/// Login lookup: id, password_hash, password_salt, is_active.
pub fn credentials_by_email(email: &str) -> Built {
    Query::select()
        .columns([
            Users::Id,
            Users::PasswordHash,
            Users::PasswordSalt,
            Users::IsActive,
        ])
        .from(Users::Table)
        .and_where(Expr::col(Users::Email).eq(email))
        .build(SqliteQueryBuilder)
}

pub fn record_login(id: Uuid, at: &DateTime<Utc>) -> Built {
    Query::update()
        .table(Users::Table)
        .value(Users::LastLoginAt, stamp(at))
        .value(Users::UpdatedAt, Expr::current_timestamp())
        .and_where(Expr::col(Users::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn set_password(id: Uuid, password: &PasswordHash) -> Built {
    Query::update()
        .table(Users::Table)
        .value(Users::PasswordHash, password.hash.as_str())
        .value(Users::PasswordSalt, password.salt.as_str())
        .value(Users::UpdatedAt, Expr::current_timestamp())
        .and_where(Expr::col(Users::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn set_user_active(id: Uuid, active: bool) -> Built {
    Query::update()
        .table(Users::Table)
        .value(Users::IsActive, active)
        .value(Users::UpdatedAt, Expr::current_timestamp())
        .and_where(Expr::col(Users::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn delete_user(id: Uuid) -> Built {
    Query::delete()
        .from_table(Users::Table)
        .and_where(Expr::col(Users::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn delete_users_with_email_like(pattern: &str) -> Built {
    Query::delete()
        .from_table(Users::Table)
        .and_where(Expr::col(Users::Email).like(pattern))
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_never_reads_credentials() {
        let (sql, _) = get_user_by_email("a@b.com");
        assert!(!sql.contains("password"));
    }

    #[test]
    fn test_role_filter_is_optional() {
        let (_, all) = users_for_school(Uuid::nil(), None);
        let (_, teachers) = users_for_school(Uuid::nil(), Some(UserRole::Teacher));
        assert_eq!(all.0.len() + 1, teachers.0.len());
    }
}

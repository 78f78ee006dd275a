use chrono::Utc;
use rusqlite::Row;
use schoolbase_core::credentials::{PasswordHash, hash_password, verify_password};
use schoolbase_core::validate::validate_new_user;
use schoolbase_core::{NewUser, User, UserRole};
use schoolbase_schema::db::users as sql;
use tracing::debug;
use uuid::Uuid;

use crate::bind::{execute, fetch_all, fetch_optional};
use crate::db::Db;
use crate::decode;
use crate::error::{Result, StoreError};
use crate::repo::touched;

impl Db {
    /// Insert an account with an already hashed password.
    pub fn insert_user(&self, user: &NewUser, password: &PasswordHash) -> Result<User> {
        validate_new_user(user)?;
        let id = Uuid::new_v4();
        let conn = self.conn();
        execute(&conn, sql::insert_user(id, user, password))?;
        fetch_optional(&conn, sql::get_user(id), row_to_user)?
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    /// Hash `password` and insert the account.
    pub fn create_user(&self, user: &NewUser, password: &str) -> Result<User> {
        validate_new_user(user)?;
        let hash = hash_password(password)?;
        self.insert_user(user, &hash)
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        fetch_optional(&self.conn(), sql::get_user(id), row_to_user)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        fetch_optional(&self.conn(), sql::get_user_by_email(email), row_to_user)
    }

    pub fn users_for_school(&self, school_id: Uuid, role: Option<UserRole>) -> Result<Vec<User>> {
        fetch_all(&self.conn(), sql::users_for_school(school_id, role), row_to_user)
    }

    /// The teacher account in charge of a class, if one is assigned.
    pub fn class_teacher(&self, class_id: Uuid) -> Result<Option<User>> {
        fetch_optional(&self.conn(), sql::class_teacher(class_id), row_to_user)
    }

    /// Check a password against an active account and stamp the login time.
    /// Returns `None` for unknown emails, inactive accounts and wrong passwords alike.
    pub fn verify_login(&self, email: &str, password: &str) -> Result<Option<User>> {
        let conn = self.conn();
        let found = fetch_optional(&conn, sql::credentials_by_email(email), |row| {
            Ok((
                decode::uuid(row, 0)?,
                PasswordHash {
                    hash: row.get(1)?,
                    salt: row.get(2)?,
                },
                row.get::<_, bool>(3)?,
            ))
        })?;
        let Some((id, stored, active)) = found else {
            return Ok(None);
        };
        if !active || !verify_password(password, &stored) {
            debug!(%id, active, "login rejected");
            return Ok(None);
        }
        execute(&conn, sql::record_login(id, &Utc::now()))?;
        fetch_optional(&conn, sql::get_user(id), row_to_user)
    }

    pub fn set_password(&self, id: Uuid, password: &str) -> Result<()> {
        let hash = hash_password(password)?;
        let rows = execute(&self.conn(), sql::set_password(id, &hash))?;
        touched(rows, "user", id)
    }

    pub fn set_user_active(&self, id: Uuid, active: bool) -> Result<()> {
        let rows = execute(&self.conn(), sql::set_user_active(id, active))?;
        touched(rows, "user", id)
    }

    /// Hard delete. Classes and subjects they taught keep existing with the
    /// teacher reference cleared.
    pub fn delete_user(&self, id: Uuid) -> Result<()> {
        let rows = execute(&self.conn(), sql::delete_user(id))?;
        touched(rows, "user", id)
    }
}

pub(crate) fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: decode::uuid(row, 0)?,
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        phone: row.get(4)?,
        role: decode::variant(row, 5)?,
        school_id: decode::opt_uuid(row, 6)?,
        is_active: row.get(7)?,
        last_login_at: decode::opt_stamp(row, 8)?,
        created_at: decode::stamp(row, 9)?,
        updated_at: decode::stamp(row, 10)?,
    })
}

#[cfg(test)]
mod tests {
    use schoolbase_core::testing;

    use super::*;
    use crate::ConstraintKind;
    use crate::repo::test_db;

    #[test]
    fn test_role_school_invariant_is_validated() {
        let db = test_db();
        let school = db.insert_school(&testing::school("a@b.com")).unwrap();
        let hash = testing::password_hash();

        let err = db
            .insert_user(&testing::user(UserRole::Teacher, None, "t@b.com"), &hash)
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let err = db
            .insert_user(
                &testing::user(UserRole::SuperAdmin, Some(school.id), "root@b.com"),
                &hash,
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let admin = db
            .insert_user(&testing::user(UserRole::SuperAdmin, None, "root@b.com"), &hash)
            .unwrap();
        assert_eq!(admin.school_id, None);
    }

    #[test]
    fn test_role_school_invariant_is_enforced_by_the_table() {
        let db = test_db();
        let hash = testing::password_hash();
        let id = Uuid::new_v4();
        let user = testing::user(UserRole::Teacher, None, "t@b.com");
        // Bypass validation to reach the CHECK constraint.
        let err = crate::bind::execute(&db.conn(), sql::insert_user(id, &user, &hash))
            .unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Check));
    }

    #[test]
    fn test_unknown_role_value_is_rejected_by_the_table() {
        let db = test_db();
        let err = db
            .conn()
            .execute(
                "INSERT INTO users (id, email, password_hash, password_salt, first_name, last_name, role)
                 VALUES ('x', 'x@b.com', 'h', 's', 'X', 'Y', 'janitor')",
                [],
            )
            .map_err(StoreError::from)
            .unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Check));
    }

    #[test]
    fn test_login_checks_password_and_activity() {
        let db = test_db();
        let school = db.insert_school(&testing::school("a@b.com")).unwrap();
        let user = db
            .insert_user(
                &testing::user(UserRole::Teacher, Some(school.id), "t@b.com"),
                &testing::password_hash(),
            )
            .unwrap();
        assert!(user.last_login_at.is_none());

        assert!(db.verify_login("t@b.com", "wrong-password").unwrap().is_none());
        assert!(db.verify_login("nobody@b.com", "fixture-password").unwrap().is_none());

        let logged_in = db.verify_login("t@b.com", "fixture-password").unwrap().unwrap();
        assert!(logged_in.last_login_at.is_some());

        db.set_user_active(user.id, false).unwrap();
        assert!(db.verify_login("t@b.com", "fixture-password").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_is_unique_violation() {
        let db = test_db();
        let school = db.insert_school(&testing::school("a@b.com")).unwrap();
        let user = testing::user(UserRole::Parent, Some(school.id), "p@b.com");
        db.insert_user(&user, &testing::password_hash()).unwrap();
        let err = db.insert_user(&user, &testing::password_hash()).unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[test]
    fn test_users_for_school_filters_by_role() {
        let db = test_db();
        let school = db.insert_school(&testing::school("a@b.com")).unwrap();
        let hash = testing::password_hash();
        for (role, email) in [
            (UserRole::Teacher, "t1@b.com"),
            (UserRole::Teacher, "t2@b.com"),
            (UserRole::Parent, "p@b.com"),
        ] {
            db.insert_user(&testing::user(role, Some(school.id), email), &hash)
                .unwrap();
        }
        assert_eq!(db.users_for_school(school.id, None).unwrap().len(), 3);
        assert_eq!(
            db.users_for_school(school.id, Some(UserRole::Teacher))
                .unwrap()
                .len(),
            2
        );
    }
}

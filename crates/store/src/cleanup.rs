//! Removal of demo tenants.
//!
//! Demo rows are recognised by the domain of their email address. Users are
//! deleted before schools: a school delete cascades to its users, and demo
//! accounts can exist without a demo school.

use schoolbase_core::validate::{ValidationError, is_valid_email};
use schoolbase_schema::db::{tenancy, users};
use tracing::info;

use crate::bind::execute;
use crate::db::Db;
use crate::error::{Result, StoreError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub schools: usize,
    pub users: usize,
}

/// Delete every school and user whose email ends in `@domain`.
pub fn cleanup_demo_data(db: &Db, domain: &str) -> Result<CleanupReport> {
    let pattern = demo_pattern(domain)?;
    let report = db.write(|tx| {
        let users = execute(tx, users::delete_users_with_email_like(&pattern))?;
        let schools = execute(tx, tenancy::delete_schools_with_email_like(&pattern))?;
        Ok(CleanupReport { schools, users })
    })?;
    info!(
        domain,
        schools = report.schools,
        users = report.users,
        "removed demo data"
    );
    Ok(report)
}

/// `LIKE` pattern for a bare domain. Wildcards in the input are rejected so a
/// typo cannot widen the match.
fn demo_pattern(domain: &str) -> Result<String> {
    let domain = domain.trim().trim_start_matches('@');
    let sample = format!("demo@{domain}");
    if domain.contains(['%', '_', '@']) || !is_valid_email(&sample) {
        return Err(StoreError::Validation(vec![ValidationError::InvalidEmail {
            value: sample,
        }]));
    }
    Ok(format!("%@{domain}"))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use schoolbase_core::{UserRole, testing};

    use super::*;
    use crate::repo::test_db;
    use crate::seed::{DemoSchoolSeeder, Seeder};

    #[test]
    fn test_removes_only_demo_rows() {
        let db = test_db();
        DemoSchoolSeeder {
            domain: "demo.schoolbase.test".into(),
            password: "demo-password".into(),
            today: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        }
        .seed(&db)
        .unwrap();

        let real = db.insert_school(&testing::school("office@real.example.com")).unwrap();
        let admin = db
            .insert_user(
                &testing::user(UserRole::SchoolAdmin, Some(real.id), "head@real.example.com"),
                &testing::password_hash(),
            )
            .unwrap();

        let report = cleanup_demo_data(&db, "demo.schoolbase.test").unwrap();
        assert_eq!(report, CleanupReport { schools: 1, users: 4 });

        assert!(db.get_school_by_email("school@demo.schoolbase.test").unwrap().is_none());
        assert!(db.get_user_by_email("teacher@demo.schoolbase.test").unwrap().is_none());
        assert!(db.get_school(real.id).unwrap().is_some());
        assert!(db.get_user(admin.id).unwrap().is_some());

        let again = cleanup_demo_data(&db, "@demo.schoolbase.test").unwrap();
        assert_eq!(again, CleanupReport::default());
    }

    #[test]
    fn test_rejects_wildcard_domains() {
        for domain in ["", "%", "localhost", "demo_school.test", "a@b.com"] {
            assert!(demo_pattern(domain).is_err(), "{domain}");
        }
        assert_eq!(demo_pattern(" @demo.test ").unwrap(), "%@demo.test");
    }
}

//! Idempotent seeders. Each one runs in a single transaction and skips rows
//! whose natural key (plan name, user email, school email) already exists.

use std::fmt;

use chrono::{Days, NaiveDate, NaiveTime};
use rusqlite::Connection;
use schoolbase_core::credentials::hash_password;
use schoolbase_core::validate::{validate_new_subscription, validate_new_user};
use schoolbase_core::{
    AttendanceStatus, BillingCycle, EventType, FeeType, NewAttendance, NewClass, NewEvent, NewFee,
    NewParent, NewSchool, NewStudent, NewSubject, NewSubscription, NewTeacher, NewUser, PlanLimits,
    PlanType, RelationshipType, SubscriptionFeatures, TargetAudience, UserRole, derive_fee_status,
};
use schoolbase_schema::db::{self as sql, Built};
use tracing::info;
use uuid::Uuid;

use crate::bind::{execute, fetch_optional};
use crate::db::Db;
use crate::decode;
use crate::error::Result;

/// What one seeder run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub existing: usize,
}

pub trait Seeder {
    fn name(&self) -> &'static str;
    fn seed(&self, db: &Db) -> Result<SeedReport>;
}

/// Run seeders in order, stopping at the first failure.
pub fn run_seeders(db: &Db, seeders: &[&dyn Seeder]) -> Result<Vec<(&'static str, SeedReport)>> {
    let mut reports = Vec::with_capacity(seeders.len());
    for seeder in seeders {
        let report = seeder.seed(db)?;
        info!(
            seeder = seeder.name(),
            created = report.created,
            existing = report.existing,
            "seeded"
        );
        reports.push((seeder.name(), report));
    }
    Ok(reports)
}

/// Id of the row a lookup query finds. Every select starts with the id column.
fn find_id(conn: &Connection, built: Built) -> Result<Option<Uuid>> {
    fetch_optional(conn, built, |row| decode::uuid(row, 0))
}

// ── Subscription plans ─────────────────────────────────────────────────────

/// The catalogue of plans offered to schools. Prices are monthly, in paise.
pub fn standard_plans() -> Vec<NewSubscription> {
    let plan = |name: &str, plan_type, price, limits: (i64, i64, i64), features| NewSubscription {
        name: name.to_string(),
        plan_type,
        price,
        billing_cycle: BillingCycle::Monthly,
        limits: PlanLimits {
            max_students: limits.0,
            max_teachers: limits.1,
            max_classes: limits.2,
        },
        features,
    };
    let base = SubscriptionFeatures::default();
    let portal = SubscriptionFeatures {
        parent_portal: true,
        ..base.clone()
    };
    let messaging = SubscriptionFeatures {
        sms_notifications: true,
        ..portal.clone()
    };
    let everything = SubscriptionFeatures {
        custom_branding: true,
        api_access: true,
        ..messaging.clone()
    };
    vec![
        plan("Free", PlanType::Free, 0, (50, 5, 5), base),
        plan("Basic", PlanType::Basic, 499_900, (300, 20, 15), portal),
        plan("Standard", PlanType::Standard, 999_900, (1_000, 60, 40), messaging.clone()),
        plan("Premium", PlanType::Premium, 1_999_900, (3_000, 150, 100), messaging),
        plan(
            "Enterprise",
            PlanType::Enterprise,
            4_999_900,
            (100_000, 5_000, 2_000),
            everything,
        ),
    ]
}

pub struct SubscriptionPlansSeeder {
    pub plans: Vec<NewSubscription>,
}

impl Default for SubscriptionPlansSeeder {
    fn default() -> Self {
        Self {
            plans: standard_plans(),
        }
    }
}

impl Seeder for SubscriptionPlansSeeder {
    fn name(&self) -> &'static str {
        "subscription_plans"
    }

    fn seed(&self, db: &Db) -> Result<SeedReport> {
        for plan in &self.plans {
            validate_new_subscription(plan)?;
        }
        db.write(|tx| {
            let mut report = SeedReport::default();
            for plan in &self.plans {
                if find_id(tx, sql::tenancy::get_subscription_by_name(&plan.name))?.is_some() {
                    report.existing += 1;
                    continue;
                }
                let features = serde_json::to_string(&plan.features)?;
                execute(
                    tx,
                    sql::tenancy::insert_subscription(Uuid::new_v4(), plan, &features),
                )?;
                report.created += 1;
            }
            Ok(report)
        })
    }
}

// ── Super admin ────────────────────────────────────────────────────────────

/// The platform operator account. The password is supplied by the caller
/// from a secret source and is only used to compute the stored hash.
pub struct SuperAdminSeeder {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl fmt::Debug for SuperAdminSeeder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuperAdminSeeder")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Seeder for SuperAdminSeeder {
    fn name(&self) -> &'static str {
        "super_admin"
    }

    /// An existing account keeps its password.
    fn seed(&self, db: &Db) -> Result<SeedReport> {
        let user = NewUser {
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: None,
            role: UserRole::SuperAdmin,
            school_id: None,
        };
        validate_new_user(&user)?;
        if db.get_user_by_email(&user.email)?.is_some() {
            return Ok(SeedReport {
                created: 0,
                existing: 1,
            });
        }
        let hash = hash_password(&self.password)?;
        db.write(|tx| {
            if find_id(tx, sql::users::get_user_by_email(&user.email))?.is_some() {
                return Ok(SeedReport {
                    created: 0,
                    existing: 1,
                });
            }
            execute(tx, sql::users::insert_user(Uuid::new_v4(), &user, &hash))?;
            Ok(SeedReport {
                created: 1,
                existing: 0,
            })
        })
    }
}

// ── Demo school ────────────────────────────────────────────────────────────

/// A small, fully linked school for trying the system out. Every account and
/// the school itself use addresses in `domain`, which is how demo cleanup
/// finds them again.
pub struct DemoSchoolSeeder {
    pub domain: String,
    /// Shared sign-in password for the demo accounts.
    pub password: String,
    /// Fee due dates and event times are laid out relative to this day.
    pub today: NaiveDate,
}

impl fmt::Debug for DemoSchoolSeeder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DemoSchoolSeeder")
            .field("domain", &self.domain)
            .field("today", &self.today)
            .finish_non_exhaustive()
    }
}

impl DemoSchoolSeeder {
    pub fn school_email(&self) -> String {
        self.address("school")
    }

    fn address(&self, local: &str) -> String {
        format!("{local}@{}", self.domain)
    }

    fn user(&self, role: UserRole, school_id: Uuid, local: &str, first: &str, last: &str) -> NewUser {
        NewUser {
            email: self.address(local),
            first_name: first.to_string(),
            last_name: last.to_string(),
            phone: None,
            role,
            school_id: Some(school_id),
        }
    }
}

impl Seeder for DemoSchoolSeeder {
    fn name(&self) -> &'static str {
        "demo_school"
    }

    fn seed(&self, db: &Db) -> Result<SeedReport> {
        let school_email = self.school_email();
        if db.get_school_by_email(&school_email)?.is_some() {
            return Ok(SeedReport {
                created: 0,
                existing: 1,
            });
        }

        let school_id = Uuid::new_v4();
        let users = [
            self.user(UserRole::SchoolAdmin, school_id, "admin", "Asha", "Kulkarni"),
            self.user(UserRole::Teacher, school_id, "teacher", "Ravi", "Menon"),
            self.user(UserRole::Student, school_id, "student", "Meera", "Joshi"),
            self.user(UserRole::Parent, school_id, "parent", "Sunil", "Joshi"),
        ];
        for user in &users {
            validate_new_user(user)?;
        }
        let hashes = users
            .iter()
            .map(|_| hash_password(&self.password))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        db.write(|tx| {
            let plan = find_id(tx, sql::tenancy::get_subscription_by_name("Standard"))?;
            let school = NewSchool {
                name: "Demo Public School".to_string(),
                email: school_email.clone(),
                phone: Some("+91 20 5555 0100".to_string()),
                address: Some("12 Demo Road".to_string()),
                city: Some("Pune".to_string()),
                state: Some("Maharashtra".to_string()),
                website: None,
                subscription_id: plan,
            };
            execute(tx, sql::tenancy::insert_school(school_id, &school))?;

            let user_ids: [Uuid; 4] = std::array::from_fn(|_| Uuid::new_v4());
            for ((user, hash), id) in users.iter().zip(&hashes).zip(user_ids) {
                execute(tx, sql::users::insert_user(id, user, hash))?;
            }
            let [admin_id, teacher_user, student_user, parent_user] = user_ids;

            let class_id = Uuid::new_v4();
            let class = NewClass {
                school_id,
                grade: "10".to_string(),
                section: "A".to_string(),
                class_teacher_id: Some(teacher_user),
                academic_year: Some("2024-25".to_string()),
                room_number: Some("201".to_string()),
                capacity: 40,
                timetable: None,
            };
            execute(tx, sql::academics::insert_class(class_id, &class, None))?;

            let teacher = NewTeacher {
                user_id: teacher_user,
                school_id,
                employee_id: "EMP-001".to_string(),
                qualification: Some("M.Sc. Mathematics".to_string()),
                specialization: Some("Mathematics".to_string()),
                experience_years: 8,
                joining_date: self.today.checked_sub_days(Days::new(3 * 365)),
            };
            execute(tx, sql::people::insert_teacher(Uuid::new_v4(), &teacher))?;

            let subject = NewSubject {
                school_id,
                name: "Mathematics".to_string(),
                code: "MATH10".to_string(),
                description: None,
                class_id: Some(class_id),
                teacher_id: Some(teacher_user),
            };
            execute(tx, sql::academics::insert_subject(Uuid::new_v4(), &subject))?;

            let student_id = Uuid::new_v4();
            let student = NewStudent {
                user_id: student_user,
                school_id,
                class_id,
                roll_number: "1".to_string(),
                admission_number: "DEMO-0001".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(2009, 8, 14),
                gender: None,
                blood_group: Some("B+".to_string()),
                address: None,
                admission_date: self.today.checked_sub_days(Days::new(365)),
            };
            execute(tx, sql::people::insert_student(student_id, &student))?;

            let parent_id = Uuid::new_v4();
            let parent = NewParent {
                user_id: parent_user,
                school_id,
                relationship_type: RelationshipType::Father,
                occupation: Some("Engineer".to_string()),
            };
            execute(tx, sql::people::insert_parent(parent_id, &parent))?;
            execute(tx, sql::people::link_parent(student_id, parent_id, true))?;

            let attendance = NewAttendance {
                school_id,
                student_id,
                class_id,
                date: self.today,
                period: 0,
                status: AttendanceStatus::Present,
                marked_by: Some(teacher_user),
                remarks: None,
            };
            execute(tx, sql::academics::insert_attendance(Uuid::new_v4(), &attendance))?;

            let fee_id = Uuid::new_v4();
            let due_date = self.today.checked_add_days(Days::new(30)).unwrap_or(self.today);
            let fee = NewFee {
                school_id,
                class_id: Some(class_id),
                name: "Term 1 tuition".to_string(),
                fee_type: FeeType::Tuition,
                amount: 1_500_000,
                due_date,
                academic_year: Some("2024-25".to_string()),
                description: None,
            };
            execute(tx, sql::fees::insert_fee(fee_id, &fee))?;
            execute(
                tx,
                sql::fees::insert_student_fee(&sql::fees::StudentFeeRow {
                    id: Uuid::new_v4(),
                    fee_id,
                    student_id,
                    amount: fee.amount,
                    status: derive_fee_status(fee.amount, 0, due_date, self.today),
                    due_date,
                    scholarship_json: None,
                }),
            )?;

            let sports_day = self
                .today
                .checked_add_days(Days::new(14))
                .unwrap_or(self.today)
                .and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default())
                .and_utc();
            let event_id = Uuid::new_v4();
            let event = NewEvent {
                school_id,
                class_id: None,
                created_by: Some(admin_id),
                title: "Annual sports day".to_string(),
                description: Some("Track and field events for all grades.".to_string()),
                event_type: EventType::Sports,
                target_audience: TargetAudience::All,
                start_date: sports_day,
                end_date: None,
                location: Some("School ground".to_string()),
            };
            execute(tx, sql::events::insert_event(event_id, &event))?;
            execute(tx, sql::events::set_event_published(event_id, true))?;

            Ok(SeedReport {
                created: 1,
                existing: 0,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;
    use crate::repo::test_db;

    fn admin(password: &str) -> SuperAdminSeeder {
        SuperAdminSeeder {
            email: "root@platform.example.com".into(),
            first_name: "Platform".into(),
            last_name: "Admin".into(),
            password: password.into(),
        }
    }

    fn demo() -> DemoSchoolSeeder {
        DemoSchoolSeeder {
            domain: "demo.schoolbase.test".into(),
            password: "demo-password".into(),
            today: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        }
    }

    #[test]
    fn test_plans_seed_once() {
        let db = test_db();
        let seeder = SubscriptionPlansSeeder::default();
        let first = seeder.seed(&db).unwrap();
        assert_eq!(first, SeedReport { created: 5, existing: 0 });
        let again = seeder.seed(&db).unwrap();
        assert_eq!(again, SeedReport { created: 0, existing: 5 });

        let names: Vec<_> = db.list_subscriptions().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["Free", "Basic", "Standard", "Premium", "Enterprise"]);
    }

    #[test]
    fn test_super_admin_has_no_school_and_can_log_in() {
        let db = test_db();
        assert_eq!(admin("correct horse").seed(&db).unwrap().created, 1);
        assert_eq!(admin("another secret").seed(&db).unwrap().existing, 1);

        let user = db
            .verify_login("root@platform.example.com", "correct horse")
            .unwrap()
            .unwrap();
        assert_eq!(user.role, UserRole::SuperAdmin);
        assert_eq!(user.school_id, None);
    }

    #[test]
    fn test_short_password_aborts_super_admin() {
        let db = test_db();
        let err = admin("short").seed(&db).unwrap_err();
        assert!(matches!(err, StoreError::Credentials(_)));
        assert!(db.get_user_by_email("root@platform.example.com").unwrap().is_none());
    }

    #[test]
    fn test_debug_output_hides_password() {
        assert!(!format!("{:?}", admin("correct horse")).contains("correct horse"));
        assert!(!format!("{:?}", demo()).contains("demo-password"));
    }

    #[test]
    fn test_demo_school_is_linked_and_idempotent() {
        let db = test_db();
        let reports = run_seeders(&db, &[&SubscriptionPlansSeeder::default(), &demo()]).unwrap();
        assert_eq!(reports[1], ("demo_school", SeedReport { created: 1, existing: 0 }));
        assert_eq!(demo().seed(&db).unwrap().existing, 1);

        let school = db.get_school_by_email("school@demo.schoolbase.test").unwrap().unwrap();
        assert_eq!(
            db.subscription_for_school(school.id).unwrap().unwrap().name,
            "Standard"
        );
        let class = db.find_class(school.id, "10", "A").unwrap().unwrap();
        let teacher = db.class_teacher(class.id).unwrap().unwrap();
        assert_eq!(teacher.email, "teacher@demo.schoolbase.test");

        let students = db.students_in_class(class.id, true).unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(db.parents_of_student(students[0].id).unwrap().len(), 1);
        assert_eq!(db.student_fees_for_student(students[0].id).unwrap().len(), 1);
        assert_eq!(db.users_for_school(school.id, None).unwrap().len(), 4);
        assert!(
            db.verify_login("parent@demo.schoolbase.test", "demo-password")
                .unwrap()
                .is_some()
        );
    }
}

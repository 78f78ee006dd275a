use rusqlite::Row;
use schoolbase_core::validate::{validate_new_parent, validate_new_student, validate_new_teacher};
use schoolbase_core::{
    NewParent, NewStudent, NewTeacher, Parent, PlanResource, Student, Teacher, UserRole,
};
use schoolbase_schema::db::people as sql;
use uuid::Uuid;

use crate::bind::{execute, fetch_all, fetch_optional};
use crate::db::Db;
use crate::decode;
use crate::error::{Result, StoreError};
use crate::repo::{STAFF, SameSchool, check_plan_limit, touched};

impl Db {
    // ── Teachers ───────────────────────────────────────────────────────────

    pub fn insert_teacher(&self, teacher: &NewTeacher) -> Result<Teacher> {
        validate_new_teacher(teacher)?;
        let id = Uuid::new_v4();
        self.write(|tx| {
            SameSchool::new(tx, teacher.school_id)
                .user("user_id", teacher.user_id, STAFF)?
                .finish()?;
            check_plan_limit(tx, teacher.school_id, PlanResource::Teachers)?;
            execute(tx, sql::insert_teacher(id, teacher))?;
            fetch_optional(tx, sql::get_teacher(id), row_to_teacher)?
                .ok_or_else(|| StoreError::not_found("teacher", id))
        })
    }

    pub fn get_teacher(&self, id: Uuid) -> Result<Option<Teacher>> {
        fetch_optional(&self.conn(), sql::get_teacher(id), row_to_teacher)
    }

    pub fn teacher_by_user(&self, user_id: Uuid) -> Result<Option<Teacher>> {
        fetch_optional(&self.conn(), sql::teacher_by_user(user_id), row_to_teacher)
    }

    pub fn teachers_for_school(&self, school_id: Uuid) -> Result<Vec<Teacher>> {
        fetch_all(&self.conn(), sql::teachers_for_school(school_id), row_to_teacher)
    }

    /// Reactivating counts against the plan limit like a new teacher.
    pub fn set_teacher_active(&self, id: Uuid, active: bool) -> Result<()> {
        self.write(|tx| {
            let teacher = fetch_optional(tx, sql::get_teacher(id), row_to_teacher)?
                .ok_or_else(|| StoreError::not_found("teacher", id))?;
            if active && !teacher.is_active {
                check_plan_limit(tx, teacher.school_id, PlanResource::Teachers)?;
            }
            let rows = execute(tx, sql::set_teacher_active(id, active))?;
            touched(rows, "teacher", id)
        })
    }

    // ── Students ───────────────────────────────────────────────────────────

    pub fn insert_student(&self, student: &NewStudent) -> Result<Student> {
        validate_new_student(student)?;
        let id = Uuid::new_v4();
        self.write(|tx| {
            SameSchool::new(tx, student.school_id)
                .user("user_id", student.user_id, &[UserRole::Student])?
                .class("class_id", student.class_id)?
                .finish()?;
            check_plan_limit(tx, student.school_id, PlanResource::Students)?;
            execute(tx, sql::insert_student(id, student))?;
            fetch_optional(tx, sql::get_student(id), row_to_student)?
                .ok_or_else(|| StoreError::not_found("student", id))
        })
    }

    pub fn get_student(&self, id: Uuid) -> Result<Option<Student>> {
        fetch_optional(&self.conn(), sql::get_student(id), row_to_student)
    }

    pub fn student_by_user(&self, user_id: Uuid) -> Result<Option<Student>> {
        fetch_optional(&self.conn(), sql::student_by_user(user_id), row_to_student)
    }

    pub fn students_in_class(&self, class_id: Uuid, active_only: bool) -> Result<Vec<Student>> {
        fetch_all(
            &self.conn(),
            sql::students_in_class(class_id, active_only),
            row_to_student,
        )
    }

    /// Deactivated students stop counting against the plan limit, and
    /// reactivating one needs room under it again.
    pub fn set_student_active(&self, id: Uuid, active: bool) -> Result<()> {
        self.write(|tx| {
            let student = fetch_optional(tx, sql::get_student(id), row_to_student)?
                .ok_or_else(|| StoreError::not_found("student", id))?;
            if active && !student.is_active {
                check_plan_limit(tx, student.school_id, PlanResource::Students)?;
            }
            let rows = execute(tx, sql::set_student_active(id, active))?;
            touched(rows, "student", id)
        })
    }

    // ── Parents ────────────────────────────────────────────────────────────

    pub fn insert_parent(&self, parent: &NewParent) -> Result<Parent> {
        validate_new_parent(parent)?;
        let id = Uuid::new_v4();
        self.write(|tx| {
            SameSchool::new(tx, parent.school_id)
                .user("user_id", parent.user_id, &[UserRole::Parent])?
                .finish()?;
            execute(tx, sql::insert_parent(id, parent))?;
            fetch_optional(tx, sql::get_parent(id), row_to_parent)?
                .ok_or_else(|| StoreError::not_found("parent", id))
        })
    }

    pub fn get_parent(&self, id: Uuid) -> Result<Option<Parent>> {
        fetch_optional(&self.conn(), sql::get_parent(id), row_to_parent)
    }

    pub fn parent_by_user(&self, user_id: Uuid) -> Result<Option<Parent>> {
        fetch_optional(&self.conn(), sql::parent_by_user(user_id), row_to_parent)
    }

    /// Student and parent must belong to the same school.
    pub fn link_parent(&self, student_id: Uuid, parent_id: Uuid, is_primary: bool) -> Result<()> {
        self.write(|tx| {
            if let Some(student) = fetch_optional(tx, sql::get_student(student_id), row_to_student)? {
                SameSchool::new(tx, student.school_id)
                    .parent("parent_id", parent_id)?
                    .finish()?;
            }
            execute(tx, sql::link_parent(student_id, parent_id, is_primary))?;
            Ok(())
        })
    }

    pub fn unlink_parent(&self, student_id: Uuid, parent_id: Uuid) -> Result<()> {
        let rows = execute(&self.conn(), sql::unlink_parent(student_id, parent_id))?;
        touched(rows, "student_parent", format!("{student_id}/{parent_id}"))
    }

    /// Parents of a student, primary contact first.
    pub fn parents_of_student(&self, student_id: Uuid) -> Result<Vec<Parent>> {
        fetch_all(&self.conn(), sql::parents_of_student(student_id), row_to_parent)
    }

    pub fn children_of_parent(&self, parent_id: Uuid) -> Result<Vec<Student>> {
        fetch_all(&self.conn(), sql::children_of_parent(parent_id), row_to_student)
    }
}

fn row_to_teacher(row: &Row<'_>) -> rusqlite::Result<Teacher> {
    Ok(Teacher {
        id: decode::uuid(row, 0)?,
        user_id: decode::uuid(row, 1)?,
        school_id: decode::uuid(row, 2)?,
        employee_id: row.get(3)?,
        qualification: row.get(4)?,
        specialization: row.get(5)?,
        experience_years: row.get(6)?,
        joining_date: decode::opt_date(row, 7)?,
        is_active: row.get(8)?,
        created_at: decode::stamp(row, 9)?,
        updated_at: decode::stamp(row, 10)?,
    })
}

pub(crate) fn row_to_student(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: decode::uuid(row, 0)?,
        user_id: decode::uuid(row, 1)?,
        school_id: decode::uuid(row, 2)?,
        class_id: decode::uuid(row, 3)?,
        roll_number: row.get(4)?,
        admission_number: row.get(5)?,
        date_of_birth: decode::opt_date(row, 6)?,
        gender: decode::opt_variant(row, 7)?,
        blood_group: row.get(8)?,
        address: row.get(9)?,
        admission_date: decode::opt_date(row, 10)?,
        is_active: row.get(11)?,
        created_at: decode::stamp(row, 12)?,
        updated_at: decode::stamp(row, 13)?,
    })
}

pub(crate) fn row_to_parent(row: &Row<'_>) -> rusqlite::Result<Parent> {
    Ok(Parent {
        id: decode::uuid(row, 0)?,
        user_id: decode::uuid(row, 1)?,
        school_id: decode::uuid(row, 2)?,
        relationship_type: decode::variant(row, 3)?,
        occupation: row.get(4)?,
        is_active: row.get(5)?,
        created_at: decode::stamp(row, 6)?,
        updated_at: decode::stamp(row, 7)?,
    })
}

#[cfg(test)]
mod tests {
    use schoolbase_core::testing;
    use schoolbase_core::validate::ValidationError;
    use schoolbase_core::{
        BillingCycle, Class, NewSubscription, PlanLimits, PlanType, RelationshipType, School,
        SubscriptionFeatures,
    };

    use super::*;
    use crate::ConstraintKind;
    use crate::repo::test_db;

    fn setup(db: &Db) -> (School, Class) {
        let school = db.insert_school(&testing::school("a@b.com")).unwrap();
        let class = db.insert_class(&testing::class(school.id, "10", "A")).unwrap();
        (school, class)
    }

    fn enrol(db: &Db, school: &School, class: &Class, email: &str, roll: &str) -> Result<Student> {
        let user = db.insert_user(
            &testing::user(UserRole::Student, Some(school.id), email),
            &testing::password_hash(),
        )?;
        db.insert_student(&testing::student(user.id, school.id, class.id, roll))
    }

    fn parent(db: &Db, school: &School, email: &str) -> Parent {
        let user = db
            .insert_user(
                &testing::user(UserRole::Parent, Some(school.id), email),
                &testing::password_hash(),
            )
            .unwrap();
        db.insert_parent(&testing::parent(user.id, school.id)).unwrap()
    }

    #[test]
    fn test_roll_number_is_unique_per_class() {
        let db = test_db();
        let (school, class) = setup(&db);
        enrol(&db, &school, &class, "s1@b.com", "7").unwrap();
        let err = enrol(&db, &school, &class, "s2@b.com", "7").unwrap_err();
        assert!(err.is_unique_violation(), "{err}");

        let other = db.insert_class(&testing::class(school.id, "10", "B")).unwrap();
        enrol(&db, &school, &other, "s3@b.com", "7").unwrap();
    }

    #[test]
    fn test_students_in_class_orders_by_roll_and_filters_inactive() {
        let db = test_db();
        let (school, class) = setup(&db);
        let b = enrol(&db, &school, &class, "s2@b.com", "2").unwrap();
        enrol(&db, &school, &class, "s1@b.com", "1").unwrap();

        let rolls: Vec<_> = db
            .students_in_class(class.id, false)
            .unwrap()
            .into_iter()
            .map(|s| s.roll_number)
            .collect();
        assert_eq!(rolls, ["1", "2"]);

        db.set_student_active(b.id, false).unwrap();
        assert_eq!(db.students_in_class(class.id, true).unwrap().len(), 1);
    }

    #[test]
    fn test_parent_links_both_ways() {
        let db = test_db();
        let (school, class) = setup(&db);
        let child = enrol(&db, &school, &class, "s@b.com", "1").unwrap();
        let mother = parent(&db, &school, "m@b.com");
        let uncle = parent(&db, &school, "u@b.com");

        db.link_parent(child.id, uncle.id, false).unwrap();
        db.link_parent(child.id, mother.id, true).unwrap();

        let parents = db.parents_of_student(child.id).unwrap();
        assert_eq!(parents[0].id, mother.id);
        assert_eq!(parents.len(), 2);
        assert_eq!(parents[1].relationship_type, RelationshipType::Guardian);

        let children = db.children_of_parent(uncle.id).unwrap();
        assert_eq!(children, vec![child.clone()]);

        let err = db.link_parent(child.id, mother.id, false).unwrap_err();
        assert!(err.is_unique_violation(), "{err}");

        db.unlink_parent(child.id, uncle.id).unwrap();
        assert!(db.children_of_parent(uncle.id).unwrap().is_empty());
    }

    #[test]
    fn test_student_must_reference_existing_class() {
        let db = test_db();
        let (school, _) = setup(&db);
        let user = db
            .insert_user(
                &testing::user(UserRole::Student, Some(school.id), "s@b.com"),
                &testing::password_hash(),
            )
            .unwrap();
        let err = db
            .insert_student(&testing::student(user.id, school.id, Uuid::new_v4(), "1"))
            .unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));
    }

    #[test]
    fn test_employee_id_is_unique_per_school() {
        let db = test_db();
        let (school, _) = setup(&db);
        let hash = testing::password_hash();
        let t1 = db
            .insert_user(&testing::user(UserRole::Teacher, Some(school.id), "t1@b.com"), &hash)
            .unwrap();
        let t2 = db
            .insert_user(&testing::user(UserRole::Teacher, Some(school.id), "t2@b.com"), &hash)
            .unwrap();
        let teacher = db.insert_teacher(&testing::teacher(t1.id, school.id, "EMP-1")).unwrap();
        assert_eq!(db.teacher_by_user(t1.id).unwrap(), Some(teacher));

        let err = db
            .insert_teacher(&testing::teacher(t2.id, school.id, "EMP-1"))
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    fn foreign_school(err: &StoreError, field: &str) -> bool {
        matches!(err, StoreError::Validation(errors)
            if errors.contains(&ValidationError::ForeignSchool { field: field.to_string() }))
    }

    fn user(db: &Db, role: UserRole, school: &School, email: &str) -> schoolbase_core::User {
        db.insert_user(&testing::user(role, Some(school.id), email), &testing::password_hash())
            .unwrap()
    }

    #[test]
    fn test_student_cannot_join_another_schools_class() {
        let db = test_db();
        let (school, class) = setup(&db);
        let other = db.insert_school(&testing::school("other@b.com")).unwrap();
        let foreign_class = db.insert_class(&testing::class(other.id, "10", "A")).unwrap();
        let pupil = user(&db, UserRole::Student, &school, "s@b.com");

        let err = db
            .insert_student(&testing::student(pupil.id, school.id, foreign_class.id, "1"))
            .unwrap_err();
        assert!(foreign_school(&err, "class_id"), "{err}");
        assert!(db.students_in_class(foreign_class.id, false).unwrap().is_empty());

        let outsider = user(&db, UserRole::Student, &other, "o@b.com");
        let err = db
            .insert_student(&testing::student(outsider.id, school.id, class.id, "2"))
            .unwrap_err();
        assert!(foreign_school(&err, "user_id"), "{err}");
    }

    #[test]
    fn test_profiles_need_a_user_of_the_same_school_and_role() {
        let db = test_db();
        let (school, _) = setup(&db);
        let other = db.insert_school(&testing::school("other@b.com")).unwrap();

        let foreign_teacher = user(&db, UserRole::Teacher, &other, "t@b.com");
        let err = db
            .insert_teacher(&testing::teacher(foreign_teacher.id, school.id, "EMP-1"))
            .unwrap_err();
        assert!(foreign_school(&err, "user_id"), "{err}");

        let foreign_parent = user(&db, UserRole::Parent, &other, "p@b.com");
        let err = db
            .insert_parent(&testing::parent(foreign_parent.id, school.id))
            .unwrap_err();
        assert!(foreign_school(&err, "user_id"), "{err}");

        let pupil = user(&db, UserRole::Student, &school, "s@b.com");
        let err = db
            .insert_teacher(&testing::teacher(pupil.id, school.id, "EMP-2"))
            .unwrap_err();
        let StoreError::Validation(errors) = err else {
            panic!("expected a validation error");
        };
        assert!(matches!(
            &errors[..],
            [ValidationError::WrongRole { role, .. }] if role == "student"
        ));
        assert!(db.teachers_for_school(school.id).unwrap().is_empty());
    }

    #[test]
    fn test_parent_link_stays_within_school() {
        let db = test_db();
        let (school, class) = setup(&db);
        let other = db.insert_school(&testing::school("other@b.com")).unwrap();
        let child = enrol(&db, &school, &class, "s@b.com", "1").unwrap();
        let stranger = parent(&db, &other, "p@b.com");

        let err = db.link_parent(child.id, stranger.id, true).unwrap_err();
        assert!(foreign_school(&err, "parent_id"), "{err}");
        assert!(db.parents_of_student(child.id).unwrap().is_empty());
    }

    #[test]
    fn test_reactivating_student_respects_plan_limit() {
        let db = test_db();
        let plan = db
            .insert_subscription(&NewSubscription {
                name: "Tiny".into(),
                plan_type: PlanType::Free,
                price: 0,
                billing_cycle: BillingCycle::Monthly,
                limits: PlanLimits {
                    max_students: 1,
                    max_teachers: 1,
                    max_classes: 5,
                },
                features: SubscriptionFeatures::default(),
            })
            .unwrap();
        let mut new_school = testing::school("a@b.com");
        new_school.subscription_id = Some(plan.id);
        let school = db.insert_school(&new_school).unwrap();
        let class = db.insert_class(&testing::class(school.id, "10", "A")).unwrap();

        let first = enrol(&db, &school, &class, "s1@b.com", "1").unwrap();
        db.set_student_active(first.id, false).unwrap();
        enrol(&db, &school, &class, "s2@b.com", "2").unwrap();

        let err = db.set_student_active(first.id, true).unwrap_err();
        assert!(matches!(
            err,
            StoreError::PlanLimitExceeded {
                resource: PlanResource::Students,
                limit: 1
            }
        ));
        assert!(!db.get_student(first.id).unwrap().unwrap().is_active);

        let t1 = user(&db, UserRole::Teacher, &school, "t1@b.com");
        let t2 = user(&db, UserRole::Teacher, &school, "t2@b.com");
        let kept = db.insert_teacher(&testing::teacher(t1.id, school.id, "EMP-1")).unwrap();
        db.set_teacher_active(kept.id, false).unwrap();
        db.insert_teacher(&testing::teacher(t2.id, school.id, "EMP-2")).unwrap();
        let err = db.set_teacher_active(kept.id, true).unwrap_err();
        assert!(matches!(err, StoreError::PlanLimitExceeded { .. }), "{err}");

        db.set_student_active(first.id, false).unwrap();
    }

    #[test]
    fn test_deleting_school_cascades() {
        let db = test_db();
        let (school, class) = setup(&db);
        let student = enrol(&db, &school, &class, "s@b.com", "1").unwrap();

        db.delete_school(school.id).unwrap();
        assert!(db.get_class(class.id).unwrap().is_none());
        assert!(db.get_student(student.id).unwrap().is_none());
        assert!(db.get_user_by_email("s@b.com").unwrap().is_none());
    }
}

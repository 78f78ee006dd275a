use chrono::NaiveDate;
use rusqlite::Row;
use schoolbase_core::validate::{
    validate_new_attendance, validate_new_class, validate_new_subject, validate_timetable,
};
use schoolbase_core::{
    Attendance, AttendanceStatus, AttendanceSummary, Class, NewAttendance, NewClass, NewSubject,
    PlanResource, Subject, Timetable,
};
use schoolbase_schema::db::academics as sql;
use uuid::Uuid;

use crate::bind::{execute, fetch_all, fetch_optional};
use crate::db::Db;
use crate::decode;
use crate::error::{Result, StoreError};
use crate::repo::{STAFF, SameSchool, check_plan_limit, touched};

impl Db {
    // ── Classes ────────────────────────────────────────────────────────────

    pub fn insert_class(&self, class: &NewClass) -> Result<Class> {
        validate_new_class(class)?;
        let timetable = class
            .timetable
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let id = Uuid::new_v4();
        self.write(|tx| {
            let mut scope = SameSchool::new(tx, class.school_id);
            if let Some(teacher) = class.class_teacher_id {
                scope.user("class_teacher_id", teacher, STAFF)?;
            }
            scope.finish()?;
            check_plan_limit(tx, class.school_id, PlanResource::Classes)?;
            execute(tx, sql::insert_class(id, class, timetable.as_deref()))?;
            fetch_optional(tx, sql::get_class(id), row_to_class)?
                .ok_or_else(|| StoreError::not_found("class", id))
        })
    }

    pub fn get_class(&self, id: Uuid) -> Result<Option<Class>> {
        fetch_optional(&self.conn(), sql::get_class(id), row_to_class)
    }

    /// Look a class up by its natural key.
    pub fn find_class(&self, school_id: Uuid, grade: &str, section: &str) -> Result<Option<Class>> {
        fetch_optional(
            &self.conn(),
            sql::find_class(school_id, grade, section),
            row_to_class,
        )
    }

    pub fn classes_for_school(&self, school_id: Uuid) -> Result<Vec<Class>> {
        fetch_all(&self.conn(), sql::classes_for_school(school_id), row_to_class)
    }

    /// The teacher must be a teacher or school admin of the class's school.
    pub fn assign_class_teacher(&self, class_id: Uuid, teacher_user_id: Option<Uuid>) -> Result<()> {
        self.write(|tx| {
            let class = fetch_optional(tx, sql::get_class(class_id), row_to_class)?
                .ok_or_else(|| StoreError::not_found("class", class_id))?;
            if let Some(teacher) = teacher_user_id {
                SameSchool::new(tx, class.school_id)
                    .user("class_teacher_id", teacher, STAFF)?
                    .finish()?;
            }
            let rows = execute(tx, sql::assign_class_teacher(class_id, teacher_user_id))?;
            touched(rows, "class", class_id)
        })
    }

    pub fn set_timetable(&self, class_id: Uuid, timetable: Option<&Timetable>) -> Result<()> {
        if let Some(timetable) = timetable {
            validate_timetable(timetable)?;
        }
        let json = timetable.map(serde_json::to_string).transpose()?;
        let rows = execute(&self.conn(), sql::set_timetable(class_id, json.as_deref()))?;
        touched(rows, "class", class_id)
    }

    /// Reactivating counts against the plan limit like a new class.
    pub fn set_class_active(&self, class_id: Uuid, active: bool) -> Result<()> {
        self.write(|tx| {
            let class = fetch_optional(tx, sql::get_class(class_id), row_to_class)?
                .ok_or_else(|| StoreError::not_found("class", class_id))?;
            if active && !class.is_active {
                check_plan_limit(tx, class.school_id, PlanResource::Classes)?;
            }
            let rows = execute(tx, sql::set_class_active(class_id, active))?;
            touched(rows, "class", class_id)
        })
    }

    /// Hard delete. Students and attendance of the class are removed with it.
    pub fn delete_class(&self, class_id: Uuid) -> Result<()> {
        let rows = execute(&self.conn(), sql::delete_class(class_id))?;
        touched(rows, "class", class_id)
    }

    // ── Subjects ───────────────────────────────────────────────────────────

    pub fn insert_subject(&self, subject: &NewSubject) -> Result<Subject> {
        validate_new_subject(subject)?;
        let id = Uuid::new_v4();
        self.write(|tx| {
            let mut scope = SameSchool::new(tx, subject.school_id);
            if let Some(class_id) = subject.class_id {
                scope.class("class_id", class_id)?;
            }
            if let Some(teacher) = subject.teacher_id {
                scope.user("teacher_id", teacher, STAFF)?;
            }
            scope.finish()?;
            execute(tx, sql::insert_subject(id, subject))?;
            fetch_optional(tx, sql::get_subject(id), row_to_subject)?
                .ok_or_else(|| StoreError::not_found("subject", id))
        })
    }

    pub fn get_subject(&self, id: Uuid) -> Result<Option<Subject>> {
        fetch_optional(&self.conn(), sql::get_subject(id), row_to_subject)
    }

    pub fn subjects_for_school(&self, school_id: Uuid) -> Result<Vec<Subject>> {
        fetch_all(&self.conn(), sql::subjects_for_school(school_id), row_to_subject)
    }

    pub fn subjects_for_class(&self, class_id: Uuid) -> Result<Vec<Subject>> {
        fetch_all(&self.conn(), sql::subjects_for_class(class_id), row_to_subject)
    }

    pub fn assign_subject_teacher(&self, subject_id: Uuid, teacher_user_id: Option<Uuid>) -> Result<()> {
        self.write(|tx| {
            let subject = fetch_optional(tx, sql::get_subject(subject_id), row_to_subject)?
                .ok_or_else(|| StoreError::not_found("subject", subject_id))?;
            if let Some(teacher) = teacher_user_id {
                SameSchool::new(tx, subject.school_id)
                    .user("teacher_id", teacher, STAFF)?
                    .finish()?;
            }
            let rows = execute(tx, sql::assign_subject_teacher(subject_id, teacher_user_id))?;
            touched(rows, "subject", subject_id)
        })
    }

    // ── Attendance ─────────────────────────────────────────────────────────

    /// Record one mark. A second mark for the same student, class, date and
    /// period is a unique violation; use [`Db::update_attendance`] to correct it.
    pub fn mark_attendance(&self, record: &NewAttendance) -> Result<Attendance> {
        validate_new_attendance(record)?;
        let id = Uuid::new_v4();
        self.write(|tx| {
            let mut scope = SameSchool::new(tx, record.school_id);
            scope
                .student("student_id", record.student_id)?
                .class("class_id", record.class_id)?;
            if let Some(marker) = record.marked_by {
                scope.user("marked_by", marker, &[])?;
            }
            scope.finish()?;
            execute(tx, sql::insert_attendance(id, record))?;
            fetch_optional(tx, sql::get_attendance(id), row_to_attendance)?
                .ok_or_else(|| StoreError::not_found("attendance", id))
        })
    }

    pub fn update_attendance(
        &self,
        id: Uuid,
        status: AttendanceStatus,
        remarks: Option<&str>,
        marked_by: Option<Uuid>,
    ) -> Result<Attendance> {
        self.write(|tx| {
            let current = fetch_optional(tx, sql::get_attendance(id), row_to_attendance)?
                .ok_or_else(|| StoreError::not_found("attendance", id))?;
            if let Some(marker) = marked_by {
                SameSchool::new(tx, current.school_id)
                    .user("marked_by", marker, &[])?
                    .finish()?;
            }
            let rows = execute(tx, sql::update_attendance(id, status, remarks, marked_by))?;
            touched(rows, "attendance", id)?;
            fetch_optional(tx, sql::get_attendance(id), row_to_attendance)?
                .ok_or_else(|| StoreError::not_found("attendance", id))
        })
    }

    pub fn attendance_for_class_on(&self, class_id: Uuid, on: NaiveDate) -> Result<Vec<Attendance>> {
        fetch_all(
            &self.conn(),
            sql::attendance_for_class_on(class_id, on),
            row_to_attendance,
        )
    }

    /// Marks of one student over an inclusive date range.
    pub fn attendance_for_student(
        &self,
        student_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Attendance>> {
        fetch_all(
            &self.conn(),
            sql::attendance_for_student(student_id, from, to),
            row_to_attendance,
        )
    }

    pub fn attendance_summary(
        &self,
        student_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AttendanceSummary> {
        let counts = fetch_all(
            &self.conn(),
            sql::attendance_summary(student_id, from, to),
            |row| Ok((decode::variant::<AttendanceStatus>(row, 0)?, row.get::<_, i64>(1)?)),
        )?;
        let mut summary = AttendanceSummary::default();
        for (status, n) in counts {
            summary.add(status, n);
        }
        Ok(summary)
    }
}

pub(crate) fn row_to_class(row: &Row<'_>) -> rusqlite::Result<Class> {
    Ok(Class {
        id: decode::uuid(row, 0)?,
        school_id: decode::uuid(row, 1)?,
        grade: row.get(2)?,
        section: row.get(3)?,
        class_teacher_id: decode::opt_uuid(row, 4)?,
        academic_year: row.get(5)?,
        room_number: row.get(6)?,
        capacity: row.get(7)?,
        timetable: decode::opt_json(row, 8)?,
        is_active: row.get(9)?,
        created_at: decode::stamp(row, 10)?,
        updated_at: decode::stamp(row, 11)?,
    })
}

fn row_to_subject(row: &Row<'_>) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: decode::uuid(row, 0)?,
        school_id: decode::uuid(row, 1)?,
        name: row.get(2)?,
        code: row.get(3)?,
        description: row.get(4)?,
        class_id: decode::opt_uuid(row, 5)?,
        teacher_id: decode::opt_uuid(row, 6)?,
        is_active: row.get(7)?,
        created_at: decode::stamp(row, 8)?,
        updated_at: decode::stamp(row, 9)?,
    })
}

fn row_to_attendance(row: &Row<'_>) -> rusqlite::Result<Attendance> {
    Ok(Attendance {
        id: decode::uuid(row, 0)?,
        school_id: decode::uuid(row, 1)?,
        student_id: decode::uuid(row, 2)?,
        class_id: decode::uuid(row, 3)?,
        date: decode::date(row, 4)?,
        period: row.get(5)?,
        status: decode::variant(row, 6)?,
        marked_by: decode::opt_uuid(row, 7)?,
        remarks: row.get(8)?,
        created_at: decode::stamp(row, 9)?,
        updated_at: decode::stamp(row, 10)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use schoolbase_core::testing;
    use schoolbase_core::{
        BillingCycle, DayOfWeek, NewSubscription, PlanLimits, PlanType, SubscriptionFeatures,
        TimetableDay, TimetableSlot, UserRole,
    };

    use schoolbase_core::validate::ValidationError;

    use super::*;
    use crate::ConstraintKind;
    use crate::repo::test_db;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn mark(school: Uuid, student: Uuid, class: Uuid, period: i64) -> NewAttendance {
        NewAttendance {
            school_id: school,
            student_id: student,
            class_id: class,
            date: day(3),
            period,
            status: AttendanceStatus::Present,
            marked_by: None,
            remarks: None,
        }
    }

    fn timetable(period: i64) -> Timetable {
        let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        Timetable {
            days: vec![TimetableDay {
                day: DayOfWeek::Monday,
                slots: vec![TimetableSlot {
                    period,
                    subject_id: None,
                    teacher_id: None,
                    starts_at: at(8),
                    ends_at: at(9),
                }],
            }],
        }
    }

    #[test]
    fn test_duplicate_class_is_unique_violation() {
        let db = test_db();
        let school = db.insert_school(&testing::school("a@b.com")).unwrap();
        let teacher = db
            .insert_user(
                &testing::user(UserRole::Teacher, Some(school.id), "t@b.com"),
                &testing::password_hash(),
            )
            .unwrap();
        let mut class = testing::class(school.id, "10", "A");
        class.class_teacher_id = Some(teacher.id);
        let created = db.insert_class(&class).unwrap();
        assert_eq!(created.label(), "10-A");
        assert_eq!(db.class_teacher(created.id).unwrap().unwrap().id, teacher.id);

        let err = db.insert_class(&class).unwrap_err();
        assert!(err.is_unique_violation(), "{err}");
    }

    #[test]
    fn test_capacity_bounds() {
        let db = test_db();
        let school = db.insert_school(&testing::school("a@b.com")).unwrap();
        let mut class = testing::class(school.id, "10", "A");
        class.capacity = 0;
        assert!(matches!(db.insert_class(&class), Err(StoreError::Validation(_))));

        let err = db
            .conn()
            .execute(
                "INSERT INTO classes (id, school_id, grade, section, capacity) VALUES ('c', ?1, '1', 'A', 500)",
                [school.id.to_string()],
            )
            .map_err(StoreError::from)
            .unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Check));
    }

    #[test]
    fn test_timetable_round_trips_through_json_column() {
        let db = test_db();
        let school = db.insert_school(&testing::school("a@b.com")).unwrap();
        let class = db.insert_class(&testing::class(school.id, "9", "B")).unwrap();
        assert!(class.timetable.is_none());

        db.set_timetable(class.id, Some(&timetable(1))).unwrap();
        let stored = db.get_class(class.id).unwrap().unwrap();
        assert_eq!(stored.timetable, Some(timetable(1)));

        let err = db.set_timetable(class.id, Some(&timetable(99))).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_class_limit_follows_plan() {
        let db = test_db();
        let plan = db
            .insert_subscription(&NewSubscription {
                name: "Tiny".into(),
                plan_type: PlanType::Free,
                price: 0,
                billing_cycle: BillingCycle::Monthly,
                limits: PlanLimits {
                    max_students: 10,
                    max_teachers: 1,
                    max_classes: 1,
                },
                features: SubscriptionFeatures::default(),
            })
            .unwrap();
        let mut school = testing::school("a@b.com");
        school.subscription_id = Some(plan.id);
        let school = db.insert_school(&school).unwrap();

        db.insert_class(&testing::class(school.id, "1", "A")).unwrap();
        let err = db.insert_class(&testing::class(school.id, "1", "B")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::PlanLimitExceeded {
                resource: PlanResource::Classes,
                limit: 1
            }
        ));
    }

    #[test]
    fn test_attendance_is_unique_per_period() {
        let db = test_db();
        let school = db.insert_school(&testing::school("a@b.com")).unwrap();
        let class = db.insert_class(&testing::class(school.id, "10", "A")).unwrap();
        let user = db
            .insert_user(
                &testing::user(UserRole::Student, Some(school.id), "s@b.com"),
                &testing::password_hash(),
            )
            .unwrap();
        let student = db
            .insert_student(&testing::student(user.id, school.id, class.id, "1"))
            .unwrap();

        let first = db.mark_attendance(&mark(school.id, student.id, class.id, 1)).unwrap();
        db.mark_attendance(&mark(school.id, student.id, class.id, 2)).unwrap();
        let err = db
            .mark_attendance(&mark(school.id, student.id, class.id, 1))
            .unwrap_err();
        assert!(err.is_unique_violation());

        let fixed = db
            .update_attendance(first.id, AttendanceStatus::Late, Some("bus delay"), None)
            .unwrap();
        assert_eq!(fixed.status, AttendanceStatus::Late);

        assert_eq!(db.attendance_for_class_on(class.id, day(3)).unwrap().len(), 2);
        let summary = db.attendance_summary(student.id, day(1), day(30)).unwrap();
        assert_eq!((summary.present, summary.late, summary.total()), (1, 1, 2));
        assert!(db.attendance_for_student(student.id, day(4), day(30)).unwrap().is_empty());
    }

    #[test]
    fn test_period_out_of_range_is_rejected() {
        let db = test_db();
        let record = mark(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), 13);
        assert!(matches!(db.mark_attendance(&record), Err(StoreError::Validation(_))));
    }

    fn staff(db: &Db, role: UserRole, school: Uuid, email: &str) -> schoolbase_core::User {
        db.insert_user(&testing::user(role, Some(school), email), &testing::password_hash())
            .unwrap()
    }

    fn rejected(err: StoreError) -> Vec<ValidationError> {
        match err {
            StoreError::Validation(errors) => errors,
            other => panic!("expected a validation error, got {other}"),
        }
    }

    #[test]
    fn test_class_teacher_must_be_staff_of_the_same_school() {
        let db = test_db();
        let a = db.insert_school(&testing::school("a@b.com")).unwrap();
        let b = db.insert_school(&testing::school("b@b.com")).unwrap();
        let class_b = db.insert_class(&testing::class(b.id, "10", "A")).unwrap();
        let parent_a = staff(&db, UserRole::Parent, a.id, "p@a.com");

        let errors = rejected(db.assign_class_teacher(class_b.id, Some(parent_a.id)).unwrap_err());
        assert_eq!(
            errors,
            vec![
                ValidationError::ForeignSchool {
                    field: "class_teacher_id".into()
                },
                ValidationError::WrongRole {
                    field: "class_teacher_id".into(),
                    role: "parent".into(),
                    expected: "teacher, school_admin".into(),
                },
            ]
        );
        assert_eq!(db.get_class(class_b.id).unwrap().unwrap().class_teacher_id, None);

        let teacher_a = staff(&db, UserRole::Teacher, a.id, "t@a.com");
        let mut class = testing::class(b.id, "9", "C");
        class.class_teacher_id = Some(teacher_a.id);
        let errors = rejected(db.insert_class(&class).unwrap_err());
        assert!(matches!(&errors[..], [ValidationError::ForeignSchool { .. }]));

        let admin_b = staff(&db, UserRole::SchoolAdmin, b.id, "admin@b.com");
        db.assign_class_teacher(class_b.id, Some(admin_b.id)).unwrap();
        db.assign_class_teacher(class_b.id, None).unwrap();
    }

    #[test]
    fn test_subject_links_stay_within_school() {
        let db = test_db();
        let a = db.insert_school(&testing::school("a@b.com")).unwrap();
        let b = db.insert_school(&testing::school("b@b.com")).unwrap();
        let class_b = db.insert_class(&testing::class(b.id, "10", "A")).unwrap();
        let teacher_b = staff(&db, UserRole::Teacher, b.id, "t@b.com");

        let subject = NewSubject {
            school_id: a.id,
            name: "Mathematics".into(),
            code: "MATH10".into(),
            description: None,
            class_id: Some(class_b.id),
            teacher_id: Some(teacher_b.id),
        };
        let errors = rejected(db.insert_subject(&subject).unwrap_err());
        assert_eq!(errors.len(), 2);

        let own = db
            .insert_subject(&NewSubject {
                class_id: None,
                teacher_id: None,
                ..subject
            })
            .unwrap();
        let errors = rejected(db.assign_subject_teacher(own.id, Some(teacher_b.id)).unwrap_err());
        assert!(matches!(&errors[..], [ValidationError::ForeignSchool { .. }]));
    }

    #[test]
    fn test_attendance_cannot_mix_schools() {
        let db = test_db();
        let a = db.insert_school(&testing::school("a@b.com")).unwrap();
        let b = db.insert_school(&testing::school("b@b.com")).unwrap();
        let class_a = db.insert_class(&testing::class(a.id, "10", "A")).unwrap();
        let class_b = db.insert_class(&testing::class(b.id, "10", "A")).unwrap();
        let user = staff(&db, UserRole::Student, a.id, "s@a.com");
        let student = db
            .insert_student(&testing::student(user.id, a.id, class_a.id, "1"))
            .unwrap();

        let errors = rejected(
            db.mark_attendance(&mark(a.id, student.id, class_b.id, 1))
                .unwrap_err(),
        );
        assert_eq!(errors, vec![ValidationError::ForeignSchool { field: "class_id".into() }]);

        let errors = rejected(
            db.mark_attendance(&mark(b.id, student.id, class_b.id, 1))
                .unwrap_err(),
        );
        assert_eq!(errors, vec![ValidationError::ForeignSchool { field: "student_id".into() }]);

        let outsider = staff(&db, UserRole::Teacher, b.id, "t@b.com");
        let mut record = mark(a.id, student.id, class_a.id, 1);
        record.marked_by = Some(outsider.id);
        rejected(db.mark_attendance(&record).unwrap_err());

        record.marked_by = None;
        let stored = db.mark_attendance(&record).unwrap();
        rejected(
            db.update_attendance(stored.id, AttendanceStatus::Absent, None, Some(outsider.id))
                .unwrap_err(),
        );
        assert!(db.attendance_for_class_on(class_b.id, day(3)).unwrap().is_empty());
    }

    #[test]
    fn test_reactivating_class_respects_plan_limit() {
        let db = test_db();
        let plan = db
            .insert_subscription(&NewSubscription {
                name: "Tiny".into(),
                plan_type: PlanType::Free,
                price: 0,
                billing_cycle: BillingCycle::Monthly,
                limits: PlanLimits {
                    max_students: 10,
                    max_teachers: 1,
                    max_classes: 1,
                },
                features: SubscriptionFeatures::default(),
            })
            .unwrap();
        let mut school = testing::school("a@b.com");
        school.subscription_id = Some(plan.id);
        let school = db.insert_school(&school).unwrap();

        let first = db.insert_class(&testing::class(school.id, "1", "A")).unwrap();
        db.set_class_active(first.id, false).unwrap();
        db.insert_class(&testing::class(school.id, "1", "B")).unwrap();

        let err = db.set_class_active(first.id, true).unwrap_err();
        assert!(matches!(
            err,
            StoreError::PlanLimitExceeded {
                resource: PlanResource::Classes,
                limit: 1
            }
        ));
        assert!(!db.get_class(first.id).unwrap().unwrap().is_active);
    }

    #[test]
    fn test_deleting_teacher_clears_class_teacher() {
        let db = test_db();
        let school = db.insert_school(&testing::school("a@b.com")).unwrap();
        let teacher = db
            .insert_user(
                &testing::user(UserRole::Teacher, Some(school.id), "t@b.com"),
                &testing::password_hash(),
            )
            .unwrap();
        let class = db.insert_class(&testing::class(school.id, "10", "A")).unwrap();
        db.assign_class_teacher(class.id, Some(teacher.id)).unwrap();

        db.delete_user(teacher.id).unwrap();
        let class = db.get_class(class.id).unwrap().unwrap();
        assert_eq!(class.class_teacher_id, None);
    }
}

//! Classes, their timetables, subjects, and attendance.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{AttendanceStatus, DayOfWeek};

/// Highest teaching period in a day. Period `0` on attendance means the whole day.
pub const MAX_PERIOD: i64 = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub id: Uuid,
    pub school_id: Uuid,
    pub grade: String,
    pub section: String,
    pub class_teacher_id: Option<Uuid>,
    pub academic_year: Option<String>,
    pub room_number: Option<String>,
    pub capacity: i64,
    pub timetable: Option<Timetable>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Class {
    /// `"10-A"` style label.
    pub fn label(&self) -> String {
        format!("{}-{}", self.grade, self.section)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewClass {
    pub school_id: Uuid,
    pub grade: String,
    pub section: String,
    pub class_teacher_id: Option<Uuid>,
    pub academic_year: Option<String>,
    pub room_number: Option<String>,
    pub capacity: i64,
    pub timetable: Option<Timetable>,
}

/// Weekly schedule of a class, stored as a JSON column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timetable {
    #[serde(default)]
    pub days: Vec<TimetableDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableDay {
    pub day: DayOfWeek,
    #[serde(default)]
    pub slots: Vec<TimetableSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableSlot {
    pub period: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<Uuid>,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
}

impl Timetable {
    pub fn slots_for(&self, day: DayOfWeek) -> &[TimetableSlot] {
        self.days
            .iter()
            .find(|d| d.day == day)
            .map(|d| d.slots.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
    pub school_id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub class_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSubject {
    pub school_id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub class_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: Uuid,
    pub school_id: Uuid,
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub date: NaiveDate,
    pub period: i64,
    pub status: AttendanceStatus,
    pub marked_by: Option<Uuid>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendance {
    pub school_id: Uuid,
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub date: NaiveDate,
    pub period: i64,
    pub status: AttendanceStatus,
    pub marked_by: Option<Uuid>,
    pub remarks: Option<String>,
}

/// Per-status counts for one student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    pub present: i64,
    pub absent: i64,
    pub late: i64,
    pub excused: i64,
    pub half_day: i64,
}

impl AttendanceSummary {
    pub fn add(&mut self, status: AttendanceStatus, count: i64) {
        match status {
            AttendanceStatus::Present => self.present += count,
            AttendanceStatus::Absent => self.absent += count,
            AttendanceStatus::Late => self.late += count,
            AttendanceStatus::Excused => self.excused += count,
            AttendanceStatus::HalfDay => self.half_day += count,
        }
    }

    pub fn total(&self) -> i64 {
        self.present + self.absent + self.late + self.excused + self.half_day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timetable_json_shape() {
        let raw = r#"{"days":[{"day":"monday","slots":[
            {"period":1,"starts_at":"08:00:00","ends_at":"08:45:00"}
        ]}]}"#;
        let timetable: Timetable = serde_json::from_str(raw).unwrap();
        assert_eq!(timetable.slots_for(DayOfWeek::Monday).len(), 1);
        assert!(timetable.slots_for(DayOfWeek::Friday).is_empty());
    }

    #[test]
    fn test_summary_totals() {
        let mut summary = AttendanceSummary::default();
        summary.add(AttendanceStatus::Present, 3);
        summary.add(AttendanceStatus::HalfDay, 1);
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.half_day, 1);
    }
}

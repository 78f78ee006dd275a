//! Compile-time–checked column identifiers for all tables.
//!
//! The `*_COLUMNS` arrays fix the SELECT order that row decoders rely on.

use sea_query::Iden;

#[derive(Iden, Clone, Copy)]
pub enum Subscriptions {
    Table,
    Id,
    Name,
    PlanType,
    Price,
    BillingCycle,
    MaxStudents,
    MaxTeachers,
    MaxClasses,
    Features,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

pub const SUBSCRIPTION_COLUMNS: [Subscriptions; 12] = [
    Subscriptions::Id,
    Subscriptions::Name,
    Subscriptions::PlanType,
    Subscriptions::Price,
    Subscriptions::BillingCycle,
    Subscriptions::MaxStudents,
    Subscriptions::MaxTeachers,
    Subscriptions::MaxClasses,
    Subscriptions::Features,
    Subscriptions::IsActive,
    Subscriptions::CreatedAt,
    Subscriptions::UpdatedAt,
];

#[derive(Iden, Clone, Copy)]
pub enum Schools {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Address,
    City,
    State,
    Website,
    SubscriptionId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

pub const SCHOOL_COLUMNS: [Schools; 12] = [
    Schools::Id,
    Schools::Name,
    Schools::Email,
    Schools::Phone,
    Schools::Address,
    Schools::City,
    Schools::State,
    Schools::Website,
    Schools::SubscriptionId,
    Schools::IsActive,
    Schools::CreatedAt,
    Schools::UpdatedAt,
];

#[derive(Iden, Clone, Copy)]
pub enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    PasswordSalt,
    FirstName,
    LastName,
    Phone,
    Role,
    SchoolId,
    IsActive,
    LastLoginAt,
    CreatedAt,
    UpdatedAt,
}

/// Everything except the credential columns.
pub const USER_COLUMNS: [Users; 11] = [
    Users::Id,
    Users::Email,
    Users::FirstName,
    Users::LastName,
    Users::Phone,
    Users::Role,
    Users::SchoolId,
    Users::IsActive,
    Users::LastLoginAt,
    Users::CreatedAt,
    Users::UpdatedAt,
];

#[derive(Iden, Clone, Copy)]
pub enum Classes {
    Table,
    Id,
    SchoolId,
    Grade,
    Section,
    ClassTeacherId,
    AcademicYear,
    RoomNumber,
    Capacity,
    Timetable,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

pub const CLASS_COLUMNS: [Classes; 12] = [
    Classes::Id,
    Classes::SchoolId,
    Classes::Grade,
    Classes::Section,
    Classes::ClassTeacherId,
    Classes::AcademicYear,
    Classes::RoomNumber,
    Classes::Capacity,
    Classes::Timetable,
    Classes::IsActive,
    Classes::CreatedAt,
    Classes::UpdatedAt,
];

#[derive(Iden, Clone, Copy)]
pub enum Subjects {
    Table,
    Id,
    SchoolId,
    Name,
    Code,
    Description,
    ClassId,
    TeacherId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

pub const SUBJECT_COLUMNS: [Subjects; 10] = [
    Subjects::Id,
    Subjects::SchoolId,
    Subjects::Name,
    Subjects::Code,
    Subjects::Description,
    Subjects::ClassId,
    Subjects::TeacherId,
    Subjects::IsActive,
    Subjects::CreatedAt,
    Subjects::UpdatedAt,
];

#[derive(Iden, Clone, Copy)]
pub enum Teachers {
    Table,
    Id,
    UserId,
    SchoolId,
    EmployeeId,
    Qualification,
    Specialization,
    ExperienceYears,
    JoiningDate,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

pub const TEACHER_COLUMNS: [Teachers; 11] = [
    Teachers::Id,
    Teachers::UserId,
    Teachers::SchoolId,
    Teachers::EmployeeId,
    Teachers::Qualification,
    Teachers::Specialization,
    Teachers::ExperienceYears,
    Teachers::JoiningDate,
    Teachers::IsActive,
    Teachers::CreatedAt,
    Teachers::UpdatedAt,
];

#[derive(Iden, Clone, Copy)]
pub enum Students {
    Table,
    Id,
    UserId,
    SchoolId,
    ClassId,
    RollNumber,
    AdmissionNumber,
    DateOfBirth,
    Gender,
    BloodGroup,
    Address,
    AdmissionDate,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

pub const STUDENT_COLUMNS: [Students; 14] = [
    Students::Id,
    Students::UserId,
    Students::SchoolId,
    Students::ClassId,
    Students::RollNumber,
    Students::AdmissionNumber,
    Students::DateOfBirth,
    Students::Gender,
    Students::BloodGroup,
    Students::Address,
    Students::AdmissionDate,
    Students::IsActive,
    Students::CreatedAt,
    Students::UpdatedAt,
];

#[derive(Iden, Clone, Copy)]
pub enum Parents {
    Table,
    Id,
    UserId,
    SchoolId,
    RelationshipType,
    Occupation,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

pub const PARENT_COLUMNS: [Parents; 8] = [
    Parents::Id,
    Parents::UserId,
    Parents::SchoolId,
    Parents::RelationshipType,
    Parents::Occupation,
    Parents::IsActive,
    Parents::CreatedAt,
    Parents::UpdatedAt,
];

#[derive(Iden, Clone, Copy)]
pub enum StudentParents {
    Table,
    StudentId,
    ParentId,
    IsPrimary,
    CreatedAt,
}

#[derive(Iden, Clone, Copy)]
pub enum Attendance {
    Table,
    Id,
    SchoolId,
    StudentId,
    ClassId,
    Date,
    Period,
    Status,
    MarkedBy,
    Remarks,
    CreatedAt,
    UpdatedAt,
}

pub const ATTENDANCE_COLUMNS: [Attendance; 11] = [
    Attendance::Id,
    Attendance::SchoolId,
    Attendance::StudentId,
    Attendance::ClassId,
    Attendance::Date,
    Attendance::Period,
    Attendance::Status,
    Attendance::MarkedBy,
    Attendance::Remarks,
    Attendance::CreatedAt,
    Attendance::UpdatedAt,
];

#[derive(Iden, Clone, Copy)]
pub enum Fees {
    Table,
    Id,
    SchoolId,
    ClassId,
    Name,
    FeeType,
    Amount,
    DueDate,
    AcademicYear,
    Description,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

pub const FEE_COLUMNS: [Fees; 12] = [
    Fees::Id,
    Fees::SchoolId,
    Fees::ClassId,
    Fees::Name,
    Fees::FeeType,
    Fees::Amount,
    Fees::DueDate,
    Fees::AcademicYear,
    Fees::Description,
    Fees::IsActive,
    Fees::CreatedAt,
    Fees::UpdatedAt,
];

#[derive(Iden, Clone, Copy)]
pub enum StudentFees {
    Table,
    Id,
    FeeId,
    StudentId,
    Amount,
    PaidAmount,
    Status,
    DueDate,
    PaidAt,
    PaymentMethod,
    TransactionRef,
    Remarks,
    ScholarshipDetails,
    CreatedAt,
    UpdatedAt,
}

pub const STUDENT_FEE_COLUMNS: [StudentFees; 14] = [
    StudentFees::Id,
    StudentFees::FeeId,
    StudentFees::StudentId,
    StudentFees::Amount,
    StudentFees::PaidAmount,
    StudentFees::Status,
    StudentFees::DueDate,
    StudentFees::PaidAt,
    StudentFees::PaymentMethod,
    StudentFees::TransactionRef,
    StudentFees::Remarks,
    StudentFees::ScholarshipDetails,
    StudentFees::CreatedAt,
    StudentFees::UpdatedAt,
];

#[derive(Iden, Clone, Copy)]
pub enum Complaints {
    Table,
    Id,
    SchoolId,
    RaisedBy,
    StudentId,
    AssignedTo,
    Title,
    Description,
    Category,
    Priority,
    Status,
    Resolution,
    ResolvedAt,
    CreatedAt,
    UpdatedAt,
}

pub const COMPLAINT_COLUMNS: [Complaints; 14] = [
    Complaints::Id,
    Complaints::SchoolId,
    Complaints::RaisedBy,
    Complaints::StudentId,
    Complaints::AssignedTo,
    Complaints::Title,
    Complaints::Description,
    Complaints::Category,
    Complaints::Priority,
    Complaints::Status,
    Complaints::Resolution,
    Complaints::ResolvedAt,
    Complaints::CreatedAt,
    Complaints::UpdatedAt,
];

#[derive(Iden, Clone, Copy)]
pub enum ComplaintUpdates {
    Table,
    Id,
    ComplaintId,
    UpdatedBy,
    FromStatus,
    ToStatus,
    Comment,
    CreatedAt,
}

pub const COMPLAINT_UPDATE_COLUMNS: [ComplaintUpdates; 7] = [
    ComplaintUpdates::Id,
    ComplaintUpdates::ComplaintId,
    ComplaintUpdates::UpdatedBy,
    ComplaintUpdates::FromStatus,
    ComplaintUpdates::ToStatus,
    ComplaintUpdates::Comment,
    ComplaintUpdates::CreatedAt,
];

#[derive(Iden, Clone, Copy)]
pub enum Events {
    Table,
    Id,
    SchoolId,
    ClassId,
    CreatedBy,
    Title,
    Description,
    EventType,
    TargetAudience,
    StartDate,
    EndDate,
    Location,
    IsPublished,
    CreatedAt,
    UpdatedAt,
}

pub const EVENT_COLUMNS: [Events; 14] = [
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
    Events::IsPublished,
    Events::CreatedAt,
    Events::UpdatedAt,
];

#[derive(Iden, Clone, Copy)]
pub enum Inquiries {
    Table,
    Id,
    SchoolName,
    ContactName,
    Email,
    Phone,
    City,
    StudentCount,
    Message,
    Status,
    Notes,
    DemoScheduledAt,
    CreatedAt,
    UpdatedAt,
}

pub const INQUIRY_COLUMNS: [Inquiries; 13] = [
    Inquiries::Id,
    Inquiries::SchoolName,
    Inquiries::ContactName,
    Inquiries::Email,
    Inquiries::Phone,
    Inquiries::City,
    Inquiries::StudentCount,
    Inquiries::Message,
    Inquiries::Status,
    Inquiries::Notes,
    Inquiries::DemoScheduledAt,
    Inquiries::CreatedAt,
    Inquiries::UpdatedAt,
];

#[derive(Iden, Clone, Copy)]
pub enum ContactMessages {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Subject,
    Message,
    CreatedAt,
}

pub const CONTACT_MESSAGE_COLUMNS: [ContactMessages; 7] = [
    ContactMessages::Id,
    ContactMessages::Name,
    ContactMessages::Email,
    ContactMessages::Phone,
    ContactMessages::Subject,
    ContactMessages::Message,
    ContactMessages::CreatedAt,
];

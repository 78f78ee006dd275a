use schoolbase_core::{ComplaintCategory, ComplaintPriority, ComplaintStatus};
use sea_query::{ColumnDef, Expr, ForeignKeyAction, Table};

use super::{
    SchemaChange, enum_col, enum_col_null, foreign_key, stamp, stamp_null, text_col, uuid_pk,
    uuid_ref, uuid_ref_null,
};
use crate::db::tables::{ComplaintUpdates, Complaints, Schools, Students, Users};

// `updated_by` stays writable so deleting its author can null it.
const APPEND_ONLY_SQLITE: &str = r#"CREATE TRIGGER "complaint_updates_append_only"
BEFORE UPDATE OF "complaint_id", "from_status", "to_status", "comment", "created_at" ON "complaint_updates"
BEGIN
    SELECT RAISE(ABORT, 'complaint_updates is append-only');
END"#;

const APPEND_ONLY_POSTGRES: &str = r#"CREATE FUNCTION "complaint_updates_append_only"() RETURNS trigger AS $$
BEGIN
    RAISE EXCEPTION 'complaint_updates is append-only';
END;
$$ LANGUAGE plpgsql;
CREATE TRIGGER "complaint_updates_append_only"
BEFORE UPDATE OF "complaint_id", "from_status", "to_status", "comment", "created_at" ON "complaint_updates"
FOR EACH ROW EXECUTE FUNCTION "complaint_updates_append_only"()"#;

const DROP_APPEND_ONLY_SQLITE: &str = r#"DROP TRIGGER IF EXISTS "complaint_updates_append_only""#;

const DROP_APPEND_ONLY_POSTGRES: &str = r#"DROP TRIGGER IF EXISTS "complaint_updates_append_only" ON "complaint_updates";
DROP FUNCTION IF EXISTS "complaint_updates_append_only"()"#;

pub fn up() -> Vec<SchemaChange> {
    let resolved = ComplaintStatus::Resolved.as_str();
    let resolution_stamp = Expr::col(Complaints::Status)
        .eq(resolved)
        .and(Expr::col(Complaints::ResolvedAt).is_not_null())
        .or(Expr::col(Complaints::Status)
            .ne(resolved)
            .and(Expr::col(Complaints::ResolvedAt).is_null()));
    let statuses = || ComplaintStatus::ALL.iter().map(|s| s.as_str());

    vec![
        SchemaChange::CreateTable(
            Table::create()
                .table(Complaints::Table)
                .col(uuid_pk(Complaints::Id))
                .col(uuid_ref(Complaints::SchoolId))
                .col(uuid_ref(Complaints::RaisedBy))
                .col(uuid_ref_null(Complaints::StudentId))
                .col(uuid_ref_null(Complaints::AssignedTo))
                .col(text_col(Complaints::Title, 200))
                .col(ColumnDef::new(Complaints::Description).text().not_null())
                .col(enum_col(
                    Complaints::Category,
                    ComplaintCategory::ALL.iter().map(|c| c.as_str()),
                ))
                .col(
                    enum_col(
                        Complaints::Priority,
                        ComplaintPriority::ALL.iter().map(|p| p.as_str()),
                    )
                    .default(ComplaintPriority::Medium.as_str()),
                )
                .col(
                    enum_col(Complaints::Status, statuses())
                        .default(ComplaintStatus::Open.as_str()),
                )
                .col(ColumnDef::new(Complaints::Resolution).text().null())
                .col(stamp_null(Complaints::ResolvedAt))
                .col(stamp(Complaints::CreatedAt))
                .col(stamp(Complaints::UpdatedAt))
                .check(resolution_stamp)
                .foreign_key(&mut foreign_key(
                    "fk_complaints_school_id",
                    Complaints::Table,
                    Complaints::SchoolId,
                    Schools::Table,
                    Schools::Id,
                    ForeignKeyAction::Cascade,
                ))
                .foreign_key(&mut foreign_key(
                    "fk_complaints_raised_by",
                    Complaints::Table,
                    Complaints::RaisedBy,
                    Users::Table,
                    Users::Id,
                    ForeignKeyAction::Cascade,
                ))
                .foreign_key(&mut foreign_key(
                    "fk_complaints_student_id",
                    Complaints::Table,
                    Complaints::StudentId,
                    Students::Table,
                    Students::Id,
                    ForeignKeyAction::SetNull,
                ))
                .foreign_key(&mut foreign_key(
                    "fk_complaints_assigned_to",
                    Complaints::Table,
                    Complaints::AssignedTo,
                    Users::Table,
                    Users::Id,
                    ForeignKeyAction::SetNull,
                ))
                .to_owned(),
        ),
        SchemaChange::CreateTable(
            Table::create()
                .table(ComplaintUpdates::Table)
                .col(uuid_pk(ComplaintUpdates::Id))
                .col(uuid_ref(ComplaintUpdates::ComplaintId))
                .col(uuid_ref_null(ComplaintUpdates::UpdatedBy))
                .col(enum_col_null(ComplaintUpdates::FromStatus, statuses()))
                .col(enum_col_null(ComplaintUpdates::ToStatus, statuses()))
                .col(ColumnDef::new(ComplaintUpdates::Comment).text().null())
                .col(stamp(ComplaintUpdates::CreatedAt))
                .foreign_key(&mut foreign_key(
                    "fk_complaint_updates_complaint_id",
                    ComplaintUpdates::Table,
                    ComplaintUpdates::ComplaintId,
                    Complaints::Table,
                    Complaints::Id,
                    ForeignKeyAction::Cascade,
                ))
                .foreign_key(&mut foreign_key(
                    "fk_complaint_updates_updated_by",
                    ComplaintUpdates::Table,
                    ComplaintUpdates::UpdatedBy,
                    Users::Table,
                    Users::Id,
                    ForeignKeyAction::SetNull,
                ))
                .to_owned(),
        ),
        SchemaChange::Raw {
            sqlite: APPEND_ONLY_SQLITE,
            postgres: APPEND_ONLY_POSTGRES,
        },
    ]
}

pub fn down() -> Vec<SchemaChange> {
    vec![
        SchemaChange::Raw {
            sqlite: DROP_APPEND_ONLY_SQLITE,
            postgres: DROP_APPEND_ONLY_POSTGRES,
        },
        SchemaChange::DropTable(Table::drop().table(ComplaintUpdates::Table).to_owned()),
        SchemaChange::DropTable(Table::drop().table(Complaints::Table).to_owned()),
    ]
}

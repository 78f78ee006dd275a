//! Subscription plans and schools.

use schoolbase_core::{NewSchool, NewSubscription, PlanResource};
use sea_query::{Alias, Asterisk, Expr, Func, Order, Query, SelectStatement, SqliteQueryBuilder};
use uuid::Uuid;

use super::tables::{
    Classes, SCHOOL_COLUMNS, SUBSCRIPTION_COLUMNS, Schools, Students, Subscriptions, Teachers,
};
use super::{Built, opt_text, opt_uuid, uuid};

// ── Subscriptions ──────────────────────────────────────────────────────────

pub fn insert_subscription(id: Uuid, sub: &NewSubscription, features_json: &str) -> Built {
    Query::insert()
        .into_table(Subscriptions::Table)
        .columns([
            Subscriptions::Id,
            Subscriptions::Name,
            Subscriptions::PlanType,
            Subscriptions::Price,
            Subscriptions::BillingCycle,
            Subscriptions::MaxStudents,
            Subscriptions::MaxTeachers,
            Subscriptions::MaxClasses,
            Subscriptions::Features,
        ])
        .values_panic([
            uuid(id),
            sub.name.as_str().into(),
            sub.plan_type.as_str().into(),
            sub.price.into(),
            sub.billing_cycle.as_str().into(),
            sub.limits.max_students.into(),
            sub.limits.max_teachers.into(),
            sub.limits.max_classes.into(),
            features_json.into(),
        ])
        .build(SqliteQueryBuilder)
}

fn select_subscriptions() -> SelectStatement {
    Query::select()
        .columns(SUBSCRIPTION_COLUMNS.map(|c| (Subscriptions::Table, c)))
        .from(Subscriptions::Table)
        .to_owned()
}

pub fn get_subscription(id: Uuid) -> Built {
    select_subscriptions()
        .and_where(Expr::col((Subscriptions::Table, Subscriptions::Id)).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn get_subscription_by_name(name: &str) -> Built {
    select_subscriptions()
        .and_where(Expr::col((Subscriptions::Table, Subscriptions::Name)).eq(name))
        .build(SqliteQueryBuilder)
}

pub fn list_subscriptions() -> Built {
    select_subscriptions()
        .order_by((Subscriptions::Table, Subscriptions::Price), Order::Asc)
        .build(SqliteQueryBuilder)
}

/// The plan a school is on, if any.
pub fn subscription_for_school(school_id: Uuid) -> Built {
    select_subscriptions()
        .inner_join(
            Schools::Table,
            Expr::col((Schools::Table, Schools::SubscriptionId))
                .equals((Subscriptions::Table, Subscriptions::Id)),
        )
        .and_where(Expr::col((Schools::Table, Schools::Id)).eq(school_id.to_string()))
        .build(SqliteQueryBuilder)
}

// ── Schools ────────────────────────────────────────────────────────────────

pub fn insert_school(id: Uuid, school: &NewSchool) -> Built {
    Query::insert()
        .into_table(Schools::Table)
        .columns([
            Schools::Id,
            Schools::Name,
            Schools::Email,
            Schools::Phone,
            Schools::Address,
            Schools::City,
            Schools::State,
            Schools::Website,
            Schools::SubscriptionId,
        ])
        .values_panic([
            uuid(id),
            school.name.as_str().into(),
            school.email.as_str().into(),
            opt_text(school.phone.as_deref()),
            opt_text(school.address.as_deref()),
            opt_text(school.city.as_deref()),
            opt_text(school.state.as_deref()),
            opt_text(school.website.as_deref()),
            opt_uuid(school.subscription_id),
        ])
        .build(SqliteQueryBuilder)
}

fn select_schools() -> SelectStatement {
    Query::select()
        .columns(SCHOOL_COLUMNS)
        .from(Schools::Table)
        .to_owned()
}

pub fn get_school(id: Uuid) -> Built {
    select_schools()
        .and_where(Expr::col(Schools::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn get_school_by_email(email: &str) -> Built {
    select_schools()
        .and_where(Expr::col(Schools::Email).eq(email))
        .build(SqliteQueryBuilder)
}

pub fn list_schools(active_only: bool) -> Built {
    let mut q = select_schools();
    if active_only {
        q.and_where(Expr::col(Schools::IsActive).eq(true));
    }
    q.order_by(Schools::Name, Order::Asc)
        .build(SqliteQueryBuilder)
}

/// Schools whose contact email matches a `LIKE` pattern.
pub fn schools_with_email_like(pattern: &str) -> Built {
    select_schools()
        .and_where(Expr::col(Schools::Email).like(pattern))
        .build(SqliteQueryBuilder)
}

pub fn set_school_active(id: Uuid, active: bool) -> Built {
    Query::update()
        .table(Schools::Table)
        .value(Schools::IsActive, active)
        .value(Schools::UpdatedAt, Expr::current_timestamp())
        .and_where(Expr::col(Schools::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn assign_subscription(school_id: Uuid, subscription_id: Option<Uuid>) -> Built {
    Query::update()
        .table(Schools::Table)
        .value(Schools::SubscriptionId, opt_uuid(subscription_id))
        .value(Schools::UpdatedAt, Expr::current_timestamp())
        .and_where(Expr::col(Schools::Id).eq(school_id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn delete_school(id: Uuid) -> Built {
    Query::delete()
        .from_table(Schools::Table)
        .and_where(Expr::col(Schools::Id).eq(id.to_string()))
        .build(SqliteQueryBuilder)
}

pub fn delete_schools_with_email_like(pattern: &str) -> Built {
    Query::delete()
        .from_table(Schools::Table)
        .and_where(Expr::col(Schools::Email).like(pattern))
        .build(SqliteQueryBuilder)
}

// ── Plan usage ─────────────────────────────────────────────────────────────

/// Count of active rows a plan limit applies to.
pub fn count_active(resource: PlanResource, school_id: Uuid) -> Built {
    let school_id = school_id.to_string();
    let mut q = Query::select();
    q.expr_as(Func::count(Expr::col(Asterisk)), Alias::new("n"));
    match resource {
        PlanResource::Students => q
            .from(Students::Table)
            .and_where(Expr::col(Students::SchoolId).eq(school_id))
            .and_where(Expr::col(Students::IsActive).eq(true)),
        PlanResource::Teachers => q
            .from(Teachers::Table)
            .and_where(Expr::col(Teachers::SchoolId).eq(school_id))
            .and_where(Expr::col(Teachers::IsActive).eq(true)),
        PlanResource::Classes => q
            .from(Classes::Table)
            .and_where(Expr::col(Classes::SchoolId).eq(school_id))
            .and_where(Expr::col(Classes::IsActive).eq(true)),
    };
    q.build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_for_school_joins_on_link() {
        let (sql, values) = subscription_for_school(Uuid::nil());
        assert!(sql.contains(r#"INNER JOIN "schools" ON "schools"."subscription_id" = "subscriptions"."id""#));
        assert_eq!(values.0.len(), 1);
    }

    #[test]
    fn test_updates_refresh_updated_at() {
        let (sql, _) = set_school_active(Uuid::nil(), false);
        assert!(sql.contains(r#""updated_at" = CURRENT_TIMESTAMP"#));
    }

    #[test]
    fn test_count_active_targets_resource_table() {
        let (sql, _) = count_active(PlanResource::Teachers, Uuid::nil());
        assert!(sql.contains(r#"FROM "teachers""#));
        assert!(sql.contains(r#""is_active" = "#));
    }
}

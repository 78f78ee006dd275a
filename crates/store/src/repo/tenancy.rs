use rusqlite::Row;
use schoolbase_core::validate::{validate_new_school, validate_new_subscription};
use schoolbase_core::{NewSchool, NewSubscription, PlanLimits, PlanResource, School, Subscription};
use schoolbase_schema::db::tenancy as sql;
use uuid::Uuid;

use crate::bind::{execute, fetch_all, fetch_count, fetch_optional};
use crate::db::Db;
use crate::decode;
use crate::error::{Result, StoreError};
use crate::repo::touched;

impl Db {
    pub fn insert_subscription(&self, sub: &NewSubscription) -> Result<Subscription> {
        validate_new_subscription(sub)?;
        let id = Uuid::new_v4();
        let features = serde_json::to_string(&sub.features)?;
        let conn = self.conn();
        execute(&conn, sql::insert_subscription(id, sub, &features))?;
        fetch_optional(&conn, sql::get_subscription(id), row_to_subscription)?
            .ok_or_else(|| StoreError::not_found("subscription", id))
    }

    pub fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>> {
        fetch_optional(&self.conn(), sql::get_subscription(id), row_to_subscription)
    }

    pub fn get_subscription_by_name(&self, name: &str) -> Result<Option<Subscription>> {
        fetch_optional(&self.conn(), sql::get_subscription_by_name(name), row_to_subscription)
    }

    /// All plans, cheapest first.
    pub fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        fetch_all(&self.conn(), sql::list_subscriptions(), row_to_subscription)
    }

    pub fn subscription_for_school(&self, school_id: Uuid) -> Result<Option<Subscription>> {
        fetch_optional(
            &self.conn(),
            sql::subscription_for_school(school_id),
            row_to_subscription,
        )
    }

    pub fn insert_school(&self, school: &NewSchool) -> Result<School> {
        validate_new_school(school)?;
        let id = Uuid::new_v4();
        let conn = self.conn();
        execute(&conn, sql::insert_school(id, school))?;
        fetch_optional(&conn, sql::get_school(id), row_to_school)?
            .ok_or_else(|| StoreError::not_found("school", id))
    }

    pub fn get_school(&self, id: Uuid) -> Result<Option<School>> {
        fetch_optional(&self.conn(), sql::get_school(id), row_to_school)
    }

    pub fn get_school_by_email(&self, email: &str) -> Result<Option<School>> {
        fetch_optional(&self.conn(), sql::get_school_by_email(email), row_to_school)
    }

    pub fn list_schools(&self, active_only: bool) -> Result<Vec<School>> {
        fetch_all(&self.conn(), sql::list_schools(active_only), row_to_school)
    }

    pub fn set_school_active(&self, id: Uuid, active: bool) -> Result<()> {
        let rows = execute(&self.conn(), sql::set_school_active(id, active))?;
        touched(rows, "school", id)
    }

    pub fn assign_subscription(&self, school_id: Uuid, subscription_id: Option<Uuid>) -> Result<()> {
        let rows = execute(
            &self.conn(),
            sql::assign_subscription(school_id, subscription_id),
        )?;
        touched(rows, "school", school_id)
    }

    /// Hard delete. Users, classes, students and everything else owned by the
    /// school go with it through `ON DELETE CASCADE`.
    pub fn delete_school(&self, id: Uuid) -> Result<()> {
        let rows = execute(&self.conn(), sql::delete_school(id))?;
        touched(rows, "school", id)
    }

    /// Active rows the plan limit for `resource` is counted against.
    pub fn count_active(&self, school_id: Uuid, resource: PlanResource) -> Result<i64> {
        fetch_count(&self.conn(), sql::count_active(resource, school_id))
    }
}

pub(crate) fn row_to_subscription(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    Ok(Subscription {
        id: decode::uuid(row, 0)?,
        name: row.get(1)?,
        plan_type: decode::variant(row, 2)?,
        price: row.get(3)?,
        billing_cycle: decode::variant(row, 4)?,
        limits: PlanLimits {
            max_students: row.get(5)?,
            max_teachers: row.get(6)?,
            max_classes: row.get(7)?,
        },
        features: decode::json(row, 8)?,
        is_active: row.get(9)?,
        created_at: decode::stamp(row, 10)?,
        updated_at: decode::stamp(row, 11)?,
    })
}

pub(crate) fn row_to_school(row: &Row<'_>) -> rusqlite::Result<School> {
    Ok(School {
        id: decode::uuid(row, 0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        address: row.get(4)?,
        city: row.get(5)?,
        state: row.get(6)?,
        website: row.get(7)?,
        subscription_id: decode::opt_uuid(row, 8)?,
        is_active: row.get(9)?,
        created_at: decode::stamp(row, 10)?,
        updated_at: decode::stamp(row, 11)?,
    })
}

#[cfg(test)]
mod tests {
    use schoolbase_core::testing;
    use schoolbase_core::{BillingCycle, PlanType, SubscriptionFeatures};

    use super::*;
    use crate::ConstraintKind;
    use crate::repo::test_db;

    fn plan(name: &str, price: i64) -> NewSubscription {
        NewSubscription {
            name: name.to_string(),
            plan_type: PlanType::Basic,
            price,
            billing_cycle: BillingCycle::Monthly,
            limits: PlanLimits {
                max_students: 100,
                max_teachers: 10,
                max_classes: 5,
            },
            features: SubscriptionFeatures::default(),
        }
    }

    #[test]
    fn test_insert_and_read_school() {
        let db = test_db();
        let school = db.insert_school(&testing::school("a@b.com")).unwrap();
        assert!(school.is_active);
        assert_eq!(school.city.as_deref(), Some("Pune"));

        let by_email = db.get_school_by_email("a@b.com").unwrap().unwrap();
        assert_eq!(by_email, school);
    }

    #[test]
    fn test_duplicate_school_email_is_unique_violation() {
        let db = test_db();
        db.insert_school(&testing::school("a@b.com")).unwrap();
        let err = db.insert_school(&testing::school("a@b.com")).unwrap_err();
        assert!(err.is_unique_violation(), "{err}");
    }

    #[test]
    fn test_invalid_school_email_is_rejected_before_writing() {
        let db = test_db();
        let err = db.insert_school(&testing::school("not-an-email")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(db.list_schools(false).unwrap().is_empty());
    }

    #[test]
    fn test_subscription_link() {
        let db = test_db();
        let basic = db.insert_subscription(&plan("Basic", 4900)).unwrap();
        db.insert_subscription(&plan("Free", 0)).unwrap();
        let school = db.insert_school(&testing::school("a@b.com")).unwrap();
        assert!(db.subscription_for_school(school.id).unwrap().is_none());

        db.assign_subscription(school.id, Some(basic.id)).unwrap();
        let linked = db.subscription_for_school(school.id).unwrap().unwrap();
        assert_eq!(linked.name, "Basic");
        assert_eq!(linked.features, SubscriptionFeatures::default());

        let names: Vec<_> = db.list_subscriptions().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["Free", "Basic"]);
    }

    #[test]
    fn test_unknown_subscription_is_foreign_key_violation() {
        let db = test_db();
        let school = db.insert_school(&testing::school("a@b.com")).unwrap();
        let err = db.assign_subscription(school.id, Some(Uuid::new_v4())).unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));
    }

    #[test]
    fn test_deactivate_missing_school_is_not_found() {
        let db = test_db();
        let err = db.set_school_active(Uuid::new_v4(), false).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "school", .. }));
    }
}

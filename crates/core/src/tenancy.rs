//! Tenants (schools) and the subscription plans that bound them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{BillingCycle, PlanType};

/// Feature switches carried by a plan, stored as a JSON column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFeatures {
    #[serde(default = "default_true")]
    pub attendance: bool,
    #[serde(default = "default_true")]
    pub fees: bool,
    #[serde(default = "default_true")]
    pub complaints: bool,
    #[serde(default = "default_true")]
    pub events: bool,
    #[serde(default)]
    pub parent_portal: bool,
    #[serde(default)]
    pub sms_notifications: bool,
    #[serde(default)]
    pub custom_branding: bool,
    #[serde(default)]
    pub api_access: bool,
}

impl Default for SubscriptionFeatures {
    fn default() -> Self {
        Self {
            attendance: true,
            fees: true,
            complaints: true,
            events: true,
            parent_portal: false,
            sms_notifications: false,
            custom_branding: false,
            api_access: false,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanResource {
    Students,
    Teachers,
    Classes,
}

impl std::fmt::Display for PlanResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PlanResource::Students => "students",
            PlanResource::Teachers => "teachers",
            PlanResource::Classes => "classes",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub max_students: i64,
    pub max_teachers: i64,
    pub max_classes: i64,
}

impl PlanLimits {
    pub fn limit_for(&self, resource: PlanResource) -> i64 {
        match resource {
            PlanResource::Students => self.max_students,
            PlanResource::Teachers => self.max_teachers,
            PlanResource::Classes => self.max_classes,
        }
    }

    /// Whether one more row fits when `current` active rows already exist.
    pub fn permits(&self, resource: PlanResource, current: i64) -> bool {
        current < self.limit_for(resource)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub name: String,
    pub plan_type: PlanType,
    /// Price per billing cycle in minor currency units.
    pub price: i64,
    pub billing_cycle: BillingCycle,
    pub limits: PlanLimits,
    pub features: SubscriptionFeatures,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    pub name: String,
    pub plan_type: PlanType,
    pub price: i64,
    pub billing_cycle: BillingCycle,
    pub limits: PlanLimits,
    pub features: SubscriptionFeatures,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub website: Option<String>,
    pub subscription_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewSchool {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub website: Option<String>,
    pub subscription_id: Option<Uuid>,
}

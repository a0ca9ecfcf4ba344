//! Outsource team and customer settlement models.
//!
//! A team settlement pays an outsource team for one task. A customer
//! settlement collects a project's `total_amount` from its customer; there is
//! at most one per project.

use pms_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `settlements` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Settlement {
    pub id: DbId,
    pub task_id: DbId,
    pub outsource_team_id: DbId,
    pub total_amount: f64,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `settlement_payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SettlementPayment {
    pub id: DbId,
    pub settlement_id: DbId,
    pub amount: f64,
    pub paid_on: Day,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSettlement {
    pub task_id: DbId,
    pub outsource_team_id: DbId,
    #[validate(range(min = 0.0))]
    pub total_amount: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateSettlement {
    #[validate(range(min = 0.0))]
    pub total_amount: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePayment {
    #[validate(range(exclusive_min = 0.0))]
    pub amount: f64,
    pub paid_on: Day,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePayment {
    #[validate(range(exclusive_min = 0.0))]
    pub amount: Option<f64>,
    pub paid_on: Option<Day>,
    pub notes: Option<String>,
}

/// A settlement with its payment ledger.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementDetail {
    #[serde(flatten)]
    pub settlement: Settlement,
    pub payments: Vec<SettlementPayment>,
    pub paid_amount: f64,
    pub balance: f64,
}

/// A row from `customer_settlements`, joined with the project total.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CustomerSettlement {
    pub id: DbId,
    pub project_id: DbId,
    pub customer_id: DbId,
    pub status: String,
    pub total_amount: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `customer_payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CustomerPayment {
    pub id: DbId,
    pub customer_settlement_id: DbId,
    pub amount: f64,
    pub paid_on: Day,
    pub payment_ref: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCustomerPayment {
    #[validate(range(exclusive_min = 0.0))]
    pub amount: f64,
    pub paid_on: Day,
    pub payment_ref: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCustomerPayment {
    #[validate(range(exclusive_min = 0.0))]
    pub amount: Option<f64>,
    pub paid_on: Option<Day>,
    pub payment_ref: Option<String>,
}

/// A customer settlement with its payments.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerSettlementDetail {
    #[serde(flatten)]
    pub settlement: CustomerSettlement,
    pub payments: Vec<CustomerPayment>,
    pub paid_amount: f64,
    pub balance: f64,
}

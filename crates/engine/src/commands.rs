//! Command structs for engine operations.
//!
//! These types group the parameters of write operations (registration,
//! enrollment, top-up, withdrawal), keeping call sites readable and avoiding
//! long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{Money, Sex};

/// Register a client.
#[derive(Clone, Debug)]
pub struct NewClient {
    pub cpf: String,
    pub name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub sex: Sex,
    pub monthly_income: Money,
}

/// Register a product.
#[derive(Clone, Debug)]
pub struct NewProduct {
    pub name: String,
    pub susep: String,
    pub sale_expiration: NaiveDate,
    pub min_initial_contribution: Money,
    pub min_extra_contribution: Money,
    pub min_entry_age: i32,
    pub max_exit_age: i32,
    pub initial_withdrawal_cooldown_days: i32,
    pub between_withdrawals_cooldown_days: i32,
}

/// Contract a new plan for a client.
#[derive(Clone, Debug)]
pub struct ContractPlanCmd {
    pub client_id: Uuid,
    pub product_id: Uuid,
    pub initial_amount: Money,
    pub contracted_on: NaiveDate,
}

impl ContractPlanCmd {
    #[must_use]
    pub fn new(
        client_id: Uuid,
        product_id: Uuid,
        initial_amount: Money,
        contracted_on: NaiveDate,
    ) -> Self {
        Self {
            client_id,
            product_id,
            initial_amount,
            contracted_on,
        }
    }
}

/// Add an extra contribution to a plan.
#[derive(Clone, Debug)]
pub struct TopUpCmd {
    /// Informational, only required to exist.
    pub client_id: Uuid,
    pub plan_id: Uuid,
    pub amount: Money,
}

impl TopUpCmd {
    #[must_use]
    pub fn new(client_id: Uuid, plan_id: Uuid, amount: Money) -> Self {
        Self {
            client_id,
            plan_id,
            amount,
        }
    }
}

/// Request a withdrawal from a plan. The date is the engine clock's today.
#[derive(Clone, Debug)]
pub struct WithdrawCmd {
    pub plan_id: Uuid,
    pub amount: Money,
}

impl WithdrawCmd {
    #[must_use]
    pub fn new(plan_id: Uuid, amount: Money) -> Self {
        Self { plan_id, amount }
    }
}

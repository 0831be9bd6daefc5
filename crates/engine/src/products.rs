//! Savings-plan products.
//!
//! A `Product` defines who can contract it, until when, and the value and
//! timing limits every plan tied to it must respect. It is shared by all its
//! plans: `last_withdrawal_on` is updated by a withdrawal on *any* of them, so
//! the cooldown between withdrawals is per product, not per plan.

use chrono::NaiveDate;
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Regulatory (SUSEP) registration code.
    pub susep: String,
    /// Last day on which the product can be contracted.
    pub sale_expiration: NaiveDate,
    pub min_initial_contribution: Money,
    pub min_extra_contribution: Money,
    pub min_entry_age: i32,
    pub max_exit_age: i32,
    /// Days after contracting before the first withdrawal is allowed.
    pub initial_withdrawal_cooldown_days: i32,
    /// Days between two withdrawals on plans of this product.
    pub between_withdrawals_cooldown_days: i32,
    pub last_withdrawal_on: Option<NaiveDate>,
    /// Row version used for compare-and-swap updates of `last_withdrawal_on`.
    pub version: i64,
}

impl Product {
    pub fn new(
        name: String,
        susep: String,
        sale_expiration: NaiveDate,
        min_initial_contribution: Money,
        min_extra_contribution: Money,
        min_entry_age: i32,
        max_exit_age: i32,
        initial_withdrawal_cooldown_days: i32,
        between_withdrawals_cooldown_days: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            susep,
            sale_expiration,
            min_initial_contribution,
            min_extra_contribution,
            min_entry_age,
            max_exit_age,
            initial_withdrawal_cooldown_days,
            between_withdrawals_cooldown_days,
            last_withdrawal_on: None,
            version: 0,
        }
    }

    pub fn sale_expired(&self, contracted_on: NaiveDate) -> bool {
        contracted_on > self.sale_expiration
    }

    pub fn initial_contribution_insufficient(&self, amount: Money) -> bool {
        amount < self.min_initial_contribution
    }

    pub fn extra_contribution_insufficient(&self, amount: Money) -> bool {
        amount < self.min_extra_contribution
    }

    pub fn below_entry_age(&self, age: i32) -> bool {
        age < self.min_entry_age
    }

    pub fn above_exit_age(&self, age: i32) -> bool {
        age > self.max_exit_age
    }

    /// `true` while the cooldown since the last withdrawal on any plan of the
    /// product has not elapsed yet.
    pub fn between_withdrawals_cooldown_active(&self, today: NaiveDate) -> bool {
        self.last_withdrawal_on.is_some_and(|last| {
            (today - last).num_days() < i64::from(self.between_withdrawals_cooldown_days)
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub susep: String,
    pub sale_expiration: Date,
    pub min_initial_contribution: i64,
    pub min_extra_contribution: i64,
    pub min_entry_age: i32,
    pub max_exit_age: i32,
    pub initial_withdrawal_cooldown_days: i32,
    pub between_withdrawals_cooldown_days: i32,
    pub last_withdrawal_on: Option<Date>,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::plans::Entity")]
    Plans,
}

impl Related<super::plans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Product> for ActiveModel {
    fn from(value: &Product) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            susep: ActiveValue::Set(value.susep.clone()),
            sale_expiration: ActiveValue::Set(value.sale_expiration),
            min_initial_contribution: ActiveValue::Set(value.min_initial_contribution.cents()),
            min_extra_contribution: ActiveValue::Set(value.min_extra_contribution.cents()),
            min_entry_age: ActiveValue::Set(value.min_entry_age),
            max_exit_age: ActiveValue::Set(value.max_exit_age),
            initial_withdrawal_cooldown_days: ActiveValue::Set(
                value.initial_withdrawal_cooldown_days,
            ),
            between_withdrawals_cooldown_days: ActiveValue::Set(
                value.between_withdrawals_cooldown_days,
            ),
            last_withdrawal_on: ActiveValue::Set(value.last_withdrawal_on),
            version: ActiveValue::Set(value.version),
        }
    }
}

impl TryFrom<Model> for Product {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "produto")?,
            name: model.name,
            susep: model.susep,
            sale_expiration: model.sale_expiration,
            min_initial_contribution: Money::new(model.min_initial_contribution),
            min_extra_contribution: Money::new(model.min_extra_contribution),
            min_entry_age: model.min_entry_age,
            max_exit_age: model.max_exit_age,
            initial_withdrawal_cooldown_days: model.initial_withdrawal_cooldown_days,
            between_withdrawals_cooldown_days: model.between_withdrawals_cooldown_days,
            last_withdrawal_on: model.last_withdrawal_on,
            version: model.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn product() -> Product {
        Product::new(
            "Produto 1".to_string(),
            "15414.900840/2018-17".to_string(),
            date(2023, 2, 15),
            Money::new(2500_00),
            Money::new(200_00),
            18,
            65,
            90,
            30,
        )
    }

    #[test]
    fn sale_expires_the_day_after() {
        let product = product();
        assert!(!product.sale_expired(date(2023, 2, 15)));
        assert!(product.sale_expired(date(2023, 2, 16)));
    }

    #[test]
    fn contribution_minimums_are_inclusive() {
        let product = product();
        assert!(!product.initial_contribution_insufficient(Money::new(2500_00)));
        assert!(product.initial_contribution_insufficient(Money::new(2499_90)));
        assert!(!product.extra_contribution_insufficient(Money::new(200_00)));
        assert!(product.extra_contribution_insufficient(Money::new(199_90)));
    }

    #[test]
    fn age_bounds() {
        let product = product();
        assert!(product.below_entry_age(17));
        assert!(!product.below_entry_age(18));
        assert!(!product.above_exit_age(65));
        assert!(product.above_exit_age(66));
    }

    #[test]
    fn between_withdrawals_cooldown() {
        let mut product = product();
        assert!(!product.between_withdrawals_cooldown_active(date(2023, 1, 1)));

        product.last_withdrawal_on = Some(date(2023, 1, 1));
        assert!(product.between_withdrawals_cooldown_active(date(2023, 1, 30)));
        assert!(!product.between_withdrawals_cooldown_active(date(2023, 1, 31)));
    }
}

//! Withdrawal (redemption) records.

use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

/// Historical record of an accepted withdrawal.
///
/// Creating it moves the product's `last_withdrawal_on`; the plan balance is
/// left as is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Withdrawal {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub amount: Money,
}

impl Withdrawal {
    pub fn new(plan_id: Uuid, amount: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            plan_id,
            amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "withdrawals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub plan_id: String,
    pub amount: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::plans::Entity",
        from = "Column::PlanId",
        to = "super::plans::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Plans,
}

impl Related<super::plans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Withdrawal> for ActiveModel {
    fn from(value: &Withdrawal) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            plan_id: ActiveValue::Set(value.plan_id.to_string()),
            amount: ActiveValue::Set(value.amount.cents()),
        }
    }
}

impl TryFrom<Model> for Withdrawal {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "resgate")?,
            plan_id: parse_uuid(&model.plan_id, "plano")?,
            amount: Money::new(model.amount),
        })
    }
}

//! Extra contributions (top-ups) applied to a plan.

use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

/// Historical record of an applied top-up.
///
/// The plan balance is incremented when the record is created; the record
/// itself is never reversed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopUp {
    pub id: Uuid,
    /// Informational: it is not checked against the plan owner.
    pub client_id: Uuid,
    pub plan_id: Uuid,
    pub amount: Money,
}

impl TopUp {
    pub fn new(client_id: Uuid, plan_id: Uuid, amount: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            plan_id,
            amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "top_ups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub client_id: String,
    pub plan_id: String,
    pub amount: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClientId",
        to = "super::clients::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Clients,
    #[sea_orm(
        belongs_to = "super::plans::Entity",
        from = "Column::PlanId",
        to = "super::plans::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Plans,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl Related<super::plans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TopUp> for ActiveModel {
    fn from(value: &TopUp) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            client_id: ActiveValue::Set(value.client_id.to_string()),
            plan_id: ActiveValue::Set(value.plan_id.to_string()),
            amount: ActiveValue::Set(value.amount.cents()),
        }
    }
}

impl TryFrom<Model> for TopUp {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "aporte extra")?,
            client_id: parse_uuid(&model.client_id, "cliente")?,
            plan_id: parse_uuid(&model.plan_id, "plano")?,
            amount: Money::new(model.amount),
        })
    }
}

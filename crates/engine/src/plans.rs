//! The `Plan` links a client to a product and holds the accumulated balance.

use chrono::NaiveDate;
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

/// A contracted plan.
///
/// Created once by the enrollment rules; the balance then grows with every
/// top-up. Plans have a single state: a zero balance does not close them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    pub id: Uuid,
    pub client_id: Uuid,
    pub product_id: Uuid,
    pub balance: Money,
    pub contracted_on: NaiveDate,
    /// Row version used for compare-and-swap updates of `balance`.
    pub version: i64,
}

impl Plan {
    pub fn new(
        client_id: Uuid,
        product_id: Uuid,
        initial_amount: Money,
        contracted_on: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            product_id,
            balance: initial_amount,
            contracted_on,
            version: 0,
        }
    }

    /// A withdrawal is denied when it asks for more than the balance.
    pub fn withdrawal_denied(&self, amount: Money) -> bool {
        amount > self.balance
    }

    /// Whole days elapsed since the plan was contracted.
    pub fn days_since_contracted(&self, today: NaiveDate) -> i64 {
        (today - self.contracted_on).num_days()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "plans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub client_id: String,
    pub product_id: String,
    pub balance: i64,
    pub contracted_on: Date,
    pub version: i64,
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
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Products,
    #[sea_orm(has_many = "super::top_ups::Entity")]
    TopUps,
    #[sea_orm(has_many = "super::withdrawals::Entity")]
    Withdrawals,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<super::top_ups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TopUps.def()
    }
}

impl Related<super::withdrawals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Withdrawals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Plan> for ActiveModel {
    fn from(value: &Plan) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            client_id: ActiveValue::Set(value.client_id.to_string()),
            product_id: ActiveValue::Set(value.product_id.to_string()),
            balance: ActiveValue::Set(value.balance.cents()),
            contracted_on: ActiveValue::Set(value.contracted_on),
            version: ActiveValue::Set(value.version),
        }
    }
}

impl TryFrom<Model> for Plan {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "plano")?,
            client_id: parse_uuid(&model.client_id, "cliente")?,
            product_id: parse_uuid(&model.product_id, "produto")?,
            balance: Money::new(model.balance),
            contracted_on: model.contracted_on,
            version: model.version,
        })
    }
}

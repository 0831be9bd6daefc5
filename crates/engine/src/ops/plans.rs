use sea_orm::{
    ConnectionTrait, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    ContractPlanCmd, EngineError, Plan, ResultEngine, plans, rules, top_ups,
    util::map_foreign_key_violation, withdrawals,
};

use super::{Engine, with_tx};

const PLAN_IN_USE: &str = "O plano possui aportes extras ou resgates e não pode ser removido.";

impl Engine {
    pub(super) async fn require_plan<C: ConnectionTrait>(
        &self,
        db: &C,
        plan_id: Uuid,
    ) -> ResultEngine<Plan> {
        let model = plans::Entity::find_by_id(plan_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("Plano".to_string()))?;
        Plan::try_from(model)
    }

    pub(super) async fn require_plan_for_update(
        &self,
        db: &DatabaseTransaction,
        plan_id: Uuid,
    ) -> ResultEngine<Plan> {
        let model = plans::Entity::find_by_id(plan_id.to_string())
            .lock_exclusive()
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("Plano".to_string()))?;
        Plan::try_from(model)
    }

    /// Persist the plan balance if the row is still at `expected_version`.
    pub(super) async fn store_plan_balance(
        &self,
        db: &DatabaseTransaction,
        plan: &mut Plan,
        expected_version: i64,
    ) -> ResultEngine<()> {
        let result = plans::Entity::update_many()
            .col_expr(plans::Column::Balance, Expr::value(plan.balance.cents()))
            .col_expr(plans::Column::Version, Expr::value(expected_version + 1))
            .filter(plans::Column::Id.eq(plan.id.to_string()))
            .filter(plans::Column::Version.eq(expected_version))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::Conflict("plano".to_string()));
        }
        plan.version = expected_version + 1;
        Ok(())
    }

    /// Contract a plan: a client enrolls in a product with an initial
    /// contribution.
    ///
    /// Checks the sale expiration, the minimum initial contribution and the
    /// client age on the contract date. On success the plan is stored with
    /// the initial contribution as its balance.
    pub async fn contract_plan(&self, cmd: ContractPlanCmd) -> ResultEngine<Plan> {
        with_tx!(self, |db_tx| {
            let client = self.require_client(&db_tx, cmd.client_id).await?;
            let product = self.require_product(&db_tx, cmd.product_id).await?;

            let plan = rules::validate_enrollment(&client, &product, &cmd)
                .inspect_err(|err| {
                    tracing::debug!(
                        client_id = %cmd.client_id,
                        product_id = %cmd.product_id,
                        %err,
                        "enrollment rejected"
                    );
                })?
                .apply();

            plans::ActiveModel::from(&plan).insert(&db_tx).await?;

            tracing::info!(
                plan_id = %plan.id,
                client_id = %plan.client_id,
                product_id = %plan.product_id,
                balance = %plan.balance,
                "plan contracted"
            );
            Ok(plan)
        })
    }

    /// Return a plan by id.
    pub async fn plan(&self, plan_id: Uuid) -> ResultEngine<Plan> {
        self.require_plan(&self.database, plan_id).await
    }

    /// List every plan, oldest contract first.
    pub async fn plans(&self) -> ResultEngine<Vec<Plan>> {
        plans::Entity::find()
            .order_by_asc(plans::Column::ContractedOn)
            .order_by_asc(plans::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Plan::try_from)
            .collect()
    }

    /// Delete a plan without top-ups or withdrawals.
    pub async fn delete_plan(&self, plan_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_plan(&db_tx, plan_id).await?;

            let id = plan_id.to_string();
            let top_ups = top_ups::Entity::find()
                .filter(top_ups::Column::PlanId.eq(id.as_str()))
                .count(&db_tx)
                .await?;
            let withdrawals = withdrawals::Entity::find()
                .filter(withdrawals::Column::PlanId.eq(id.as_str()))
                .count(&db_tx)
                .await?;
            if top_ups > 0 || withdrawals > 0 {
                return Err(EngineError::ReferenceProtected(PLAN_IN_USE.to_string()));
            }

            plans::Entity::delete_by_id(id)
                .exec(&db_tx)
                .await
                .map_err(|err| map_foreign_key_violation(err, PLAN_IN_USE))?;

            tracing::info!(%plan_id, "plan deleted");
            Ok(())
        })
    }
}

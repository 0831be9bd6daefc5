use sea_orm::{QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Plan, ResultEngine, TopUp, TopUpCmd, rules, top_ups};

use super::{Engine, with_tx};

impl Engine {
    /// Apply an extra contribution to a plan.
    ///
    /// The client and the plan must exist and the amount must reach the
    /// product's minimum extra contribution. The balance increment and the
    /// stored record commit together; a failed check changes nothing.
    pub async fn top_up(&self, cmd: TopUpCmd) -> ResultEngine<(Plan, TopUp)> {
        self.retry_on_conflict("top_up", || self.try_top_up(&cmd))
            .await
    }

    async fn try_top_up(&self, cmd: &TopUpCmd) -> ResultEngine<(Plan, TopUp)> {
        with_tx!(self, |db_tx| {
            self.require_client(&db_tx, cmd.client_id).await?;
            let plan = self.require_plan_for_update(&db_tx, cmd.plan_id).await?;
            let product = self.require_product(&db_tx, plan.product_id).await?;

            let expected_version = plan.version;
            let (mut plan, top_up) = rules::validate_top_up(plan, &product, cmd)
                .inspect_err(|err| {
                    tracing::debug!(plan_id = %cmd.plan_id, %err, "top-up rejected");
                })?
                .apply()?;

            self.store_plan_balance(&db_tx, &mut plan, expected_version)
                .await?;
            top_ups::ActiveModel::from(&top_up).insert(&db_tx).await?;

            tracing::info!(
                top_up_id = %top_up.id,
                plan_id = %plan.id,
                amount = %top_up.amount,
                balance = %plan.balance,
                "top-up applied"
            );
            Ok((plan, top_up))
        })
    }

    /// Return a top-up record by id.
    pub async fn top_up_record(&self, top_up_id: Uuid) -> ResultEngine<TopUp> {
        let model = top_ups::Entity::find_by_id(top_up_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("Aporte extra".to_string()))?;
        TopUp::try_from(model)
    }

    /// List every top-up record.
    pub async fn top_ups(&self) -> ResultEngine<Vec<TopUp>> {
        top_ups::Entity::find()
            .order_by_asc(top_ups::Column::PlanId)
            .order_by_asc(top_ups::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(TopUp::try_from)
            .collect()
    }
}

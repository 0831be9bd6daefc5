use sea_orm::{QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Product, ResultEngine, WithdrawCmd, Withdrawal, rules, withdrawals};

use super::{Engine, with_tx};

impl Engine {
    /// Withdraw from a plan on the engine clock's today.
    ///
    /// Checks the plan balance, the initial cooldown since the plan was
    /// contracted and the cooldown since the last withdrawal on any plan of
    /// the same product. On success the product's last withdrawal date moves
    /// to today; the plan balance is left untouched.
    ///
    /// Returns the updated product together with the stored record.
    pub async fn withdraw(&self, cmd: WithdrawCmd) -> ResultEngine<(Product, Withdrawal)> {
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "o valor do resgate deve ser maior que zero".to_string(),
            ));
        }

        self.retry_on_conflict("withdraw", || self.try_withdraw(&cmd))
            .await
    }

    async fn try_withdraw(&self, cmd: &WithdrawCmd) -> ResultEngine<(Product, Withdrawal)> {
        let today = self.today();

        with_tx!(self, |db_tx| {
            let plan = self.require_plan(&db_tx, cmd.plan_id).await?;
            let product = self
                .require_product_for_update(&db_tx, plan.product_id)
                .await?;

            let expected_version = product.version;
            let (mut product, withdrawal) =
                rules::validate_withdrawal(&plan, product, cmd, today)
                    .inspect_err(|err| {
                        tracing::debug!(plan_id = %cmd.plan_id, %today, %err, "withdrawal rejected");
                    })?
                    .apply();

            self.store_last_withdrawal(&db_tx, &mut product, expected_version)
                .await?;
            withdrawals::ActiveModel::from(&withdrawal)
                .insert(&db_tx)
                .await?;

            tracing::info!(
                withdrawal_id = %withdrawal.id,
                plan_id = %plan.id,
                product_id = %product.id,
                amount = %withdrawal.amount,
                "withdrawal registered"
            );
            Ok((product, withdrawal))
        })
    }

    /// Return a withdrawal record by id.
    pub async fn withdrawal(&self, withdrawal_id: Uuid) -> ResultEngine<Withdrawal> {
        let model = withdrawals::Entity::find_by_id(withdrawal_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("Resgate".to_string()))?;
        Withdrawal::try_from(model)
    }

    /// List every withdrawal record.
    pub async fn withdrawals(&self) -> ResultEngine<Vec<Withdrawal>> {
        withdrawals::Entity::find()
            .order_by_asc(withdrawals::Column::PlanId)
            .order_by_asc(withdrawals::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Withdrawal::try_from)
            .collect()
    }
}

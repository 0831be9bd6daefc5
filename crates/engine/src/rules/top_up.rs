use uuid::Uuid;

use crate::{EngineError, Money, Plan, Product, ResultEngine, TopUp, TopUpCmd};

/// A top-up that passed validation. Owns the plan it will be applied to.
#[derive(Debug)]
pub struct ValidatedTopUp {
    plan: Plan,
    client_id: Uuid,
    amount: Money,
}

/// Checks the amount against the product's minimum extra contribution.
pub fn validate_top_up(
    plan: Plan,
    product: &Product,
    cmd: &TopUpCmd,
) -> ResultEngine<ValidatedTopUp> {
    if product.extra_contribution_insufficient(cmd.amount) {
        return Err(EngineError::InsufficientTopUp(
            product.min_extra_contribution,
        ));
    }

    Ok(ValidatedTopUp {
        plan,
        client_id: cmd.client_id,
        amount: cmd.amount,
    })
}

impl ValidatedTopUp {
    /// Returns the plan with its increased balance and the record to store.
    pub fn apply(self) -> ResultEngine<(Plan, TopUp)> {
        let mut plan = self.plan;
        plan.balance = plan
            .balance
            .checked_add(self.amount)
            .ok_or_else(|| EngineError::InvalidAmount("saldo excede o limite".to_string()))?;
        let top_up = TopUp::new(self.client_id, plan.id, self.amount);
        Ok((plan, top_up))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::{date, plan, product};

    #[test]
    fn top_up_increases_balance_by_amount() {
        let product = product();
        let plan = plan(&product, date(2022, 9, 15));
        let plan_id = plan.id;
        let cmd = TopUpCmd::new(plan.client_id, plan_id, Money::new(200_00));

        let (plan, top_up) = validate_top_up(plan, &product, &cmd)
            .unwrap()
            .apply()
            .unwrap();

        assert_eq!(plan.balance, Money::new(2700_00));
        assert_eq!(top_up.plan_id, plan_id);
        assert_eq!(top_up.amount, Money::new(200_00));
    }

    #[test]
    fn top_up_below_minimum_is_rejected() {
        let product = product();
        let plan = plan(&product, date(2022, 9, 15));
        let cmd = TopUpCmd::new(plan.client_id, plan.id, Money::new(199_90));

        let err = validate_top_up(plan, &product, &cmd).unwrap_err();
        assert_eq!(err, EngineError::InsufficientTopUp(Money::new(200_00)));
        assert!(err.to_string().contains("200.00"));
    }

    #[test]
    fn client_is_informational() {
        let product = product();
        let plan = plan(&product, date(2022, 9, 15));
        let other_client = Uuid::new_v4();
        let cmd = TopUpCmd::new(other_client, plan.id, Money::new(500_00));

        let (_, top_up) = validate_top_up(plan, &product, &cmd)
            .unwrap()
            .apply()
            .unwrap();
        assert_eq!(top_up.client_id, other_client);
    }

    #[test]
    fn balance_overflow_is_an_error() {
        let product = product();
        let mut plan = plan(&product, date(2022, 9, 15));
        plan.balance = Money::new(i64::MAX);
        let cmd = TopUpCmd::new(plan.client_id, plan.id, Money::new(200_00));

        let err = validate_top_up(plan, &product, &cmd)
            .unwrap()
            .apply()
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }
}

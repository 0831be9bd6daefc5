use chrono::NaiveDate;
use uuid::Uuid;

use crate::{EngineError, Money, Plan, Product, ResultEngine, WithdrawCmd, Withdrawal};

/// A withdrawal that passed validation. Owns the product whose last
/// withdrawal date it will move.
#[derive(Debug)]
pub struct ValidatedWithdrawal {
    product: Product,
    plan_id: Uuid,
    amount: Money,
    today: NaiveDate,
}

/// Checks, in order: amount against the plan balance, the initial cooldown
/// since the plan was contracted, the cooldown since the last withdrawal on
/// any plan of the product.
pub fn validate_withdrawal(
    plan: &Plan,
    product: Product,
    cmd: &WithdrawCmd,
    today: NaiveDate,
) -> ResultEngine<ValidatedWithdrawal> {
    if plan.withdrawal_denied(cmd.amount) {
        return Err(EngineError::InsufficientBalance(plan.balance));
    }
    if plan.days_since_contracted(today) < i64::from(product.initial_withdrawal_cooldown_days) {
        return Err(EngineError::InitialCooldownActive(
            product.initial_withdrawal_cooldown_days,
        ));
    }
    if product.between_withdrawals_cooldown_active(today) {
        return Err(EngineError::BetweenWithdrawalsCooldownActive(
            product.between_withdrawals_cooldown_days,
        ));
    }

    Ok(ValidatedWithdrawal {
        product,
        plan_id: plan.id,
        amount: cmd.amount,
        today,
    })
}

impl ValidatedWithdrawal {
    /// Marks today as the product's last withdrawal and builds the record.
    ///
    /// The plan balance is not drawn down.
    // TODO: decrement `Plan::balance` once product owners confirm repeated
    // withdrawals should deplete it.
    pub fn apply(self) -> (Product, Withdrawal) {
        let mut product = self.product;
        product.last_withdrawal_on = Some(self.today);
        (product, Withdrawal::new(self.plan_id, self.amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::{date, plan, product};

    #[test]
    fn withdrawal_marks_product_last_withdrawal() {
        let product = product();
        let plan = plan(&product, date(2022, 9, 15));
        let cmd = WithdrawCmd::new(plan.id, Money::new(2500_00));

        let (product, withdrawal) = validate_withdrawal(&plan, product, &cmd, date(2023, 1, 1))
            .unwrap()
            .apply();

        assert_eq!(product.last_withdrawal_on, Some(date(2023, 1, 1)));
        assert_eq!(withdrawal.plan_id, plan.id);
        assert_eq!(withdrawal.amount, Money::new(2500_00));
    }

    #[test]
    fn amount_above_balance_reports_current_balance() {
        let product = product();
        let plan = plan(&product, date(2022, 9, 15));
        let cmd = WithdrawCmd::new(plan.id, Money::new(2500_10));

        let err = validate_withdrawal(&plan, product, &cmd, date(2023, 1, 1)).unwrap_err();
        assert_eq!(err, EngineError::InsufficientBalance(Money::new(2500_00)));
        assert!(err.to_string().contains("2500.00"));
    }

    #[test]
    fn balance_is_checked_before_cooldowns() {
        let product = product();
        let plan = plan(&product, date(2022, 9, 15));
        let cmd = WithdrawCmd::new(plan.id, Money::new(9999_00));

        let err = validate_withdrawal(&plan, product, &cmd, date(2022, 9, 15)).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientBalance(_)));
    }

    #[test]
    fn initial_cooldown_ends_on_boundary_day() {
        let product = product();
        let plan = plan(&product, date(2022, 9, 15));
        let cmd = WithdrawCmd::new(plan.id, Money::new(100_00));

        // 89 days after contracting.
        let err = validate_withdrawal(&plan, product.clone(), &cmd, date(2022, 12, 13))
            .unwrap_err();
        assert_eq!(err, EngineError::InitialCooldownActive(90));

        // 90 days after contracting.
        assert!(validate_withdrawal(&plan, product, &cmd, date(2022, 12, 14)).is_ok());
    }

    #[test]
    fn immediate_withdrawal_hits_initial_cooldown() {
        let product = product();
        let plan = plan(&product, date(2022, 9, 15));
        let cmd = WithdrawCmd::new(plan.id, Money::new(2500_00));

        let err = validate_withdrawal(&plan, product, &cmd, date(2022, 9, 15)).unwrap_err();
        assert_eq!(err, EngineError::InitialCooldownActive(90));
        assert!(err.to_string().contains("90"));
    }

    #[test]
    fn second_withdrawal_on_same_product_waits_for_cooldown() {
        let product = product();
        let first_plan = plan(&product, date(2022, 9, 15));
        let second_plan = plan(&product, date(2022, 9, 15));

        let (product, _) = validate_withdrawal(
            &first_plan,
            product,
            &WithdrawCmd::new(first_plan.id, Money::new(100_00)),
            date(2023, 1, 1),
        )
        .unwrap()
        .apply();

        let cmd = WithdrawCmd::new(second_plan.id, Money::new(100_00));
        let err = validate_withdrawal(&second_plan, product.clone(), &cmd, date(2023, 1, 30))
            .unwrap_err();
        assert_eq!(err, EngineError::BetweenWithdrawalsCooldownActive(30));

        assert!(validate_withdrawal(&second_plan, product, &cmd, date(2023, 1, 31)).is_ok());
    }

    #[test]
    fn balance_is_not_drawn_down() {
        let product = product();
        let plan = plan(&product, date(2022, 9, 15));
        let cmd = WithdrawCmd::new(plan.id, Money::new(2500_00));

        let (product, _) = validate_withdrawal(&plan, product, &cmd, date(2023, 1, 1))
            .unwrap()
            .apply();

        // Only the product cooldown stops a replay, the balance still allows it.
        let err = validate_withdrawal(&plan, product, &cmd, date(2023, 1, 2)).unwrap_err();
        assert_eq!(err, EngineError::BetweenWithdrawalsCooldownActive(30));
        assert_eq!(plan.balance, Money::new(2500_00));
    }
}

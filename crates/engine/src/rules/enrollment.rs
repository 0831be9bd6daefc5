use chrono::NaiveDate;
use uuid::Uuid;

use crate::{Client, ContractPlanCmd, EngineError, Money, Plan, Product, ResultEngine};

/// An enrollment that passed every check and can be turned into a `Plan`.
#[derive(Debug)]
pub struct ValidatedEnrollment {
    client_id: Uuid,
    product_id: Uuid,
    initial_amount: Money,
    contracted_on: NaiveDate,
}

/// Checks, in order: sale expiration, minimum initial contribution, client
/// age against both product bounds.
pub fn validate_enrollment(
    client: &Client,
    product: &Product,
    cmd: &ContractPlanCmd,
) -> ResultEngine<ValidatedEnrollment> {
    if product.sale_expired(cmd.contracted_on) {
        return Err(EngineError::SaleExpired);
    }
    if product.initial_contribution_insufficient(cmd.initial_amount) {
        return Err(EngineError::InsufficientInitialContribution(
            product.min_initial_contribution,
        ));
    }

    // Too young and too old are a single failure reporting both bounds.
    let age = client.age(cmd.contracted_on);
    if product.below_entry_age(age) || product.above_exit_age(age) {
        return Err(EngineError::InvalidAge {
            min: product.min_entry_age,
            max: product.max_exit_age,
        });
    }

    Ok(ValidatedEnrollment {
        client_id: client.id,
        product_id: product.id,
        initial_amount: cmd.initial_amount,
        contracted_on: cmd.contracted_on,
    })
}

impl ValidatedEnrollment {
    /// The new plan starts with the initial contribution as balance.
    pub fn apply(self) -> Plan {
        Plan::new(
            self.client_id,
            self.product_id,
            self.initial_amount,
            self.contracted_on,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::{client, date, product};

    fn enroll(
        client: &Client,
        product: &Product,
        cents: i64,
        on: NaiveDate,
    ) -> ResultEngine<ValidatedEnrollment> {
        let cmd = ContractPlanCmd::new(client.id, product.id, Money::new(cents), on);
        validate_enrollment(client, product, &cmd)
    }

    #[test]
    fn valid_enrollment_creates_plan_with_initial_balance() {
        let client = client(date(1991, 10, 22));
        let product = product();

        let plan = enroll(&client, &product, 2500_00, date(2022, 9, 15))
            .unwrap()
            .apply();

        assert_eq!(plan.balance, Money::new(2500_00));
        assert_eq!(plan.client_id, client.id);
        assert_eq!(plan.product_id, product.id);
        assert_eq!(plan.contracted_on, date(2022, 9, 15));
    }

    #[test]
    fn contracting_on_expiration_day_is_allowed() {
        let client = client(date(1991, 10, 22));
        let product = product();

        assert!(enroll(&client, &product, 2500_00, date(2023, 2, 15)).is_ok());
    }

    #[test]
    fn expired_sale_wins_over_every_other_check() {
        // Also too young and below the minimum: only the expiration is reported.
        let client = client(date(2021, 10, 22));
        let product = product();

        let err = enroll(&client, &product, 1_00, date(2023, 2, 16)).unwrap_err();
        assert_eq!(err, EngineError::SaleExpired);
    }

    #[test]
    fn minimum_initial_contribution_is_inclusive() {
        let client = client(date(1991, 10, 22));
        let product = product();

        let err = enroll(&client, &product, 2499_90, date(2022, 9, 15)).unwrap_err();
        assert_eq!(
            err,
            EngineError::InsufficientInitialContribution(Money::new(2500_00))
        );
        assert!(err.to_string().contains("2500.00"));
    }

    #[test]
    fn contribution_is_checked_before_age() {
        let client = client(date(2021, 10, 22));
        let product = product();

        let err = enroll(&client, &product, 100_00, date(2022, 9, 15)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientInitialContribution(_)
        ));
    }

    #[test]
    fn too_young_and_too_old_report_both_bounds() {
        let product = product();

        for birth_date in [date(2021, 10, 22), date(1940, 10, 22)] {
            let client = client(birth_date);
            let err = enroll(&client, &product, 2500_00, date(2022, 9, 15)).unwrap_err();
            assert_eq!(err, EngineError::InvalidAge { min: 18, max: 65 });
            let message = err.to_string();
            assert!(message.contains("18") && message.contains("65"));
        }
    }

    #[test]
    fn age_bounds_are_inclusive() {
        let product = product();

        // Exactly 18 and exactly 65 on the contract date.
        for birth_date in [date(2004, 9, 15), date(1957, 9, 15)] {
            let client = client(birth_date);
            assert!(enroll(&client, &product, 2500_00, date(2022, 9, 15)).is_ok());
        }
    }
}

use std::fmt;

use api_types::Amount;

/// Signed money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (balances,
/// contributions, product limits) to avoid floating-point drift. Values are
/// persisted as the raw cents.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(2500_00);
/// assert_eq!(amount.cents(), 250000);
/// assert_eq!(amount.to_string(), "2500.00");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }
}

/// Formats through [`Amount`] so engine messages and API bodies agree.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Amount::from(*self), f)
    }
}

impl From<Amount> for Money {
    fn from(value: Amount) -> Self {
        Self(value.minor())
    }
}

impl From<Money> for Amount {
    fn from(value: Money) -> Self {
        Amount::from_minor(value.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_always_has_two_decimals() {
        assert_eq!(Money::new(0).to_string(), "0.00");
        assert_eq!(Money::new(1).to_string(), "0.01");
        assert_eq!(Money::new(10).to_string(), "0.10");
        assert_eq!(Money::new(2500_00).to_string(), "2500.00");
        assert_eq!(Money::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn checked_add_detects_overflow() {
        assert_eq!(
            Money::new(100).checked_add(Money::new(50)),
            Some(Money::new(150))
        );
        assert_eq!(Money::new(i64::MAX).checked_add(Money::new(1)), None);
    }

    #[test]
    fn converts_from_wire_amounts() {
        let amount: Amount = "2500,5".parse().unwrap();
        let money = Money::from(amount);
        assert_eq!(money, Money::new(2500_50));
        assert_eq!(Amount::from(money), amount);
    }

    #[test]
    fn ordering_follows_cents() {
        assert!(Money::new(2499_90) < Money::new(2500_00));
        assert!(Money::new(-1).is_negative());
        assert!(!Money::new(0).is_positive());
    }
}

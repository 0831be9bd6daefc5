//! The module contains the errors the engine can throw.
//!
//! The `Display` of every variant is the exact message returned to API
//! callers, so the rule failures carry the limit they were checked against:
//!
//! - [`SaleExpired`] the product can no longer be contracted.
//! - [`InsufficientInitialContribution`] / [`InsufficientTopUp`] the amount is
//!   below the product minimum.
//! - [`InvalidAge`] the client is outside the product age bounds.
//! - [`InsufficientBalance`], [`InitialCooldownActive`] and
//!   [`BetweenWithdrawalsCooldownActive`] reject a withdrawal.
//!
//!  [`SaleExpired`]: EngineError::SaleExpired
//!  [`InsufficientInitialContribution`]: EngineError::InsufficientInitialContribution
//!  [`InsufficientTopUp`]: EngineError::InsufficientTopUp
//!  [`InvalidAge`]: EngineError::InvalidAge
//!  [`InsufficientBalance`]: EngineError::InsufficientBalance
//!  [`InitialCooldownActive`]: EngineError::InitialCooldownActive
//!  [`BetweenWithdrawalsCooldownActive`]: EngineError::BetweenWithdrawalsCooldownActive
use sea_orm::DbErr;
use thiserror::Error;

use crate::Money;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("O prazo de venda deste produto está expirado.")]
    SaleExpired,
    #[error("O valor mínimo de aporte inicial para este produto é {0}.")]
    InsufficientInitialContribution(Money),
    #[error("A idade do cliente deve estar entre {min} e {max} anos para este produto.")]
    InvalidAge { min: i32, max: i32 },
    #[error("O valor mínimo de aporte extra para este produto é {0}.")]
    InsufficientTopUp(Money),
    #[error("Saldo insuficiente para o resgate. Saldo atual: {0}.")]
    InsufficientBalance(Money),
    #[error("O primeiro resgate só pode ser feito após {0} dias da contratação.")]
    InitialCooldownActive(i32),
    #[error("É necessário aguardar {0} dias entre resgates.")]
    BetweenWithdrawalsCooldownActive(i32),
    #[error("{0}")]
    ExistingKey(String),
    #[error("{0} não encontrado.")]
    KeyNotFound(String),
    #[error("{0}")]
    ReferenceProtected(String),
    #[error("Valor inválido: {0}")]
    InvalidAmount(String),
    #[error("Dados inválidos: {0}")]
    InvalidInput(String),
    #[error("Identificador inválido: {0}")]
    InvalidId(String),
    #[error("Conflito de escrita concorrente em {0}, tente novamente.")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::SaleExpired, Self::SaleExpired) => true,
            (
                Self::InsufficientInitialContribution(a),
                Self::InsufficientInitialContribution(b),
            ) => a == b,
            (
                Self::InvalidAge { min: a, max: b },
                Self::InvalidAge { min: c, max: d },
            ) => a == c && b == d,
            (Self::InsufficientTopUp(a), Self::InsufficientTopUp(b)) => a == b,
            (Self::InsufficientBalance(a), Self::InsufficientBalance(b)) => a == b,
            (Self::InitialCooldownActive(a), Self::InitialCooldownActive(b)) => a == b,
            (
                Self::BetweenWithdrawalsCooldownActive(a),
                Self::BetweenWithdrawalsCooldownActive(b),
            ) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ReferenceProtected(a), Self::ReferenceProtected(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_checked_limits() {
        let err = EngineError::InvalidAge { min: 18, max: 65 };
        let message = err.to_string();
        assert!(message.contains("18"));
        assert!(message.contains("65"));

        let err = EngineError::InsufficientInitialContribution(Money::new(2500_00));
        assert!(err.to_string().contains("2500.00"));

        let err = EngineError::InitialCooldownActive(90);
        assert!(err.to_string().contains("90"));
    }
}

//! Validation and state-transition rules for enrollment, top-up and
//! withdrawal.
//!
//! Each rule is split in two phases that never touch storage:
//!
//! 1. `validate_*` runs the ordered checks (first failure wins) and returns a
//!    `Validated*` token;
//! 2. `Validated*::apply` produces the records to persist.
//!
//! The `Engine` loads the inputs, runs both phases and persists the result in
//! one database transaction.

mod enrollment;
mod top_up;
mod withdrawal;

pub use enrollment::{ValidatedEnrollment, validate_enrollment};
pub use top_up::{ValidatedTopUp, validate_top_up};
pub use withdrawal::{ValidatedWithdrawal, validate_withdrawal};

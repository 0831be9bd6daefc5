//! Savings-plan engine: clients, products, plans and the rules that govern
//! enrollment, top-ups and withdrawals.
//!
//! All state lives in the database behind [`Engine`]. The rules in [`rules`]
//! are pure and can be exercised without storage.

pub use clients::{Client, Sex, age_on};
pub use clock::{Clock, FixedClock, SystemClock};
pub use commands::{ContractPlanCmd, NewClient, NewProduct, TopUpCmd, WithdrawCmd};
pub use error::EngineError;
pub use money::Money;
pub use ops::{DEFAULT_CONFLICT_RETRIES, Engine, EngineBuilder};
pub use plans::Plan;
pub use products::Product;
pub use top_ups::TopUp;
pub use withdrawals::Withdrawal;

mod clients;
mod clock;
mod commands;
mod error;
mod money;
mod ops;
mod plans;
mod products;
pub mod rules;
mod top_ups;
mod util;
mod withdrawals;

type ResultEngine<T> = Result<T, EngineError>;

use std::{future::Future, sync::Arc};

use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

use crate::{Clock, EngineError, ResultEngine, SystemClock};

mod clients;
mod plans;
mod products;
mod top_ups;
mod withdrawals;

/// Extra attempts for an operation that lost a compare-and-swap race.
pub const DEFAULT_CONFLICT_RETRIES: u32 = 3;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    clock: Arc<dyn Clock>,
    conflict_retries: u32,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The date withdrawals are evaluated against.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Runs `op` again while it fails with [`EngineError::Conflict`].
    ///
    /// Every attempt opens its own transaction, so a retry re-reads the rows
    /// and re-runs the validation against the winner's state.
    async fn retry_on_conflict<T, F, Fut>(&self, operation: &str, mut op: F) -> ResultEngine<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ResultEngine<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Err(EngineError::Conflict(target)) if attempt < self.conflict_retries => {
                    attempt += 1;
                    tracing::warn!(operation, %target, attempt, "concurrent write detected, retrying");
                }
                result => return result,
            }
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    clock: Option<Arc<dyn Clock>>,
    conflict_retries: Option<u32>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the source of "today" (defaults to [`SystemClock`]).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> EngineBuilder {
        self.clock = Some(clock);
        self
    }

    /// Extra attempts after a write conflict (defaults to
    /// [`DEFAULT_CONFLICT_RETRIES`]).
    pub fn conflict_retries(mut self, retries: u32) -> EngineBuilder {
        self.conflict_retries = Some(retries);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            conflict_retries: self
                .conflict_retries
                .unwrap_or(DEFAULT_CONFLICT_RETRIES),
        })
    }
}

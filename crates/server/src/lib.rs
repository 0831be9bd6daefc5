use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, app, run_with_listener};

mod clients;
mod extract;
mod plans;
mod products;
mod server;
mod top_ups;
mod withdrawals;

pub mod types {
    pub use api_types::{Amount, Sexo, busca::Busca};

    pub mod cliente {
        pub use api_types::cliente::{Cliente, ClienteNew};
    }

    pub mod produto {
        pub use api_types::produto::{Produto, ProdutoNew};
    }

    pub mod contratacao {
        pub use api_types::contratacao::{Contratacao, ContratacaoNew};
    }

    pub mod aporte_extra {
        pub use api_types::aporte_extra::{AporteExtra, AporteExtraNew};
    }

    pub mod resgate {
        pub use api_types::resgate::{Resgate, ResgateNew};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ReferenceProtected(_) | EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::SaleExpired
        | EngineError::InsufficientInitialContribution(_)
        | EngineError::InvalidAge { .. }
        | EngineError::InsufficientTopUp(_)
        | EngineError::InsufficientBalance(_)
        | EngineError::InitialCooldownActive(_)
        | EngineError::BetweenWithdrawalsCooldownActive(_)
        | EngineError::ExistingKey(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidInput(_)
        | EngineError::InvalidId(_) => StatusCode::BAD_REQUEST,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "Erro interno do servidor.".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use engine::Money;
    use sea_orm::DbErr;

    use super::*;

    fn status(err: EngineError) -> StatusCode {
        ServerError::from(err).into_response().status()
    }

    #[test]
    fn rule_failures_map_to_400() {
        for err in [
            EngineError::SaleExpired,
            EngineError::InsufficientInitialContribution(Money::new(2500_00)),
            EngineError::InvalidAge { min: 18, max: 65 },
            EngineError::InsufficientTopUp(Money::new(200_00)),
            EngineError::InsufficientBalance(Money::new(2500_00)),
            EngineError::InitialCooldownActive(90),
            EngineError::BetweenWithdrawalsCooldownActive(30),
            EngineError::InvalidAmount("x".to_string()),
        ] {
            assert_eq!(status(err), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn duplicate_maps_to_400() {
        assert_eq!(
            status(EngineError::ExistingKey("x".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        assert_eq!(
            status(EngineError::KeyNotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn protected_delete_and_conflict_map_to_409() {
        assert_eq!(
            status(EngineError::ReferenceProtected("x".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(EngineError::Conflict("plano".to_string())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn database_error_hides_details() {
        let err = EngineError::Database(DbErr::Custom("disk on fire".to_string()));
        assert_eq!(
            status_for_engine_error(&err),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(message_for_engine_error(err), "Erro interno do servidor.");
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

use api_types::resgate::{Resgate, ResgateNew};
use axum::{Json, extract::State, http::StatusCode};
use engine::{WithdrawCmd, Withdrawal};

use crate::{
    ServerError,
    extract::{IdPath, Payload},
    server::ServerState,
};

fn view(withdrawal: Withdrawal) -> Resgate {
    Resgate {
        id: withdrawal.id,
        id_plano: withdrawal.plan_id,
        valor_resgate: withdrawal.amount.into(),
    }
}

/// Withdrawals are dated by the engine clock, not by the request.
pub async fn create(
    State(state): State<ServerState>,
    Payload(payload): Payload<ResgateNew>,
) -> Result<(StatusCode, Json<Resgate>), ServerError> {
    let (_product, withdrawal) = state
        .engine
        .withdraw(WithdrawCmd::new(
            payload.id_plano,
            payload.valor_resgate.into(),
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(view(withdrawal))))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Resgate>>, ServerError> {
    let withdrawals = state.engine.withdrawals().await?;
    Ok(Json(withdrawals.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    IdPath(id): IdPath,
) -> Result<Json<Resgate>, ServerError> {
    Ok(Json(view(state.engine.withdrawal(id).await?)))
}

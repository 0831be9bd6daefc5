use api_types::aporte_extra::{AporteExtra, AporteExtraNew};
use axum::{Json, extract::State, http::StatusCode};
use engine::{TopUp, TopUpCmd};

use crate::{
    ServerError,
    extract::{IdPath, Payload},
    server::ServerState,
};

fn view(top_up: TopUp) -> AporteExtra {
    AporteExtra {
        id: top_up.id,
        id_cliente: top_up.client_id,
        id_plano: top_up.plan_id,
        valor_aporte: top_up.amount.into(),
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Payload(payload): Payload<AporteExtraNew>,
) -> Result<(StatusCode, Json<AporteExtra>), ServerError> {
    let (_plan, top_up) = state
        .engine
        .top_up(TopUpCmd::new(
            payload.id_cliente,
            payload.id_plano,
            payload.valor_aporte.into(),
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(view(top_up))))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<AporteExtra>>, ServerError> {
    let top_ups = state.engine.top_ups().await?;
    Ok(Json(top_ups.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    IdPath(id): IdPath,
) -> Result<Json<AporteExtra>, ServerError> {
    Ok(Json(view(state.engine.top_up_record(id).await?)))
}

//! Plan contracting endpoints (`/contratacoes`).

use api_types::contratacao::{Contratacao, ContratacaoNew};
use axum::{Json, extract::State, http::StatusCode};
use engine::{ContractPlanCmd, Plan};

use crate::{
    ServerError,
    extract::{IdPath, Payload},
    server::ServerState,
};

fn view(plan: Plan) -> Contratacao {
    Contratacao {
        id: plan.id,
        id_cliente: plan.client_id,
        id_produto: plan.product_id,
        aporte: plan.balance.into(),
        data_da_contratacao: plan.contracted_on,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Payload(payload): Payload<ContratacaoNew>,
) -> Result<(StatusCode, Json<Contratacao>), ServerError> {
    let plan = state
        .engine
        .contract_plan(ContractPlanCmd::new(
            payload.id_cliente,
            payload.id_produto,
            payload.aporte.into(),
            payload.data_da_contratacao,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(view(plan))))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Contratacao>>, ServerError> {
    let plans = state.engine.plans().await?;
    Ok(Json(plans.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    IdPath(id): IdPath,
) -> Result<Json<Contratacao>, ServerError> {
    Ok(Json(view(state.engine.plan(id).await?)))
}

pub async fn delete(
    State(state): State<ServerState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_plan(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

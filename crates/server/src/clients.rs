//! Clients API endpoints.

use api_types::{
    Sexo,
    cliente::{Cliente, ClienteNew},
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use engine::{Client, NewClient, Sex};

use crate::{
    ServerError,
    extract::{IdPath, Payload, SearchQuery},
    server::ServerState,
};

fn sex_from_wire(sexo: Sexo) -> Sex {
    match sexo {
        Sexo::M => Sex::Male,
        Sexo::F => Sex::Female,
    }
}

fn sex_to_wire(sex: Sex) -> Sexo {
    match sex {
        Sex::Male => Sexo::M,
        Sex::Female => Sexo::F,
    }
}

fn view(client: Client) -> Cliente {
    Cliente {
        id: client.id,
        cpf: client.cpf,
        nome: client.name,
        email: client.email,
        data_de_nascimento: client.birth_date,
        sexo: sex_to_wire(client.sex),
        renda_mensal: client.monthly_income.into(),
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Payload(payload): Payload<ClienteNew>,
) -> Result<(StatusCode, Json<Cliente>), ServerError> {
    let client = state
        .engine
        .new_client(NewClient {
            cpf: payload.cpf,
            name: payload.nome,
            email: payload.email,
            birth_date: payload.data_de_nascimento,
            sex: sex_from_wire(payload.sexo),
            monthly_income: payload.renda_mensal.into(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(view(client))))
}

pub async fn list(
    State(state): State<ServerState>,
    SearchQuery(busca): SearchQuery,
) -> Result<Json<Vec<Cliente>>, ServerError> {
    let clients = state.engine.clients(busca.search.as_deref()).await?;
    Ok(Json(clients.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    IdPath(id): IdPath,
) -> Result<Json<Cliente>, ServerError> {
    Ok(Json(view(state.engine.client(id).await?)))
}

pub async fn delete(
    State(state): State<ServerState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_client(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

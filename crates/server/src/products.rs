//! Products API endpoints.

use api_types::{
    produto::{Produto, ProdutoNew},
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use engine::{NewProduct, Product};

use crate::{
    ServerError,
    extract::{IdPath, Payload, SearchQuery},
    server::ServerState,
};

fn view(product: Product) -> Produto {
    Produto {
        id: product.id,
        nome: product.name,
        susep: product.susep,
        expiracao_de_venda: product.sale_expiration,
        valor_minimo_aporte_inicial: product.min_initial_contribution.into(),
        valor_minimo_aporte_extra: product.min_extra_contribution.into(),
        idade_de_entrada: product.min_entry_age,
        idade_de_saida: product.max_exit_age,
        carencia_inicial_de_resgate: product.initial_withdrawal_cooldown_days,
        carencia_entre_resgates: product.between_withdrawals_cooldown_days,
        data_ultimo_resgate: product.last_withdrawal_on,
    }
}

fn command(payload: ProdutoNew) -> NewProduct {
    NewProduct {
        name: payload.nome,
        susep: payload.susep,
        sale_expiration: payload.expiracao_de_venda,
        min_initial_contribution: payload.valor_minimo_aporte_inicial.into(),
        min_extra_contribution: payload.valor_minimo_aporte_extra.into(),
        min_entry_age: payload.idade_de_entrada,
        max_exit_age: payload.idade_de_saida,
        initial_withdrawal_cooldown_days: payload.carencia_inicial_de_resgate,
        between_withdrawals_cooldown_days: payload.carencia_entre_resgates,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Payload(payload): Payload<ProdutoNew>,
) -> Result<(StatusCode, Json<Produto>), ServerError> {
    let product = state.engine.new_product(command(payload)).await?;
    Ok((StatusCode::CREATED, Json(view(product))))
}

/// Replace a product's fields; `dataUltimoResgate` is not editable.
pub async fn update(
    State(state): State<ServerState>,
    IdPath(id): IdPath,
    Payload(payload): Payload<ProdutoNew>,
) -> Result<Json<Produto>, ServerError> {
    let product = state.engine.update_product(id, command(payload)).await?;
    Ok(Json(view(product)))
}

pub async fn list(
    State(state): State<ServerState>,
    SearchQuery(busca): SearchQuery,
) -> Result<Json<Vec<Produto>>, ServerError> {
    let products = state.engine.products(busca.search.as_deref()).await?;
    Ok(Json(products.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    IdPath(id): IdPath,
) -> Result<Json<Produto>, ServerError> {
    Ok(Json(view(state.engine.product(id).await?)))
}

pub async fn delete(
    State(state): State<ServerState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    Router,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{clients, plans, products, top_ups, withdrawals};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/clientes", post(clients::create).get(clients::list))
        .route("/clientes/{id}", get(clients::get).delete(clients::delete))
        .route("/produtos", post(products::create).get(products::list))
        .route(
            "/produtos/{id}",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/contratacoes", post(plans::create).get(plans::list))
        .route("/contratacoes/{id}", get(plans::get).delete(plans::delete))
        .route("/aportes-extras", post(top_ups::create).get(top_ups::list))
        .route("/aportes-extras/{id}", get(top_ups::get))
        .route("/resgates", post(withdrawals::create).get(withdrawals::list))
        .route("/resgates/{id}", get(withdrawals::get))
        .with_state(state)
}

/// The full HTTP application over `engine`.
pub fn app(engine: Engine) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
    })
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine)).await
}

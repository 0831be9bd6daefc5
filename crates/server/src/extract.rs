//! Extractors whose rejections use the `{"error": ...}` body.

use api_types::busca::Busca;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request, rejection::JsonRejection},
    http::request::Parts,
};
use uuid::Uuid;

use crate::ServerError;

/// JSON request body.
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ServerError::Generic(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// The `{id}` path segment of a single resource.
pub struct IdPath(pub Uuid);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|_| ServerError::Generic("Identificador inválido.".to_string()))?;
        Ok(Self(id))
    }
}

/// `?search=` filter of the list endpoints.
pub struct SearchQuery(pub Busca);

impl<S> FromRequestParts<S> for SearchQuery
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(busca) = Query::<Busca>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ServerError::Generic(rejection.body_text()))?;
        Ok(Self(busca))
    }
}

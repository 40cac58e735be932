//! API request handlers.

/// Question answering against the caller's chain.
pub mod ask;
/// URL and PDF ingestion.
pub mod documents;
/// Embedded single-page frontend.
pub mod frontend;
/// Liveness endpoint.
pub mod health;

use crate::types::AppError;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use std::net::SocketAddr;

/// Network host of the caller (peer IP, port dropped).
///
/// Chains are keyed by this value, so every client behind the same address
/// shares one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHost(pub String);

impl<S> FromRequestParts<S> for ClientHost
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ConnectInfo(addr) = ConnectInfo::<SocketAddr>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::Internal(format!("Client address unavailable: {}", e)))?;

        Ok(ClientHost(addr.ip().to_string()))
    }
}

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::utils::AppError;

/// Header carrying the authenticated organizer, set by the upstream
/// authentication gateway.
pub const ORGANIZER_ID_HEADER: &str = "x-organizer-id";

/// Organizer on whose behalf the request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrganizerId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for OrganizerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ORGANIZER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthenticated("Missing organizer identity".to_string()))?;

        raw.to_str()
            .ok()
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(OrganizerId)
            .ok_or_else(|| AppError::Unauthenticated("Malformed organizer identity".to_string()))
    }
}

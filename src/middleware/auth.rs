// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::User,
};

// A sessão é emitida por fora (proxy/gateway), que injeta o ID do usuário neste cabeçalho.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Lê o cabeçalho `x-user-id`. `Ok(None)` quando ausente; valor malformado é tratado
/// como sessão inválida.
pub fn read_user_id(headers: &HeaderMap) -> Result<Option<Uuid>, AppError> {
    let Some(value) = headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };

    let value_str = value.to_str().map_err(|_| AppError::Unauthorized)?;
    let user_id = Uuid::parse_str(value_str.trim()).map_err(|_| AppError::Unauthorized)?;
    Ok(Some(user_id))
}

async fn lookup_user(app_state: &AppState, user_id: Uuid) -> Result<User, AppError> {
    app_state
        .user_repo
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::Unauthorized)
}

// Extrator para rotas que exigem usuário
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let locale = Locale::from_headers(&parts.headers);
        let app_state = AppState::from_ref(state);

        let user_id = read_user_id(&parts.headers)
            .and_then(|id| id.ok_or(AppError::Unauthorized))
            .map_err(|e| e.to_api_error(&locale))?;

        let user = lookup_user(&app_state, user_id)
            .await
            .map_err(|e| e.to_api_error(&locale))?;

        Ok(AuthenticatedUser(user))
    }
}

// Extrator para rotas que aceitam visitante (carrinho, catálogo, chamados de reparo)
pub struct MaybeUser(pub Option<User>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let locale = Locale::from_headers(&parts.headers);

        let Some(user_id) = read_user_id(&parts.headers).map_err(|e| e.to_api_error(&locale))? else {
            return Ok(MaybeUser(None));
        };

        let app_state = AppState::from_ref(state);
        let user = lookup_user(&app_state, user_id)
            .await
            .map_err(|e| e.to_api_error(&locale))?;

        Ok(MaybeUser(Some(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_header_is_a_guest() {
        assert!(matches!(read_user_id(&HeaderMap::new()), Ok(None)));
    }

    #[test]
    fn malformed_header_is_unauthorized() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert!(matches!(read_user_id(&headers), Err(AppError::Unauthorized)));
    }

    #[test]
    fn parses_uuid_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(read_user_id(&headers).unwrap(), Some(id));
    }
}

// src/handlers/users.rs

use axum::{response::IntoResponse, Json};

use crate::{middleware::auth::AuthenticatedUser, models::auth::User};

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    params(
        ("x-user-id" = Uuid, Header, description = "Usuário da sessão")
    ),
    responses(
        (status = 200, description = "Perfil do usuário (papel e faixa de atacado)", body = User),
        (status = 401, description = "Não autenticado")
    )
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> impl IntoResponse {
    Json(user)
}

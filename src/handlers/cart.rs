// src/handlers/cart.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::{AuthenticatedUser, MaybeUser},
        i18n::Locale,
        validation::ValidatedJson,
    },
    models::cart::{CartMutation, CartView},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartPayload {
    #[serde(alias = "product_id")]
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 999, message = "A quantidade deve estar entre 1 e 999."))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCartItemPayload {
    // 0 remove a linha
    #[validate(range(min = 0, max = 999, message = "A quantidade deve estar entre 0 e 999."))]
    pub quantity: i32,
}

// GET /api/cart
#[utoipa::path(
    get,
    path = "/api/cart",
    tag = "Cart",
    responses(
        (status = 200, description = "Carrinho com preços atuais (vazio para visitantes)", body = CartView)
    ),
    params(
        ("x-user-id" = Option<Uuid>, Header, description = "Usuário da sessão")
    )
)]
pub async fn get_cart(
    State(app_state): State<AppState>,
    locale: Locale,
    MaybeUser(user): MaybeUser,
) -> Result<impl IntoResponse, ApiError> {
    let Some(user) = user else {
        return Ok(Json(CartView::guest()));
    };

    let cart = app_state
        .cart_service
        .get_cart(&user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(cart))
}

// POST /api/cart
#[utoipa::path(
    post,
    path = "/api/cart",
    tag = "Cart",
    request_body = AddToCartPayload,
    responses(
        (status = 200, description = "Quantidade somada ao carrinho", body = CartMutation),
        (status = 400, description = "Payload inválido ou estoque insuficiente"),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("x-user-id" = Option<Uuid>, Header, description = "Usuário da sessão")
    )
)]
pub async fn add_to_cart(
    State(app_state): State<AppState>,
    locale: Locale,
    MaybeUser(user): MaybeUser,
    ValidatedJson(payload): ValidatedJson<AddToCartPayload>,
) -> Result<impl IntoResponse, ApiError> {
    // Visitante: o carrinho fica no cliente, só validamos o payload
    let Some(user) = user else {
        return Ok(Json(CartMutation {
            persisted: false,
            product_id: payload.product_id,
            quantity: payload.quantity,
        }));
    };

    let mutation = app_state
        .cart_service
        .add_item(&user, payload.product_id, payload.quantity)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(mutation))
}

// PUT /api/cart/{product_id}
#[utoipa::path(
    put,
    path = "/api/cart/{product_id}",
    tag = "Cart",
    request_body = UpdateCartItemPayload,
    responses(
        (status = 200, description = "Quantidade definida", body = CartMutation),
        (status = 400, description = "Estoque insuficiente"),
        (status = 401, description = "Não autenticado"),
        (status = 404, description = "Item não está no carrinho")
    ),
    params(
        ("product_id" = Uuid, Path, description = "ID do produto"),
        ("x-user-id" = Uuid, Header, description = "Usuário da sessão")
    )
)]
pub async fn update_cart_item(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(product_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCartItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mutation = app_state
        .cart_service
        .set_quantity(&user, product_id, payload.quantity)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(mutation))
}

// DELETE /api/cart/{product_id}
#[utoipa::path(
    delete,
    path = "/api/cart/{product_id}",
    tag = "Cart",
    responses(
        (status = 204, description = "Linha removida"),
        (status = 401, description = "Não autenticado")
    ),
    params(
        ("product_id" = Uuid, Path, description = "ID do produto"),
        ("x-user-id" = Uuid, Header, description = "Usuário da sessão")
    )
)]
pub async fn remove_cart_item(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .cart_service
        .remove_item(&user, product_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/cart
#[utoipa::path(
    delete,
    path = "/api/cart",
    tag = "Cart",
    responses(
        (status = 204, description = "Carrinho esvaziado"),
        (status = 401, description = "Não autenticado")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "Usuário da sessão")
    )
)]
pub async fn clear_cart(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .cart_service
        .clear(&user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

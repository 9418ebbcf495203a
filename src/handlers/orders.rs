// src/handlers/orders.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        pagination::Pagination,
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, validation::ValidatedJson},
    models::{
        auth::UserRole,
        orders::{Address, OrderDetail, PlacedOrder},
    },
};

// Aceita snake_case (formato do checkout) e camelCase
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PlaceOrderPayload {
    #[serde(alias = "shippingAddress")]
    #[validate(nested)]
    pub shipping_address: Address,
    #[serde(default, alias = "billingAddress")]
    #[validate(nested)]
    pub billing_address: Option<Address>,
    #[serde(default, alias = "customerNotes")]
    #[validate(length(max = 1000, message = "As observações podem ter no máximo 1000 caracteres."))]
    pub customer_notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = PlaceOrderPayload,
    responses(
        (status = 201, description = "Pedido criado a partir do carrinho", body = PlacedOrder),
        (status = 400, description = "Carrinho vazio, estoque insuficiente, produto indisponível ou dados inválidos"),
        (status = 401, description = "Não autenticado"),
        (status = 500, description = "Falha ao finalizar o pedido")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "Usuário da sessão")
    )
)]
pub async fn place_order(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<PlaceOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let placed = app_state
        .order_service
        .place_order(
            &user,
            payload.shipping_address,
            payload.billing_address,
            payload.customer_notes,
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(placed)))
}

// GET /api/orders
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    params(
        PageQuery,
        ("x-user-id" = Uuid, Header, description = "Usuário da sessão")
    ),
    responses(
        (status = 200, description = "Pedidos do usuário, mais recentes primeiro"),
        (status = 401, description = "Não autenticado")
    )
)]
pub async fn list_my_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .order_service
        .list_user_orders(user.id, Pagination::new(query.page, query.limit))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(page))
}

// GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("x-user-id" = Uuid, Header, description = "Usuário da sessão")
    ),
    responses(
        (status = 200, description = "Pedido com itens", body = OrderDetail),
        (status = 404, description = "Pedido não encontrado")
    )
)]
pub async fn get_my_order(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .order_service
        .get_order_for_user(order_id, &user)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(detail))
}

// GET /api/orders/{id}/invoice.pdf
#[utoipa::path(
    get,
    path = "/api/orders/{id}/invoice.pdf",
    tag = "Orders",
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("x-user-id" = Uuid, Header, description = "Dono do pedido ou administrador")
    ),
    responses(
        (status = 200, description = "Fatura em PDF", content_type = "application/pdf"),
        (status = 404, description = "Pedido não encontrado")
    )
)]
pub async fn invoice_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let owner = (user.role != UserRole::Admin).then_some(user.id);

    let detail = app_state
        .order_service
        .get_order_detail(order_id, owner)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let order_number = detail.order.order_number.clone();
    let tracking_url = app_state.order_service.tracking_url(order_id);
    let documents = app_state.document_service.clone();

    // genpdf é síncrono: renderiza fora das threads do runtime
    let pdf_bytes = tokio::task::spawn_blocking(move || documents.render_invoice(&detail, &tracking_url))
        .await
        .map_err(|e| AppError::InternalServerError(e.into()).to_api_error(&locale))?
        .map_err(|e| e.to_api_error(&locale))?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}.pdf\"", order_number),
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_snake_and_camel_case() {
        let snake: PlaceOrderPayload = serde_json::from_value(serde_json::json!({
            "shipping_address": {
                "full_name": "Ana Souza", "line1": "Rua A, 1", "city": "Curitiba",
                "postal_code": "80000-000", "country": "BR"
            },
            "customer_notes": "Deixar na portaria"
        }))
        .unwrap();
        assert!(snake.validate().is_ok());
        assert!(snake.billing_address.is_none());

        let camel: PlaceOrderPayload = serde_json::from_value(serde_json::json!({
            "shippingAddress": {
                "fullName": "Ana Souza", "line1": "Rua A, 1", "city": "Curitiba",
                "postalCode": "80000-000", "country": "BR"
            }
        }))
        .unwrap();
        assert_eq!(camel.shipping_address.full_name, "Ana Souza");
    }

    #[test]
    fn nested_address_is_validated() {
        let payload: PlaceOrderPayload = serde_json::from_value(serde_json::json!({
            "shipping_address": {
                "full_name": "", "line1": "Rua A, 1", "city": "Curitiba",
                "postal_code": "80000-000", "country": "BR"
            }
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }
}

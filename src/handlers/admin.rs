// src/handlers/admin.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{i18n::Locale, rbac::AdminUser, validation::ValidatedJson},
    models::{
        dashboard::DashboardSummary,
        orders::{Order, OrderDetail, OrderStatus},
        repairs::{RepairStatus, RepairTicket},
    },
};

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusPayload {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRepairStatusPayload {
    pub status: RepairStatus,
    #[validate(custom(function = "validate_not_negative"))]
    pub estimated_cost: Option<Decimal>,
    #[validate(length(max = 2000, message = "As notas podem ter no máximo 2000 caracteres."))]
    pub technician_notes: Option<String>,
}

// GET /api/admin/dashboard
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Admin",
    responses(
        (status = 200, description = "Resumo do dia, pendências e estoque baixo", body = DashboardSummary),
        (status = 401, description = "Não autenticado"),
        (status = 403, description = "Apenas administradores")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "Administrador")
    )
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .dashboard_service
        .get_summary()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(summary))
}

// GET /api/admin/orders/{id}
#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    tag = "Admin",
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("x-user-id" = Uuid, Header, description = "Administrador")
    ),
    responses(
        (status = 200, description = "Pedido com itens", body = OrderDetail),
        (status = 404, description = "Pedido não encontrado")
    )
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .order_service
        .get_order_detail(order_id, None)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(detail))
}

// PUT /api/admin/orders/{id}/status
#[utoipa::path(
    put,
    path = "/api/admin/orders/{id}/status",
    tag = "Admin",
    request_body = UpdateOrderStatusPayload,
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("x-user-id" = Uuid, Header, description = "Administrador")
    ),
    responses(
        (status = 200, description = "Status atualizado (ou já estava no destino)", body = Order),
        (status = 404, description = "Pedido não encontrado"),
        (status = 409, description = "Transição não permitida")
    )
)]
pub async fn update_order_status(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: AdminUser,
    Path(order_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(admin_id = %admin.user().id, order_id = %order_id, "Alteração de status pedida: {}", payload.status);

    let order = app_state
        .order_service
        .update_status(order_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(order))
}

// PUT /api/admin/repairs/{id}/status
#[utoipa::path(
    put,
    path = "/api/admin/repairs/{id}/status",
    tag = "Admin",
    request_body = UpdateRepairStatusPayload,
    params(
        ("id" = Uuid, Path, description = "ID do chamado"),
        ("x-user-id" = Uuid, Header, description = "Administrador")
    ),
    responses(
        (status = 200, description = "Chamado atualizado", body = RepairTicket),
        (status = 404, description = "Chamado não encontrado"),
        (status = 409, description = "Transição não permitida")
    )
)]
pub async fn update_repair_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(ticket_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateRepairStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let notes = payload
        .technician_notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let ticket = app_state
        .repair_service
        .update_status(ticket_id, payload.status, payload.estimated_cost, notes)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(ticket))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_payloads_use_screaming_case() {
        let payload: UpdateOrderStatusPayload =
            serde_json::from_value(serde_json::json!({ "status": "SHIPPED" })).unwrap();
        assert_eq!(payload.status, OrderStatus::Shipped);

        assert!(serde_json::from_value::<UpdateOrderStatusPayload>(serde_json::json!({ "status": "shipped" })).is_err());
    }

    #[test]
    fn negative_estimate_is_rejected() {
        let payload: UpdateRepairStatusPayload = serde_json::from_value(serde_json::json!({
            "status": "AWAITING_PARTS",
            "estimatedCost": -10
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }
}

// src/handlers/webhooks.rs

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    services::payment_webhook::{verify_signature, PaymentEvent, SIGNATURE_HEADER},
};

// POST /api/webhooks/payments
#[utoipa::path(
    post,
    path = "/api/webhooks/payments",
    tag = "Webhooks",
    request_body = PaymentEvent,
    params(
        ("x-payment-signature" = String, Header, description = "t=<unix>,v1=<hex HMAC-SHA256>")
    ),
    responses(
        (status = 200, description = "Evento recebido (tipos desconhecidos são ignorados)"),
        (status = 400, description = "Corpo inválido"),
        (status = 401, description = "Assinatura inválida"),
        (status = 404, description = "Pedido não encontrado")
    )
)]
pub async fn payment_webhook(
    State(app_state): State<AppState>,
    locale: Locale,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Autentica antes de olhar o conteúdo
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::InvalidSignature("cabeçalho ausente".into()))
        .map_err(|e| e.to_api_error(&locale))?;

    if let Err(e) = verify_signature(
        &app_state.settings.payment_webhook_secret,
        signature,
        &body,
        Utc::now().timestamp(),
    ) {
        tracing::warn!("⚠️ Webhook de pagamento rejeitado: {}", e);
        return Err(e.to_api_error(&locale));
    }

    // 2. Interpreta
    let event: PaymentEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(e.to_string()).to_api_error(&locale))?;

    // 3. Aplica
    let order = app_state
        .order_service
        .apply_payment_event(&event)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(json!({
        "received": true,
        "applied": order.is_some(),
    })))
}

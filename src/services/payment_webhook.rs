// src/services/payment_webhook.rs
//
// Verificação e interpretação dos eventos do provedor de pagamento.
// Cabeçalho: `x-payment-signature: t=<unix>,v1=<hex>` com
// `v1 = HMAC-SHA256(segredo, "<t>.<corpo bruto>")`.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::orders::{OrderStatus, PaymentStatus},
};

pub const SIGNATURE_HEADER: &str = "x-payment-signature";

/// Janela aceita entre o carimbo do evento e o relógio local (segundos).
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

pub fn verify_signature(secret: &str, header: &str, body: &[u8], now: i64) -> Result<(), AppError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let ts: i64 = timestamp
        .ok_or_else(|| AppError::InvalidSignature("carimbo ausente".into()))?
        .parse()
        .map_err(|_| AppError::InvalidSignature("carimbo inválido".into()))?;

    if now.abs_diff(ts) > SIGNATURE_TOLERANCE_SECS.unsigned_abs() {
        return Err(AppError::InvalidSignature("evento fora da janela de tempo".into()));
    }

    if signatures.is_empty() {
        return Err(AppError::InvalidSignature("assinatura v1 ausente".into()));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::InvalidSignature(e.to_string()))?;
    mac.update(ts.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);

    // `verify_slice` compara em tempo constante
    let matched = signatures.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });

    if !matched {
        return Err(AppError::InvalidSignature("assinatura não confere".into()));
    }

    tracing::debug!("Assinatura do webhook verificada");
    Ok(())
}

/// Gera o cabeçalho de assinatura no formato do provedor.
#[cfg(test)]
pub fn sign(secret: &str, timestamp: i64, body: &[u8]) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::InternalServerError(anyhow::anyhow!(e.to_string())))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    Ok(format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes())))
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaymentEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: PaymentEventData,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaymentEventData {
    #[serde(rename = "orderId", alias = "order_id")]
    pub order_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEventKind {
    Succeeded,
    Failed,
    Refunded,
}

impl PaymentEventKind {
    /// `None` para tipos que não tratamos: o evento é aceito e ignorado.
    pub fn from_type(event_type: &str) -> Option<Self> {
        match event_type {
            "payment.succeeded" => Some(PaymentEventKind::Succeeded),
            "payment.failed" => Some(PaymentEventKind::Failed),
            "payment.refunded" => Some(PaymentEventKind::Refunded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentEffect {
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
}

/// Estado final do pedido depois do evento.
///
/// - sucesso: pagamento PAID; PENDING avança para PROCESSING;
/// - falha: só o pagamento vira FAILED;
/// - estorno: pagamento REFUNDED e o pedido vai para REFUNDED quando a tabela permite.
pub fn payment_effect(
    kind: PaymentEventKind,
    status: OrderStatus,
    payment_status: PaymentStatus,
) -> PaymentEffect {
    match kind {
        PaymentEventKind::Succeeded => PaymentEffect {
            status: if status == OrderStatus::Pending { OrderStatus::Processing } else { status },
            payment_status: PaymentStatus::Paid,
        },
        PaymentEventKind::Failed => {
            // Pagamento já confirmado ou estornado não regride por um evento atrasado
            let payment_status = match payment_status {
                PaymentStatus::Paid | PaymentStatus::Refunded => payment_status,
                _ => PaymentStatus::Failed,
            };
            PaymentEffect { status, payment_status }
        }
        PaymentEventKind::Refunded => PaymentEffect {
            status: match status.check_transition(OrderStatus::Refunded) {
                Ok(_) => OrderStatus::Refunded,
                Err(_) => status,
            },
            payment_status: PaymentStatus::Refunded,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const BODY: &[u8] = br#"{"id":"evt_1","type":"payment.succeeded","data":{"orderId":"00000000-0000-0000-0000-000000000000"}}"#;

    #[test]
    fn accepts_a_fresh_valid_signature() {
        let header = sign(SECRET, 1_700_000_000, BODY).unwrap();
        assert!(verify_signature(SECRET, &header, BODY, 1_700_000_100).is_ok());
    }

    #[test]
    fn rejects_a_tampered_body() {
        let header = sign(SECRET, 1_700_000_000, BODY).unwrap();
        let result = verify_signature(SECRET, &header, b"{}", 1_700_000_000);
        assert!(matches!(result, Err(AppError::InvalidSignature(_))));
    }

    #[test]
    fn rejects_the_wrong_secret() {
        let header = sign("outro", 1_700_000_000, BODY).unwrap();
        assert!(verify_signature(SECRET, &header, BODY, 1_700_000_000).is_err());
    }

    #[test]
    fn rejects_old_timestamps() {
        let header = sign(SECRET, 1_700_000_000, BODY).unwrap();
        let result = verify_signature(SECRET, &header, BODY, 1_700_000_000 + 301);
        assert!(matches!(result, Err(AppError::InvalidSignature(_))));
    }

    #[test]
    fn extreme_timestamps_are_rejected_without_overflow() {
        let min = format!("t={},v1=00", i64::MIN);
        let max = format!("t={},v1=00", i64::MAX);
        for header in [&min, &max] {
            let result = verify_signature(SECRET, header, b"{}", 1_700_000_000);
            assert!(matches!(result, Err(AppError::InvalidSignature(_))));
        }
        assert!(verify_signature(SECRET, "t=0,v1=00", b"{}", i64::MIN).is_err());
    }

    #[test]
    fn rejects_malformed_headers() {
        assert!(verify_signature(SECRET, "", BODY, 0).is_err());
        assert!(verify_signature(SECRET, "t=abc,v1=00", BODY, 0).is_err());
        assert!(verify_signature(SECRET, "t=0", BODY, 0).is_err());
        assert!(verify_signature(SECRET, "t=0,v1=zz", BODY, 0).is_err());
    }

    #[test]
    fn event_payload_parses() {
        let event: PaymentEvent = serde_json::from_slice(BODY).unwrap();
        assert_eq!(event.id, "evt_1");
        assert_eq!(PaymentEventKind::from_type(&event.event_type), Some(PaymentEventKind::Succeeded));
        assert_eq!(event.data.order_id, Uuid::nil());
        assert_eq!(PaymentEventKind::from_type("charge.dispute.created"), None);
    }

    #[test]
    fn success_moves_pending_to_processing() {
        let effect = payment_effect(PaymentEventKind::Succeeded, OrderStatus::Pending, PaymentStatus::Pending);
        assert_eq!(effect.status, OrderStatus::Processing);
        assert_eq!(effect.payment_status, PaymentStatus::Paid);

        let shipped = payment_effect(PaymentEventKind::Succeeded, OrderStatus::Shipped, PaymentStatus::Pending);
        assert_eq!(shipped.status, OrderStatus::Shipped);
    }

    #[test]
    fn failure_only_touches_payment() {
        let effect = payment_effect(PaymentEventKind::Failed, OrderStatus::Pending, PaymentStatus::Pending);
        assert_eq!(effect.status, OrderStatus::Pending);
        assert_eq!(effect.payment_status, PaymentStatus::Failed);
    }

    #[test]
    fn refund_marks_order_refunded_when_allowed() {
        let effect = payment_effect(PaymentEventKind::Refunded, OrderStatus::Delivered, PaymentStatus::Paid);
        assert_eq!(effect.status, OrderStatus::Refunded);
        assert_eq!(effect.payment_status, PaymentStatus::Refunded);

        let completed = payment_effect(PaymentEventKind::Refunded, OrderStatus::Completed, PaymentStatus::Paid);
        assert_eq!(completed.status, OrderStatus::Completed);
        assert_eq!(completed.payment_status, PaymentStatus::Refunded);
    }
}

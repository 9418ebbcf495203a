// src/models/orders.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

// --- Endereço (gravado como JSONB dentro do pedido) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(alias = "full_name")]
    #[validate(length(min = 1, message = "O nome do destinatário é obrigatório."))]
    pub full_name: String,
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "O endereço é obrigatório."))]
    pub line1: String,
    pub line2: Option<String>,
    #[validate(length(min = 1, message = "A cidade é obrigatória."))]
    pub city: String,
    pub state: Option<String>,
    #[serde(alias = "postal_code")]
    #[validate(length(min = 1, message = "O CEP é obrigatório."))]
    pub postal_code: String,
    #[validate(length(min = 2, message = "O país é obrigatório."))]
    pub country: String,
}

// --- Status do pedido ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Tabela de transições. Estados terminais não saem do lugar.
    pub fn allowed_next(self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Processing, Cancelled, Refunded],
            Processing => &[Shipped, Cancelled, Refunded],
            Shipped => &[Delivered, Completed, Refunded],
            Delivered => &[Completed, Refunded],
            Completed | Cancelled | Refunded => &[],
        }
    }

    #[cfg(test)]
    pub fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }

    /// `Ok(true)` se a transição muda o estado, `Ok(false)` se já está no destino.
    pub fn check_transition(self, next: OrderStatus) -> Result<bool, AppError> {
        if self == next {
            return Ok(false);
        }
        if self.allowed_next().contains(&next) {
            return Ok(true);
        }
        Err(AppError::InvalidStatusTransition {
            from: self.to_string(),
            to: next.to_string(),
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Refunded => "REFUNDED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

// --- Pedido (snapshot imutável, só o status muda) ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[schema(example = "ORD-20260118-000042")]
    pub order_number: String,
    pub user_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub shipping_cost: Decimal,
    pub total_amount: Decimal,
    pub is_wholesale: bool,
    pub wholesale_tier: Option<String>,
    #[schema(value_type = Address)]
    pub shipping_address: Json<Address>,
    #[schema(value_type = Address)]
    pub billing_address: Json<Address>,
    pub customer_notes: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: String,
    pub product_image: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub subtotal: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// --- Rascunhos montados antes do commit ---

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemDraft {
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: String,
    pub product_image: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub user_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub shipping_cost: Decimal,
    pub total_amount: Decimal,
    pub is_wholesale: bool,
    pub wholesale_tier: Option<String>,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub customer_notes: Option<String>,
    pub items: Vec<OrderItemDraft>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order_id: Uuid,
    pub order_number: String,
    pub total_amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    const ALL: [OrderStatus; 7] = [
        Pending, Processing, Shipped, Delivered, Completed, Cancelled, Refunded,
    ];

    #[test]
    fn happy_path_is_allowed() {
        assert_eq!(Pending.check_transition(Processing).unwrap(), true);
        assert_eq!(Processing.check_transition(Shipped).unwrap(), true);
        assert_eq!(Shipped.check_transition(Delivered).unwrap(), true);
        assert_eq!(Delivered.check_transition(Completed).unwrap(), true);
        assert_eq!(Shipped.check_transition(Completed).unwrap(), true);
    }

    #[test]
    fn terminal_states_never_move() {
        for terminal in [Completed, Cancelled, Refunded] {
            assert!(terminal.is_terminal());
            for next in ALL.into_iter().filter(|s| *s != terminal) {
                assert!(
                    matches!(
                        terminal.check_transition(next),
                        Err(AppError::InvalidStatusTransition { .. })
                    ),
                    "{terminal} -> {next} deveria falhar"
                );
            }
        }
    }

    #[test]
    fn completed_back_to_pending_is_rejected() {
        let err = Completed.check_transition(Pending).unwrap_err();
        match err {
            AppError::InvalidStatusTransition { from, to } => {
                assert_eq!(from, "COMPLETED");
                assert_eq!(to, "PENDING");
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn same_state_is_a_no_op() {
        for status in ALL {
            assert_eq!(status.check_transition(status).unwrap(), false);
        }
    }

    #[test]
    fn cannot_cancel_after_shipping() {
        assert!(Shipped.check_transition(Cancelled).is_err());
        assert!(Delivered.check_transition(Cancelled).is_err());
    }

    #[test]
    fn address_accepts_snake_case_keys() {
        let address: Address = serde_json::from_value(serde_json::json!({
            "full_name": "Ana Souza",
            "line1": "Rua A, 10",
            "city": "Curitiba",
            "postal_code": "80000-000",
            "country": "BR"
        }))
        .unwrap();
        assert_eq!(address.full_name, "Ana Souza");
        assert_eq!(address.postal_code, "80000-000");
        assert!(address.validate().is_ok());
    }
}

// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Os cards do topo do painel administrativo
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub orders_today: i64,
    pub revenue_today: Decimal, // Sem pedidos cancelados/reembolsados
    pub pending_orders: i64,
    pub open_repair_tickets: i64,
    pub low_stock: Vec<LowStockProduct>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LowStockProduct {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub total_stock: i32,
}

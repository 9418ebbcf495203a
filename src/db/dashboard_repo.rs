// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use crate::{
    common::error::AppError,
    models::dashboard::{DashboardSummary, LowStockProduct},
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_summary(&self, low_stock_threshold: i32) -> Result<DashboardSummary, AppError> {
        // Transação só de leitura: todos os cards vêm do mesmo snapshot
        let mut tx = self.pool.begin().await?;

        // A. Pedidos e faturamento de hoje
        let (orders_today, revenue_today): (i64, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(total_amount) FILTER (WHERE status NOT IN ('CANCELLED', 'REFUNDED')), 0)
            FROM orders
            WHERE created_at::date = CURRENT_DATE
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // B. Pedidos aguardando processamento
        let pending_orders: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = 'PENDING'")
                .fetch_one(&mut *tx)
                .await?;

        // C. Chamados de reparo em aberto
        let open_repair_tickets: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM repair_tickets WHERE status NOT IN ('COMPLETED', 'CANCELLED')",
        )
        .fetch_one(&mut *tx)
        .await?;

        // D. Estoque baixo
        let low_stock = sqlx::query_as::<_, LowStockProduct>(
            r#"
            SELECT id, sku, name, total_stock
            FROM products
            WHERE is_active = TRUE AND total_stock <= $1
            ORDER BY total_stock ASC, name ASC
            LIMIT 50
            "#,
        )
        .bind(low_stock_threshold)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            orders_today,
            revenue_today,
            pending_orders,
            open_repair_tickets,
            low_stock,
        })
    }
}

// src/db/repair_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::repairs::{NewRepairTicket, RepairStatus, RepairTicket},
};

#[derive(Clone)]
pub struct RepairRepository {
    pool: PgPool,
}

impl RepairRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn next_ticket_sequence<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let seq: i64 = sqlx::query_scalar("SELECT nextval('repair_ticket_seq')")
            .fetch_one(executor)
            .await?;
        Ok(seq)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        ticket_number: &str,
        new: &NewRepairTicket,
    ) -> Result<RepairTicket, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ticket = sqlx::query_as::<_, RepairTicket>(
            r#"
            INSERT INTO repair_tickets (
                ticket_number, user_id, customer_name, customer_email, customer_phone,
                device_model, issue
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(ticket_number)
        .bind(new.user_id)
        .bind(&new.customer_name)
        .bind(&new.customer_email)
        .bind(&new.customer_phone)
        .bind(&new.device_model)
        .bind(&new.issue)
        .fetch_one(executor)
        .await?;
        Ok(ticket)
    }

    pub async fn find_by_number(&self, ticket_number: &str) -> Result<Option<RepairTicket>, AppError> {
        let ticket = sqlx::query_as::<_, RepairTicket>(
            "SELECT * FROM repair_tickets WHERE ticket_number = $1",
        )
        .bind(ticket_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(ticket)
    }

    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        ticket_id: Uuid,
    ) -> Result<Option<RepairTicket>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ticket = sqlx::query_as::<_, RepairTicket>(
            "SELECT * FROM repair_tickets WHERE id = $1 FOR UPDATE",
        )
        .bind(ticket_id)
        .fetch_optional(executor)
        .await?;
        Ok(ticket)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<RepairTicket>, AppError> {
        let tickets = sqlx::query_as::<_, RepairTicket>(
            "SELECT * FROM repair_tickets WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tickets)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        ticket_id: Uuid,
        status: RepairStatus,
        estimated_cost: Option<Decimal>,
        technician_notes: Option<&str>,
    ) -> Result<RepairTicket, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ticket = sqlx::query_as::<_, RepairTicket>(
            r#"
            UPDATE repair_tickets SET
                status = $2,
                estimated_cost = COALESCE($3, estimated_cost),
                technician_notes = COALESCE($4, technician_notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(ticket_id)
        .bind(status)
        .bind(estimated_cost)
        .bind(technician_notes)
        .fetch_one(executor)
        .await?;
        Ok(ticket)
    }
}

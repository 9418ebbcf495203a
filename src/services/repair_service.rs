// src/services/repair_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RepairRepository,
    models::repairs::{NewRepairTicket, RepairStatus, RepairTicket, RepairTracking},
    services::{
        checkout::format_ticket_number,
        mailer::{self, spawn_email, Mailer},
    },
};

#[derive(Clone)]
pub struct RepairService {
    pool: PgPool,
    repairs: RepairRepository,
    mailer: Arc<dyn Mailer>,
    public_base_url: String,
}

impl RepairService {
    pub fn new(
        pool: PgPool,
        repairs: RepairRepository,
        mailer: Arc<dyn Mailer>,
        public_base_url: String,
    ) -> Self {
        Self {
            pool,
            repairs,
            mailer,
            public_base_url,
        }
    }

    fn tracking_url(&self, ticket_number: &str) -> String {
        format!(
            "{}/repairs/track/{}",
            self.public_base_url.trim_end_matches('/'),
            ticket_number
        )
    }

    pub async fn create_ticket(&self, new: &NewRepairTicket) -> Result<RepairTicket, AppError> {
        let mut tx = self.pool.begin().await?;
        let sequence = self.repairs.next_ticket_sequence(&mut *tx).await?;
        let ticket = self
            .repairs
            .insert(&mut *tx, &format_ticket_number(sequence), new)
            .await?;
        tx.commit().await?;

        tracing::info!(ticket = %ticket.ticket_number, device = %ticket.device_model, "🔧 Chamado de reparo aberto");
        spawn_email(
            self.mailer.clone(),
            mailer::repair_received(&ticket, &self.tracking_url(&ticket.ticket_number)),
        );
        Ok(ticket)
    }

    pub async fn track(&self, ticket_number: &str) -> Result<RepairTracking, AppError> {
        let ticket = self
            .repairs
            .find_by_number(ticket_number.trim())
            .await?
            .ok_or(AppError::NotFound("Chamado de reparo"))?;
        Ok(ticket.into())
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<RepairTicket>, AppError> {
        self.repairs.list_for_user(user_id).await
    }

    /// Avança o chamado pela tabela de transições. Orçamento e notas podem vir
    /// junto, inclusive sem mudança de status.
    pub async fn update_status(
        &self,
        ticket_id: Uuid,
        next: RepairStatus,
        estimated_cost: Option<Decimal>,
        technician_notes: Option<&str>,
    ) -> Result<RepairTicket, AppError> {
        let mut tx = self.pool.begin().await?;
        let ticket = self
            .repairs
            .find_by_id_for_update(&mut *tx, ticket_id)
            .await?
            .ok_or(AppError::NotFound("Chamado de reparo"))?;

        let previous = ticket.status;
        let changes_status = previous.check_transition(next)?;
        if !changes_status && estimated_cost.is_none() && technician_notes.is_none() {
            return Ok(ticket);
        }

        let updated = self
            .repairs
            .update_status(&mut *tx, ticket.id, next, estimated_cost, technician_notes)
            .await?;
        tx.commit().await?;

        if changes_status {
            tracing::info!(ticket = %updated.ticket_number, "🔧 Reparo: {} -> {}", previous, next);
            spawn_email(self.mailer.clone(), mailer::repair_status_changed(&updated));
        }
        Ok(updated)
    }
}

// src/models/repairs.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "repair_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepairStatus {
    Received,
    Diagnosing,
    AwaitingParts,
    Repairing,
    Ready,
    Completed,
    Cancelled,
}

impl RepairStatus {
    pub fn allowed_next(self) -> &'static [RepairStatus] {
        use RepairStatus::*;
        match self {
            Received => &[Diagnosing, Cancelled],
            Diagnosing => &[AwaitingParts, Repairing, Cancelled],
            AwaitingParts => &[Repairing, Cancelled],
            Repairing => &[Ready, Cancelled],
            Ready => &[Completed],
            Completed | Cancelled => &[],
        }
    }

    pub fn check_transition(self, next: RepairStatus) -> Result<bool, AppError> {
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

    #[cfg(test)]
    pub fn is_open(self) -> bool {
        !matches!(self, RepairStatus::Completed | RepairStatus::Cancelled)
    }
}

impl fmt::Display for RepairStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RepairStatus::Received => "RECEIVED",
            RepairStatus::Diagnosing => "DIAGNOSING",
            RepairStatus::AwaitingParts => "AWAITING_PARTS",
            RepairStatus::Repairing => "REPAIRING",
            RepairStatus::Ready => "READY",
            RepairStatus::Completed => "COMPLETED",
            RepairStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepairTicket {
    pub id: Uuid,
    #[schema(example = "RPR-000123")]
    pub ticket_number: String,
    pub user_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub device_model: String,
    pub issue: String,
    pub status: RepairStatus,
    pub estimated_cost: Option<Decimal>,
    pub technician_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Visão pública do rastreio: sem e-mail/telefone do cliente
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepairTracking {
    pub ticket_number: String,
    pub device_model: String,
    pub status: RepairStatus,
    pub estimated_cost: Option<Decimal>,
    pub updated_at: DateTime<Utc>,
}

impl From<RepairTicket> for RepairTracking {
    fn from(ticket: RepairTicket) -> Self {
        Self {
            ticket_number: ticket.ticket_number,
            device_model: ticket.device_model,
            status: ticket.status,
            estimated_cost: ticket.estimated_cost,
            updated_at: ticket.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewRepairTicket {
    pub user_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub device_model: String,
    pub issue: String,
}

// src/services/mailer.rs

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::{
    orders::{Order, OrderStatus},
    repairs::RepairTicket,
};

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()>;
}

/// Mailer padrão: só registra no log. Um provedor SMTP/HTTP entra implementando `Mailer`.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()> {
        tracing::info!(to = %message.to, subject = %message.subject, "📧 E-mail enviado");
        tracing::debug!("{}", message.body);
        Ok(())
    }
}

/// Dispara o envio sem segurar a requisição. Falha vira aviso no log.
pub fn spawn_email(mailer: Arc<dyn Mailer>, message: EmailMessage) {
    tokio::spawn(async move {
        let to = message.to.clone();
        if let Err(e) = mailer.send(message).await {
            tracing::warn!(to = %to, "⚠️ Falha ao enviar e-mail: {:#}", e);
        }
    });
}

fn money(value: Decimal) -> String {
    format!("${:.2}", value)
}

pub fn order_confirmation(order: &Order, tracking_url: &str) -> EmailMessage {
    EmailMessage {
        to: order.customer_email.clone(),
        subject: format!("Order {} confirmed", order.order_number),
        body: format!(
            "Hi {},\n\nWe received your order {}.\nSubtotal: {}\nShipping: {}\nTax: {}\nTotal: {}\n\nTrack it at {}\n",
            order.customer_name,
            order.order_number,
            money(order.subtotal),
            money(order.shipping_cost),
            money(order.tax_amount),
            money(order.total_amount),
            tracking_url,
        ),
    }
}

pub fn order_status_changed(order: &Order, previous: OrderStatus) -> EmailMessage {
    EmailMessage {
        to: order.customer_email.clone(),
        subject: format!("Order {} is now {}", order.order_number, order.status),
        body: format!(
            "Hi {},\n\nYour order {} moved from {} to {}.\n",
            order.customer_name, order.order_number, previous, order.status,
        ),
    }
}

pub fn repair_received(ticket: &RepairTicket, tracking_url: &str) -> EmailMessage {
    EmailMessage {
        to: ticket.customer_email.clone(),
        subject: format!("Repair ticket {} received", ticket.ticket_number),
        body: format!(
            "Hi {},\n\nWe registered your {} for repair.\nTicket: {}\nFollow the progress at {}\n",
            ticket.customer_name, ticket.device_model, ticket.ticket_number, tracking_url,
        ),
    }
}

pub fn repair_status_changed(ticket: &RepairTicket) -> EmailMessage {
    let estimate = ticket
        .estimated_cost
        .map(|c| format!("\nEstimated cost: {}", money(c)))
        .unwrap_or_default();
    EmailMessage {
        to: ticket.customer_email.clone(),
        subject: format!("Repair {} is now {}", ticket.ticket_number, ticket.status),
        body: format!(
            "Hi {},\n\nYour {} is now {}.{}\n",
            ticket.customer_name, ticket.device_model, ticket.status, estimate,
        ),
    }
}

// src/services/document_service.rs

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;

use crate::{common::error::AppError, models::orders::OrderDetail};

const FONT_FAMILY: &str = "Roboto";

#[derive(Clone)]
pub struct DocumentService {
    fonts_dir: String,
    store_name: String,
}

fn render_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}

impl DocumentService {
    pub fn new(fonts_dir: String, store_name: String) -> Self {
        Self { fonts_dir, store_name }
    }

    /// Fatura do pedido em PDF, com QR code apontando para o acompanhamento.
    /// Renderização síncrona: chamar de dentro de `spawn_blocking`.
    pub fn render_invoice(&self, detail: &OrderDetail, tracking_url: &str) -> Result<Vec<u8>, AppError> {
        let order = &detail.order;

        // 1. Fonte (pasta configurável, padrão ./fonts)
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, FONT_FAMILY, None).map_err(|_| {
            AppError::FontNotFound(format!("{} não encontrada em {}", FONT_FAMILY, self.fonts_dir))
        })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Invoice {}", order.order_number));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(
            elements::Paragraph::new(self.store_name.clone())
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(elements::Break::new(1.5));
        doc.push(
            elements::Paragraph::new(format!("INVOICE {}", order.order_number))
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Date: {}",
            order.created_at.format("%Y-%m-%d")
        )));
        doc.push(elements::Paragraph::new(format!(
            "Customer: {} <{}>",
            order.customer_name, order.customer_email
        )));

        let ship = &order.shipping_address.0;
        doc.push(elements::Paragraph::new(format!(
            "Ship to: {}, {}, {} {}, {}",
            ship.full_name, ship.line1, ship.city, ship.postal_code, ship.country
        )));
        if let Some(tier) = order.wholesale_tier.as_deref() {
            doc.push(elements::Paragraph::new(format!("Wholesale account ({})", tier)));
        }
        doc.push(elements::Break::new(2));

        // --- ITENS ---
        // Pesos das colunas: Produto (4), SKU (2), Qtd (1), Unitário (2), Total (2)
        let mut table = elements::TableLayout::new(vec![4, 2, 1, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Product").styled(bold))
            .element(elements::Paragraph::new("SKU").styled(bold))
            .element(elements::Paragraph::new("Qty").styled(bold))
            .element(elements::Paragraph::new("Unit").styled(bold))
            .element(elements::Paragraph::new("Total").styled(bold))
            .push()
            .map_err(render_error)?;

        for item in &detail.items {
            table
                .row()
                .element(elements::Paragraph::new(item.product_name.clone()))
                .element(elements::Paragraph::new(item.product_sku.clone()))
                .element(elements::Paragraph::new(item.quantity.to_string()))
                .element(elements::Paragraph::new(format!("$ {:.2}", item.unit_price)))
                .element(elements::Paragraph::new(format!("$ {:.2}", item.subtotal)))
                .push()
                .map_err(render_error)?;
        }

        doc.push(table);
        doc.push(elements::Break::new(2));

        // --- TOTAIS ---
        for (label, value) in [
            ("Subtotal", order.subtotal),
            ("Shipping", order.shipping_cost),
            ("Tax", order.tax_amount),
        ] {
            let mut line = elements::Paragraph::new(format!("{}: $ {:.2}", label, value));
            line.set_alignment(genpdf::Alignment::Right);
            doc.push(line);
        }
        let mut total = elements::Paragraph::new(format!("TOTAL: $ {:.2}", order.total_amount));
        total.set_alignment(genpdf::Alignment::Right);
        doc.push(total.styled(style::Style::new().bold().with_font_size(12)));
        doc.push(elements::Break::new(2));

        // --- QR CODE DE ACOMPANHAMENTO ---
        doc.push(elements::Paragraph::new("Track your order").styled(bold));
        doc.push(elements::Paragraph::new(tracking_url.to_string()));
        doc.push(elements::Break::new(1));

        let code = QrCode::new(tracking_url.as_bytes()).map_err(render_error)?;
        let image_buffer = code.render::<Luma<u8>>().build();
        let pdf_image = elements::Image::from_dynamic_image(image::DynamicImage::ImageLuma8(image_buffer))
            .map_err(render_error)?
            .with_scale(genpdf::Scale::new(0.5, 0.5));
        doc.push(pdf_image);

        // --- RENDER ---
        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(render_error)?;

        tracing::debug!(order_number = %order.order_number, bytes = buffer.len(), "🧾 Fatura gerada");
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::orders::{OrderStatus, PaymentStatus};
    use crate::test_support::{order, order_item};

    #[test]
    fn missing_fonts_are_reported() {
        let order = order(OrderStatus::Pending, PaymentStatus::Pending);
        let items = vec![order_item(order.id, "Bateria iPhone 12", 1, "45.00")];
        let detail = OrderDetail { order, items };

        let service = DocumentService::new("/caminho/que/nao/existe".into(), "Parts".into());
        let result = service.render_invoice(&detail, "https://loja.example.com/orders/1");

        assert!(matches!(result, Err(AppError::FontNotFound(_))));
    }
}

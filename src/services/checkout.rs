// src/services/checkout.rs
//
// Montagem do pedido a partir do carrinho. Nada aqui toca o banco: o serviço de
// pedidos trava os produtos, chama `build_order` e grava o rascunho.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::{
        auth::User,
        cart::CartLine,
        orders::{Address, OrderDraft, OrderItemDraft},
    },
    services::{
        pricing::{resolve_price, round_money},
        stock::check_stock,
    },
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckoutSettings {
    pub shipping_flat_fee: Decimal,
    pub free_shipping_threshold: Decimal,
    // Fração (0.08 = 8%)
    pub tax_rate: Decimal,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            shipping_flat_fee: Decimal::TEN,
            free_shipping_threshold: Decimal::ONE_HUNDRED,
            tax_rate: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub shipping_cost: Decimal,
    pub total_amount: Decimal,
}

/// Frete grátis a partir do limite (inclusive); abaixo dele, taxa fixa.
pub fn compute_totals(subtotal: Decimal, settings: &CheckoutSettings) -> Totals {
    let subtotal = round_money(subtotal);
    let shipping_cost = if subtotal >= settings.free_shipping_threshold {
        Decimal::ZERO
    } else {
        round_money(settings.shipping_flat_fee)
    };
    let tax_amount = round_money(subtotal * settings.tax_rate);

    Totals {
        subtotal,
        tax_amount,
        shipping_cost,
        total_amount: subtotal + tax_amount + shipping_cost,
    }
}

/// Monta o rascunho imutável do pedido.
///
/// Tudo ou nada: a primeira linha que falhar no estoque derruba o checkout inteiro.
/// O número do pedido só é reservado no commit.
pub fn build_order(
    lines: &[CartLine],
    user: &User,
    shipping_address: Address,
    billing_address: Option<Address>,
    customer_notes: Option<String>,
    settings: &CheckoutSettings,
) -> Result<OrderDraft, AppError> {
    if lines.is_empty() {
        return Err(AppError::EmptyCart);
    }

    for line in lines {
        check_stock(&line.product, line.quantity)?;
    }

    let mut items = Vec::with_capacity(lines.len());
    let mut subtotal = Decimal::ZERO;

    for line in lines {
        let quote = resolve_price(&line.product, user.role, user.wholesale_tier.as_deref());
        // Preço unitário fechado em centavos: subtotal da linha = unitário × quantidade
        let unit_price = round_money(quote.unit_price);
        let line_subtotal = unit_price * Decimal::from(line.quantity);
        subtotal += line_subtotal;

        items.push(OrderItemDraft {
            product_id: line.product.id,
            product_name: line.product.name.clone(),
            product_sku: line.product.sku.clone(),
            product_image: line.product.primary_image().map(str::to_string),
            quantity: line.quantity,
            unit_price,
            discount_percent: quote.discount_percent,
            subtotal: line_subtotal,
        });
    }

    let totals = compute_totals(subtotal, settings);

    let customer_name = user
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(shipping_address.full_name.as_str())
        .to_string();
    let customer_phone = user
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .or_else(|| shipping_address.phone.clone());

    let notes = customer_notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    Ok(OrderDraft {
        user_id: user.id,
        customer_name,
        customer_email: user.email.clone(),
        customer_phone,
        subtotal: totals.subtotal,
        tax_amount: totals.tax_amount,
        shipping_cost: totals.shipping_cost,
        total_amount: totals.total_amount,
        is_wholesale: user.is_wholesale(),
        wholesale_tier: if user.is_wholesale() { user.wholesale_tier.clone() } else { None },
        billing_address: billing_address.unwrap_or_else(|| shipping_address.clone()),
        shipping_address,
        customer_notes: notes,
        items,
    })
}

/// `ORD-20260118-000042`
pub fn format_order_number(date: NaiveDate, sequence: i64) -> String {
    format!("ORD-{}-{:06}", date.format("%Y%m%d"), sequence)
}

/// `RPR-000123`
pub fn format_ticket_number(sequence: i64) -> String {
    format!("RPR-{:06}", sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use crate::test_support::{address, dec, line, priced, product, user};

    #[test]
    fn tier_one_order_rounds_unit_price_to_cents() {
        let p = product("129.99", "15", "20", "25", 10);
        let buyer = user(UserRole::Wholesale, Some("TIER1"));

        let draft = build_order(
            &[line(p, 2)],
            &buyer,
            address(),
            None,
            None,
            &CheckoutSettings::default(),
        )
        .unwrap();

        let item = &draft.items[0];
        assert_eq!(item.unit_price, dec("110.49"));
        assert_eq!(item.discount_percent, dec("15"));
        assert_eq!(item.subtotal, dec("220.98"));
        assert_eq!(draft.subtotal, dec("220.98"));
        assert_eq!(draft.shipping_cost, Decimal::ZERO);
        assert!(draft.is_wholesale);
        assert_eq!(draft.wholesale_tier.as_deref(), Some("TIER1"));
    }

    #[test]
    fn empty_cart_is_rejected() {
        let buyer = user(UserRole::Retail, None);
        let result = build_order(&[], &buyer, address(), None, None, &CheckoutSettings::default());
        assert!(matches!(result, Err(AppError::EmptyCart)));
    }

    #[test]
    fn one_short_line_fails_the_whole_order() {
        let buyer = user(UserRole::Retail, None);
        let ok = priced("20.00", 100);
        let short = priced("35.00", 5);
        let short_id = short.id;

        let result = build_order(
            &[line(ok, 1), line(short, 10)],
            &buyer,
            address(),
            None,
            None,
            &CheckoutSettings::default(),
        );

        match result {
            Err(AppError::InsufficientStock { product_id, available }) => {
                assert_eq!(product_id, short_id);
                assert_eq!(available, 5);
            }
            other => panic!("esperava InsufficientStock, veio {:?}", other),
        }
    }

    #[test]
    fn below_threshold_pays_flat_shipping() {
        let buyer = user(UserRole::Retail, None);
        let draft = build_order(
            &[line(priced("45.00", 10), 2)],
            &buyer,
            address(),
            None,
            None,
            &CheckoutSettings::default(),
        )
        .unwrap();

        assert_eq!(draft.subtotal, dec("90.00"));
        assert_eq!(draft.shipping_cost, dec("10.00"));
        assert_eq!(draft.tax_amount, Decimal::ZERO);
        assert_eq!(draft.total_amount, dec("100.00"));
    }

    #[test]
    fn threshold_itself_ships_free() {
        let totals = compute_totals(dec("100.00"), &CheckoutSettings::default());
        assert_eq!(totals.shipping_cost, Decimal::ZERO);
        assert_eq!(totals.total_amount, dec("100.00"));
    }

    #[test]
    fn tax_is_applied_on_subtotal() {
        let settings = CheckoutSettings { tax_rate: dec("0.08"), ..Default::default() };
        let totals = compute_totals(dec("50.00"), &settings);
        assert_eq!(totals.tax_amount, dec("4.00"));
        assert_eq!(totals.total_amount, dec("64.00"));
        assert_eq!(
            totals.total_amount,
            totals.subtotal + totals.tax_amount + totals.shipping_cost
        );
    }

    #[test]
    fn snapshot_falls_back_to_shipping_contact() {
        let mut buyer = user(UserRole::Retail, None);
        buyer.name = Some("   ".into());
        buyer.phone = None;
        let shipping = address();

        let draft = build_order(
            &[line(priced("10.00", 10), 1)],
            &buyer,
            shipping.clone(),
            None,
            Some("  ".into()),
            &CheckoutSettings::default(),
        )
        .unwrap();

        assert_eq!(draft.customer_name, shipping.full_name);
        assert_eq!(draft.customer_phone, shipping.phone);
        assert_eq!(draft.billing_address, shipping);
        assert_eq!(draft.customer_notes, None);
        assert!(!draft.is_wholesale);
    }

    #[test]
    fn retail_user_tier_is_not_recorded() {
        let buyer = user(UserRole::Retail, Some("TIER2"));
        let draft = build_order(
            &[line(product("80.00", "10", "20", "30", 3), 1)],
            &buyer,
            address(),
            None,
            None,
            &CheckoutSettings::default(),
        )
        .unwrap();
        assert_eq!(draft.items[0].unit_price, dec("80.00"));
        assert_eq!(draft.wholesale_tier, None);
    }

    #[test]
    fn numbers_are_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 18).unwrap();
        assert_eq!(format_order_number(date, 42), "ORD-20260118-000042");
        assert_eq!(format_ticket_number(123), "RPR-000123");
    }
}

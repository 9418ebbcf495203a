// src/services/pricing.rs

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::models::{
    auth::{User, UserRole, WholesaleTier},
    catalog::Product,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
}

impl PriceQuote {
    fn retail(product: &Product) -> Self {
        Self {
            unit_price: product.base_price,
            discount_percent: Decimal::ZERO,
        }
    }
}

/// Resolve o preço unitário para um papel/faixa.
///
/// - não-atacado ou sem faixa: preço base, desconto 0;
/// - atacado com faixa: `base × (1 − desconto/100)` com o desconto da coluna da faixa.
///
/// O valor volta sem arredondamento; quem monta a linha do pedido arredonda.
/// Uma faixa gravada com valor desconhecido gera um aviso no log e cai no preço de varejo.
pub fn resolve_price(product: &Product, role: UserRole, tier: Option<&str>) -> PriceQuote {
    if role != UserRole::Wholesale {
        return PriceQuote::retail(product);
    }

    let Some(raw_tier) = tier.filter(|t| !t.trim().is_empty()) else {
        return PriceQuote::retail(product);
    };

    let tier = match raw_tier.parse::<WholesaleTier>() {
        Ok(tier) => tier,
        Err(e) => {
            tracing::warn!(product_id = %product.id, "⚠️ {}; aplicando preço de varejo", e);
            return PriceQuote::retail(product);
        }
    };

    let discount_percent = match tier {
        WholesaleTier::Tier1 => product.tier1_discount,
        WholesaleTier::Tier2 => product.tier2_discount,
        WholesaleTier::Tier3 => product.tier3_discount,
    };

    let unit_price = product.base_price * (Decimal::ONE - discount_percent / Decimal::ONE_HUNDRED);

    PriceQuote {
        unit_price,
        discount_percent,
    }
}

/// Atalho para o usuário da requisição (visitante = varejo).
pub fn resolve_price_for(product: &Product, user: Option<&User>) -> PriceQuote {
    match user {
        Some(user) => resolve_price(product, user.role, user.wholesale_tier.as_deref()),
        None => PriceQuote::retail(product),
    }
}

/// Arredondamento monetário: 2 casas, meio para longe do zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dec, product};

    #[test]
    fn retail_users_pay_base_price() {
        let p = product("129.99", "15", "20", "25", 10);
        let quote = resolve_price(&p, UserRole::Retail, Some("TIER1"));
        assert_eq!(quote.unit_price, dec("129.99"));
        assert_eq!(quote.discount_percent, Decimal::ZERO);

        let admin = resolve_price(&p, UserRole::Admin, Some("TIER3"));
        assert_eq!(admin.unit_price, dec("129.99"));
    }

    #[test]
    fn wholesale_without_tier_pays_base_price() {
        let p = product("50.00", "10", "20", "30", 10);
        assert_eq!(resolve_price(&p, UserRole::Wholesale, None).unit_price, dec("50.00"));
        assert_eq!(resolve_price(&p, UserRole::Wholesale, Some("  ")).unit_price, dec("50.00"));
    }

    #[test]
    fn each_tier_uses_its_own_discount_column() {
        let p = product("200.00", "10", "20", "30", 10);
        let t1 = resolve_price(&p, UserRole::Wholesale, Some("TIER1"));
        let t2 = resolve_price(&p, UserRole::Wholesale, Some("TIER2"));
        let t3 = resolve_price(&p, UserRole::Wholesale, Some("TIER3"));

        assert_eq!((t1.unit_price, t1.discount_percent), (dec("180.00"), dec("10")));
        assert_eq!((t2.unit_price, t2.discount_percent), (dec("160.00"), dec("20")));
        assert_eq!((t3.unit_price, t3.discount_percent), (dec("140.00"), dec("30")));
    }

    #[test]
    fn tier1_scenario_is_not_rounded_mid_calculation() {
        let p = product("129.99", "15", "0", "0", 10);
        let quote = resolve_price(&p, UserRole::Wholesale, Some("TIER1"));

        assert_eq!(quote.unit_price, dec("110.4915"));
        assert_eq!(round_money(quote.unit_price), dec("110.49"));
    }

    #[test]
    fn unknown_tier_falls_back_to_retail() {
        let p = product("80.00", "10", "20", "30", 10);
        let quote = resolve_price(&p, UserRole::Wholesale, Some("PLATINUM"));
        assert_eq!(quote.unit_price, dec("80.00"));
        assert_eq!(quote.discount_percent, Decimal::ZERO);
    }

    #[test]
    fn guests_get_retail_price() {
        let p = product("80.00", "10", "20", "30", 10);
        assert_eq!(resolve_price_for(&p, None).unit_price, dec("80.00"));
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_money(dec("10.005")), dec("10.01"));
        assert_eq!(round_money(dec("10.004")), dec("10.00"));
    }
}

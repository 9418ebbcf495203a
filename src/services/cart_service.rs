// src/services/cart_service.rs

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CartRepository, ProductRepository},
    models::{
        auth::User,
        cart::{CartLine, CartLineView, CartMutation, CartView},
    },
    services::{
        pricing::{resolve_price_for, round_money},
        stock::check_stock,
    },
};

#[derive(Clone)]
pub struct CartService {
    pool: PgPool,
    carts: CartRepository,
    products: ProductRepository,
}

impl CartService {
    pub fn new(pool: PgPool, carts: CartRepository, products: ProductRepository) -> Self {
        Self { pool, carts, products }
    }

    pub async fn get_cart(&self, user: &User) -> Result<CartView, AppError> {
        let items = self.carts.list_items(&self.pool, user.id).await?;
        if items.is_empty() {
            return Ok(build_cart_view(&[], Some(user)));
        }

        let ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        let mut products: HashMap<Uuid, _> = self
            .products
            .find_many(&self.pool, &ids, false)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let lines: Vec<CartLine> = items
            .iter()
            .filter_map(|item| {
                products
                    .remove(&item.product_id)
                    .map(|product| CartLine { product, quantity: item.quantity })
            })
            .collect();

        Ok(build_cart_view(&lines, Some(user)))
    }

    /// Soma à quantidade que já está no carrinho. O total resultante passa pelo estoque.
    pub async fn add_item(
        &self,
        user: &User,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartMutation, AppError> {
        let product = self
            .products
            .find_by_id(&self.pool, product_id)
            .await?
            .ok_or(AppError::NotFound("Produto"))?;

        let current = self
            .carts
            .find_item(user.id, product_id)
            .await?
            .map(|item| item.quantity)
            .unwrap_or(0);
        check_stock(&product, current + quantity)?;

        let item = self
            .carts
            .add_quantity(&self.pool, user.id, product_id, quantity)
            .await?;

        tracing::debug!(user_id = %user.id, product_id = %product_id, quantity = item.quantity, "Carrinho atualizado");

        Ok(CartMutation {
            persisted: true,
            product_id,
            quantity: item.quantity,
        })
    }

    /// Quantidade absoluta. Zero remove a linha.
    pub async fn set_quantity(
        &self,
        user: &User,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartMutation, AppError> {
        if quantity == 0 {
            self.carts.remove_item(&self.pool, user.id, product_id).await?;
            return Ok(CartMutation { persisted: true, product_id, quantity: 0 });
        }

        let product = self
            .products
            .find_by_id(&self.pool, product_id)
            .await?
            .ok_or(AppError::NotFound("Produto"))?;
        check_stock(&product, quantity)?;

        let item = self
            .carts
            .set_quantity(&self.pool, user.id, product_id, quantity)
            .await?
            .ok_or(AppError::NotFound("Item do carrinho"))?;

        Ok(CartMutation {
            persisted: true,
            product_id,
            quantity: item.quantity,
        })
    }

    pub async fn remove_item(&self, user: &User, product_id: Uuid) -> Result<(), AppError> {
        self.carts.remove_item(&self.pool, user.id, product_id).await?;
        Ok(())
    }

    pub async fn clear(&self, user: &User) -> Result<(), AppError> {
        let removed = self.carts.clear(&self.pool, user.id).await?;
        tracing::debug!(user_id = %user.id, removed, "Carrinho esvaziado");
        Ok(())
    }
}

/// Visão do carrinho com o preço atual de cada linha para quem está comprando.
pub fn build_cart_view(lines: &[CartLine], user: Option<&User>) -> CartView {
    let mut subtotal = Decimal::ZERO;
    let mut item_count = 0;

    let items = lines
        .iter()
        .map(|line| {
            let quote = resolve_price_for(&line.product, user);
            let unit_price = round_money(quote.unit_price);
            let line_subtotal = unit_price * Decimal::from(line.quantity);
            subtotal += line_subtotal;
            item_count += line.quantity;

            CartLineView {
                product_id: line.product.id,
                slug: line.product.slug.clone(),
                name: line.product.name.clone(),
                sku: line.product.sku.clone(),
                image: line.product.primary_image().map(str::to_string),
                quantity: line.quantity,
                unit_price,
                discount_percent: quote.discount_percent,
                line_subtotal,
                available: line.product.total_stock,
                is_active: line.product.is_active,
            }
        })
        .collect();

    CartView {
        items,
        item_count,
        subtotal,
        guest: user.is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use crate::test_support::{dec, line, priced, product, user};

    #[test]
    fn wholesale_cart_shows_tier_prices() {
        let buyer = user(UserRole::Wholesale, Some("tier2"));
        let lines = vec![
            line(product("100.00", "10", "20", "30", 10), 2),
            line(priced("15.50", 10), 1),
        ];

        let view = build_cart_view(&lines, Some(&buyer));

        assert!(!view.guest);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.items[0].unit_price, dec("80.00"));
        assert_eq!(view.items[0].line_subtotal, dec("160.00"));
        assert_eq!(view.items[1].unit_price, dec("15.50"));
        assert_eq!(view.subtotal, dec("175.50"));
    }

    #[test]
    fn empty_view_for_guests() {
        let view = build_cart_view(&[], None);
        assert!(view.guest);
        assert_eq!(view.subtotal, Decimal::ZERO);
        assert!(view.items.is_empty());
    }

    #[test]
    fn inactive_lines_are_flagged() {
        let mut p = priced("9.99", 0);
        p.is_active = false;
        let view = build_cart_view(&[line(p, 1)], Some(&user(UserRole::Retail, None)));
        assert!(!view.items[0].is_active);
        assert_eq!(view.items[0].available, 0);
    }
}

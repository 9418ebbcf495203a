// src/services/catalog_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, Pagination},
    },
    db::ProductRepository,
    models::{
        auth::User,
        catalog::{NewProduct, Product, ProductChanges, ProductFilter, ProductListing},
    },
    services::pricing::{resolve_price_for, round_money},
};

#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
    products: ProductRepository,
}

impl CatalogService {
    pub fn new(pool: PgPool, products: ProductRepository) -> Self {
        Self { pool, products }
    }

    pub async fn list_products(
        &self,
        filter: &ProductFilter,
        pagination: Pagination,
        viewer: Option<&User>,
    ) -> Result<Page<ProductListing>, AppError> {
        let products = self.products.list_active(filter, pagination).await?;
        let total = self.products.count_active(filter).await?;
        let items = products.iter().map(|p| to_listing(p, viewer)).collect();
        Ok(Page::new(items, pagination, total))
    }

    pub async fn get_by_slug(&self, slug: &str, viewer: Option<&User>) -> Result<ProductListing, AppError> {
        let product = self
            .products
            .find_by_slug(slug)
            .await?
            .filter(|p| p.is_active)
            .ok_or(AppError::NotFound("Produto"))?;
        Ok(to_listing(&product, viewer))
    }

    // --- Administração ---

    pub async fn create_product(&self, new: &NewProduct) -> Result<Product, AppError> {
        let product = self.products.create(&self.pool, new).await?;
        tracing::info!(sku = %product.sku, "✅ Produto cadastrado");
        Ok(product)
    }

    pub async fn update_product(&self, id: Uuid, changes: &ProductChanges) -> Result<Product, AppError> {
        self.products
            .update(&self.pool, id, changes)
            .await?
            .ok_or(AppError::NotFound("Produto"))
    }

    /// Ajuste relativo de saldo. Recusa o que deixaria o estoque negativo.
    pub async fn adjust_stock(&self, id: Uuid, delta: i32) -> Result<Product, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(product) = self.products.adjust_stock(&mut *tx, id, delta).await? else {
            return match self.products.current_stock(&mut *tx, id).await? {
                None => Err(AppError::NotFound("Produto")),
                Some(current) => Err(AppError::BadRequest(format!(
                    "O ajuste de {} deixaria o estoque negativo (saldo atual: {}).",
                    delta, current
                ))),
            };
        };

        tx.commit().await?;
        tracing::info!(sku = %product.sku, delta, stock = product.total_stock, "📦 Estoque ajustado");
        Ok(product)
    }
}

/// Produto como o visitante/usuário vê, com o preço resolvido.
pub fn to_listing(product: &Product, viewer: Option<&User>) -> ProductListing {
    let quote = resolve_price_for(product, viewer);
    ProductListing {
        id: product.id,
        sku: product.sku.clone(),
        slug: product.slug.clone(),
        name: product.name.clone(),
        brand: product.brand.clone(),
        device_model: product.device_model.clone(),
        images: product.images.clone(),
        base_price: product.base_price,
        price: round_money(quote.unit_price),
        discount_percent: quote.discount_percent,
        available: product.total_stock,
        in_stock: product.is_active && product.total_stock > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use crate::test_support::{dec, product, user};

    #[test]
    fn guests_see_retail() {
        let p = product("129.99", "15", "20", "25", 4);
        let listing = to_listing(&p, None);
        assert_eq!(listing.price, dec("129.99"));
        assert_eq!(listing.discount_percent, dec("0"));
        assert!(listing.in_stock);
    }

    #[test]
    fn wholesale_sees_rounded_tier_price() {
        let p = product("129.99", "15", "20", "25", 0);
        let buyer = user(UserRole::Wholesale, Some("TIER1"));
        let listing = to_listing(&p, Some(&buyer));
        assert_eq!(listing.price, dec("110.49"));
        assert_eq!(listing.base_price, dec("129.99"));
        assert!(!listing.in_stock);
    }
}

// src/db/catalog_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;
use crate::{
    common::{error::AppError, pagination::Pagination},
    models::catalog::{NewProduct, Product, ProductChanges, ProductFilter},
};

// Filtro opcional: `$n IS NULL` desliga a condição
const FILTER_CLAUSE: &str = r#"
    is_active = TRUE
    AND ($1::text IS NULL OR brand ILIKE $1)
    AND ($2::text IS NULL OR device_model ILIKE $2)
    AND ($3::text IS NULL OR name ILIKE '%' || $3 || '%' OR sku ILIKE '%' || $3 || '%')
"#;

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura da vitrine: usa a pool direto
    // ---

    pub async fn list_active(
        &self,
        filter: &ProductFilter,
        pagination: Pagination,
    ) -> Result<Vec<Product>, AppError> {
        let sql = format!(
            "SELECT * FROM products WHERE {FILTER_CLAUSE} ORDER BY name ASC LIMIT $4 OFFSET $5"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(filter.brand.as_deref())
            .bind(filter.device_model.as_deref())
            .bind(filter.search.as_deref())
            .bind(pagination.limit)
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    pub async fn count_active(&self, filter: &ProductFilter) -> Result<i64, AppError> {
        let sql = format!("SELECT COUNT(*) FROM products WHERE {FILTER_CLAUSE}");
        let total: i64 = sqlx::query_scalar(&sql)
            .bind(filter.brand.as_deref())
            .bind(filter.device_model.as_deref())
            .bind(filter.search.as_deref())
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    // ---
    // Funções que participam de transações recebem o executor
    // ---

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Busca vários produtos de uma vez. Com `lock = true` as linhas ficam travadas
    /// até o fim da transação (usado no checkout).
    pub async fn find_many<'e, E>(
        &self,
        executor: E,
        ids: &[Uuid],
        lock: bool,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = if lock {
            "SELECT * FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE"
        } else {
            "SELECT * FROM products WHERE id = ANY($1)"
        };
        let products = sqlx::query_as::<_, Product>(sql)
            .bind(ids.to_vec())
            .fetch_all(executor)
            .await?;
        Ok(products)
    }

    pub async fn create<'e, E>(&self, executor: E, new: &NewProduct) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                sku, slug, name, brand, device_model, images, base_price,
                tier1_discount, tier2_discount, tier3_discount, total_stock, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(&new.sku)
        .bind(&new.slug)
        .bind(&new.name)
        .bind(&new.brand)
        .bind(&new.device_model)
        .bind(&new.images)
        .bind(new.base_price)
        .bind(new.tier1_discount)
        .bind(new.tier2_discount)
        .bind(new.tier3_discount)
        .bind(new.total_stock)
        .bind(new.is_active)
        .fetch_one(executor)
        .await
        .map_err(map_unique_violation)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                brand = COALESCE($3, brand),
                device_model = COALESCE($4, device_model),
                images = COALESCE($5, images),
                base_price = COALESCE($6, base_price),
                tier1_discount = COALESCE($7, tier1_discount),
                tier2_discount = COALESCE($8, tier2_discount),
                tier3_discount = COALESCE($9, tier3_discount),
                is_active = COALESCE($10, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.brand)
        .bind(&changes.device_model)
        .bind(&changes.images)
        .bind(changes.base_price)
        .bind(changes.tier1_discount)
        .bind(changes.tier2_discount)
        .bind(changes.tier3_discount)
        .bind(changes.is_active)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    /// Baixa condicional: só decrementa se houver saldo e o produto estiver ativo.
    /// `None` = nenhuma linha afetada (sem saldo, inativo ou inexistente).
    pub async fn decrement_stock<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Option<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let remaining: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET total_stock = total_stock - $2, updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE AND total_stock >= $2
            RETURNING total_stock
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(executor)
        .await?;
        Ok(remaining)
    }

    /// Ajuste relativo (entrada, devolução, correção). Nunca deixa o saldo negativo:
    /// `None` quando o ajuste levaria abaixo de zero ou o produto não existe.
    pub async fn adjust_stock<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        delta: i32,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET total_stock = total_stock + $2, updated_at = NOW()
            WHERE id = $1 AND total_stock + $2 >= 0
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(delta)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    pub async fn current_stock<'e, E>(&self, executor: E, product_id: Uuid) -> Result<Option<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stock: Option<i32> = sqlx::query_scalar("SELECT total_stock FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(executor)
            .await?;
        Ok(stock)
    }
}

fn map_unique_violation(e: sqlx::Error) -> AppError {
    // Converte erro de violação de chave única em um erro mais amigável
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::ProductAlreadyExists;
        }
    }
    e.into()
}

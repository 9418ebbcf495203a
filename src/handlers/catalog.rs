// src/handlers/catalog.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{error::ApiError, pagination::Pagination},
    config::AppState,
    middleware::{auth::MaybeUser, i18n::Locale, rbac::AdminUser, validation::ValidatedJson},
    models::catalog::{NewProduct, Product, ProductChanges, ProductFilter, ProductListing},
};

// ---
// Validações Customizadas
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_percent(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() || *val > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("range");
        err.message = Some("O desconto deve estar entre 0 e 100.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_non_zero(val: i32) -> Result<(), ValidationError> {
    if val == 0 {
        let mut err = ValidationError::new("non_zero");
        err.message = Some("O ajuste não pode ser zero.".into());
        return Err(err);
    }
    Ok(())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub brand: Option<String>,
    #[serde(alias = "device_model")]
    pub device_model: Option<String>,
    /// Busca por nome ou SKU
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "O SKU é obrigatório."))]
    pub sku: String,
    #[validate(length(min = 1, message = "O slug é obrigatório."))]
    pub slug: String,
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub brand: Option<String>,
    pub device_model: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub base_price: Decimal,
    #[serde(default)]
    #[validate(custom(function = "validate_percent"))]
    pub tier1_discount: Decimal,
    #[serde(default)]
    #[validate(custom(function = "validate_percent"))]
    pub tier2_discount: Decimal,
    #[serde(default)]
    #[validate(custom(function = "validate_percent"))]
    pub tier3_discount: Decimal,
    #[serde(default)]
    #[validate(range(min = 0, message = "O estoque inicial não pode ser negativo."))]
    pub total_stock: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl From<CreateProductPayload> for NewProduct {
    fn from(p: CreateProductPayload) -> Self {
        NewProduct {
            sku: p.sku.trim().to_string(),
            slug: p.slug.trim().to_lowercase(),
            name: p.name.trim().to_string(),
            brand: blank_to_none(p.brand),
            device_model: blank_to_none(p.device_model),
            images: p.images,
            base_price: p.base_price,
            tier1_discount: p.tier1_discount,
            tier2_discount: p.tier2_discount,
            tier3_discount: p.tier3_discount,
            total_stock: p.total_stock,
            is_active: p.is_active,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,
    pub brand: Option<String>,
    pub device_model: Option<String>,
    pub images: Option<Vec<String>>,
    #[validate(custom(function = "validate_not_negative"))]
    pub base_price: Option<Decimal>,
    #[validate(custom(function = "validate_percent"))]
    pub tier1_discount: Option<Decimal>,
    #[validate(custom(function = "validate_percent"))]
    pub tier2_discount: Option<Decimal>,
    #[validate(custom(function = "validate_percent"))]
    pub tier3_discount: Option<Decimal>,
    pub is_active: Option<bool>,
}

impl From<UpdateProductPayload> for ProductChanges {
    fn from(p: UpdateProductPayload) -> Self {
        ProductChanges {
            name: p.name,
            brand: p.brand,
            device_model: p.device_model,
            images: p.images,
            base_price: p.base_price,
            tier1_discount: p.tier1_discount,
            tier2_discount: p.tier2_discount,
            tier3_discount: p.tier3_discount,
            is_active: p.is_active,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdjustStockPayload {
    /// Positivo para entrada, negativo para baixa manual
    #[validate(custom(function = "validate_non_zero"))]
    pub delta: i32,
}

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Catalog",
    params(
        ProductQuery,
        ("x-user-id" = Option<Uuid>, Header, description = "Usuário da sessão (preço de atacado)")
    ),
    responses(
        (status = 200, description = "Página de produtos ativos com o preço de quem consulta")
    )
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
    MaybeUser(user): MaybeUser,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = ProductFilter {
        brand: blank_to_none(query.brand),
        device_model: blank_to_none(query.device_model),
        search: blank_to_none(query.q),
    };
    let pagination = Pagination::new(query.page, query.limit);

    let page = app_state
        .catalog_service
        .list_products(&filter, pagination, user.as_ref())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(page))
}

// GET /api/products/{slug}
#[utoipa::path(
    get,
    path = "/api/products/{slug}",
    tag = "Catalog",
    params(
        ("slug" = String, Path, description = "Slug do produto"),
        ("x-user-id" = Option<Uuid>, Header, description = "Usuário da sessão")
    ),
    responses(
        (status = 200, description = "Produto", body = ProductListing),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    locale: Locale,
    MaybeUser(user): MaybeUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = app_state
        .catalog_service
        .get_by_slug(&slug, user.as_ref())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(product))
}

// POST /api/admin/products
#[utoipa::path(
    post,
    path = "/api/admin/products",
    tag = "Admin",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas administradores"),
        (status = 409, description = "SKU ou slug já existe")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "Administrador")
    )
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    ValidatedJson(payload): ValidatedJson<CreateProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let product = app_state
        .catalog_service
        .create_product(&payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(product)))
}

// PUT /api/admin/products/{id}
#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    tag = "Admin",
    request_body = UpdateProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do produto"),
        ("x-user-id" = Uuid, Header, description = "Administrador")
    )
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let product = app_state
        .catalog_service
        .update_product(id, &payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(product))
}

// POST /api/admin/products/{id}/stock
#[utoipa::path(
    post,
    path = "/api/admin/products/{id}/stock",
    tag = "Admin",
    request_body = AdjustStockPayload,
    responses(
        (status = 200, description = "Saldo ajustado", body = Product),
        (status = 400, description = "O ajuste deixaria o saldo negativo"),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do produto"),
        ("x-user-id" = Uuid, Header, description = "Administrador")
    )
)]
pub async fn adjust_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AdjustStockPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let product = app_state
        .catalog_service
        .adjust_stock(id, payload.delta)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(product))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_adjustment_cannot_be_zero() {
        let zero = AdjustStockPayload { delta: 0 };
        let errors = zero.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("delta"));

        assert!(AdjustStockPayload { delta: -3 }.validate().is_ok());
        assert!(AdjustStockPayload { delta: 12 }.validate().is_ok());
    }

    #[test]
    fn discounts_outside_percent_range_fail() {
        let payload: CreateProductPayload = serde_json::from_value(serde_json::json!({
            "sku": "BAT-IP12",
            "slug": "bateria-iphone-12",
            "name": "Bateria iPhone 12",
            "basePrice": 45.0,
            "tier1Discount": 120
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("tier1_discount"));
    }

    #[test]
    fn new_product_is_normalized() {
        let payload: CreateProductPayload = serde_json::from_value(serde_json::json!({
            "sku": " BAT-IP12 ",
            "slug": "Bateria-iPhone-12",
            "name": "Bateria iPhone 12",
            "brand": "  ",
            "basePrice": 45.0
        }))
        .unwrap();
        assert!(payload.validate().is_ok());

        let new: NewProduct = payload.into();
        assert_eq!(new.sku, "BAT-IP12");
        assert_eq!(new.slug, "bateria-iphone-12");
        assert_eq!(new.brand, None);
        assert!(new.is_active);
        assert_eq!(new.total_stock, 0);
    }

    #[test]
    fn zero_stock_adjustment_is_invalid() {
        assert!(AdjustStockPayload { delta: 0 }.validate().is_err());
        assert!(AdjustStockPayload { delta: -3 }.validate().is_ok());
    }
}

// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Produto (peças, telas, baterias...) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "SCR-IP13-OLED")]
    pub sku: String,
    #[schema(example = "iphone-13-oled-screen")]
    pub slug: String,
    pub name: String,
    pub brand: Option<String>,
    pub device_model: Option<String>,
    pub images: Vec<String>,
    #[schema(example = 129.99)]
    pub base_price: Decimal,
    // Descontos de atacado em porcentagem (0-100)
    pub tier1_discount: Decimal,
    pub tier2_discount: Decimal,
    pub tier3_discount: Decimal,
    // Contador simples, não é um livro-razão. Nunca negativo.
    pub total_stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Produto como a vitrine mostra: preço já resolvido para quem está olhando.
/// Os descontos por faixa não saem daqui.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub id: Uuid,
    pub sku: String,
    pub slug: String,
    pub name: String,
    pub brand: Option<String>,
    pub device_model: Option<String>,
    pub images: Vec<String>,
    pub base_price: Decimal,
    pub price: Decimal,
    pub discount_percent: Decimal,
    pub available: i32,
    pub in_stock: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub brand: Option<String>,
    pub device_model: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub sku: String,
    pub slug: String,
    pub name: String,
    pub brand: Option<String>,
    pub device_model: Option<String>,
    pub images: Vec<String>,
    pub base_price: Decimal,
    pub tier1_discount: Decimal,
    pub tier2_discount: Decimal,
    pub tier3_discount: Decimal,
    pub total_stock: i32,
    pub is_active: bool,
}

// Atualização parcial: `None` mantém o valor atual
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub device_model: Option<String>,
    pub images: Option<Vec<String>>,
    pub base_price: Option<Decimal>,
    pub tier1_discount: Option<Decimal>,
    pub tier2_discount: Option<Decimal>,
    pub tier3_discount: Option<Decimal>,
    pub is_active: Option<bool>,
}

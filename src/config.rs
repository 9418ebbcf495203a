// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{CartRepository, DashboardRepository, OrderRepository, ProductRepository, RepairRepository, UserRepository},
    services::{
        checkout::CheckoutSettings,
        mailer::{LogMailer, Mailer},
        CartService, CatalogService, DashboardService, DocumentService, OrderService, RepairService,
    },
};

// Configuração lida uma vez na subida. Valores obrigatórios ausentes derrubam o start.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub cors_allowed_origins: Vec<String>,
    pub payment_webhook_secret: String,
    pub checkout: CheckoutSettings,
    pub low_stock_threshold: i32,
    pub public_base_url: String,
    pub pdf_fonts_dir: String,
    pub store_name: String,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| get(key).ok_or_else(|| anyhow!("{} deve ser definida", key));

        fn parsed<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
        where
            T: FromStr,
            T::Err: std::fmt::Display,
        {
            match raw {
                None => Ok(default),
                Some(v) => v
                    .parse::<T>()
                    .map_err(|e| anyhow!("{} inválida ('{}'): {}", key, v, e)),
            }
        }

        let checkout = CheckoutSettings {
            shipping_flat_fee: parsed("SHIPPING_FLAT_FEE", get("SHIPPING_FLAT_FEE"), Decimal::TEN)?,
            free_shipping_threshold: parsed(
                "FREE_SHIPPING_THRESHOLD",
                get("FREE_SHIPPING_THRESHOLD"),
                Decimal::ONE_HUNDRED,
            )?,
            tax_rate: parsed("TAX_RATE", get("TAX_RATE"), Decimal::ZERO)?,
        };
        if checkout.tax_rate.is_sign_negative() || checkout.shipping_flat_fee.is_sign_negative() {
            return Err(anyhow!("TAX_RATE e SHIPPING_FLAT_FEE não podem ser negativos"));
        }

        let cors_allowed_origins: Vec<String> = get("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().trim_end_matches('/').to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections: parsed("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 5)?,
            cors_allowed_origins,
            payment_webhook_secret: required("PAYMENT_WEBHOOK_SECRET")?,
            checkout,
            low_stock_threshold: parsed("LOW_STOCK_THRESHOLD", get("LOW_STOCK_THRESHOLD"), 5)?,
            public_base_url: get("PUBLIC_BASE_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),
            pdf_fonts_dir: get("PDF_FONTS_DIR").unwrap_or_else(|| "./fonts".to_string()),
            store_name: get("STORE_NAME").unwrap_or_else(|| "Parts Storefront".to_string()),
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db_pool: PgPool,
    pub user_repo: UserRepository,
    pub catalog_service: CatalogService,
    pub cart_service: CartService,
    pub order_service: OrderService,
    pub repair_service: RepairService,
    pub dashboard_service: DashboardService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(settings, db_pool, Arc::new(LogMailer)))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(settings: Settings, db_pool: PgPool, mailer: Arc<dyn Mailer>) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let cart_repo = CartRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let repair_repo = RepairRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let catalog_service = CatalogService::new(db_pool.clone(), product_repo.clone());
        let cart_service = CartService::new(db_pool.clone(), cart_repo.clone(), product_repo.clone());
        let order_service = OrderService::new(
            db_pool.clone(),
            order_repo,
            product_repo,
            cart_repo,
            settings.checkout,
            mailer.clone(),
            settings.public_base_url.clone(),
        );
        let repair_service = RepairService::new(
            db_pool.clone(),
            repair_repo,
            mailer,
            settings.public_base_url.clone(),
        );
        let dashboard_service = DashboardService::new(dashboard_repo, settings.low_stock_threshold);
        let document_service =
            DocumentService::new(settings.pdf_fonts_dir.clone(), settings.store_name.clone());

        Self {
            settings: Arc::new(settings),
            db_pool,
            user_repo,
            catalog_service,
            cart_service,
            order_service,
            repair_service,
            dashboard_service,
            document_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/parts"),
        ("PAYMENT_WEBHOOK_SECRET", "whsec_test"),
    ];

    #[test]
    fn defaults_apply() {
        let settings = Settings::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(settings.bind_addr, "0.0.0.0:3000");
        assert_eq!(settings.db_max_connections, 5);
        assert_eq!(settings.checkout, CheckoutSettings::default());
        assert_eq!(settings.low_stock_threshold, 5);
        assert!(settings.cors_allowed_origins.is_empty());
        assert_eq!(settings.pdf_fonts_dir, "./fonts");
    }

    #[test]
    fn missing_secret_fails() {
        let result = Settings::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")]));
        let message = result.unwrap_err().to_string();
        assert!(message.contains("PAYMENT_WEBHOOK_SECRET"));
    }

    #[test]
    fn origins_and_money_are_parsed() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("CORS_ALLOWED_ORIGINS", "https://loja.example.com/, http://localhost:5173"));
        pairs.push(("SHIPPING_FLAT_FEE", "12.50"));
        pairs.push(("TAX_RATE", "0.08"));

        let settings = Settings::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(
            settings.cors_allowed_origins,
            vec!["https://loja.example.com", "http://localhost:5173"]
        );
        assert_eq!(settings.checkout.shipping_flat_fee, Decimal::new(1250, 2));
        assert_eq!(settings.checkout.tax_rate, Decimal::new(8, 2));
    }

    #[test]
    fn garbage_numbers_are_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DB_MAX_CONNECTIONS", "muitas"));
        assert!(Settings::from_lookup(lookup(&pairs)).is_err());
    }
}

// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Retail,
    Wholesale,
    Admin,
}

// Faixa de atacado: escolhe qual coluna de desconto do produto vale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WholesaleTier {
    Tier1,
    Tier2,
    Tier3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTier(pub String);

impl fmt::Display for UnknownTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "faixa de atacado desconhecida: '{}'", self.0)
    }
}

impl std::error::Error for UnknownTier {}

impl FromStr for WholesaleTier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TIER1" => Ok(WholesaleTier::Tier1),
            "TIER2" => Ok(WholesaleTier::Tier2),
            "TIER3" => Ok(WholesaleTier::Tier3),
            _ => Err(UnknownTier(s.to_string())),
        }
    }
}

impl fmt::Display for WholesaleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WholesaleTier::Tier1 => "TIER1",
            WholesaleTier::Tier2 => "TIER2",
            WholesaleTier::Tier3 => "TIER3",
        };
        f.write_str(s)
    }
}

// Representa um usuário vindo do banco de dados.
// O papel e a faixa são mantidos pelo fluxo externo de aprovação de atacado.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    pub wholesale_tier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_wholesale(&self) -> bool {
        self.role == UserRole::Wholesale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tiers_case_insensitively() {
        assert_eq!("TIER1".parse::<WholesaleTier>(), Ok(WholesaleTier::Tier1));
        assert_eq!(" tier3 ".parse::<WholesaleTier>(), Ok(WholesaleTier::Tier3));
        assert!("GOLD".parse::<WholesaleTier>().is_err());
    }

    #[test]
    fn tier_display_matches_storage_format() {
        assert_eq!(WholesaleTier::Tier2.to_string(), "TIER2");
        assert_eq!(serde_json::to_string(&WholesaleTier::Tier2).unwrap(), "\"TIER2\"");
    }
}

// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::common::messages;
use crate::middleware::i18n::Locale;

// O erro de domínio. Serviços e repositórios só conhecem este tipo;
// a tradução para HTTP acontece em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("Usuário não autenticado")]
    Unauthorized,

    #[error("Acesso negado")]
    Forbidden,

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("SKU ou slug já existe")]
    ProductAlreadyExists,

    #[error("Carrinho vazio")]
    EmptyCart,

    #[error("Produto {product_id} indisponível")]
    ProductUnavailable { product_id: Uuid },

    #[error("Estoque insuficiente para {product_id} (disponível: {available})")]
    InsufficientStock { product_id: Uuid, available: i32 },

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Assinatura do webhook inválida: {0}")]
    InvalidSignature(String),

    // O erro do banco fica só no log, nunca vai para o cliente
    #[error("Falha ao finalizar o pedido: {0}")]
    OrderPlacementFailed(#[source] sqlx::Error),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::BadRequest(_)
            | AppError::EmptyCart
            | AppError::ProductUnavailable { .. }
            | AppError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized | AppError::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ProductAlreadyExists | AppError::InvalidStatusTransition { .. } => {
                StatusCode::CONFLICT
            }
            AppError::OrderPlacementFailed(_)
            | AppError::FontNotFound(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Código estável que o frontend usa para decidir o que mostrar.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ProductAlreadyExists => "PRODUCT_ALREADY_EXISTS",
            AppError::EmptyCart => "EMPTY_CART",
            AppError::ProductUnavailable { .. } => "PRODUCT_UNAVAILABLE",
            AppError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            AppError::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            AppError::InvalidSignature(_) => "INVALID_SIGNATURE",
            AppError::OrderPlacementFailed(_) => "ORDER_PLACEMENT_FAILED",
            AppError::FontNotFound(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let mut api_error = ApiError {
            status,
            error: messages::translate(self.code(), locale.lang()).to_string(),
            code: Some(self.code()),
            available: None,
            details: None,
        };

        match self {
            AppError::InsufficientStock { available, .. } => {
                api_error.available = Some(*available);
            }
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                api_error.details = Some(json!(details));
            }
            AppError::BadRequest(reason) => {
                api_error.details = Some(json!({ "reason": reason }));
            }
            AppError::InvalidStatusTransition { from, to } => {
                api_error.details = Some(json!({ "from": from, "to": to }));
            }
            _ => {}
        }

        api_error
    }
}

// Sem locale explícito (ex.: tarefas em background) usamos o idioma padrão.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

// O envelope JSON que volta para o cliente:
// { "error": "...", "code": "...", "available": 5, "details": {...} }
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub code: Option<&'static str>,
    pub available: Option<i32>,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn body(&self) -> Value {
        let mut body = json!({ "error": self.error });
        if let Some(code) = self.code {
            body["code"] = json!(code);
        }
        if let Some(available) = self.available {
            body["available"] = json!(available);
        }
        if let Some(details) = &self.details {
            body["details"] = details.clone();
        }
        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body())).into_response()
    }
}

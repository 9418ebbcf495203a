// src/handlers/repairs.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{AuthenticatedUser, MaybeUser},
        i18n::Locale,
        validation::ValidatedJson,
    },
    models::{
        auth::User,
        repairs::{NewRepairTicket, RepairTicket, RepairTracking},
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepairPayload {
    // Opcionais para usuários logados (vêm do perfil); obrigatórios para visitantes
    pub customer_name: Option<String>,
    #[validate(email(message = "E-mail inválido."))]
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Informe o modelo do aparelho."))]
    pub device_model: String,
    #[validate(length(min = 1, max = 2000, message = "Descreva o problema."))]
    pub issue: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl CreateRepairPayload {
    /// Completa o contato com o perfil do usuário; visitante precisa informar nome e e-mail.
    pub fn into_ticket(self, user: Option<&User>) -> Result<NewRepairTicket, AppError> {
        let customer_name = non_blank(self.customer_name)
            .or_else(|| user.and_then(|u| non_blank(u.name.clone())))
            .ok_or_else(|| AppError::BadRequest("Informe o nome do cliente.".into()))?;
        let customer_email = non_blank(self.customer_email)
            .or_else(|| user.map(|u| u.email.clone()))
            .ok_or_else(|| AppError::BadRequest("Informe o e-mail do cliente.".into()))?;
        let customer_phone =
            non_blank(self.customer_phone).or_else(|| user.and_then(|u| non_blank(u.phone.clone())));

        Ok(NewRepairTicket {
            user_id: user.map(|u| u.id),
            customer_name,
            customer_email,
            customer_phone,
            device_model: self.device_model.trim().to_string(),
            issue: self.issue.trim().to_string(),
        })
    }
}

// POST /api/repairs
#[utoipa::path(
    post,
    path = "/api/repairs",
    tag = "Repairs",
    request_body = CreateRepairPayload,
    responses(
        (status = 201, description = "Chamado aberto", body = RepairTicket),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-user-id" = Option<Uuid>, Header, description = "Usuário da sessão")
    )
)]
pub async fn create_ticket(
    State(app_state): State<AppState>,
    locale: Locale,
    MaybeUser(user): MaybeUser,
    ValidatedJson(payload): ValidatedJson<CreateRepairPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let new = payload
        .into_ticket(user.as_ref())
        .map_err(|e| e.to_api_error(&locale))?;

    let ticket = app_state
        .repair_service
        .create_ticket(&new)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(ticket)))
}

// GET /api/repairs/track/{ticket_number}
#[utoipa::path(
    get,
    path = "/api/repairs/track/{ticket_number}",
    tag = "Repairs",
    params(
        ("ticket_number" = String, Path, description = "Número do chamado (RPR-000123)")
    ),
    responses(
        (status = 200, description = "Status público do reparo", body = RepairTracking),
        (status = 404, description = "Chamado não encontrado")
    )
)]
pub async fn track_ticket(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(ticket_number): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tracking = app_state
        .repair_service
        .track(&ticket_number)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(tracking))
}

// GET /api/repairs/mine
#[utoipa::path(
    get,
    path = "/api/repairs/mine",
    tag = "Repairs",
    params(
        ("x-user-id" = Uuid, Header, description = "Usuário da sessão")
    ),
    responses(
        (status = 200, description = "Chamados do usuário", body = Vec<RepairTicket>),
        (status = 401, description = "Não autenticado")
    )
)]
pub async fn my_tickets(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let tickets = app_state
        .repair_service
        .list_for_user(user.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(tickets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use crate::test_support::user;

    fn payload(name: Option<&str>, email: Option<&str>) -> CreateRepairPayload {
        CreateRepairPayload {
            customer_name: name.map(str::to_string),
            customer_email: email.map(str::to_string),
            customer_phone: None,
            device_model: " iPhone 12 ".into(),
            issue: "Tela trincada".into(),
        }
    }

    #[test]
    fn guests_must_identify_themselves() {
        let result = payload(None, Some("a@b.com")).into_ticket(None);
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let ticket = payload(Some("Ana"), Some("a@b.com")).into_ticket(None).unwrap();
        assert_eq!(ticket.user_id, None);
        assert_eq!(ticket.device_model, "iPhone 12");
    }

    #[test]
    fn users_fall_back_to_their_profile() {
        let u = user(UserRole::Retail, None);
        let ticket = payload(None, None).into_ticket(Some(&u)).unwrap();
        assert_eq!(ticket.user_id, Some(u.id));
        assert_eq!(ticket.customer_email, u.email);
        assert_eq!(Some(ticket.customer_name), u.name);
        assert_eq!(ticket.customer_phone, u.phone);
    }

    #[test]
    fn bad_email_fails_validation() {
        assert!(payload(Some("Ana"), Some("nao-e-email")).validate().is_err());
    }
}

// src/middleware/validation.rs

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    middleware::i18n::Locale,
};

// Json + Validate num extrator só: corpo malformado e regras do `validator`
// viram o mesmo envelope de erro 400.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let locale = Locale::from_headers(req.headers());

        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()).to_api_error(&locale))?;

        payload
            .validate()
            .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

        Ok(ValidatedJson(payload))
    }
}

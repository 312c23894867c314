use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use trekka_ingest::InboundEmail;

use crate::error::AppError;

/// Relay payload, posted either as `multipart/form-data` or
/// `application/x-www-form-urlencoded`. Fields other than `to`, `from`,
/// `subject`, `text` and `html` are ignored.
pub struct RelayEmail(pub InboundEmail);

impl<S> FromRequest<S> for RelayEmail
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(email) = Form::<InboundEmail>::from_request(req, state)
                .await
                .map_err(|e| AppError::ValidationError(e.body_text()))?;
            return Ok(RelayEmail(email));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::ValidationError(e.body_text()))?;

        let mut email = InboundEmail::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::ValidationError(e.body_text()))?
        {
            let slot = match field.name() {
                Some("to") => &mut email.to,
                Some("from") => &mut email.from,
                Some("subject") => &mut email.subject,
                Some("text") => &mut email.text,
                Some("html") => &mut email.html,
                _ => continue,
            };
            *slot = Some(field.text().await.map_err(|e| AppError::ValidationError(e.body_text()))?);
        }

        Ok(RelayEmail(email))
    }
}

use std::future::Future;
use std::pin::Pin;

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};

use crate::error::AppError;
use crate::repos::agents::Agent;
use crate::services::agents::authenticate;
use crate::state::app_state::AppState;

/// Agent behind the request's `Authorization: Bearer <api key>` header.
#[derive(Debug, Clone)]
pub struct CurrentAgent(pub Agent);

impl CurrentAgent {
    pub fn id(&self) -> i64 {
        self.0.id
    }
}

/// Pulls the key out of a `Bearer <key>` header value. The scheme is
/// matched case-insensitively.
pub fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(char::is_whitespace)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}

impl FromRequest for CurrentAgent {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(bearer_token)
            .map(str::to_owned);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let token = token.ok_or_else(AppError::unauthorized_missing_bearer)?;
            let state = state.ok_or_else(|| AppError::internal("AppState not available"))?;
            let agent = authenticate(&state.db, &state.config, &token).await?;
            Ok(CurrentAgent(agent))
        })
    }
}

use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::errors::domain::{
    ConflictKind, DomainError, ForbiddenKind, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::errors::ErrorCode;
use crate::trace_ctx;

#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: ErrorCode, detail: String },
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Unauthorized: {detail}")]
    Unauthorized { code: ErrorCode, detail: String },
    #[error("Forbidden: {detail}")]
    Forbidden { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Database error: {detail}")]
    Db { detail: String },
    #[error("Database unavailable: {detail}")]
    DbUnavailable { detail: String },
    #[error("Database timeout: {detail}")]
    Timeout { detail: String },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. }
            | AppError::BadRequest { code, .. }
            | AppError::Unauthorized { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Internal { code, .. } => *code,
            AppError::Db { .. } => ErrorCode::DbError,
            AppError::DbUnavailable { .. } => ErrorCode::DbUnavailable,
            AppError::Timeout { .. } => ErrorCode::DbTimeout,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. }
            | AppError::BadRequest { detail, .. }
            | AppError::Unauthorized { detail, .. }
            | AppError::Forbidden { detail, .. }
            | AppError::NotFound { detail, .. }
            | AppError::Conflict { detail, .. }
            | AppError::Db { detail }
            | AppError::DbUnavailable { detail }
            | AppError::Timeout { detail }
            | AppError::Internal { detail, .. }
            | AppError::Config { detail } => detail.clone(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::DbUnavailable { .. } | AppError::Timeout { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Db { .. } | AppError::Internal { .. } | AppError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn invalid(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
        }
    }

    pub fn bad_request(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn unauthorized(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Unauthorized {
            code,
            detail: detail.into(),
        }
    }

    pub fn unauthorized_missing_bearer() -> Self {
        Self::unauthorized(
            ErrorCode::UnauthorizedMissingBearer,
            "Missing or malformed Bearer token",
        )
    }

    pub fn unauthorized_invalid_api_key() -> Self {
        Self::unauthorized(ErrorCode::UnauthorizedInvalidApiKey, "Invalid API key")
    }

    pub fn forbidden(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Forbidden {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            code: ErrorCode::Internal,
            detail: detail.into(),
        }
    }

    pub fn db(detail: impl Into<String>) -> Self {
        Self::Db {
            detail: detail.into(),
        }
    }

    pub fn db_unavailable(detail: impl Into<String>) -> Self {
        Self::DbUnavailable {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    /// Rebuilds an error recorded earlier (idempotent replays of a rejected
    /// move). Unknown codes fall back to the generic code for the status.
    pub fn from_recorded(status: u16, code: &str, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let parsed = ErrorCode::parse(code);
        match status {
            400 => Self::invalid(parsed.unwrap_or(ErrorCode::ValidationError), detail),
            401 => Self::unauthorized(parsed.unwrap_or(ErrorCode::Unauthorized), detail),
            403 => Self::forbidden(parsed.unwrap_or(ErrorCode::Forbidden), detail),
            404 => Self::not_found(parsed.unwrap_or(ErrorCode::NotFound), detail),
            409 => Self::conflict(parsed.unwrap_or(ErrorCode::Conflict), detail),
            _ => Self::Internal {
                code: parsed.unwrap_or(ErrorCode::Internal),
                detail,
            },
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let lower = word.to_lowercase();
                let mut chars = lower.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(kind, detail) => {
                let code = match kind {
                    ValidationKind::InvalidCoordinates => ErrorCode::InvalidCoordinates,
                    ValidationKind::InvalidOffer10 => ErrorCode::InvalidOffer10,
                    ValidationKind::NotAnOfferCandidate => ErrorCode::NotAnOfferCandidate,
                    ValidationKind::InvalidIdempotencyKey => ErrorCode::InvalidIdempotencyKey,
                    ValidationKind::Other(_) => ErrorCode::ValidationError,
                };
                AppError::invalid(code, detail)
            }
            DomainError::Forbidden(kind, detail) => {
                let code = match kind {
                    ForbiddenKind::NotAParticipant => ErrorCode::NotAParticipant,
                    ForbiddenKind::NotYourTurn => ErrorCode::NotYourTurn,
                    ForbiddenKind::NotSwapDecider => ErrorCode::NotSwapDecider,
                    ForbiddenKind::NotOfferProposer => ErrorCode::NotOfferProposer,
                    ForbiddenKind::NotOfferSelector => ErrorCode::NotOfferSelector,
                };
                AppError::forbidden(code, detail)
            }
            DomainError::Conflict(kind, detail) => {
                let code = match kind {
                    ConflictKind::GameNotActive => ErrorCode::GameNotActive,
                    ConflictKind::SwapDecisionPending => ErrorCode::SwapDecisionPending,
                    ConflictKind::Offer10SelectionPending => ErrorCode::Offer10SelectionPending,
                    ConflictKind::NoSwapPending => ErrorCode::NoSwapPending,
                    ConflictKind::NoOffer10Pending => ErrorCode::NoOffer10Pending,
                    ConflictKind::Offer10NotAllowed => ErrorCode::Offer10NotAllowed,
                    ConflictKind::TurnNumberMismatch => ErrorCode::TurnNumberMismatch,
                    ConflictKind::OpeningPosition => ErrorCode::OpeningPosition,
                    ConflictKind::CellOccupied => ErrorCode::CellOccupied,
                    ConflictKind::DuplicateSymmetryClass => ErrorCode::DuplicateSymmetryClass,
                    ConflictKind::OptimisticLock => ErrorCode::OptimisticLock,
                    ConflictKind::IdempotencyMismatch => ErrorCode::IdempotencyMismatch,
                    ConflictKind::IdempotencyInProgress => ErrorCode::IdempotencyInProgress,
                    ConflictKind::AgentNameTaken => ErrorCode::AgentNameTaken,
                    ConflictKind::AlreadyInGame => ErrorCode::AlreadyInGame,
                    ConflictKind::Other(ref tag) if tag == "Unique" => ErrorCode::UniqueViolation,
                    ConflictKind::Other(_) => ErrorCode::Conflict,
                };
                AppError::conflict(code, detail)
            }
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::Game => ErrorCode::GameNotFound,
                    NotFoundKind::Agent => ErrorCode::AgentNotFound,
                    NotFoundKind::Offer10 => ErrorCode::Offer10NotFound,
                    NotFoundKind::Other(_) => ErrorCode::NotFound,
                };
                AppError::not_found(code, detail)
            }
            DomainError::Infra(kind, detail) => match kind {
                InfraErrorKind::Timeout => AppError::Timeout { detail },
                InfraErrorKind::DbUnavailable => AppError::DbUnavailable { detail },
                InfraErrorKind::DataCorruption => AppError::Internal {
                    code: ErrorCode::DataCorruption,
                    detail,
                },
                InfraErrorKind::Other(_) => AppError::internal(detail),
            },
        }
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        crate::infra::db_errors::map_db_err(e).into()
    }
}

impl From<std::env::VarError> for AppError {
    fn from(e: std::env::VarError) -> Self {
        AppError::config(format!("env var error: {e}"))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code();
        let trace_id = trace_ctx::trace_id();

        let problem_details = ProblemDetails {
            type_: format!("https://renju-arena.dev/errors/{}", code.as_str()),
            title: Self::humanize_code(code.as_str()),
            status: status.as_u16(),
            detail: self.detail(),
            code: code.as_str().to_string(),
            trace_id: trace_id.clone(),
        };

        HttpResponse::build(status)
            .content_type("application/problem+json")
            .insert_header(("x-trace-id", trace_id))
            .json(problem_details)
    }
}

// Unit tests for error mapping - pure domain logic without HTTP or database dependencies
use crate::errors::domain::{
    ConflictKind, DomainError, ForbiddenKind, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::{AppError, ErrorCode};

#[test]
fn maps_validation_to_400() {
    let de = DomainError::validation(ValidationKind::InvalidCoordinates, "x out of range");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::InvalidCoordinates);
    assert_eq!(app.status().as_u16(), 400);

    let other = DomainError::validation_other("bad field");
    let app: AppError = other.into();
    assert_eq!(app.code(), ErrorCode::ValidationError);
}

#[test]
fn maps_turn_ownership_to_403() {
    let de = DomainError::forbidden(ForbiddenKind::NotYourTurn, "white to move");
    let app: AppError = de.into();
    assert_eq!(app.code().as_str(), "NOT_YOUR_TURN");
    assert_eq!(app.status().as_u16(), 403);
}

#[test]
fn maps_conflicts() {
    let occupied = DomainError::conflict(ConflictKind::CellOccupied, "taken");
    let app: AppError = occupied.into();
    assert_eq!(app.code().as_str(), "CELL_OCCUPIED");
    assert_eq!(app.status().as_u16(), 409);

    let stale = DomainError::conflict(ConflictKind::OptimisticLock, "stale");
    assert!(stale.is_optimistic_lock());
    let app: AppError = stale.into();
    assert_eq!(app.code().as_str(), "OPTIMISTIC_LOCK");

    let unique = DomainError::conflict(ConflictKind::Other("Unique".into()), "dup");
    let app: AppError = unique.into();
    assert_eq!(app.code(), ErrorCode::UniqueViolation);

    let other = DomainError::conflict(ConflictKind::Other("x".into()), "generic conflict");
    let app: AppError = other.into();
    assert_eq!(app.code().as_str(), "CONFLICT");
    assert_eq!(app.status().as_u16(), 409);
}

#[test]
fn maps_not_found() {
    let nf = DomainError::not_found(NotFoundKind::Game, "no game");
    let app: AppError = nf.into();
    assert_eq!(app.code().as_str(), "GAME_NOT_FOUND");
    assert_eq!(app.status().as_u16(), 404);
}

#[test]
fn maps_infra() {
    let t = DomainError::infra(InfraErrorKind::Timeout, "timeout");
    let app: AppError = t.into();
    assert_eq!(app.code().as_str(), "DB_TIMEOUT");
    assert_eq!(app.status().as_u16(), 503);
    assert!(matches!(app, AppError::Timeout { .. }));

    let down = DomainError::infra(InfraErrorKind::DbUnavailable, "down");
    let app: AppError = down.into();
    assert_eq!(app.code().as_str(), "DB_UNAVAILABLE");
    assert_eq!(app.status().as_u16(), 503);

    let corr = DomainError::infra(InfraErrorKind::DataCorruption, "bad");
    let app: AppError = corr.into();
    assert_eq!(app.code().as_str(), "DATA_CORRUPTION");
    assert_eq!(app.status().as_u16(), 500);

    let other = DomainError::infra(InfraErrorKind::Other("unknown".to_string()), "other");
    let app: AppError = other.into();
    assert_eq!(app.code().as_str(), "INTERNAL");
    assert_eq!(app.status().as_u16(), 500);
}

#[test]
fn recorded_errors_rebuild_with_same_status_and_code() {
    let app = AppError::from_recorded(409, "CELL_OCCUPIED", "occupied");
    assert_eq!(app.status().as_u16(), 409);
    assert_eq!(app.code(), ErrorCode::CellOccupied);
    assert_eq!(app.detail(), "occupied");

    let app = AppError::from_recorded(403, "SOMETHING_ELSE", "nope");
    assert_eq!(app.status().as_u16(), 403);
    assert_eq!(app.code(), ErrorCode::Forbidden);
}

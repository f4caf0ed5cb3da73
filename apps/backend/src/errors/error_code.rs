//! Error codes for the arena API.
//!
//! This module defines all error codes used throughout the application.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses.

use core::fmt;

/// Centralized error codes for the arena API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication & Authorization
    /// Authentication required
    Unauthorized,
    /// Missing or malformed Bearer token
    UnauthorizedMissingBearer,
    /// Bearer token does not match any agent
    UnauthorizedInvalidApiKey,
    /// Agent exists but is deactivated
    AgentInactive,
    /// Access denied
    Forbidden,

    // Turn ownership
    /// Caller is not seated in the game
    NotAParticipant,
    /// Caller's color does not own the pending placement
    NotYourTurn,
    /// Caller is not the side deciding the pending swap
    NotSwapDecider,
    /// Only tentative black may offer ten candidates
    NotOfferProposer,
    /// Only tentative white may pick an offered candidate
    NotOfferSelector,

    // Request Validation
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,
    /// Invalid game ID provided
    InvalidGameId,
    /// Coordinates outside the board
    InvalidCoordinates,
    /// Malformed offer of ten
    InvalidOffer10,
    /// Selected point is not one of the offered candidates
    NotAnOfferCandidate,
    /// Missing or oversized idempotency key
    InvalidIdempotencyKey,

    // Resource Not Found
    /// Game not found
    GameNotFound,
    /// Agent not found
    AgentNotFound,
    /// Offer of ten not found
    Offer10NotFound,
    /// General not found error
    NotFound,

    // Game state conflicts
    /// Game already finished
    GameNotActive,
    /// A swap decision must be made first
    SwapDecisionPending,
    /// An offer-of-ten selection must be made first
    Offer10SelectionPending,
    /// No swap decision is pending
    NoSwapPending,
    /// No offer of ten is waiting for a selection
    NoOffer10Pending,
    /// Offer of ten is only possible right after the ply-4 swap decision
    Offer10NotAllowed,
    /// Declared turn number is not the next ply
    TurnNumberMismatch,
    /// Opening ply outside its positional box
    OpeningPosition,
    /// Target intersection already holds a stone
    CellOccupied,
    /// Two offered candidates share a symmetry class
    DuplicateSymmetryClass,
    /// Game changed since it was read
    OptimisticLock,
    /// Idempotency key reused with a different payload
    IdempotencyMismatch,
    /// Original request for this idempotency key still running
    IdempotencyInProgress,
    /// Agent name already registered
    AgentNameTaken,
    /// Agent already seated in an active game
    AlreadyInGame,
    /// Unique constraint violation
    UniqueViolation,
    /// General conflict
    Conflict,

    // System Errors
    /// Database error
    DbError,
    /// Database unavailable
    DbUnavailable,
    /// Database timeout
    DbTimeout,
    /// Stored data failed to decode
    DataCorruption,
    /// Internal server error
    Internal,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        Self::Unauthorized,
        Self::UnauthorizedMissingBearer,
        Self::UnauthorizedInvalidApiKey,
        Self::AgentInactive,
        Self::Forbidden,
        Self::NotAParticipant,
        Self::NotYourTurn,
        Self::NotSwapDecider,
        Self::NotOfferProposer,
        Self::NotOfferSelector,
        Self::ValidationError,
        Self::BadRequest,
        Self::InvalidGameId,
        Self::InvalidCoordinates,
        Self::InvalidOffer10,
        Self::NotAnOfferCandidate,
        Self::InvalidIdempotencyKey,
        Self::GameNotFound,
        Self::AgentNotFound,
        Self::Offer10NotFound,
        Self::NotFound,
        Self::GameNotActive,
        Self::SwapDecisionPending,
        Self::Offer10SelectionPending,
        Self::NoSwapPending,
        Self::NoOffer10Pending,
        Self::Offer10NotAllowed,
        Self::TurnNumberMismatch,
        Self::OpeningPosition,
        Self::CellOccupied,
        Self::DuplicateSymmetryClass,
        Self::OptimisticLock,
        Self::IdempotencyMismatch,
        Self::IdempotencyInProgress,
        Self::AgentNameTaken,
        Self::AlreadyInGame,
        Self::UniqueViolation,
        Self::Conflict,
        Self::DbError,
        Self::DbUnavailable,
        Self::DbTimeout,
        Self::DataCorruption,
        Self::Internal,
        Self::ConfigError,
    ];

    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::UnauthorizedMissingBearer => "UNAUTHORIZED_MISSING_BEARER",
            Self::UnauthorizedInvalidApiKey => "UNAUTHORIZED_INVALID_API_KEY",
            Self::AgentInactive => "AGENT_INACTIVE",
            Self::Forbidden => "FORBIDDEN",

            Self::NotAParticipant => "NOT_A_PARTICIPANT",
            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::NotSwapDecider => "NOT_SWAP_DECIDER",
            Self::NotOfferProposer => "NOT_OFFER_PROPOSER",
            Self::NotOfferSelector => "NOT_OFFER_SELECTOR",

            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidGameId => "INVALID_GAME_ID",
            Self::InvalidCoordinates => "INVALID_COORDINATES",
            Self::InvalidOffer10 => "INVALID_OFFER10",
            Self::NotAnOfferCandidate => "NOT_AN_OFFER_CANDIDATE",
            Self::InvalidIdempotencyKey => "INVALID_IDEMPOTENCY_KEY",

            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::AgentNotFound => "AGENT_NOT_FOUND",
            Self::Offer10NotFound => "OFFER10_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::GameNotActive => "GAME_NOT_ACTIVE",
            Self::SwapDecisionPending => "SWAP_DECISION_PENDING",
            Self::Offer10SelectionPending => "OFFER10_SELECTION_PENDING",
            Self::NoSwapPending => "NO_SWAP_PENDING",
            Self::NoOffer10Pending => "NO_OFFER10_PENDING",
            Self::Offer10NotAllowed => "OFFER10_NOT_ALLOWED",
            Self::TurnNumberMismatch => "TURN_NUMBER_MISMATCH",
            Self::OpeningPosition => "OPENING_POSITION",
            Self::CellOccupied => "CELL_OCCUPIED",
            Self::DuplicateSymmetryClass => "DUPLICATE_SYMMETRY_CLASS",
            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::IdempotencyMismatch => "IDEMPOTENCY_MISMATCH",
            Self::IdempotencyInProgress => "IDEMPOTENCY_IN_PROGRESS",
            Self::AgentNameTaken => "AGENT_NAME_TAKEN",
            Self::AlreadyInGame => "ALREADY_IN_GAME",
            Self::UniqueViolation => "UNIQUE_VIOLATION",
            Self::Conflict => "CONFLICT",

            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }

    /// Inverse of [`ErrorCode::as_str`], used when replaying recorded responses.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|code| code.as_str() == raw)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

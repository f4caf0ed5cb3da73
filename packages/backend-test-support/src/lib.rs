//! Backend test support utilities
//!
//! Shared by every backend test binary: idempotent logging setup and
//! assertions over the Problem Details error contract.

pub mod logging;
pub mod problem_details;

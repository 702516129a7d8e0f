//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod categories;
pub mod import;
pub mod transactions;

// Re-export all handlers for use in router
pub use categories::*;
pub use import::*;
pub use transactions::*;

use crate::AppError;

/// Map a core error onto the API contract: validation failures are the
/// caller's fault, import failures carry their message, anything else
/// becomes a generic internal error.
pub(crate) fn map_core_error(err: tally_core::Error) -> AppError {
    match err {
        tally_core::Error::Validation(message) => AppError::bad_request(&message),
        tally_core::Error::Import(message) => AppError::internal(&message),
        other => AppError::from(other),
    }
}

//! Command boundary. Every command returns a status-coded `ErrorResponse` on
//! failure instead of a bare error.

pub mod calculations;
pub mod heat;
pub mod journal;
pub mod settings;

pub use calculations::*;
pub use heat::*;
pub use journal::*;
pub use settings::*;

use crate::error::{AppError, ErrorResponse};

pub type CommandResult<T> = Result<T, ErrorResponse>;

fn respond(err: AppError) -> ErrorResponse {
    if err.status_code() < 500 {
        log::warn!("Command rejected: {}", err);
    }
    err.to_response()
}

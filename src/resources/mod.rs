//! Per-resource parameter tables and command DTOs
//!
//! Each module owns the static query schema of one family and the command
//! bodies of its endpoints. The functions here are transport independent;
//! the axum handlers in [`crate::api`] only extract and forward.

pub mod job;
pub mod job_definition;
pub mod message;
pub mod process_instance;
pub mod task;

use crate::engine::SuspensionTerminal;
use crate::error::RestError;

/// Run the terminal call of a fully configured suspension builder
pub(crate) fn complete_suspension<B>(builder: Box<B>, suspended: bool) -> Result<(), RestError>
where
    B: SuspensionTerminal + ?Sized,
{
    let result = if suspended {
        builder.suspend()
    } else {
        builder.activate()
    };
    Ok(result?)
}

//! Collaborator interfaces of the process engine
//!
//! The REST layer never executes anything itself. It obtains a query or a
//! command builder from [`ProcessEngine`], configures it from the compiled
//! request and hands it back to the engine through a terminal call.

pub mod command;
pub mod dto;
pub mod query;

pub use command::{
    JobDefinitionSuspensionBuilder, JobRetriesBuilder, JobSuspensionBuilder,
    MessageCorrelationBuilder, ProcessInstanceSuspensionBuilder, SuspensionTerminal,
};
pub use dto::{JobDto, ProcessInstanceDto, TaskDto};
pub use query::{JobQuery, ProcessInstanceQuery, TaskQuery};

use crate::compiler::coerce::TypedValue;

/// Failures reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    Other(String),
}

/// Common surface of every query family
pub trait Query {
    type Item;

    fn asc(&mut self);
    fn desc(&mut self);

    fn list(&self) -> Result<Vec<Self::Item>, EngineError>;
    fn list_page(&self, first: i32, max: i32) -> Result<Vec<Self::Item>, EngineError>;
    fn count(&self) -> Result<i64, EngineError>;
}

/// Factory for queries and command builders.
///
/// Everything returned is owned by a single request and dropped with it.
pub trait ProcessEngine: Send + Sync {
    fn create_job_query(&self) -> Box<dyn JobQuery>;
    fn create_task_query(&self) -> Box<dyn TaskQuery>;
    fn create_process_instance_query(&self) -> Box<dyn ProcessInstanceQuery>;

    fn update_job_suspension_state(&self) -> Box<dyn JobSuspensionBuilder>;
    fn update_job_definition_suspension_state(&self) -> Box<dyn JobDefinitionSuspensionBuilder>;
    fn update_process_instance_suspension_state(
        &self,
    ) -> Box<dyn ProcessInstanceSuspensionBuilder>;

    fn set_job_retries(&self, retries: i32) -> Box<dyn JobRetriesBuilder>;

    fn create_message_correlation(&self, message_name: &str) -> Box<dyn MessageCorrelationBuilder>;

    fn set_task_variable(
        &self,
        task_id: &str,
        name: &str,
        value: TypedValue,
    ) -> Result<(), EngineError>;
}

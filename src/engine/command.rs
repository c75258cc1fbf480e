//! Command builders
//!
//! A builder is configured with exactly one selector, then optional
//! modifiers, and is consumed by its terminal call.

use chrono::{DateTime, FixedOffset};

use super::EngineError;
use crate::compiler::coerce::TypedValue;
use crate::compiler::selector::TenantScoped;

/// Terminal calls of the suspension builders
pub trait SuspensionTerminal {
    fn activate(self: Box<Self>) -> Result<(), EngineError>;
    fn suspend(self: Box<Self>) -> Result<(), EngineError>;
}

pub trait JobSuspensionBuilder: TenantScoped + SuspensionTerminal {
    fn by_job_id(&mut self, job_id: &str);
    fn by_job_definition_id(&mut self, job_definition_id: &str);
    fn by_process_instance_id(&mut self, process_instance_id: &str);
    fn by_process_definition_id(&mut self, process_definition_id: &str);
    fn by_process_definition_key(&mut self, process_definition_key: &str);
}

pub trait JobDefinitionSuspensionBuilder: TenantScoped + SuspensionTerminal {
    fn by_job_definition_id(&mut self, job_definition_id: &str);
    fn by_process_definition_id(&mut self, process_definition_id: &str);
    fn by_process_definition_key(&mut self, process_definition_key: &str);
    fn include_jobs(&mut self, include: bool);
    fn execution_date(&mut self, date: DateTime<FixedOffset>);
}

pub trait ProcessInstanceSuspensionBuilder: TenantScoped + SuspensionTerminal {
    fn by_process_instance_id(&mut self, process_instance_id: &str);
    fn by_process_definition_id(&mut self, process_definition_id: &str);
    fn by_process_definition_key(&mut self, process_definition_key: &str);
}

pub trait JobRetriesBuilder {
    fn job_id(&mut self, job_id: &str);
    fn job_ids(&mut self, job_ids: &[String]);
    fn job_definition_id(&mut self, job_definition_id: &str);
    fn due_date(&mut self, date: DateTime<FixedOffset>);
    fn execute(self: Box<Self>) -> Result<(), EngineError>;
}

pub trait MessageCorrelationBuilder: TenantScoped {
    fn process_instance_business_key(&mut self, business_key: &str);
    fn process_instance_id(&mut self, process_instance_id: &str);
    fn process_instance_variable_equals(&mut self, name: &str, value: &TypedValue);
    fn local_variable_equals(&mut self, name: &str, value: &TypedValue);
    fn set_variable(&mut self, name: &str, value: TypedValue);
    fn correlate(self: Box<Self>) -> Result<(), EngineError>;
    fn correlate_all(self: Box<Self>) -> Result<(), EngineError>;
}

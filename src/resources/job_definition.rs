//! Job definition suspension

use serde::Deserialize;

use crate::compiler::coerce::Coercer;
use crate::compiler::selector::{SelectorGroup, TenantSelection};
use crate::engine::ProcessEngine;
use crate::error::RestError;

use super::complete_suspension;

/// Body of `PUT /job-definition/suspended` and `PUT /job-definition/{id}/suspended`
#[derive(Debug, Clone, Default, Deserialize, SelectorGroup)]
#[serde(rename_all = "camelCase")]
#[selector(name = "JobDefinitionSelector", purpose = "update the suspension state")]
pub struct JobDefinitionSuspensionStateDto {
    #[serde(default)]
    #[selector(skip)]
    pub suspended: bool,
    pub job_definition_id: Option<String>,
    pub process_definition_id: Option<String>,
    pub process_definition_key: Option<String>,
    #[selector(skip)]
    pub include_jobs: Option<bool>,
    #[selector(skip)]
    pub execution_date: Option<String>,
    #[selector(skip)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    #[selector(skip)]
    pub without_tenant_id: bool,
}

impl JobDefinitionSuspensionStateDto {
    fn failure_context(&self) -> String {
        match &self.job_definition_id {
            Some(id) => format!(
                "The suspension state of Job Definition with id {id} could not be updated due to"
            ),
            None => "The suspension state of Job Definitions could not be updated due to".to_string(),
        }
    }

    pub fn update(&self, engine: &dyn ProcessEngine, coercer: &Coercer) -> Result<(), RestError> {
        let tenant = TenantSelection::resolve(self.tenant_id.as_deref(), self.without_tenant_id)?;
        let selector = self.selected()?;
        tenant.require_definition_key(matches!(
            selector,
            JobDefinitionSelector::ProcessDefinitionKey(_)
        ))?;
        let execution_date = self
            .execution_date
            .as_deref()
            .map(|raw| coercer.parse_date(raw))
            .transpose()
            .map_err(|err| err.with_context(self.failure_context()))?;

        let mut builder = engine.update_job_definition_suspension_state();
        match selector {
            JobDefinitionSelector::JobDefinitionId(id) => builder.by_job_definition_id(id),
            JobDefinitionSelector::ProcessDefinitionId(id) => builder.by_process_definition_id(id),
            JobDefinitionSelector::ProcessDefinitionKey(key) => {
                builder.by_process_definition_key(key)
            }
        }
        if let Some(include) = self.include_jobs {
            builder.include_jobs(include);
        }
        if let Some(date) = execution_date {
            builder.execution_date(date);
        }
        tenant.apply(builder.as_mut());

        complete_suspension(builder, self.suspended)
    }
}

//! Job queries and job commands

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::compiler::coerce::Coercer;
use crate::compiler::operator::Operator;
use crate::compiler::params::RequestParams;
use crate::compiler::registry::{FilterParam, ParamSetter, QuerySchema};
use crate::compiler::request::QueryRequest;
use crate::compiler::selector::{SelectorGroup, TenantSelection};
use crate::compiler::sorting::SortKey;
use crate::engine::dto::CountResultDto;
use crate::engine::{JobDto, JobQuery, ProcessEngine};
use crate::error::RestError;

use super::complete_suspension;

const DATE_CONDITIONS: &[Operator] = &[Operator::GreaterThan, Operator::LessThan];

pub static JOB_QUERY: QuerySchema<dyn JobQuery> = QuerySchema {
    name: "job",
    params: &[
        FilterParam::new("jobId", ParamSetter::Text(|q, v| q.job_id(v))),
        FilterParam::new("jobIds", ParamSetter::TextList(|q, v| q.job_ids(v))),
        FilterParam::new("jobDefinitionId", ParamSetter::Text(|q, v| q.job_definition_id(v))),
        FilterParam::new("processInstanceId", ParamSetter::Text(|q, v| q.process_instance_id(v))),
        FilterParam::new(
            "processInstanceIds",
            ParamSetter::TextList(|q, v| q.process_instance_ids(v)),
        ),
        FilterParam::new("executionId", ParamSetter::Text(|q, v| q.execution_id(v))),
        FilterParam::new(
            "processDefinitionId",
            ParamSetter::Text(|q, v| q.process_definition_id(v)),
        ),
        FilterParam::new(
            "processDefinitionKey",
            ParamSetter::Text(|q, v| q.process_definition_key(v)),
        ),
        FilterParam::new("activityId", ParamSetter::Text(|q, v| q.activity_id(v))),
        FilterParam::new("withRetriesLeft", ParamSetter::Flag(|q| q.with_retries_left())),
        FilterParam::new("noRetriesLeft", ParamSetter::Flag(|q| q.no_retries_left())),
        FilterParam::new("executable", ParamSetter::Flag(|q| q.executable())),
        FilterParam::new("timers", ParamSetter::Flag(|q| q.timers())),
        FilterParam::new("messages", ParamSetter::Flag(|q| q.messages())),
        FilterParam::new(
            "dueDates",
            ParamSetter::DateConditions {
                description: "due date",
                allowed: DATE_CONDITIONS,
                apply: |q, op, date| q.due_date(op, date),
            },
        ),
        FilterParam::new(
            "createTimes",
            ParamSetter::DateConditions {
                description: "create time",
                allowed: DATE_CONDITIONS,
                apply: |q, op, date| q.create_time(op, date),
            },
        ),
        FilterParam::new("withException", ParamSetter::Flag(|q| q.with_exception())),
        FilterParam::new("exceptionMessage", ParamSetter::Text(|q, v| q.exception_message(v))),
        FilterParam::new("active", ParamSetter::Flag(|q| q.active())),
        FilterParam::new("suspended", ParamSetter::Flag(|q| q.suspended())),
        FilterParam::new(
            "priorityHigherThanOrEquals",
            ParamSetter::Long(|q, v| q.priority_higher_than_or_equals(v)),
        ),
        FilterParam::new(
            "priorityLowerThanOrEquals",
            ParamSetter::Long(|q, v| q.priority_lower_than_or_equals(v)),
        ),
        FilterParam::new("tenantIdIn", ParamSetter::TextList(|q, v| q.tenant_id_in(v))),
        FilterParam::new("withoutTenantId", ParamSetter::Flag(|q| q.without_tenant_id())),
        FilterParam::new(
            "includeJobsWithoutTenantId",
            ParamSetter::Flag(|q| q.include_jobs_without_tenant_id()),
        ),
    ],
    sort_keys: &[
        SortKey::field("jobId", |q| q.order_by_job_id()),
        SortKey::field("jobDefinitionId", |q| q.order_by_job_definition_id()),
        SortKey::field("executionId", |q| q.order_by_execution_id()),
        SortKey::field("processInstanceId", |q| q.order_by_process_instance_id()),
        SortKey::field("processDefinitionId", |q| q.order_by_process_definition_id()),
        SortKey::field("processDefinitionKey", |q| q.order_by_process_definition_key()),
        SortKey::field("jobRetries", |q| q.order_by_job_retries()),
        SortKey::field("jobDueDate", |q| q.order_by_job_due_date()),
        SortKey::field("jobPriority", |q| q.order_by_job_priority()),
        SortKey::field("tenantId", |q| q.order_by_tenant_id()),
    ],
    case_toggles: None,
    exclusive_flags: &[("timers", "messages")],
};

pub fn list_jobs(
    engine: &dyn ProcessEngine,
    coercer: &Coercer,
    params: &RequestParams,
) -> Result<Vec<JobDto>, RestError> {
    let request = QueryRequest::compile(&JOB_QUERY, params, coercer)?;
    let mut query = engine.create_job_query();
    Ok(request.list(query.as_mut())?)
}

pub fn count_jobs(
    engine: &dyn ProcessEngine,
    coercer: &Coercer,
    params: &RequestParams,
) -> Result<CountResultDto, RestError> {
    let request = QueryRequest::compile(&JOB_QUERY, params, coercer)?;
    let mut query = engine.create_job_query();
    Ok(CountResultDto {
        count: request.count(query.as_mut())?,
    })
}

// ============================================================================
// Suspension
// ============================================================================

/// Body of `PUT /job/suspended` and `PUT /job/{id}/suspended`
#[derive(Debug, Clone, Default, Deserialize, SelectorGroup)]
#[serde(rename_all = "camelCase")]
#[selector(name = "JobSelector", purpose = "update the suspension state")]
pub struct JobSuspensionStateDto {
    #[serde(default)]
    #[selector(skip)]
    pub suspended: bool,
    pub job_id: Option<String>,
    pub job_definition_id: Option<String>,
    pub process_instance_id: Option<String>,
    pub process_definition_id: Option<String>,
    pub process_definition_key: Option<String>,
    #[selector(skip)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    #[selector(skip)]
    pub without_tenant_id: bool,
}

impl JobSuspensionStateDto {
    /// Validate, then configure one builder and run its terminal call
    pub fn update(&self, engine: &dyn ProcessEngine) -> Result<(), RestError> {
        let tenant = TenantSelection::resolve(self.tenant_id.as_deref(), self.without_tenant_id)?;
        let selector = self.selected()?;
        tenant.require_definition_key(matches!(selector, JobSelector::ProcessDefinitionKey(_)))?;

        let mut builder = engine.update_job_suspension_state();
        match selector {
            JobSelector::JobId(id) => builder.by_job_id(id),
            JobSelector::JobDefinitionId(id) => builder.by_job_definition_id(id),
            JobSelector::ProcessInstanceId(id) => builder.by_process_instance_id(id),
            JobSelector::ProcessDefinitionId(id) => builder.by_process_definition_id(id),
            JobSelector::ProcessDefinitionKey(key) => builder.by_process_definition_key(key),
        }
        tenant.apply(builder.as_mut());

        complete_suspension(builder, self.suspended)
    }
}

// ============================================================================
// Retries
// ============================================================================

/// Body of `PUT /job/retries`
#[derive(Debug, Clone, Default, Deserialize, SelectorGroup)]
#[serde(rename_all = "camelCase")]
#[selector(name = "RetriesSelector", purpose = "set the job retries")]
pub struct SetJobRetriesDto {
    #[selector(skip)]
    pub retries: Option<i32>,
    pub job_id: Option<String>,
    pub job_ids: Option<Vec<String>>,
    pub job_definition_id: Option<String>,
    #[selector(skip)]
    pub due_date: Option<String>,
}

impl SetJobRetriesDto {
    pub fn execute(&self, engine: &dyn ProcessEngine, coercer: &Coercer) -> Result<(), RestError> {
        let retries = match self.retries {
            Some(retries) if retries >= 0 => retries,
            other => {
                let shown = other.map_or_else(|| "null".to_string(), |n| n.to_string());
                return Err(RestError::invalid(format!(
                    "The number of job retries must be a non-negative Integer, but '{shown}' has been provided."
                )));
            }
        };
        let selector = self.selected()?;
        let due_date: Option<DateTime<FixedOffset>> = self
            .due_date
            .as_deref()
            .map(|raw| coercer.parse_date(raw))
            .transpose()
            .map_err(|err| err.with_context("Cannot set job retries"))?;

        let mut builder = engine.set_job_retries(retries);
        match selector {
            RetriesSelector::JobId(id) => builder.job_id(id),
            RetriesSelector::JobIds(ids) => builder.job_ids(ids),
            RetriesSelector::JobDefinitionId(id) => builder.job_definition_id(id),
        }
        if let Some(date) = due_date {
            builder.due_date(date);
        }

        tracing::debug!(retries, "Setting job retries");
        Ok(builder.execute()?)
    }
}

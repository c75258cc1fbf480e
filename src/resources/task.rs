//! Task queries and task variables

use crate::compiler::case::CaseToggles;
use crate::compiler::coerce::{Coercer, VariableValueDto};
use crate::compiler::params::RequestParams;
use crate::compiler::registry::{FilterParam, ParamSetter, QuerySchema};
use crate::compiler::request::QueryRequest;
use crate::compiler::sorting::SortKey;
use crate::engine::dto::CountResultDto;
use crate::engine::{ProcessEngine, TaskDto, TaskQuery};
use crate::error::RestError;

pub static TASK_QUERY: QuerySchema<dyn TaskQuery> = QuerySchema {
    name: "task",
    params: &[
        FilterParam::new("taskId", ParamSetter::Text(|q, v| q.task_id(v))),
        FilterParam::new("name", ParamSetter::Text(|q, v| q.name(v))),
        FilterParam::new("nameLike", ParamSetter::Text(|q, v| q.name_like(v))),
        FilterParam::new("assignee", ParamSetter::Text(|q, v| q.assignee(v))),
        FilterParam::new("assigneeLike", ParamSetter::Text(|q, v| q.assignee_like(v))),
        FilterParam::new("owner", ParamSetter::Text(|q, v| q.owner(v))),
        FilterParam::new("candidateGroup", ParamSetter::Text(|q, v| q.candidate_group(v))),
        FilterParam::new("candidateUser", ParamSetter::Text(|q, v| q.candidate_user(v))),
        FilterParam::new("processInstanceId", ParamSetter::Text(|q, v| q.process_instance_id(v))),
        FilterParam::new(
            "processDefinitionKey",
            ParamSetter::Text(|q, v| q.process_definition_key(v)),
        ),
        FilterParam::new(
            "processDefinitionKeyIn",
            ParamSetter::TextList(|q, v| q.process_definition_key_in(v)),
        ),
        FilterParam::new("taskDefinitionKey", ParamSetter::Text(|q, v| q.task_definition_key(v))),
        FilterParam::new("description", ParamSetter::Text(|q, v| q.description(v))),
        FilterParam::new("priority", ParamSetter::Integer(|q, v| q.priority(v))),
        FilterParam::new("maxPriority", ParamSetter::Integer(|q, v| q.max_priority(v))),
        FilterParam::new("minPriority", ParamSetter::Integer(|q, v| q.min_priority(v))),
        FilterParam::new("dueAfter", ParamSetter::Date(|q, v| q.due_after(v))),
        FilterParam::new("dueBefore", ParamSetter::Date(|q, v| q.due_before(v))),
        FilterParam::new("createdAfter", ParamSetter::Date(|q, v| q.created_after(v))),
        FilterParam::new("createdBefore", ParamSetter::Date(|q, v| q.created_before(v))),
        FilterParam::new("assigned", ParamSetter::Flag(|q| q.assigned())),
        FilterParam::new("unassigned", ParamSetter::Flag(|q| q.unassigned())),
        FilterParam::new("active", ParamSetter::Flag(|q| q.active())),
        FilterParam::new("suspended", ParamSetter::Flag(|q| q.suspended())),
        FilterParam::new("tenantIdIn", ParamSetter::TextList(|q, v| q.tenant_id_in(v))),
        FilterParam::new("withoutTenantId", ParamSetter::Flag(|q| q.without_tenant_id())),
        FilterParam::new(
            "taskVariables",
            ParamSetter::Variables {
                label: "variable",
                apply: |q, name, op, value| q.task_variable_value(name, op, value),
            },
        ),
        FilterParam::new(
            "processVariables",
            ParamSetter::Variables {
                label: "variable",
                apply: |q, name, op, value| q.process_variable_value(name, op, value),
            },
        ),
        FilterParam::new(
            "caseInstanceVariables",
            ParamSetter::Variables {
                label: "variable",
                apply: |q, name, op, value| q.case_instance_variable_value(name, op, value),
            },
        ),
    ],
    sort_keys: &[
        SortKey::field("instanceId", |q| q.order_by_process_instance_id()),
        SortKey::field("caseInstanceId", |q| q.order_by_case_instance_id()),
        SortKey::field("dueDate", |q| q.order_by_due_date()),
        SortKey::field("followUpDate", |q| q.order_by_follow_up_date()),
        SortKey::field("executionId", |q| q.order_by_execution_id()),
        SortKey::field("caseExecutionId", |q| q.order_by_case_execution_id()),
        SortKey::field("assignee", |q| q.order_by_assignee()),
        SortKey::field("created", |q| q.order_by_create_time()),
        SortKey::field("description", |q| q.order_by_description()),
        SortKey::field("id", |q| q.order_by_task_id()),
        SortKey::field("name", |q| q.order_by_name()),
        SortKey::field("nameCaseInsensitive", |q| q.order_by_name_case_insensitive()),
        SortKey::field("priority", |q| q.order_by_priority()),
        SortKey::field("tenantId", |q| q.order_by_tenant_id()),
        SortKey::variable("processVariable", |q, name, ty| q.order_by_process_variable(name, ty)),
        SortKey::variable("executionVariable", |q, name, ty| {
            q.order_by_execution_variable(name, ty)
        }),
        SortKey::variable("taskVariable", |q, name, ty| q.order_by_task_variable(name, ty)),
        SortKey::variable("caseInstanceVariable", |q, name, ty| {
            q.order_by_case_instance_variable(name, ty)
        }),
        SortKey::variable("caseExecutionVariable", |q, name, ty| {
            q.order_by_case_execution_variable(name, ty)
        }),
    ],
    case_toggles: Some(CaseToggles {
        names: |q| q.match_variable_names_ignore_case(),
        values: |q| q.match_variable_values_ignore_case(),
    }),
    exclusive_flags: &[],
};

pub fn list_tasks(
    engine: &dyn ProcessEngine,
    coercer: &Coercer,
    params: &RequestParams,
) -> Result<Vec<TaskDto>, RestError> {
    let request = QueryRequest::compile(&TASK_QUERY, params, coercer)?;
    let mut query = engine.create_task_query();
    Ok(request.list(query.as_mut())?)
}

pub fn count_tasks(
    engine: &dyn ProcessEngine,
    coercer: &Coercer,
    params: &RequestParams,
) -> Result<CountResultDto, RestError> {
    let request = QueryRequest::compile(&TASK_QUERY, params, coercer)?;
    let mut query = engine.create_task_query();
    Ok(CountResultDto {
        count: request.count(query.as_mut())?,
    })
}

/// `PUT /task/{id}/variables/{name}`
pub fn put_variable(
    engine: &dyn ProcessEngine,
    coercer: &Coercer,
    task_id: &str,
    name: &str,
    body: &VariableValueDto,
) -> Result<(), RestError> {
    let value = body
        .to_typed(coercer)
        .map_err(|err| err.with_context(format!("Cannot put task variable {name}")))?;
    engine.set_task_variable(task_id, name, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_sort_keys() {
        let variable_keys: Vec<&str> = TASK_QUERY
            .sort_keys
            .iter()
            .filter(|k| matches!(k.target, crate::compiler::sorting::SortTarget::Variable(_)))
            .map(|k| k.name)
            .collect();
        assert_eq!(
            variable_keys,
            vec![
                "processVariable",
                "executionVariable",
                "taskVariable",
                "caseInstanceVariable",
                "caseExecutionVariable"
            ]
        );
    }

    #[test]
    fn test_supports_case_toggles() {
        assert!(TASK_QUERY.case_toggles.is_some());
    }
}

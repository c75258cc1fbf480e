//! Process instance queries and suspension

use serde::Deserialize;

use crate::compiler::case::CaseToggles;
use crate::compiler::coerce::Coercer;
use crate::compiler::params::RequestParams;
use crate::compiler::registry::{FilterParam, ParamSetter, QuerySchema};
use crate::compiler::request::QueryRequest;
use crate::compiler::selector::{SelectorGroup, TenantSelection};
use crate::compiler::sorting::SortKey;
use crate::engine::dto::CountResultDto;
use crate::engine::{ProcessEngine, ProcessInstanceDto, ProcessInstanceQuery};
use crate::error::RestError;

use super::complete_suspension;

pub static PROCESS_INSTANCE_QUERY: QuerySchema<dyn ProcessInstanceQuery> = QuerySchema {
    name: "process-instance",
    params: &[
        FilterParam::new(
            "processInstanceIds",
            ParamSetter::TextList(|q, v| q.process_instance_ids(v)),
        ),
        FilterParam::new("businessKey", ParamSetter::Text(|q, v| q.business_key(v))),
        FilterParam::new("businessKeyLike", ParamSetter::Text(|q, v| q.business_key_like(v))),
        FilterParam::new(
            "processDefinitionId",
            ParamSetter::Text(|q, v| q.process_definition_id(v)),
        ),
        FilterParam::new(
            "processDefinitionKey",
            ParamSetter::Text(|q, v| q.process_definition_key(v)),
        ),
        FilterParam::new(
            "processDefinitionKeyIn",
            ParamSetter::TextList(|q, v| q.process_definition_key_in(v)),
        ),
        FilterParam::new(
            "superProcessInstance",
            ParamSetter::Text(|q, v| q.super_process_instance(v)),
        ),
        FilterParam::new("subProcessInstance", ParamSetter::Text(|q, v| q.sub_process_instance(v))),
        FilterParam::new("active", ParamSetter::Flag(|q| q.active())),
        FilterParam::new("suspended", ParamSetter::Flag(|q| q.suspended())),
        FilterParam::new("withIncident", ParamSetter::Flag(|q| q.with_incident())),
        FilterParam::new("incidentId", ParamSetter::Text(|q, v| q.incident_id(v))),
        FilterParam::new("tenantIdIn", ParamSetter::TextList(|q, v| q.tenant_id_in(v))),
        FilterParam::new("withoutTenantId", ParamSetter::Flag(|q| q.without_tenant_id())),
        FilterParam::new("activityIdIn", ParamSetter::TextList(|q, v| q.activity_id_in(v))),
        FilterParam::new(
            "variables",
            ParamSetter::Variables {
                label: "variable",
                apply: |q, name, op, value| q.variable_value(name, op, value),
            },
        ),
    ],
    sort_keys: &[
        SortKey::field("instanceId", |q| q.order_by_process_instance_id()),
        SortKey::field("definitionKey", |q| q.order_by_process_definition_key()),
        SortKey::field("definitionId", |q| q.order_by_process_definition_id()),
        SortKey::field("businessKey", |q| q.order_by_business_key()),
        SortKey::field("tenantId", |q| q.order_by_tenant_id()),
    ],
    case_toggles: Some(CaseToggles {
        names: |q| q.match_variable_names_ignore_case(),
        values: |q| q.match_variable_values_ignore_case(),
    }),
    exclusive_flags: &[],
};

pub fn list_process_instances(
    engine: &dyn ProcessEngine,
    coercer: &Coercer,
    params: &RequestParams,
) -> Result<Vec<ProcessInstanceDto>, RestError> {
    let request = QueryRequest::compile(&PROCESS_INSTANCE_QUERY, params, coercer)?;
    let mut query = engine.create_process_instance_query();
    Ok(request.list(query.as_mut())?)
}

pub fn count_process_instances(
    engine: &dyn ProcessEngine,
    coercer: &Coercer,
    params: &RequestParams,
) -> Result<CountResultDto, RestError> {
    let request = QueryRequest::compile(&PROCESS_INSTANCE_QUERY, params, coercer)?;
    let mut query = engine.create_process_instance_query();
    Ok(CountResultDto {
        count: request.count(query.as_mut())?,
    })
}

/// Body of `PUT /process-instance/suspended`
#[derive(Debug, Clone, Default, Deserialize, SelectorGroup)]
#[serde(rename_all = "camelCase")]
#[selector(name = "ProcessInstanceSelector", purpose = "update the suspension state")]
pub struct ProcessInstanceSuspensionStateDto {
    #[serde(default)]
    #[selector(skip)]
    pub suspended: bool,
    pub process_instance_id: Option<String>,
    pub process_definition_id: Option<String>,
    pub process_definition_key: Option<String>,
    #[selector(skip)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    #[selector(skip)]
    pub without_tenant_id: bool,
}

impl ProcessInstanceSuspensionStateDto {
    pub fn update(&self, engine: &dyn ProcessEngine) -> Result<(), RestError> {
        let tenant = TenantSelection::resolve(self.tenant_id.as_deref(), self.without_tenant_id)?;
        let selector = self.selected()?;
        tenant.require_definition_key(matches!(
            selector,
            ProcessInstanceSelector::ProcessDefinitionKey(_)
        ))?;

        let mut builder = engine.update_process_instance_suspension_state();
        match selector {
            ProcessInstanceSelector::ProcessInstanceId(id) => builder.by_process_instance_id(id),
            ProcessInstanceSelector::ProcessDefinitionId(id) => {
                builder.by_process_definition_id(id)
            }
            ProcessInstanceSelector::ProcessDefinitionKey(key) => {
                builder.by_process_definition_key(key)
            }
        }
        tenant.apply(builder.as_mut());

        complete_suspension(builder, self.suspended)
    }
}

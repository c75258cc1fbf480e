//! Message correlation

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::compiler::coerce::{Coercer, TypedValue, VariableValueDto, typed_variables};
use crate::compiler::selector::TenantSelection;
use crate::engine::ProcessEngine;
use crate::error::RestError;

const CONTEXT: &str = "Cannot deliver message";

/// Body of `POST /message`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationMessageDto {
    pub message_name: Option<String>,
    pub business_key: Option<String>,
    pub process_instance_id: Option<String>,
    #[serde(default)]
    pub correlation_keys: BTreeMap<String, VariableValueDto>,
    #[serde(default)]
    pub local_correlation_keys: BTreeMap<String, VariableValueDto>,
    #[serde(default)]
    pub process_variables: BTreeMap<String, VariableValueDto>,
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub without_tenant_id: bool,
    #[serde(default)]
    pub all: bool,
}

/// Typed values of a correlation, converted before the builder is created
struct Correlation {
    correlation_keys: Vec<(String, TypedValue)>,
    local_correlation_keys: Vec<(String, TypedValue)>,
    process_variables: Vec<(String, TypedValue)>,
}

impl CorrelationMessageDto {
    fn convert(&self, coercer: &Coercer) -> Result<Correlation, RestError> {
        let convert = |variables: &BTreeMap<String, VariableValueDto>| {
            typed_variables(variables, coercer).map_err(|err| err.with_context(CONTEXT))
        };
        Ok(Correlation {
            correlation_keys: convert(&self.correlation_keys)?,
            local_correlation_keys: convert(&self.local_correlation_keys)?,
            process_variables: convert(&self.process_variables)?,
        })
    }

    pub fn correlate(&self, engine: &dyn ProcessEngine, coercer: &Coercer) -> Result<(), RestError> {
        let message_name = self
            .message_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| RestError::invalid("No message name supplied"))?;
        let tenant = TenantSelection::resolve(self.tenant_id.as_deref(), self.without_tenant_id)?;
        let correlation = self.convert(coercer)?;

        let mut builder = engine.create_message_correlation(message_name);
        if let Some(key) = &self.business_key {
            builder.process_instance_business_key(key);
        }
        if let Some(id) = &self.process_instance_id {
            builder.process_instance_id(id);
        }
        for (name, value) in &correlation.correlation_keys {
            builder.process_instance_variable_equals(name, value);
        }
        for (name, value) in &correlation.local_correlation_keys {
            builder.local_variable_equals(name, value);
        }
        for (name, value) in correlation.process_variables {
            builder.set_variable(&name, value);
        }
        tenant.apply(builder.as_mut());

        tracing::debug!(message = message_name, all = self.all, "Correlating message");
        let result = if self.all {
            builder.correlate_all()
        } else {
            builder.correlate()
        };
        Ok(result?)
    }
}

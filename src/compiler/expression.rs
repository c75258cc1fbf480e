//! Filter expressions in flat (`field_OPERATOR_value`) and structured JSON form

use serde::Deserialize;
use serde_json::Value;

use crate::compiler::coerce::{Coercer, ConversionError, TypeTag, TypedValue};
use crate::compiler::operator::Operator;
use crate::error::RestError;

/// One parsed filter predicate, value still raw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpression {
    pub field: String,
    pub operator: Operator,
    pub raw_value: String,
    pub declared_type: Option<TypeTag>,
}

/// A filter expression with its value converted for the engine
#[derive(Debug, Clone, PartialEq)]
pub struct VariableFilter {
    pub name: String,
    pub operator: Operator,
    pub value: TypedValue,
}

impl FilterExpression {
    /// Type the value: `like` keeps the raw string, a declared type is
    /// honoured, anything else is inferred
    pub fn compile(&self, coercer: &Coercer) -> Result<VariableFilter, ConversionError> {
        let value = match (self.operator, self.declared_type) {
            (Operator::Like, _) => TypedValue::String(self.raw_value.clone()),
            (_, Some(tag)) => coercer.coerce(&self.raw_value, tag)?,
            (_, None) => coercer.infer(&self.raw_value),
        };
        Ok(VariableFilter {
            name: self.field.clone(),
            operator: self.operator,
            value,
        })
    }
}

fn format_error(label: &str, token: &str) -> RestError {
    RestError::invalid(format!(
        "{label} query parameter has to have format KEY_OPERATOR_VALUE, but was '{token}'"
    ))
}

fn comparator_error(label: &str, operator: &str) -> RestError {
    RestError::invalid(format!("Invalid {label} comparator specified: {operator}"))
}

/// Parse a single `field_OPERATOR_value` token
pub fn parse_filter_token(token: &str, label: &str) -> Result<FilterExpression, RestError> {
    let Some((field, rest)) = token.split_once('_') else {
        return Err(format_error(label, token));
    };
    if field.is_empty() {
        return Err(format_error(label, token));
    }

    if let Some((operator, tail)) = Operator::match_prefix(rest)
        && let Some(value) = tail.strip_prefix('_')
    {
        if value.is_empty() {
            return Err(format_error(label, token));
        }
        return Ok(FilterExpression {
            field: field.to_string(),
            operator,
            raw_value: value.to_string(),
            declared_type: None,
        });
    }

    match rest.split_once('_') {
        Some((candidate, value)) if !candidate.is_empty() && !value.is_empty() => {
            Err(comparator_error(label, candidate))
        }
        _ => Err(format_error(label, token)),
    }
}

/// Parse a comma separated list of filter tokens
pub fn parse_filter_list(raw: &str, label: &str) -> Result<Vec<FilterExpression>, RestError> {
    raw.split(',')
        .filter(|token| !token.is_empty())
        .map(|token| parse_filter_token(token, label))
        .collect()
}

/// JSON form of a filter expression
#[derive(Debug, Clone, Deserialize)]
pub struct FilterExpressionDto {
    pub name: String,
    pub operator: String,
    #[serde(default)]
    pub value: Value,
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
}

impl FilterExpressionDto {
    /// Validate the operator against the same table as the flat form.
    ///
    /// A JSON string without an explicit type is taken as a string value.
    pub fn parse(&self, label: &str) -> Result<FilterExpression, RestError> {
        let operator = Operator::from_token(&self.operator)
            .ok_or_else(|| comparator_error(label, &self.operator))?;

        let declared_type = match (&self.type_name, &self.value) {
            (Some(name), _) => Some(TypeTag::from_name(name)?),
            (None, Value::String(_)) => Some(TypeTag::String),
            (None, _) => None,
        };
        let raw_value = match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        Ok(FilterExpression {
            field: self.name.clone(),
            operator,
            raw_value,
            declared_type,
        })
    }
}

// ============================================================================
// Condition lists
// ============================================================================

/// A field-less `OPERATOR_value` condition, e.g. `lt_2013-05-05T00:00:00.000+0200`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub operator: Operator,
    pub raw_value: String,
}

/// JSON form of a condition
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionDto {
    pub operator: String,
    #[serde(default)]
    pub value: Value,
}

fn condition_operator(
    token: &str,
    description: &str,
    allowed: &[Operator],
) -> Result<Operator, RestError> {
    Operator::from_token(token)
        .filter(|op| allowed.contains(op))
        .ok_or_else(|| comparator_error(description, token))
}

/// Parse a comma separated condition list
pub fn parse_condition_list(
    raw: &str,
    description: &str,
    allowed: &[Operator],
) -> Result<Vec<Condition>, RestError> {
    raw.split(',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            let Some((operator, value)) = token.split_once('_') else {
                return Err(RestError::invalid(format!(
                    "Invalid {description} format: has to have format OPERATOR_VALUE"
                )));
            };
            Ok(Condition {
                operator: condition_operator(operator, description, allowed)?,
                raw_value: value.to_string(),
            })
        })
        .collect()
}

impl ConditionDto {
    pub fn parse(&self, description: &str, allowed: &[Operator]) -> Result<Condition, RestError> {
        Ok(Condition {
            operator: condition_operator(&self.operator, description, allowed)?,
            raw_value: match &self.value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        })
    }
}

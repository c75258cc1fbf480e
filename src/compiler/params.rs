//! Uniform access to request parameters from a query string or a JSON body
//!
//! Both transports carry the same logical parameter names. Query-string
//! values are always text (lists are comma separated); JSON values keep
//! their JSON shape until a typed getter reads them.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::compiler::coerce::{Coercer, ConversionError, TypeTag};
use crate::compiler::expression::{
    Condition, ConditionDto, FilterExpression, FilterExpressionDto, parse_condition_list,
    parse_filter_list,
};
use crate::compiler::operator::Operator;
use crate::compiler::sorting::{SortCriterion, SortingDto};
use crate::error::RestError;

/// A single raw parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Json(Value),
}

/// The parameters of one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    values: BTreeMap<String, ParamValue>,
}

fn invalid_value(name: &str, raw: &str, cause: impl std::fmt::Display) -> RestError {
    RestError::invalid(format!(
        "Cannot set query parameter '{name}' to value '{raw}': {cause}"
    ))
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl RequestParams {
    /// Build from query-string pairs; the first occurrence of a name wins
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::default();
        params.add_pairs(pairs);
        params
    }

    /// Build from a JSON object body. `null` is treated as an empty body.
    pub fn from_json(body: Value) -> Result<Self, RestError> {
        match body {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => Ok(Self {
                values: map
                    .into_iter()
                    .map(|(name, value)| (name, ParamValue::Json(value)))
                    .collect(),
            }),
            _ => Err(RestError::invalid("Request body must be a JSON object")),
        }
    }

    /// Add query-string pairs for names the body did not set
    pub fn with_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.add_pairs(pairs);
        self
    }

    fn add_pairs<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in pairs {
            self.values
                .entry(name.into())
                .or_insert_with(|| ParamValue::Text(value.into()));
        }
    }

    /// Present and not JSON `null`
    fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values
            .get(name)
            .filter(|value| !matches!(value, ParamValue::Json(Value::Null)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// A scalar as text; arrays and objects are rejected
    pub fn text(&self, name: &str) -> Result<Option<String>, RestError> {
        match self.get(name) {
            None => Ok(None),
            Some(ParamValue::Text(s)) => Ok(Some(s.clone())),
            Some(ParamValue::Json(value @ (Value::Array(_) | Value::Object(_)))) => Err(
                invalid_value(name, &value.to_string(), "expected a single value"),
            ),
            Some(ParamValue::Json(value)) => Ok(Some(json_text(value))),
        }
    }

    /// A list: comma separated text or a JSON array. Empty entries are dropped.
    pub fn text_list(&self, name: &str) -> Result<Option<Vec<String>>, RestError> {
        let items: Vec<String> = match self.get(name) {
            None => return Ok(None),
            Some(ParamValue::Text(s)) | Some(ParamValue::Json(Value::String(s))) => {
                s.split(',').map(str::to_string).collect()
            }
            Some(ParamValue::Json(Value::Array(items))) => items.iter().map(json_text).collect(),
            Some(ParamValue::Json(value)) => vec![json_text(value)],
        };
        let items: Vec<String> = items.into_iter().filter(|s| !s.is_empty()).collect();
        Ok((!items.is_empty()).then_some(items))
    }

    fn convert<T>(
        &self,
        name: &str,
        convert: impl FnOnce(&str) -> Result<T, ConversionError>,
    ) -> Result<Option<T>, RestError> {
        match self.text(name)? {
            None => Ok(None),
            Some(raw) => convert(&raw)
                .map(Some)
                .map_err(|cause| invalid_value(name, &raw, cause)),
        }
    }

    pub fn boolean(&self, name: &str) -> Result<Option<bool>, RestError> {
        let coercer = Coercer::default();
        self.convert(name, |raw| coercer.parse_flag(raw))
    }

    pub fn integer(&self, name: &str) -> Result<Option<i32>, RestError> {
        let coercer = Coercer::default();
        self.convert(name, |raw| coercer.parse_untyped(raw, TypeTag::Integer))
    }

    pub fn long(&self, name: &str) -> Result<Option<i64>, RestError> {
        let coercer = Coercer::default();
        self.convert(name, |raw| coercer.parse_untyped(raw, TypeTag::Long))
    }

    pub fn date(
        &self,
        name: &str,
        coercer: &Coercer,
    ) -> Result<Option<DateTime<FixedOffset>>, RestError> {
        self.convert(name, |raw| coercer.parse_date(raw))
    }

    fn json_list<T: DeserializeOwned>(&self, name: &str, value: &Value) -> Result<Vec<T>, RestError> {
        serde_json::from_value(value.clone())
            .map_err(|err| invalid_value(name, &value.to_string(), err))
    }

    /// Filter expressions: flat tokens or a JSON array of `{name, operator, value[, type]}`
    pub fn filter_expressions(
        &self,
        name: &str,
        label: &str,
    ) -> Result<Option<Vec<FilterExpression>>, RestError> {
        let expressions = match self.get(name) {
            None => return Ok(None),
            Some(ParamValue::Text(raw)) | Some(ParamValue::Json(Value::String(raw))) => {
                parse_filter_list(raw, label)?
            }
            Some(ParamValue::Json(value)) => self
                .json_list::<FilterExpressionDto>(name, value)?
                .iter()
                .map(|dto| dto.parse(label))
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(Some(expressions))
    }

    /// Conditions: `OPERATOR_value` tokens or a JSON array of `{operator, value}`
    pub fn conditions(
        &self,
        name: &str,
        description: &str,
        allowed: &[Operator],
    ) -> Result<Option<Vec<Condition>>, RestError> {
        let conditions = match self.get(name) {
            None => return Ok(None),
            Some(ParamValue::Text(raw)) | Some(ParamValue::Json(Value::String(raw))) => {
                parse_condition_list(raw, description, allowed)?
            }
            Some(ParamValue::Json(value)) => self
                .json_list::<ConditionDto>(name, value)?
                .iter()
                .map(|dto| dto.parse(description, allowed))
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(Some(conditions))
    }

    /// Sort criteria: the flat `sortBy`/`sortOrder` pair first, then the
    /// entries of a JSON `sorting` array in order
    pub fn sorting(&self) -> Result<Vec<SortCriterion>, RestError> {
        let mut criteria = Vec::new();

        let flat = SortCriterion::from_parts(
            self.text("sortBy")?,
            self.text("sortOrder")?,
            BTreeMap::new(),
        )?;
        criteria.extend(flat);

        if let Some(ParamValue::Json(value)) = self.get("sorting") {
            for dto in self.json_list::<SortingDto>("sorting", value)? {
                criteria.extend(SortCriterion::from_dto(dto)?);
            }
        }
        Ok(criteria)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_first_pair_wins() {
        let params = RequestParams::from_pairs([("a", "1"), ("a", "2")]);
        assert_eq!(params.text("a").unwrap(), Some("1".to_string()));
    }

    #[test]
    fn test_body_wins_over_query_string() {
        let params = RequestParams::from_json(json!({"maxResults": 3}))
            .unwrap()
            .with_pairs([("maxResults", "10"), ("firstResult", "2")]);
        assert_eq!(params.integer("maxResults").unwrap(), Some(3));
        assert_eq!(params.integer("firstResult").unwrap(), Some(2));
    }

    #[test]
    fn test_json_null_is_absent() {
        let params = RequestParams::from_json(json!({"jobId": null})).unwrap();
        assert!(!params.contains("jobId"));
        assert_eq!(params.text("jobId").unwrap(), None);
    }

    #[test]
    fn test_non_object_body() {
        assert_matches!(RequestParams::from_json(json!([1])), Err(RestError::InvalidRequest(_)));
    }

    #[test]
    fn test_invalid_integer_message() {
        let params = RequestParams::from_pairs([("firstResult", "abc")]);
        assert_eq!(
            params.integer("firstResult").unwrap_err().to_string(),
            "Cannot set query parameter 'firstResult' to value 'abc': Cannot convert value \"abc\" to type i32"
        );
    }

    #[test]
    fn test_invalid_date_message() {
        let params = RequestParams::from_pairs([("dueAfter", "anInvalidDate")]);
        let err = params.date("dueAfter", &Coercer::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot set query parameter 'dueAfter' to value 'anInvalidDate': Cannot convert value \"anInvalidDate\" to type date"
        );
    }

    #[test]
    fn test_text_list_forms() {
        let flat = RequestParams::from_pairs([("tenantIdIn", "a,b,,c")]);
        assert_eq!(
            flat.text_list("tenantIdIn").unwrap(),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );

        let json = RequestParams::from_json(json!({"tenantIdIn": ["a", "b"]})).unwrap();
        assert_eq!(
            json.text_list("tenantIdIn").unwrap(),
            Some(vec!["a".to_string(), "b".to_string()])
        );

        let empty = RequestParams::from_pairs([("tenantIdIn", "")]);
        assert_eq!(empty.text_list("tenantIdIn").unwrap(), None);
    }

    #[test]
    fn test_json_scalars_as_text() {
        let params = RequestParams::from_json(json!({"priority": 5, "active": true})).unwrap();
        assert_eq!(params.integer("priority").unwrap(), Some(5));
        assert_eq!(params.boolean("active").unwrap(), Some(true));
    }

    #[test]
    fn test_structured_filters() {
        let params = RequestParams::from_json(json!({
            "variables": [
                {"name": "a", "operator": "eq", "value": 1},
                {"name": "b", "operator": "like", "value": "x%"}
            ]
        }))
        .unwrap();
        let filters = params.filter_expressions("variables", "variable").unwrap().unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[1].operator, Operator::Like);
    }

    #[test]
    fn test_malformed_structured_filters() {
        let params =
            RequestParams::from_json(json!({"variables": [{"operator": "eq", "value": 1}]})).unwrap();
        let err = params.filter_expressions("variables", "variable").unwrap_err();
        assert!(err.to_string().starts_with("Cannot set query parameter 'variables'"));
    }

    #[test]
    fn test_flat_then_structured_sorting() {
        let params = RequestParams::from_json(json!({
            "sortBy": "name",
            "sortOrder": "asc",
            "sorting": [{"sortBy": "created", "sortOrder": "desc"}]
        }))
        .unwrap();
        let keys: Vec<String> = params.sorting().unwrap().into_iter().map(|c| c.key).collect();
        assert_eq!(keys, vec!["name".to_string(), "created".to_string()]);
    }

    #[test]
    fn test_partial_structured_sorting() {
        let params =
            RequestParams::from_json(json!({"sorting": [{"sortBy": "created"}]})).unwrap();
        assert_eq!(
            params.sorting().unwrap_err().to_string(),
            crate::compiler::sorting::PARTIAL_SORTING
        );
    }
}

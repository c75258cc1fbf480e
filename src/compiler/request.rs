//! The compiled query request
//!
//! [`QueryRequest::compile`] validates everything up front; nothing touches
//! the query until compilation succeeded. [`QueryRequest::apply`] then emits
//! the calls in a fixed order: filter setters in table order, case toggles,
//! then the sort chain.

use std::fmt;

use crate::compiler::case::{CaseFlags, CaseToggles};
use crate::compiler::coerce::Coercer;
use crate::compiler::pagination::Pagination;
use crate::compiler::params::RequestParams;
use crate::compiler::registry::{BoundFilter, QuerySchema};
use crate::compiler::selector::ensure_exclusive;
use crate::compiler::sorting::{self, BoundSort};
use crate::engine::{EngineError, Query};
use crate::error::RestError;

pub struct QueryRequest<Q: ?Sized + 'static> {
    filters: Vec<BoundFilter<Q>>,
    sorts: Vec<BoundSort<Q>>,
    pagination: Pagination,
    flags: CaseFlags,
    toggles: Option<CaseToggles<Q>>,
}

impl<Q: Query + ?Sized + 'static> QueryRequest<Q> {
    pub fn compile(
        schema: &QuerySchema<Q>,
        params: &RequestParams,
        coercer: &Coercer,
    ) -> Result<Self, RestError> {
        let mut filters = Vec::new();
        for param in schema.params {
            filters.extend(param.bind(params, coercer)?);
        }

        for (first, second) in schema.exclusive_flags {
            let both_set =
                params.boolean(first)? == Some(true) && params.boolean(second)? == Some(true);
            ensure_exclusive(first, second, both_set)?;
        }

        let sorts = sorting::bind(params.sorting()?, schema.sort_keys)?;

        let pagination = Pagination::resolve(
            params.integer("firstResult")?,
            params.integer("maxResults")?,
        );

        let flags = match schema.case_toggles {
            Some(_) => CaseFlags::from_params(params)?,
            None => CaseFlags::default(),
        };

        tracing::debug!(
            query = schema.name,
            filters = filters.len(),
            sorts = sorts.len(),
            first = pagination.first,
            max = pagination.max,
            "Compiled query request"
        );

        Ok(Self {
            filters,
            sorts,
            pagination,
            flags,
            toggles: schema.case_toggles,
        })
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Configure `query` from this request
    pub fn apply(&self, query: &mut Q) {
        for filter in &self.filters {
            filter.apply(query);
        }
        if let Some(toggles) = &self.toggles {
            self.flags.apply(query, toggles);
        }
        for sort in &self.sorts {
            sort.apply(query);
        }
    }

    /// Apply and run the query: `list()` when no window was requested,
    /// `list_page(first, max)` otherwise
    pub fn list(self, query: &mut Q) -> Result<Vec<Q::Item>, EngineError> {
        self.apply(query);
        if self.pagination.is_paged() {
            query.list_page(self.pagination.first, self.pagination.max)
        } else {
            query.list()
        }
    }

    /// Apply and count; the result window is ignored
    pub fn count(self, query: &mut Q) -> Result<i64, EngineError> {
        self.apply(query);
        query.count()
    }
}

impl<Q: ?Sized + 'static> fmt::Debug for QueryRequest<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryRequest")
            .field("filters", &self.filters.len())
            .field("sorts", &self.sorts)
            .field("pagination", &self.pagination)
            .field("flags", &self.flags)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::registry::{FilterParam, ParamSetter};
    use crate::compiler::sorting::SortKey;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Default)]
    struct Fake {
        calls: Vec<String>,
    }

    impl Fake {
        fn record(&mut self, call: String) {
            self.calls.push(call);
        }
    }

    impl Query for Fake {
        type Item = String;

        fn asc(&mut self) {
            self.record("asc".into());
        }

        fn desc(&mut self) {
            self.record("desc".into());
        }

        fn list(&self) -> Result<Vec<String>, EngineError> {
            Ok(vec!["list".into()])
        }

        fn list_page(&self, first: i32, max: i32) -> Result<Vec<String>, EngineError> {
            Ok(vec![format!("list_page({first}, {max})")])
        }

        fn count(&self) -> Result<i64, EngineError> {
            Ok(self.calls.len() as i64)
        }
    }

    static SCHEMA: QuerySchema<Fake> = QuerySchema {
        name: "fake",
        params: &[
            FilterParam::new("id", ParamSetter::Text(|q, v| q.record(format!("id({v})")))),
            FilterParam::new("timers", ParamSetter::Flag(|q| q.record("timers".into()))),
            FilterParam::new("messages", ParamSetter::Flag(|q| q.record("messages".into()))),
            FilterParam::new(
                "variables",
                ParamSetter::Variables {
                    label: "variable",
                    apply: |q, name, op, value| q.record(format!("variable({name} {op} {value})")),
                },
            ),
        ],
        sort_keys: &[SortKey::field("id", |q| q.record("order_by_id".into()))],
        case_toggles: Some(CaseToggles {
            names: |q| q.record("names_ignore_case".into()),
            values: |q| q.record("values_ignore_case".into()),
        }),
        exclusive_flags: &[("timers", "messages")],
    };

    fn compile(params: RequestParams) -> Result<QueryRequest<Fake>, RestError> {
        QueryRequest::compile(&SCHEMA, &params, &Coercer::default())
    }

    #[test]
    fn test_apply_order() {
        let params = RequestParams::from_pairs([
            ("sortBy", "id"),
            ("sortOrder", "desc"),
            ("variables", "a_eq_1,b_like_x%"),
            ("variableNamesIgnoreCase", "true"),
            ("variableValuesIgnoreCase", "true"),
            ("id", "7"),
        ]);
        let request = compile(params).unwrap();
        let mut fake = Fake::default();
        request.apply(&mut fake);
        assert_eq!(
            fake.calls,
            vec![
                "id(7)",
                "variable(a eq 1)",
                "variable(b like x%)",
                "names_ignore_case",
                "values_ignore_case",
                "order_by_id",
                "desc",
            ]
        );
    }

    #[test]
    fn test_case_toggles_once_for_many_filters() {
        let params = RequestParams::from_pairs([
            ("variables", "a_eq_1,b_eq_2,c_eq_3"),
            ("variableValuesIgnoreCase", "true"),
        ]);
        let mut fake = Fake::default();
        compile(params).unwrap().apply(&mut fake);
        let toggles = fake
            .calls
            .iter()
            .filter(|c| c.ends_with("ignore_case"))
            .count();
        assert_eq!(toggles, 1);
    }

    #[test]
    fn test_false_flag_is_skipped() {
        let params = RequestParams::from_pairs([("timers", "false")]);
        let mut fake = Fake::default();
        compile(params).unwrap().apply(&mut fake);
        assert!(fake.calls.is_empty());
    }

    #[test]
    fn test_exclusive_flags() {
        let params = RequestParams::from_pairs([("timers", "true"), ("messages", "true")]);
        let err = compile(params).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parameter timers cannot be used together with parameter messages."
        );
    }

    #[test]
    fn test_list_without_window() {
        let mut fake = Fake::default();
        let rows = compile(RequestParams::default()).unwrap().list(&mut fake).unwrap();
        assert_eq!(rows, vec!["list".to_string()]);
    }

    #[test]
    fn test_list_with_window() {
        let params = RequestParams::from_pairs([("firstResult", "10")]);
        let mut fake = Fake::default();
        let rows = compile(params).unwrap().list(&mut fake).unwrap();
        assert_eq!(rows, vec![format!("list_page(10, {})", i32::MAX)]);
    }

    #[test]
    fn test_structured_body() {
        let params = RequestParams::from_json(json!({
            "variables": [{"name": "a", "operator": "gteq", "value": 5}],
            "sorting": [{"sortBy": "id", "sortOrder": "asc"}]
        }))
        .unwrap();
        let mut fake = Fake::default();
        compile(params).unwrap().apply(&mut fake);
        assert_eq!(fake.calls, vec!["variable(a gteq 5)", "order_by_id", "asc"]);
    }

    #[test]
    fn test_partial_sorting_fails_compilation() {
        let params = RequestParams::from_pairs([("id", "7"), ("sortBy", "id")]);
        assert_matches!(compile(params), Err(RestError::InvalidRequest(_)));
    }

    #[test]
    fn test_unknown_operator_in_variables() {
        let params = RequestParams::from_pairs([("variables", "a_bt_1")]);
        let err = compile(params).unwrap_err();
        assert_eq!(err.to_string(), "Invalid variable comparator specified: bt");
    }
}

//! Static parameter tables of the query families
//!
//! Each query family declares which request parameter drives which setter
//! of its query interface. The table is the only place that knows parameter
//! names; adding a parameter means adding one entry.

use chrono::{DateTime, FixedOffset};

use crate::compiler::case::CaseToggles;
use crate::compiler::coerce::{Coercer, TypedValue};
use crate::compiler::operator::Operator;
use crate::compiler::params::RequestParams;
use crate::compiler::sorting::SortKey;
use crate::error::RestError;

/// How a parameter value reaches the query
pub enum ParamSetter<Q: ?Sized> {
    Text(fn(&mut Q, &str)),
    TextList(fn(&mut Q, &[String])),
    /// Applied when the parameter is `true`, ignored when `false`
    Flag(fn(&mut Q)),
    Integer(fn(&mut Q, i32)),
    Long(fn(&mut Q, i64)),
    Date(fn(&mut Q, DateTime<FixedOffset>)),
    DateConditions {
        description: &'static str,
        allowed: &'static [Operator],
        apply: fn(&mut Q, Operator, DateTime<FixedOffset>),
    },
    Variables {
        label: &'static str,
        apply: fn(&mut Q, &str, Operator, &TypedValue),
    },
}

/// One entry of a parameter table
pub struct FilterParam<Q: ?Sized> {
    pub name: &'static str,
    pub setter: ParamSetter<Q>,
}

impl<Q: ?Sized> FilterParam<Q> {
    pub const fn new(name: &'static str, setter: ParamSetter<Q>) -> Self {
        Self { name, setter }
    }
}

/// A parameter value bound to its setter, ready to be applied
pub(crate) enum BoundFilter<Q: ?Sized> {
    Text(fn(&mut Q, &str), String),
    TextList(fn(&mut Q, &[String]), Vec<String>),
    Flag(fn(&mut Q)),
    Integer(fn(&mut Q, i32), i32),
    Long(fn(&mut Q, i64), i64),
    Date(fn(&mut Q, DateTime<FixedOffset>), DateTime<FixedOffset>),
    Condition(
        fn(&mut Q, Operator, DateTime<FixedOffset>),
        Operator,
        DateTime<FixedOffset>,
    ),
    Variable(fn(&mut Q, &str, Operator, &TypedValue), String, Operator, TypedValue),
}

impl<Q: ?Sized> BoundFilter<Q> {
    pub(crate) fn apply(&self, query: &mut Q) {
        match self {
            BoundFilter::Text(set, value) => set(query, value),
            BoundFilter::TextList(set, values) => set(query, values),
            BoundFilter::Flag(set) => set(query),
            BoundFilter::Integer(set, value) => set(query, *value),
            BoundFilter::Long(set, value) => set(query, *value),
            BoundFilter::Date(set, value) => set(query, *value),
            BoundFilter::Condition(set, operator, value) => set(query, *operator, *value),
            BoundFilter::Variable(set, name, operator, value) => {
                set(query, name, *operator, value)
            }
        }
    }
}

impl<Q: ?Sized> FilterParam<Q> {
    /// Read and convert this parameter; absent parameters bind nothing
    pub(crate) fn bind(
        &self,
        params: &RequestParams,
        coercer: &Coercer,
    ) -> Result<Vec<BoundFilter<Q>>, RestError> {
        let name = self.name;
        let bound = match &self.setter {
            ParamSetter::Text(set) => params
                .text(name)?
                .map(|value| BoundFilter::Text(*set, value))
                .into_iter()
                .collect(),
            ParamSetter::TextList(set) => params
                .text_list(name)?
                .map(|values| BoundFilter::TextList(*set, values))
                .into_iter()
                .collect(),
            ParamSetter::Flag(set) => match params.boolean(name)? {
                Some(true) => vec![BoundFilter::Flag(*set)],
                _ => Vec::new(),
            },
            ParamSetter::Integer(set) => params
                .integer(name)?
                .map(|value| BoundFilter::Integer(*set, value))
                .into_iter()
                .collect(),
            ParamSetter::Long(set) => params
                .long(name)?
                .map(|value| BoundFilter::Long(*set, value))
                .into_iter()
                .collect(),
            ParamSetter::Date(set) => params
                .date(name, coercer)?
                .map(|value| BoundFilter::Date(*set, value))
                .into_iter()
                .collect(),
            ParamSetter::DateConditions {
                description,
                allowed,
                apply,
            } => {
                let mut bound = Vec::new();
                for condition in params
                    .conditions(name, description, allowed)?
                    .unwrap_or_default()
                {
                    let date = coercer.parse_date(&condition.raw_value).map_err(|err| {
                        RestError::invalid(format!("Invalid {description} format: {err}"))
                    })?;
                    bound.push(BoundFilter::Condition(*apply, condition.operator, date));
                }
                bound
            }
            ParamSetter::Variables { label, apply } => {
                let mut bound = Vec::new();
                for expression in params.filter_expressions(name, label)?.unwrap_or_default() {
                    let filter = expression.compile(coercer).map_err(|err| {
                        err.with_context(format!(
                            "Cannot set query parameter '{name}' to value '{}'",
                            expression.raw_value
                        ))
                    })?;
                    bound.push(BoundFilter::Variable(
                        *apply,
                        filter.name,
                        filter.operator,
                        filter.value,
                    ));
                }
                bound
            }
        };
        Ok(bound)
    }
}

/// Everything the compiler needs to know about one query family
pub struct QuerySchema<Q: ?Sized + 'static> {
    /// Family name used in log lines
    pub name: &'static str,
    pub params: &'static [FilterParam<Q>],
    pub sort_keys: &'static [SortKey<Q>],
    /// Present when the family supports case-insensitive variable matching
    pub case_toggles: Option<CaseToggles<Q>>,
    /// Flag parameter pairs that must not both be `true`
    pub exclusive_flags: &'static [(&'static str, &'static str)],
}

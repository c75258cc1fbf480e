//! Sort criteria: parsing, validation against a key registry, and the ordered call chain

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::compiler::coerce::ValueType;
use crate::engine::Query;
use crate::error::RestError;

pub const PARTIAL_SORTING: &str =
    "Only a single sorting parameter specified. sortBy and sortOrder required.";

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    fn apply<Q: Query + ?Sized>(self, query: &mut Q) {
        match self {
            SortDirection::Asc => query.asc(),
            SortDirection::Desc => query.desc(),
        }
    }
}

/// One validated entry of the sort chain, before binding to a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortCriterion {
    pub key: String,
    pub direction: SortDirection,
    pub parameters: BTreeMap<String, String>,
}

/// JSON form of a sort entry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortingDto {
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
}

impl SortCriterion {
    /// Both or neither of key and direction; `None` when neither is given
    pub fn from_parts(
        sort_by: Option<String>,
        sort_order: Option<String>,
        parameters: BTreeMap<String, String>,
    ) -> Result<Option<Self>, RestError> {
        match (sort_by, sort_order) {
            (None, None) => Ok(None),
            (Some(key), Some(order)) => {
                let direction = SortDirection::from_name(&order).ok_or_else(|| {
                    RestError::invalid(format!("sortOrder parameter has invalid value: {order}"))
                })?;
                Ok(Some(Self {
                    key,
                    direction,
                    parameters,
                }))
            }
            _ => Err(RestError::invalid(PARTIAL_SORTING)),
        }
    }

    pub fn from_dto(dto: SortingDto) -> Result<Option<Self>, RestError> {
        let parameters = dto
            .parameters
            .into_iter()
            .map(|(name, value)| {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (name, text)
            })
            .collect();
        Self::from_parts(dto.sort_by, dto.sort_order, parameters)
    }
}

// ============================================================================
// Key registry
// ============================================================================

/// What a sort key calls on the query
pub enum SortTarget<Q: ?Sized> {
    Field(fn(&mut Q)),
    /// Variable-scoped ordering; needs the `variable` and `type` parameters
    Variable(fn(&mut Q, &str, ValueType)),
}

/// Entry of a query family's static sort key table
pub struct SortKey<Q: ?Sized> {
    pub name: &'static str,
    pub target: SortTarget<Q>,
}

impl<Q: ?Sized> SortKey<Q> {
    pub const fn field(name: &'static str, order_by: fn(&mut Q)) -> Self {
        Self {
            name,
            target: SortTarget::Field(order_by),
        }
    }

    pub const fn variable(name: &'static str, order_by: fn(&mut Q, &str, ValueType)) -> Self {
        Self {
            name,
            target: SortTarget::Variable(order_by),
        }
    }
}

/// A sort criterion bound to its registry entry
pub struct BoundSort<Q: ?Sized + 'static> {
    key: &'static str,
    order_by: BoundOrder<Q>,
    direction: SortDirection,
}

enum BoundOrder<Q: ?Sized> {
    Field(fn(&mut Q)),
    Variable(fn(&mut Q, &str, ValueType), String, ValueType),
}

impl<Q: Query + ?Sized + 'static> BoundSort<Q> {
    /// Emit `order_by`, immediately followed by `asc`/`desc`
    pub fn apply(&self, query: &mut Q) {
        match &self.order_by {
            BoundOrder::Field(order_by) => order_by(query),
            BoundOrder::Variable(order_by, variable, value_type) => {
                order_by(query, variable, *value_type)
            }
        }
        self.direction.apply(query);
    }
}

impl<Q: ?Sized + 'static> std::fmt::Debug for BoundSort<Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundSort")
            .field("key", &self.key)
            .field("direction", &self.direction)
            .finish()
    }
}

/// Validate every criterion against `keys`, keeping the request order
pub fn bind<Q: ?Sized + 'static>(
    criteria: Vec<SortCriterion>,
    keys: &'static [SortKey<Q>],
) -> Result<Vec<BoundSort<Q>>, RestError> {
    criteria
        .into_iter()
        .map(|criterion| -> Result<BoundSort<Q>, RestError> {
            let key = keys
                .iter()
                .find(|key| key.name == criterion.key)
                .ok_or_else(|| {
                    RestError::invalid(format!(
                        "sortBy parameter has invalid value: {}",
                        criterion.key
                    ))
                })?;

            let order_by = match key.target {
                SortTarget::Field(order_by) => BoundOrder::Field(order_by),
                SortTarget::Variable(order_by) => {
                    let require = |name: &str| {
                        criterion.parameters.get(name).cloned().ok_or_else(|| {
                            RestError::invalid(format!(
                                "Sorting by {} requires parameter '{name}'",
                                key.name
                            ))
                        })
                    };
                    let variable = require("variable")?;
                    let value_type = ValueType::from_name(&require("type")?)?;
                    BoundOrder::Variable(order_by, variable, value_type)
                }
            };

            Ok(BoundSort {
                key: key.name,
                order_by,
                direction: criterion.direction,
            })
        })
        .collect()
}

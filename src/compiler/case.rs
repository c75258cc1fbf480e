//! Case-insensitive matching of variable names and values

use crate::compiler::params::RequestParams;
use crate::error::RestError;

/// Query-wide toggles, independent of the number of variable filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseFlags {
    pub ignore_field_name_case: bool,
    pub ignore_value_case: bool,
}

/// Setter pair of a query family that supports case-insensitive variable matching
pub struct CaseToggles<Q: ?Sized> {
    pub names: fn(&mut Q),
    pub values: fn(&mut Q),
}

impl<Q: ?Sized> Clone for CaseToggles<Q> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Q: ?Sized> Copy for CaseToggles<Q> {}

impl CaseFlags {
    /// Read `variableNamesIgnoreCase` / `variableValuesIgnoreCase`
    pub fn from_params(params: &RequestParams) -> Result<Self, RestError> {
        Ok(Self {
            ignore_field_name_case: params.boolean("variableNamesIgnoreCase")?.unwrap_or(false),
            ignore_value_case: params.boolean("variableValuesIgnoreCase")?.unwrap_or(false),
        })
    }

    /// Invoke each enabled toggle once
    pub fn apply<Q: ?Sized>(self, query: &mut Q, toggles: &CaseToggles<Q>) {
        if self.ignore_field_name_case {
            (toggles.names)(query);
        }
        if self.ignore_value_case {
            (toggles.values)(query);
        }
    }
}

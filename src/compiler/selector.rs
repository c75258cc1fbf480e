//! Exactly-one-of validation for command selectors and tenant selection
//!
//! Command DTOs derive [`SelectorGroup`] (see `flowrest-macros`) which
//! generates a typed selector enum and a `selected()` method backed by
//! [`exactly_one_of`].

use crate::error::RestError;

pub use flowrest_macros::SelectorGroup;

/// Static description of a selector group
pub trait SelectorGroup {
    /// Wire names of the selector slots in declaration order
    const NAMES: &'static [&'static str];
    /// Completes the sentence "... should be set to <purpose>."
    const PURPOSE: &'static str;
}

/// A selector slot holds a value when it is present and non-empty
pub trait SelectorSlot {
    type Value: ?Sized;

    fn selected_value(&self) -> Option<&Self::Value>;
}

impl SelectorSlot for Option<String> {
    type Value = String;

    fn selected_value(&self) -> Option<&String> {
        self.as_ref().filter(|v| !v.is_empty())
    }
}

impl<T> SelectorSlot for Option<Vec<T>> {
    type Value = Vec<T>;

    fn selected_value(&self) -> Option<&Vec<T>> {
        self.as_ref().filter(|v| !v.is_empty())
    }
}

/// Zero or several selectors were set on a command
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorViolation {
    #[error("Either {names} should be set to {purpose}.")]
    None { names: String, purpose: &'static str },

    #[error("Only one of {names} should be set to {purpose}.")]
    TooMany { names: String, purpose: &'static str },
}

/// Keep the single present selector of group `G`
pub fn exactly_one_of<G, T>(mut present: Vec<T>) -> Result<T, SelectorViolation>
where
    G: SelectorGroup + ?Sized,
{
    let chosen = present.pop();
    match chosen {
        Some(selector) if present.is_empty() => Ok(selector),
        Some(_) => Err(SelectorViolation::TooMany {
            names: join_names(G::NAMES),
            purpose: G::PURPOSE,
        }),
        None => Err(SelectorViolation::None {
            names: join_names(G::NAMES),
            purpose: G::PURPOSE,
        }),
    }
}

/// Join names as `a, b or c`
pub fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

/// Fail when two mutually exclusive flag parameters are both set
pub fn ensure_exclusive(first: &str, second: &str, both_set: bool) -> Result<(), RestError> {
    if both_set {
        return Err(RestError::invalid(format!(
            "Parameter {first} cannot be used together with parameter {second}."
        )));
    }
    Ok(())
}

// ============================================================================
// Tenant selection
// ============================================================================

pub const TENANT_CONFLICT: &str =
    "Parameter 'tenantId' cannot be used together with parameter 'withoutTenantId'.";

pub const TENANT_REQUIRES_DEFINITION_KEY: &str = "Parameter 'tenantId' or 'withoutTenantId' can only be used together with parameter 'processDefinitionKey'.";

/// Targets that can be narrowed to a tenant
pub trait TenantScoped {
    fn tenant_id(&mut self, tenant_id: &str);
    fn without_tenant_id(&mut self);
}

/// Resolved `tenantId` / `withoutTenantId` pair
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TenantSelection {
    #[default]
    Unspecified,
    Tenant(String),
    WithoutTenant,
}

impl TenantSelection {
    pub fn resolve(tenant_id: Option<&str>, without_tenant_id: bool) -> Result<Self, RestError> {
        match (tenant_id, without_tenant_id) {
            (Some(_), true) => Err(RestError::invalid(TENANT_CONFLICT)),
            (Some(id), false) => Ok(TenantSelection::Tenant(id.to_string())),
            (None, true) => Ok(TenantSelection::WithoutTenant),
            (None, false) => Ok(TenantSelection::Unspecified),
        }
    }

    pub fn is_specified(&self) -> bool {
        !matches!(self, TenantSelection::Unspecified)
    }

    /// Tenant modifiers are only accepted next to a process definition key
    pub fn require_definition_key(&self, by_definition_key: bool) -> Result<(), RestError> {
        if self.is_specified() && !by_definition_key {
            return Err(RestError::invalid(TENANT_REQUIRES_DEFINITION_KEY));
        }
        Ok(())
    }

    pub fn apply<T: TenantScoped + ?Sized>(&self, target: &mut T) {
        match self {
            TenantSelection::Unspecified => {}
            TenantSelection::Tenant(id) => target.tenant_id(id),
            TenantSelection::WithoutTenant => target.without_tenant_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default, SelectorGroup)]
    #[selector(name = "SampleSelector", purpose = "update the suspension state")]
    struct SampleDto {
        job_id: Option<String>,
        job_ids: Option<Vec<String>>,
        #[selector(rename = "definitionKey")]
        process_definition_key: Option<String>,
        #[selector(skip)]
        #[allow(dead_code)]
        suspended: bool,
    }

    #[test]
    fn test_join_names() {
        assert_eq!(join_names(&["a"]), "a");
        assert_eq!(join_names(&["a", "b"]), "a or b");
        assert_eq!(join_names(&["a", "b", "c"]), "a, b or c");
    }

    #[test]
    fn test_derived_names() {
        assert_eq!(
            <SampleDto as SelectorGroup>::NAMES,
            &["jobId", "jobIds", "definitionKey"]
        );
    }

    #[test]
    fn test_single_selector() {
        let dto = SampleDto {
            job_ids: Some(vec!["a".into()]),
            ..Default::default()
        };
        assert_matches!(dto.selected(), Ok(SampleSelector::JobIds(ids)) if ids.len() == 1);
    }

    #[test]
    fn test_no_selector() {
        let err = SampleDto::default().selected().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Either jobId, jobIds or definitionKey should be set to update the suspension state."
        );
    }

    #[test]
    fn test_empty_values_do_not_count() {
        let dto = SampleDto {
            job_id: Some(String::new()),
            job_ids: Some(Vec::new()),
            ..Default::default()
        };
        assert_matches!(dto.selected(), Err(SelectorViolation::None { .. }));
    }

    #[test]
    fn test_two_selectors() {
        let dto = SampleDto {
            job_id: Some("a".into()),
            process_definition_key: Some("b".into()),
            ..Default::default()
        };
        let err = dto.selected().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Only one of jobId, jobIds or definitionKey should be set to update the suspension state."
        );
    }

    #[test]
    fn test_tenant_conflict() {
        let err = TenantSelection::resolve(Some("t"), true).unwrap_err();
        assert_eq!(err.to_string(), TENANT_CONFLICT);
        assert_eq!(
            TenantSelection::resolve(Some("t"), false),
            Ok(TenantSelection::Tenant("t".into()))
        );
        assert_eq!(
            TenantSelection::resolve(None, true),
            Ok(TenantSelection::WithoutTenant)
        );
    }

    #[test]
    fn test_tenant_requires_definition_key() {
        let tenant = TenantSelection::Tenant("t".into());
        assert!(tenant.require_definition_key(true).is_ok());
        assert_matches!(tenant.require_definition_key(false), Err(RestError::InvalidRequest(_)));
        assert!(TenantSelection::Unspecified.require_definition_key(false).is_ok());
    }

    #[test]
    fn test_ensure_exclusive() {
        assert!(ensure_exclusive("timers", "messages", false).is_ok());
        assert_eq!(
            ensure_exclusive("timers", "messages", true).unwrap_err().to_string(),
            "Parameter timers cannot be used together with parameter messages."
        );
    }
}

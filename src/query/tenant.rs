//! Tenant scoping of compiled queries.

use serde::{Deserialize, Serialize};

/// The tenant a request runs as.
///
/// When multi-tenancy is active every compiled query is intersected with
/// a filter on the tenant's domain. The default tenant uses the empty
/// domain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TenantContext {
    multi_tenancy: bool,
    domain: String,
}

impl TenantContext {
    /// A deployment without multi-tenancy; queries are not filtered.
    pub fn single() -> Self {
        Self::default()
    }

    /// A request for `domain` in a multi-tenant deployment.
    pub fn domain<S: Into<String>>(domain: S) -> Self {
        TenantContext {
            multi_tenancy: true,
            domain: domain.into(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.multi_tenancy
    }

    pub fn domain_name(&self) -> &str {
        &self.domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_context() {
        assert!(!TenantContext::single().is_active());

        let tenant = TenantContext::domain("acme.com");
        assert!(tenant.is_active());
        assert_eq!(tenant.domain_name(), "acme.com");

        assert!(TenantContext::domain("").is_active());
    }
}

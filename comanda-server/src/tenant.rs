//! Tenant scope resolution
//!
//! Every read/write path that touches tables, orders or catalog entities
//! must be filtered through a [`TenantScope`]; omitting it is a
//! cross-tenant data leak, not merely a bug.

use crate::auth::{Capability, Identity};
use crate::error::AppError;

/// Resolved tenant visibility of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantScope {
    /// Administrator capability: sees all tenants
    Unscoped,
    /// Everything filtered to this tenant
    Tenant(i64),
}

impl TenantScope {
    /// Resolve the scope from an authenticated identity.
    ///
    /// Priority order: administrator → unscoped; owner → its own tenant;
    /// any principal with an assigned tenant → that tenant; otherwise
    /// the request is blocked with `NotAssociated`.
    pub fn resolve(identity: &Identity) -> Result<TenantScope, AppError> {
        if identity.has(Capability::Administrator) {
            return Ok(TenantScope::Unscoped);
        }
        match identity.tenant_id {
            Some(id) => Ok(TenantScope::Tenant(id)),
            None => Err(AppError::NotAssociated),
        }
    }

    /// Whether an entity owned by `tenant_id` is visible in this scope
    pub fn covers(&self, tenant_id: i64) -> bool {
        match self {
            TenantScope::Unscoped => true,
            TenantScope::Tenant(id) => *id == tenant_id,
        }
    }

    /// SQL filter value: `None` means no tenant predicate
    pub fn filter(&self) -> Option<i64> {
        match self {
            TenantScope::Unscoped => None,
            TenantScope::Tenant(id) => Some(*id),
        }
    }

    /// The single tenant this scope is bound to, or `Validation` for
    /// unscoped principals (used by write paths that need one tenant)
    pub fn require_tenant(&self) -> Result<i64, AppError> {
        match self {
            TenantScope::Tenant(id) => Ok(*id),
            TenantScope::Unscoped => Err(AppError::Validation(
                "operation requires a tenant-bound session".to_string(),
            )),
        }
    }
}

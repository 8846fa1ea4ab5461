use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pledge_core::{FilialeId, UserId};

use crate::policy::permissions_for;
use crate::{Permission, Role};

/// A fully resolved principal for authorization decisions.
///
/// The console service resolves it from its own user records on every call
/// (`ConsoleService::principal`); callers only ever hand in a user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
    /// `None` for admins, who span every filiale.
    pub filiale_id: Option<FilialeId>,
    pub permissions: Vec<Permission>,
}

impl Principal {
    /// Principal carrying the role's default permissions.
    pub fn for_role(user_id: UserId, role: Role, filiale_id: Option<FilialeId>) -> Self {
        Self {
            user_id,
            role,
            filiale_id,
            permissions: permissions_for(role),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("unknown account")]
    UnknownAccount,

    #[error("account is inactive")]
    InactiveAccount,

    #[error("filiale mismatch")]
    FilialeMismatch,

    #[error("account is not attached to a filiale")]
    MissingFiliale,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Check that the principal holds `required`.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    let perms: HashSet<&str> = principal.permissions.iter().map(|p| p.as_str()).collect();

    if perms.contains("*") || perms.contains(required.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Check that the principal holds at least one of `options`.
///
/// Reports the last missing permission when none is held.
pub fn authorize_any(principal: &Principal, options: &[Permission]) -> Result<(), AuthzError> {
    let mut last = Err(AuthzError::Forbidden(String::new()));
    for required in options {
        last = authorize(principal, required);
        if last.is_ok() {
            break;
        }
    }
    last
}

/// Check that the principal may act on data owned by `filiale_id`.
///
/// Admins act in every filiale; everyone else only in their own.
pub fn within_filiale(principal: &Principal, filiale_id: FilialeId) -> Result<(), AuthzError> {
    if principal.is_admin() {
        return Ok(());
    }
    match principal.filiale_id {
        Some(own) if own == filiale_id => Ok(()),
        Some(_) => Err(AuthzError::FilialeMismatch),
        None => Err(AuthzError::MissingFiliale),
    }
}

/// Check `required` for an action on data owned by `filiale_id`.
pub fn authorize_in_filiale(
    principal: &Principal,
    required: &Permission,
    filiale_id: FilialeId,
) -> Result<(), AuthzError> {
    authorize(principal, required)?;
    within_filiale(principal, filiale_id)
}

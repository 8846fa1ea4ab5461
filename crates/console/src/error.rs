use thiserror::Error;

use pledge_auth::AuthzError;
use pledge_core::DomainError;
use pledge_infra::{DispatchError, RepositoryError};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a console operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    /// Validation, not-found and conflict failures from the domain.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Dispatch(DispatchError),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<DispatchError> for ServiceError {
    fn from(value: DispatchError) -> Self {
        match value {
            DispatchError::Domain(e) => ServiceError::Domain(e),
            other => ServiceError::Dispatch(other),
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound(what) => ServiceError::Domain(DomainError::not_found(what)),
            RepositoryError::AlreadyExists(what) => {
                ServiceError::Domain(DomainError::conflict(format!("{what} already exists")))
            }
            other => ServiceError::Repository(other),
        }
    }
}

impl ServiceError {
    /// Offending input field for validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            ServiceError::Domain(e) => e.field(),
            _ => None,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, ServiceError::Forbidden(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Domain(DomainError::NotFound(_)))
    }
}

//! Console application service.
//!
//! Every operation receives the caller's `UserId`, resolves it into a
//! `Principal` from the stored account and checks permissions before
//! touching storage. Non-admin callers only ever see and change data of their
//! own filiale.

mod catalog;
mod directory;
mod fleet;
mod orders;

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{NaiveDate, Utc};

use pledge_auth::{AuthzError, Principal, Role};
use pledge_core::{DomainError, FilialeId, UserId};
use pledge_directory::{Filiale, NewUser, Region, Shop, User};
use pledge_fleet::{Livreur, Truck};
use pledge_infra::{
    EventStore, InMemoryEventStore, InMemoryRepository, ProductCatalog, Repository,
    RepositoryError,
};
use pledge_sales::{Order, OrderSettings, PriceList};

use crate::error::{ServiceError, ServiceResult};

pub use catalog::VariantEdit;

/// Storage for the non-event-sourced records.
#[derive(Clone)]
pub struct Repositories {
    pub filiales: Arc<dyn Repository<Filiale>>,
    pub regions: Arc<dyn Repository<Region>>,
    pub users: Arc<dyn Repository<User>>,
    pub shops: Arc<dyn Repository<Shop>>,
    pub livreurs: Arc<dyn Repository<Livreur>>,
    pub trucks: Arc<dyn Repository<Truck>>,
    pub orders: Arc<dyn Repository<Order>>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            filiales: Arc::new(InMemoryRepository::<Filiale>::new()),
            regions: Arc::new(InMemoryRepository::<Region>::new()),
            users: Arc::new(InMemoryRepository::<User>::new()),
            shops: Arc::new(InMemoryRepository::<Shop>::new()),
            livreurs: Arc::new(InMemoryRepository::<Livreur>::new()),
            trucks: Arc::new(InMemoryRepository::<Truck>::new()),
            orders: Arc::new(InMemoryRepository::<Order>::new()),
        }
    }
}

pub struct ConsoleService<S> {
    repos: Repositories,
    products: ProductCatalog<S>,
    /// Applies to filiales that never saved their own settings.
    default_settings: OrderSettings,
    settings: RwLock<HashMap<FilialeId, OrderSettings>>,
    offers: RwLock<HashMap<FilialeId, PriceList>>,
}

impl ConsoleService<InMemoryEventStore> {
    pub fn in_memory(default_settings: OrderSettings) -> Self {
        Self::new(
            InMemoryEventStore::new(),
            Repositories::in_memory(),
            default_settings,
        )
    }
}

impl<S: EventStore> ConsoleService<S> {
    pub fn new(store: S, repos: Repositories, default_settings: OrderSettings) -> Self {
        Self {
            repos,
            products: ProductCatalog::new(store),
            default_settings,
            settings: RwLock::new(HashMap::new()),
            offers: RwLock::new(HashMap::new()),
        }
    }

    /// Create the first administrator of an empty console.
    pub fn bootstrap_admin(&self, input: NewUser) -> ServiceResult<User> {
        if input.role != Role::Admin {
            return Err(DomainError::validation("role", "the first account must be an Admin").into());
        }
        let user = User::new(UserId::new(), input, today())?;
        unique(
            self.repos.users.insert_unique(user.clone(), &|_: &User, _: &User| true),
            || "the console already has accounts".to_string(),
        )?;
        tracing::info!(user_id = %user.id, "administrator bootstrapped");
        Ok(user)
    }

    /// Resolve a caller into a principal from the stored account.
    ///
    /// Unknown and inactive accounts are rejected. Role and filiale always
    /// come from the record, never from the caller.
    pub fn principal(&self, user_id: UserId) -> ServiceResult<Principal> {
        let user = match self.repos.users.get(user_id) {
            Ok(user) => user,
            Err(RepositoryError::NotFound(_)) => {
                return Err(reject(user_id, AuthzError::UnknownAccount));
            }
            Err(other) => return Err(other.into()),
        };
        if !user.is_active {
            return Err(reject(user_id, AuthzError::InactiveAccount));
        }
        Ok(Principal::for_role(user.id, user.role, user.filiale_id))
    }

    fn read_settings(&self) -> ServiceResult<RwLockReadGuard<'_, HashMap<FilialeId, OrderSettings>>> {
        self.settings.read().map_err(|_| RepositoryError::Poisoned.into())
    }

    fn write_settings(&self) -> ServiceResult<RwLockWriteGuard<'_, HashMap<FilialeId, OrderSettings>>> {
        self.settings.write().map_err(|_| RepositoryError::Poisoned.into())
    }

    fn read_offers(&self) -> ServiceResult<RwLockReadGuard<'_, HashMap<FilialeId, PriceList>>> {
        self.offers.read().map_err(|_| RepositoryError::Poisoned.into())
    }

    fn write_offers(&self) -> ServiceResult<RwLockWriteGuard<'_, HashMap<FilialeId, PriceList>>> {
        self.offers.write().map_err(|_| RepositoryError::Poisoned.into())
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn reject(user_id: UserId, error: AuthzError) -> ServiceError {
    tracing::warn!(%user_id, error = %error, "caller rejected");
    ServiceError::Forbidden(error)
}

fn deny(principal: &Principal, action: &'static str, error: AuthzError) -> ServiceError {
    tracing::warn!(
        user_id = %principal.user_id,
        role = %principal.role,
        action,
        error = %error,
        "permission denied"
    );
    ServiceError::Forbidden(error)
}

fn guard(principal: &Principal, action: &'static str, check: Result<(), AuthzError>) -> ServiceResult<()> {
    check.map_err(|e| deny(principal, action, e))
}

fn guard_filiale(principal: &Principal, action: &'static str) -> ServiceResult<FilialeId> {
    principal
        .filiale_id
        .ok_or_else(|| deny(principal, action, AuthzError::MissingFiliale))
}

/// Filiale a caller is confined to; `None` for admins.
fn scope(principal: &Principal) -> ServiceResult<Option<FilialeId>> {
    if principal.is_admin() {
        return Ok(None);
    }
    principal
        .filiale_id
        .map(Some)
        .ok_or(ServiceError::Forbidden(AuthzError::MissingFiliale))
}

/// Turn a uniqueness clash reported by a repository into a domain conflict.
fn unique(result: Result<(), RepositoryError>, conflict: impl FnOnce() -> String) -> ServiceResult<()> {
    match result {
        Err(RepositoryError::AlreadyExists(_)) => Err(DomainError::conflict(conflict()).into()),
        other => Ok(other?),
    }
}

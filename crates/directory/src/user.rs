use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pledge_auth::Role;
use pledge_core::error::require_non_blank;
use pledge_core::{contains_ci, DomainError, DomainResult, Entity, FilialeId, Filter, UserId};

/// A console account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub fullname: String,
    pub email: String,
    pub role: Role,
    /// Absent only for administrators.
    pub filiale_id: Option<FilialeId>,
    pub is_active: bool,
    pub created_on: NaiveDate,
}

/// Input for creating or editing a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub fullname: String,
    pub email: String,
    pub role: Role,
    pub filiale_id: Option<FilialeId>,
    pub is_active: bool,
}

impl NewUser {
    fn validate(&self) -> DomainResult<()> {
        require_non_blank("fullname", &self.fullname)?;
        check_email(&self.email)?;
        if self.role.requires_filiale() && self.filiale_id.is_none() {
            return Err(DomainError::validation(
                "filiale_id",
                format!("{} accounts must belong to a filiale", self.role),
            ));
        }
        Ok(())
    }
}

/// Required address with text on both sides of the `@`.
pub(crate) fn check_email(email: &str) -> DomainResult<()> {
    require_non_blank("email", email)?;
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(DomainError::validation(
            "email",
            format!("'{email}' is not a valid email address"),
        )),
    }
}

impl User {
    pub fn new(id: UserId, input: NewUser, created_on: NaiveDate) -> DomainResult<Self> {
        input.validate()?;
        Ok(Self {
            id,
            fullname: input.fullname.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            role: input.role,
            filiale_id: input.filiale_id,
            is_active: input.is_active,
            created_on,
        })
    }

    pub fn update(&mut self, input: NewUser) -> DomainResult<()> {
        input.validate()?;
        self.fullname = input.fullname.trim().to_string();
        self.email = input.email.trim().to_lowercase();
        self.role = input.role;
        self.filiale_id = input.filiale_id;
        self.is_active = input.is_active;
        Ok(())
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Matches the full name or the email.
    pub search: Option<String>,
    pub role: Option<Role>,
    pub filiale_id: Option<FilialeId>,
    pub is_active: Option<bool>,
    /// When set, only these roles are listed.
    pub roles: Option<Vec<Role>>,
}

impl UserFilter {
    /// Restrict the listing to the roles a caller may manage.
    pub fn restricted_to(mut self, roles: &[Role]) -> Self {
        self.roles = Some(roles.to_vec());
        self
    }
}

impl Filter<User> for UserFilter {
    fn matches(&self, u: &User) -> bool {
        if let Some(search) = &self.search {
            if !contains_ci(&u.fullname, search) && !contains_ci(&u.email, search) {
                return false;
            }
        }
        if self.role.is_some_and(|r| u.role != r) {
            return false;
        }
        if self.filiale_id.is_some_and(|id| u.filiale_id != Some(id)) {
            return false;
        }
        if self.is_active.is_some_and(|a| u.is_active != a) {
            return false;
        }
        self.roles.as_ref().is_none_or(|roles| roles.contains(&u.role))
    }
}
